//! Domain layer for the cake order assistant.
//!
//! This crate is pure: no I/O, no clocks beyond event timestamps. It provides:
//! - the product catalogs and the pricing engine
//! - the order session aggregate driven by an explicit transition table
//! - customer-facing prompts and the confirmed order record
//! - slash command parsing

pub mod aggregate;
pub mod catalog;
pub mod command;
pub mod error;
pub mod order;
pub mod pricing;

pub use aggregate::{Aggregate, DomainEvent};
pub use command::BotCommand;
pub use error::ValidationError;
pub use order::{
    AttachmentRef, CakeKind, CakeSize, InputClass, Money, OrderError, OrderRecord, OrderSession,
    OrderState, PaymentMethod, Prompt, QuickReply, SessionEvent, StepContext, UserInput,
};
pub use pricing::{PriceBreakdown, PricingInput};
