//! Checkout layer for the cake order assistant.
//!
//! Sits between a conversational transport and the pure order session:
//! - keeps one session per conversation and serializes its inputs
//! - hands prepayments to the payment provider and maps completion to
//!   order confirmation
//! - delivers confirmed orders to the bakery operator
//!
//! Collaborator failures never leave a session half-updated: events are
//! committed only after the hand-off they depend on succeeded.

pub mod clock;
pub mod coordinator;
pub mod error;
pub mod repository;
pub mod services;

pub use clock::{Clock, FixedClock, SystemClock};
pub use coordinator::{CheckoutCoordinator, CheckoutSettings, Inbound, PaymentReceipt, Reply};
pub use error::CheckoutError;
pub use repository::{SessionRepository, SessionSlot};
pub use services::{
    InMemoryNotificationService, InMemoryPaymentService, Invoice, InvoiceRequest,
    NotificationService, OperatorMessage, PaymentPurpose, PaymentService,
};
