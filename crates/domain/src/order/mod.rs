//! Order session aggregate and related types.

mod events;
pub mod input;
mod prompts;
mod record;
mod session;
mod state;
pub mod transitions;
mod value_objects;

pub use events::{OrderStartedData, PaymentConfirmedData, SessionEvent};
pub use input::{InputClass, UserInput};
pub use prompts::{Prompt, QuickReply};
pub use record::OrderRecord;
pub use session::OrderSession;
pub use state::OrderState;
pub use transitions::{StepContext, Transition};
pub use value_objects::{AttachmentRef, CakeKind, CakeSize, Money, PaymentMethod};

use thiserror::Error;

use crate::error::ValidationError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The input failed the current step's predicate; the step is unchanged.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The session is not in a state that allows the action.
    #[error("Invalid state transition: cannot {action} from {current_state} state")]
    InvalidStateTransition {
        current_state: OrderState,
        action: &'static str,
    },

    /// Input arrived while no order is in progress.
    #[error("No order in progress")]
    NoActiveOrder,

    /// A debug-only transition was attempted outside developer mode.
    #[error("'{action}' is only available in developer mode")]
    Unauthorized { action: &'static str },

    /// A payment completion arrived but no prepayment was requested.
    #[error("No prepayment has been requested for this order")]
    NoPendingPayment,

    /// The paid amount is not the prepayment that was requested.
    #[error("Paid {received} does not match the requested prepayment of {expected}")]
    PaymentAmountMismatch { expected: Money, received: Money },

    /// A field required for pricing or the final record is missing.
    #[error("Order is incomplete: {field} is missing")]
    IncompleteOrder { field: &'static str },
}

impl OrderError {
    /// Returns true for errors the customer fixes by answering again.
    pub fn is_validation(&self) -> bool {
        matches!(self, OrderError::Validation(_))
    }
}
