//! Checkout error types.

use common::SessionId;
use domain::OrderError;
use thiserror::Error;

/// Errors that can occur while routing inputs and talking to collaborators.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The order session refused the operation.
    #[error("Domain error: {0}")]
    Domain(#[from] OrderError),

    /// No session exists for the given identity.
    #[error("Session {0} not found")]
    SessionNotFound(SessionId),

    /// The payment provider could not start a payment.
    #[error("Payment service error: {0}")]
    PaymentService(String),

    /// The operator notification could not be delivered.
    #[error("Notification service error: {0}")]
    NotificationService(String),

    /// No payment provider is configured.
    #[error("Online payment is not configured")]
    PaymentUnavailable,
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
