//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use domain::OrderError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout or order session error.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    let status = match &err {
        CheckoutError::Domain(order_err) => match order_err {
            OrderError::Validation(_) => StatusCode::BAD_REQUEST,
            OrderError::InvalidStateTransition { .. }
            | OrderError::NoActiveOrder
            | OrderError::NoPendingPayment
            | OrderError::PaymentAmountMismatch { .. } => StatusCode::CONFLICT,
            OrderError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            OrderError::IncompleteOrder { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        },
        CheckoutError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        CheckoutError::PaymentUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        CheckoutError::PaymentService(_) | CheckoutError::NotificationService(_) => {
            StatusCode::BAD_GATEWAY
        }
    };

    if status.is_server_error() {
        tracing::error!(error = %err, "checkout failed");
    }
    (status, err.to_string())
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

#[cfg(test)]
mod tests {
    use common::SessionId;
    use domain::{Money, OrderState, ValidationError};

    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_order_errors_map_to_client_statuses() {
        let conflict = CheckoutError::Domain(OrderError::InvalidStateTransition {
            current_state: OrderState::AwaitingContact,
            action: "confirm payment",
        });
        assert_eq!(status_of(conflict.into()), StatusCode::CONFLICT);

        let forbidden = CheckoutError::Domain(OrderError::Unauthorized {
            action: "skip payment",
        });
        assert_eq!(status_of(forbidden.into()), StatusCode::FORBIDDEN);

        let invalid = CheckoutError::Domain(OrderError::Validation(ValidationError::NotANumber));
        assert_eq!(status_of(invalid.into()), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_rejected_payment_completion_statuses() {
        let unrequested = CheckoutError::Domain(OrderError::NoPendingPayment);
        assert_eq!(status_of(unrequested.into()), StatusCode::CONFLICT);

        let mismatch = CheckoutError::Domain(OrderError::PaymentAmountMismatch {
            expected: Money::from_units(835),
            received: Money::from_units(1),
        });
        assert_eq!(status_of(mismatch.into()), StatusCode::CONFLICT);

        let unknown = CheckoutError::SessionNotFound(SessionId::new(9));
        assert_eq!(status_of(unknown.into()), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_collaborator_errors_map_to_server_statuses() {
        assert_eq!(
            status_of(CheckoutError::PaymentUnavailable.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(CheckoutError::PaymentService("declined".into()).into()),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_plain_variants() {
        assert_eq!(
            status_of(ApiError::NotFound("session 1".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ApiError::BadRequest("bad id".into())),
            StatusCode::BAD_REQUEST
        );
    }
}
