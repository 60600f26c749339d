//! HTTP handlers grouped by resource.

pub mod catalog;
pub mod ops;
pub mod payments;
pub mod sessions;

use common::SessionId;

use crate::error::ApiError;

fn parse_session_id(id: &str) -> Result<SessionId, ApiError> {
    id.parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid session id {id:?}: {e}")))
}
