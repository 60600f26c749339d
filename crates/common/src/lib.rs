//! Shared identifier types used across the ordering crates.

pub mod types;

pub use types::{OrderId, SessionId};
