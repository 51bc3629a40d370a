//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, caller identity and error types used by the
//! billing domain and the adapters around it.

mod auth;
mod errors;
mod ids;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CustomerId, UserId};
pub use timestamp::Timestamp;
