//! HTTP middleware for axum.
//!
//! - `auth` - Bearer token middleware and extractors
//! - `request_id` - `x-request-id` generation

pub mod auth;
pub mod request_id;

pub use auth::{
    auth_middleware, optional_auth_middleware, AuthRejection, AuthState, OptionalAuth, RequireAuth,
};
pub use request_id::MakeRequestUuid;
