//! Adapters - Implementations of port interfaces.
//!
//! - `stripe` - Stripe REST client and an in-process mock
//! - `postgres` - sqlx-backed link and snapshot stores
//! - `memory` - In-memory stores for tests
//! - `auth` - Bearer token validation
//! - `http` - axum routes, extractors and middleware

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
