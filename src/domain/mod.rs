//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, auth, errors)
//! - `billing` - Customer links, subscription snapshots and webhook verification

pub mod billing;
pub mod foundation;
