//! Rejection reasons for inbound provider events.
//!
//! Every variant is a reason to refuse the delivery before any state is
//! touched. All of them answer 400 so the provider records the failure.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebhookError {
    /// No `Stripe-Signature` header on the request.
    #[error("Missing signature header")]
    MissingSignature,

    /// `Stripe-Signature` header present but unreadable.
    #[error("Malformed signature header: {0}")]
    MalformedSignature(String),

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Signed payload is not a readable event.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Test-mode event delivered to a live-mode endpoint.
    #[error("Livemode mismatch")]
    LivemodeMismatch,
}

impl WebhookError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// True for every signature-verification failure: the delivery may be
    /// forged or replayed.
    pub fn is_security_event(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::MalformedSignature(_)
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }
}
