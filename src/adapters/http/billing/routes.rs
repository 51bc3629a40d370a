//! Axum router configuration for billing endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::adapters::http::middleware::{auth_middleware, optional_auth_middleware, AuthState};

use super::handlers::{
    checkout_success, create_checkout_session, get_subscription, handle_stripe_webhook, health,
    BillingAppState,
};

/// Browser-facing billing routes, mounted at `/api/billing`.
///
/// - `POST /checkout-session` - start hosted checkout (auth required)
/// - `GET /subscription` - caller's stored snapshot (auth required)
/// - `GET /success` - post-checkout landing (auth optional; an invalid token
///   counts as anonymous so the browser is always redirected)
pub fn billing_routes(auth: AuthState) -> Router<BillingAppState> {
    let protected = Router::new()
        .route("/checkout-session", post(create_checkout_session))
        .route("/subscription", get(get_subscription))
        .layer(middleware::from_fn_with_state(auth.clone(), auth_middleware));

    let landing = Router::new()
        .route("/success", get(checkout_success))
        .layer(middleware::from_fn_with_state(auth, optional_auth_middleware));

    protected.merge(landing)
}

/// Provider callbacks, mounted at `/api/webhooks`.
///
/// No bearer auth; deliveries are authenticated by signature.
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Complete application router.
///
/// # Example
///
/// ```ignore
/// let app = app_router(state, validator)
///     .layer(TraceLayer::new_for_http());
/// ```
pub fn app_router(state: BillingAppState, auth: AuthState) -> Router {
    Router::new()
        .nest("/api/billing", billing_routes(auth))
        .nest("/api/webhooks", webhook_routes())
        .route("/health", get(health))
        .with_state(state)
}
