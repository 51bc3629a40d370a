//! Authentication middleware and extractors for axum.
//!
//! - `auth_middleware` - validates a Bearer token and injects the user into extensions
//! - `optional_auth_middleware` - same, but a token that fails validation is anonymous
//! - `RequireAuth` - extractor that rejects unauthenticated requests with 401
//! - `OptionalAuth` - extractor that yields `None` for anonymous requests
//!
//! ```text
//! Request → auth_middleware → injects AuthenticatedUser into extensions
//!                                      ↓
//!                              Handler → RequireAuth / OptionalAuth
//! ```
//!
//! With `auth_middleware` a request with no `Authorization` header passes
//! through untouched and a header carrying a bad token is rejected with 401.
//! Routes that must never answer 401, like the post-checkout lander, use
//! `optional_auth_middleware` instead.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthError, AuthenticatedUser};
use crate::ports::SessionValidator;

/// Auth middleware state - wraps the session validator.
pub type AuthState = Arc<dyn SessionValidator>;

/// Validates `Authorization: Bearer <token>` and injects `AuthenticatedUser`.
pub async fn auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        return next.run(request).await;
    };

    match validator.validate(token).await {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            let message = match &e {
                AuthError::TokenExpired => "Token expired",
                AuthError::InvalidToken => "Invalid token",
                AuthError::MissingClaim(claim) => {
                    tracing::warn!(claim = %claim, "Token missing required claim");
                    "Authentication failed"
                }
            };

            (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": message,
                    "code": "AUTH_ERROR"
                })),
            )
                .into_response()
        }
    }
}

/// Injects `AuthenticatedUser` when the Bearer token validates; otherwise the
/// request continues as anonymous.
pub async fn optional_auth_middleware(
    State(validator): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    if let Some(token) = token {
        match validator.validate(token).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid token on optional-auth route");
            }
        }
    }

    next.run(request).await
}

/// Extractor that requires authentication.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(RequireAuth)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Extractor for optional authentication.
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(parts.extensions.get::<AuthenticatedUser>().cloned()))
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone)]
pub enum AuthRejection {
    Unauthenticated,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({
                    "error": "Authentication required",
                    "code": "UNAUTHENTICATED"
                })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockSessionValidator;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        let validator: AuthState =
            Arc::new(MockSessionValidator::new().with_test_user("good-token", "user-123"));

        Router::new()
            .route(
                "/protected",
                get(|RequireAuth(user): RequireAuth| async move { user.id.to_string() }),
            )
            .route(
                "/optional",
                get(|OptionalAuth(user): OptionalAuth| async move {
                    user.map(|u| u.id.to_string()).unwrap_or_else(|| "anonymous".to_string())
                }),
            )
            .layer(middleware::from_fn_with_state(validator, auth_middleware))
    }

    fn lenient_app() -> Router {
        let validator: AuthState =
            Arc::new(MockSessionValidator::new().with_test_user("good-token", "user-123"));

        Router::new()
            .route(
                "/optional",
                get(|OptionalAuth(user): OptionalAuth| async move {
                    user.map(|u| u.id.to_string()).unwrap_or_else(|| "anonymous".to_string())
                }),
            )
            .layer(middleware::from_fn_with_state(validator, optional_auth_middleware))
    }

    fn request(uri: &str, token: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // RequireAuth
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn require_auth_accepts_valid_token() {
        let response = app()
            .oneshot(request("/protected", Some("good-token")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "user-123");
    }

    #[tokio::test]
    async fn require_auth_rejects_anonymous() {
        let response = app().oneshot(request("/protected", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(response).await.contains("UNAUTHENTICATED"));
    }

    #[tokio::test]
    async fn bad_token_is_rejected_by_middleware() {
        let response = app()
            .oneshot(request("/optional", Some("forged")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(response).await.contains("AUTH_ERROR"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // OptionalAuth
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn optional_auth_is_none_without_header() {
        let response = app().oneshot(request("/optional", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn optional_auth_is_some_with_valid_token() {
        let response = app()
            .oneshot(request("/optional", Some("good-token")))
            .await
            .unwrap();

        assert_eq!(body_string(response).await, "user-123");
    }

    #[tokio::test]
    async fn lenient_middleware_treats_bad_token_as_anonymous() {
        let response = lenient_app()
            .oneshot(request("/optional", Some("forged")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn lenient_middleware_injects_valid_user() {
        let response = lenient_app()
            .oneshot(request("/optional", Some("good-token")))
            .await
            .unwrap();

        assert_eq!(body_string(response).await, "user-123");
    }

    #[test]
    fn auth_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuthState>();
        assert_send_sync::<RequireAuth>();
        assert_send_sync::<OptionalAuth>();
    }
}
