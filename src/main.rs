//! billing-sync server binary.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use billing_sync::adapters::auth::JwtSessionValidator;
use billing_sync::adapters::http::middleware::{AuthState, MakeRequestUuid};
use billing_sync::adapters::http::{app_router, BillingAppState, CheckoutSettings};
use billing_sync::adapters::postgres::{
    connect_pool, run_migrations, PostgresCustomerLinkRepository, PostgresSubscriptionRepository,
};
use billing_sync::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use billing_sync::config::{AppConfig, ServerConfig};
use billing_sync::domain::billing::StripeWebhookVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        stripe_test_mode = config.payment.is_test_mode(),
        "Starting billing-sync"
    );

    // Storage
    let pool = connect_pool(&config.database).await?;
    if config.database.run_migrations {
        run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }

    // Stripe
    let mut stripe_config = StripeConfig::new(config.payment.stripe_api_key.clone())
        .with_timeout(config.payment.request_timeout());
    if let Some(base_url) = &config.payment.stripe_api_base_url {
        stripe_config = stripe_config.with_base_url(base_url.clone());
    }
    let payment_provider = Arc::new(StripePaymentAdapter::new(stripe_config)?);

    let state = BillingAppState {
        customer_links: Arc::new(PostgresCustomerLinkRepository::new(pool.clone())),
        subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool)),
        payment_provider,
        webhook_verifier: Arc::new(StripeWebhookVerifier::new(
            config.payment.stripe_webhook_secret.clone(),
        )),
        settings: CheckoutSettings {
            price_id: config.payment.stripe_price_id.clone(),
            public_url: config.server.public_url.clone(),
            require_livemode: config.payment.require_livemode,
        },
    };
    let auth: AuthState = Arc::new(JwtSessionValidator::from_config(&config.auth));

    let app = with_layers(app_router(state, auth), &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&server.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if server.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    }
}

fn with_layers(router: Router, server: &ServerConfig) -> Router {
    let mut router = router
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)));

    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    if !origins.is_empty() {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
