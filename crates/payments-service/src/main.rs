//! Payments Service
//!
//! Entry point for the payments resource server. Wires the JWKS client,
//! token verifier, claim validator chain and route policy into the HTTP
//! stack, then serves until shutdown.

use payments_service::auth::{JwksClient, RoutePolicy, TokenVerifier, ValidatorChain};
use payments_service::config::Config;
use payments_service::middleware::AuthState;
use payments_service::routes;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payments_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Payments Service");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        issuer_uri = %config.issuer_uri,
        audience = %config.audience,
        bind_address = %config.bind_address,
        jwt_clock_skew_seconds = config.jwt_clock_skew_seconds,
        jwks_cache_ttl_seconds = config.jwks_cache_ttl_seconds,
        "Configuration loaded successfully"
    );

    // Wire the authentication pipeline
    let jwks_client = Arc::new(JwksClient::with_ttl(
        config.issuer_uri.clone(),
        Duration::from_secs(config.jwks_cache_ttl_seconds),
    ));
    let verifier = Arc::new(TokenVerifier::new(
        jwks_client,
        config.jwt_clock_skew_seconds,
    ));
    let validators = Arc::new(ValidatorChain::standard(
        config.issuer_uri.clone(),
        config.audience.clone(),
    ));
    let policy = Arc::new(RoutePolicy::payments_default());

    let auth_state = AuthState {
        verifier,
        validators,
        policy,
    };

    // Build application routes
    let app = routes::build_routes(auth_state);

    // Parse bind address
    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Payments Service listening on {}", addr);

    // Start server with graceful shutdown support
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Payments Service shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
