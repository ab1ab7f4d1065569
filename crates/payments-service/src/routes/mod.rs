//! HTTP routes for the Payments Service.
//!
//! Defines the Axum router. The authentication middleware wraps every
//! route; the route policy table decides which of them actually require a
//! token, so the policy stays the single source of truth for access rules.

use crate::handlers;
use crate::middleware::AuthState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Public health check
/// - `/api/payments/balance` - Requires scope `payments.read`
/// - `/api/payments/transfer` - Requires scope `payments.write`
/// - `/api/payments/info` - Requires a valid token, no scope
/// - Authentication middleware consulting the route policy
/// - TraceLayer for request logging
/// - 30 second request timeout
pub fn build_routes(auth_state: AuthState) -> Router {
    // Layer order (bottom-to-top execution):
    // 1. authenticate - admit/deny per route policy (innermost)
    // 2. TraceLayer - Log request details
    // 3. TimeoutLayer - Timeout the request
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/payments/balance", get(handlers::get_balance))
        .route("/api/payments/transfer", post(handlers::create_transfer))
        .route("/api/payments/info", get(handlers::token_info))
        .layer(middleware::from_fn_with_state(
            auth_state,
            crate::middleware::authenticate,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}

#[cfg(test)]
mod tests {
    use crate::middleware::AuthState;

    #[test]
    fn test_auth_state_is_clone() {
        // Required for Axum's State extractor.
        fn assert_clone<T: Clone>() {}
        assert_clone::<AuthState>();
    }
}
