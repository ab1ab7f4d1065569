//! Account balance handler.
//!
//! Business logic is simulated; the interesting part is that the handler
//! runs only after the pipeline has verified the token and the
//! `payments.read` scope.

use crate::auth::Principal;
use crate::models::BalanceResponse;
use axum::{Extension, Json};
use chrono::Utc;
use tracing::instrument;

/// Handler for `GET /api/payments/balance`.
///
/// Requires scope `payments.read`.
#[instrument(skip_all, name = "payments.handlers.balance")]
pub async fn get_balance(Extension(principal): Extension<Principal>) -> Json<BalanceResponse> {
    tracing::info!(target: "payments.handlers.balance", "Balance request");

    Json(BalanceResponse {
        user_id: principal.sub.clone(),
        user_name: principal.name.clone(),
        account_number: "4532-1234-5678-9012".to_string(),
        balance: 15_000.50,
        currency: "USD".to_string(),
        last_update: Utc::now(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_balance_echoes_principal_identity() {
        let principal = Principal {
            sub: "user-42".to_string(),
            name: Some("Jordan Doe".to_string()),
            scopes: vec!["payments.read".to_string()],
        };

        let Json(response) = get_balance(Extension(principal)).await;

        assert_eq!(response.user_id, "user-42");
        assert_eq!(response.user_name.as_deref(), Some("Jordan Doe"));
        assert_eq!(response.currency, "USD");
    }
}
