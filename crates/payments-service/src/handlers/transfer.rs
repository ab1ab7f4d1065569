//! Transfer handler.
//!
//! Executes a simulated transfer. Requires scope `payments.write`; the
//! amount must be strictly positive.

use crate::auth::Principal;
use crate::errors::ApiError;
use crate::models::{TransferRequest, TransferResponse};
use axum::{Extension, Json};
use chrono::Utc;
use tracing::instrument;
use uuid::Uuid;

/// Handler for `POST /api/payments/transfer`.
///
/// Requires scope `payments.write`.
///
/// # Errors
///
/// Returns `ApiError::BadRequest` for non-positive amounts.
#[instrument(skip_all, name = "payments.handlers.transfer")]
pub async fn create_transfer(
    Extension(_principal): Extension<Principal>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    tracing::info!(
        target: "payments.handlers.transfer",
        amount = request.amount,
        currency = %request.currency,
        "Transfer request"
    );

    // The comparison is written to also reject NaN
    if !(request.amount > 0.0) {
        return Err(ApiError::BadRequest(
            "transfer amount must be positive".to_string(),
        ));
    }

    Ok(Json(TransferResponse {
        transaction_id: format!("TXN-{}", Uuid::new_v4()),
        status: "COMPLETED".to_string(),
        from_account: request.from_account,
        to_account: request.to_account,
        amount: request.amount,
        currency: request.currency,
        timestamp: Utc::now(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn writer_principal() -> Principal {
        Principal {
            sub: "user-42".to_string(),
            name: None,
            scopes: vec!["payments.write".to_string()],
        }
    }

    fn request_with_amount(amount: f64) -> TransferRequest {
        TransferRequest {
            from_account: "ACC-001".to_string(),
            to_account: "ACC-002".to_string(),
            amount,
            currency: "USD".to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_transfer_completes() {
        let result =
            create_transfer(Extension(writer_principal()), Json(request_with_amount(250.75))).await;

        let Json(response) = result.unwrap();
        assert_eq!(response.status, "COMPLETED");
        assert!(response.transaction_id.starts_with("TXN-"));
        assert_eq!(response.from_account, "ACC-001");
        assert_eq!(response.to_account, "ACC-002");
    }

    #[tokio::test]
    async fn test_transfer_rejects_zero_amount() {
        let result =
            create_transfer(Extension(writer_principal()), Json(request_with_amount(0.0))).await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_transfer_rejects_negative_amount() {
        let result =
            create_transfer(Extension(writer_principal()), Json(request_with_amount(-5.0))).await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_transfer_rejects_nan_amount() {
        let result =
            create_transfer(Extension(writer_principal()), Json(request_with_amount(f64::NAN)))
                .await;

        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
