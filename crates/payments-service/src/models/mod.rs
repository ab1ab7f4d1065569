//! Payments Service models.
//!
//! Request and response bodies for the HTTP surface. The payment payloads
//! are simulated business data; their JSON shape uses camelCase field names
//! for API clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response.
///
/// Returned by the `/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status.
    pub status: String,
}

/// Account balance response for `GET /api/payments/balance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// Subject of the authenticated token.
    pub user_id: String,

    /// Display name from the token, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// Masked account number.
    pub account_number: String,

    /// Current balance.
    pub balance: f64,

    /// ISO 4217 currency code.
    pub currency: String,

    /// When the balance was last updated.
    pub last_update: DateTime<Utc>,
}

/// Transfer request body for `POST /api/payments/transfer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Source account identifier.
    pub from_account: String,

    /// Destination account identifier.
    pub to_account: String,

    /// Amount to transfer; must be positive.
    pub amount: f64,

    /// ISO 4217 currency code.
    pub currency: String,

    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Transfer result body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    /// Generated transaction identifier.
    pub transaction_id: String,

    /// Transfer status.
    pub status: String,

    /// Source account identifier.
    pub from_account: String,

    /// Destination account identifier.
    pub to_account: String,

    /// Transferred amount.
    pub amount: f64,

    /// ISO 4217 currency code.
    pub currency: String,

    /// When the transfer was executed.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_response_uses_camel_case() {
        let response = BalanceResponse {
            user_id: "user-1".to_string(),
            user_name: Some("Jordan Doe".to_string()),
            account_number: "4532-1234-5678-9012".to_string(),
            balance: 15_000.50,
            currency: "USD".to_string(),
            last_update: Utc::now(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"userId\":\"user-1\""));
        assert!(json.contains("\"userName\":\"Jordan Doe\""));
        assert!(json.contains("\"accountNumber\""));
        assert!(json.contains("\"lastUpdate\""));
    }

    #[test]
    fn test_balance_response_omits_missing_name() {
        let response = BalanceResponse {
            user_id: "user-1".to_string(),
            user_name: None,
            account_number: "4532-1234-5678-9012".to_string(),
            balance: 0.0,
            currency: "USD".to_string(),
            last_update: Utc::now(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("userName"));
    }

    #[test]
    fn test_transfer_request_deserialization() {
        let json = r#"{
            "fromAccount": "ACC-001",
            "toAccount": "ACC-002",
            "amount": 250.75,
            "currency": "USD",
            "description": "Rent"
        }"#;

        let request: TransferRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.from_account, "ACC-001");
        assert_eq!(request.to_account, "ACC-002");
        assert!((request.amount - 250.75).abs() < f64::EPSILON);
        assert_eq!(request.description.as_deref(), Some("Rent"));
    }

    #[test]
    fn test_transfer_request_description_is_optional() {
        let json = r#"{
            "fromAccount": "ACC-001",
            "toAccount": "ACC-002",
            "amount": 10.0,
            "currency": "USD"
        }"#;

        let request: TransferRequest = serde_json::from_str(json).unwrap();
        assert!(request.description.is_none());
    }

    #[test]
    fn test_transfer_response_round_trip() {
        let response = TransferResponse {
            transaction_id: "TXN-0001".to_string(),
            status: "COMPLETED".to_string(),
            from_account: "ACC-001".to_string(),
            to_account: "ACC-002".to_string(),
            amount: 99.99,
            currency: "USD".to_string(),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"transactionId\":\"TXN-0001\""));
        assert!(json.contains("\"status\":\"COMPLETED\""));

        let decoded: TransferResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.transaction_id, response.transaction_id);
    }
}
