//! Token introspection handler.
//!
//! Echoes the verified token's claims back to the caller. Any valid token
//! for this audience may call it; no scope is required.

use crate::auth::Claims;
use axum::{Extension, Json};
use serde::Serialize;
use tracing::instrument;

/// Response for `GET /api/payments/info`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfoResponse {
    /// Always true; the request reached a protected handler.
    pub authenticated: bool,

    /// Subject (user or client ID).
    pub user_id: String,

    /// Token scopes.
    pub scopes: Vec<String>,

    /// Token issuer.
    pub issuer: String,

    /// Token audience set.
    pub audience: Vec<String>,

    /// Token issued-at timestamp.
    pub issued_at: i64,

    /// Token expiration timestamp.
    pub expires_at: i64,
}

/// Handler for `GET /api/payments/info`.
///
/// Requires a valid token; no scope requirement.
#[instrument(skip_all, name = "payments.handlers.info")]
pub async fn token_info(Extension(claims): Extension<Claims>) -> Json<TokenInfoResponse> {
    tracing::debug!(target: "payments.handlers.info", "Returning token info");

    let scopes = claims.scopes().iter().map(ToString::to_string).collect();

    Json(TokenInfoResponse {
        authenticated: true,
        user_id: claims.sub,
        scopes,
        issuer: claims.iss,
        audience: claims.aud,
        issued_at: claims.iat,
        expires_at: claims.exp,
    })
}
