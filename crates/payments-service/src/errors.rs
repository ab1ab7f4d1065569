//! Payments Service error types.
//!
//! Authentication failures carry the specific reason internally but are
//! normalized to generic 401/403 responses: distinguishing "bad signature"
//! from "wrong audience" in the response body would hand a token-probing
//! attacker a debugging oracle. The real reason is logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authentication and authorization failure reasons.
///
/// Every variant is terminal for the request. All map to 401 except
/// `InsufficientScope`, which maps to 403 (valid identity, missing grant).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("malformed token")]
    MalformedToken,

    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("key fetch failed: {0}")]
    KeyFetchFailed(String),

    #[error("signing key not found: {0}")]
    KeyNotFound(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token expired")]
    TokenExpired,

    #[error("token not yet valid")]
    TokenNotYetValid,

    #[error("issuer mismatch")]
    IssuerMismatch,

    #[error("audience mismatch")]
    AudienceMismatch,

    #[error("no credentials presented")]
    NoCredentials,

    #[error("insufficient scope: requires {required}")]
    InsufficientScope { required: String },
}

impl AuthError {
    /// Returns the HTTP status code this failure normalizes to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InsufficientScope { .. } => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

/// Payments Service error type for request handling.
///
/// Maps to HTTP status codes via the `IntoResponse` impl:
/// - Auth: 401 or 403 (see [`AuthError::status_code`])
/// - BadRequest: 400
/// - Internal: 500
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // The specific reason stays server-side; clients get a generic body
        let (code, message) = if status == StatusCode::FORBIDDEN {
            tracing::warn!(target: "payments.auth", reason = %self, "Request forbidden");
            (
                "FORBIDDEN",
                "The access token does not grant the required scope",
            )
        } else {
            tracing::debug!(target: "payments.auth", reason = %self, "Request unauthorized");
            (
                "INVALID_TOKEN",
                "The access token is missing, invalid or expired",
            )
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: message.to_string(),
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) =
                "Bearer realm=\"payments-api\", error=\"invalid_token\"".parse()
            {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(err) => err.into_response(),
            ApiError::BadRequest(reason) => {
                let error_response = ErrorResponse {
                    error: ErrorDetail {
                        code: "BAD_REQUEST".to_string(),
                        message: reason,
                    },
                };
                (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
            }
            ApiError::Internal => {
                let error_response = ErrorResponse {
                    error: ErrorDetail {
                        code: "INTERNAL_ERROR".to_string(),
                        message: "An internal error occurred".to_string(),
                    },
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error_response)).into_response()
            }
        }
    }
}
