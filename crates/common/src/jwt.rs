//! JWT utilities shared across Payments Service components.
//!
//! This module provides the low-level JWT plumbing that runs before any
//! cryptographic verification:
//! - Size limits for DoS prevention
//! - Clock skew constants and iat validation
//! - Raw header extraction (algorithm + key ID) from unverified tokens
//! - The asymmetric signing algorithm allow-list
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only allow-listed asymmetric algorithms are accepted
//! - Generic error messages prevent information leakage

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// JWTs larger than this are rejected BEFORE any base64 decode or signature
/// verification, bounding the resources an unauthenticated caller can consume.
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Default JWT clock skew tolerance.
///
/// Accounts for small clock drift between this service and the issuer when
/// checking `exp`, `nbf` and `iat`.
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(5);

/// Maximum allowed JWT clock skew tolerance (10 minutes).
///
/// Prevents misconfiguration that would weaken temporal claim checks.
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

/// Asymmetric signing algorithms this service accepts.
///
/// Symmetric algorithms (HMAC) and `none` are rejected up front; accepting
/// them against keys published in a public JWKS would let anyone mint tokens.
pub const ALLOWED_ALGORITHMS: &[&str] = &["RS256", "ES256"];

// =============================================================================
// Error Types
// =============================================================================

/// Errors from pre-verification token handling.
///
/// Messages are intentionally generic; the variant itself carries the detail
/// for server-side logging.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token format is invalid (not a valid JWT structure).
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Token is missing a usable `kid` header.
    #[error("The access token is invalid or expired")]
    MissingKid,

    /// Token `iat` claim is too far in the future.
    #[error("The access token is invalid or expired")]
    IatTooFarInFuture,
}

// =============================================================================
// Raw header
// =============================================================================

/// The two header fields needed before signature verification can start.
///
/// Extracted without verifying the signature; `alg` must still be checked
/// against [`ALLOWED_ALGORITHMS`] and `kid` used only for lookup in a
/// trusted JWKS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHeader {
    /// Declared signing algorithm (e.g. "RS256").
    pub alg: String,

    /// Key ID selecting the verification key from the issuer's key set.
    pub kid: String,
}

#[derive(Deserialize)]
struct HeaderFields {
    #[serde(default)]
    alg: Option<String>,
    #[serde(default)]
    kid: Option<String>,
}

/// Extract the algorithm and key ID from a JWT header without verifying
/// the signature.
///
/// # Security
///
/// - Token size is checked BEFORE any parsing
/// - The returned values are attacker-controlled until the signature is
///   verified with the key the `kid` resolves to
///
/// # Errors
///
/// - `TokenTooLarge` - token exceeds [`MAX_JWT_SIZE_BYTES`]
/// - `MalformedToken` - wrong structure, bad base64, invalid JSON, or a
///   missing/empty `alg`
/// - `MissingKid` - header has no usable string `kid`
pub fn extract_header(token: &str) -> Result<RawHeader, JwtValidationError> {
    // Size check first (DoS prevention)
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "common.jwt",
            parts = parts.len(),
            "Token rejected: invalid JWT format"
        );
        return Err(JwtValidationError::MalformedToken);
    }

    let header_part = parts.first().ok_or(JwtValidationError::MalformedToken)?;
    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT header base64");
        JwtValidationError::MalformedToken
    })?;

    let header: HeaderFields = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header JSON");
        JwtValidationError::MalformedToken
    })?;

    let alg = header
        .alg
        .filter(|a| !a.is_empty())
        .ok_or(JwtValidationError::MalformedToken)?;

    // Empty kid is rejected outright; it can never match a published key
    let kid = header
        .kid
        .filter(|k| !k.is_empty())
        .ok_or(JwtValidationError::MissingKid)?;

    Ok(RawHeader { alg, kid })
}

// =============================================================================
// Temporal checks
// =============================================================================

/// Validate the `iat` (issued-at) claim with clock skew tolerance.
///
/// Rejects tokens issued in the future, which indicates either clock drift
/// beyond tolerance or a manipulated token.
///
/// # Errors
///
/// Returns `JwtValidationError::IatTooFarInFuture` if `iat` is more than
/// `clock_skew` ahead of the current time.
pub fn validate_iat(iat: i64, clock_skew: Duration) -> Result<(), JwtValidationError> {
    let now = chrono::Utc::now().timestamp();
    validate_iat_at(iat, clock_skew, now)
}

/// Deterministic `iat` validation against an explicit `now` timestamp.
///
/// Prefer [`validate_iat`] in production code. This variant exists so that
/// boundary conditions can be unit-tested without wall-clock dependence.
pub fn validate_iat_at(
    iat: i64,
    clock_skew: Duration,
    now: i64,
) -> Result<(), JwtValidationError> {
    // Safe cast: clock_skew is bounded to MAX_CLOCK_SKEW (600 seconds)
    #[allow(clippy::cast_possible_wrap)]
    let clock_skew_secs = clock_skew.as_secs() as i64;
    let max_iat = now + clock_skew_secs;

    if iat > max_iat {
        tracing::debug!(
            target: "common.jwt",
            iat = iat,
            now = now,
            max_allowed = max_iat,
            "Token rejected: iat too far in the future"
        );
        return Err(JwtValidationError::IatTooFarInFuture);
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
