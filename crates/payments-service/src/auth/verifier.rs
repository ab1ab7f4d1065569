//! JWT verification for the Payments Service.
//!
//! Verifies incoming bearer tokens using public keys resolved from the
//! issuer's JWKS endpoint.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only allow-listed asymmetric algorithms are accepted; `none` and HMAC
//!   headers are rejected before any key is fetched
//! - Expiration, not-before and issued-at are validated with clock skew
//!   tolerance
//!
//! Issuer and audience are policy, not structure: they are checked by the
//! claim validator chain, not here.

use crate::auth::claims::Claims;
use crate::auth::jwks::{Jwk, JwksClient};
use crate::errors::AuthError;
use common::jwt::{extract_header, validate_iat, RawHeader, ALLOWED_ALGORITHMS};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Token verifier backed by the issuer's JWKS.
pub struct TokenVerifier {
    /// JWKS client for resolving public keys.
    jwks_client: Arc<JwksClient>,

    /// Clock skew tolerance in seconds for temporal claims.
    clock_skew_seconds: i64,
}

impl TokenVerifier {
    /// Create a new token verifier.
    pub fn new(jwks_client: Arc<JwksClient>, clock_skew_seconds: i64) -> Self {
        Self {
            jwks_client,
            clock_skew_seconds,
        }
    }

    /// Verify a raw bearer token and return its claims.
    ///
    /// # Checks, in order
    ///
    /// 1. Size and structure (three base64url parts)
    /// 2. Header algorithm against the allow-list, key ID present
    /// 3. Key resolution via JWKS (one forced refresh on unknown `kid`)
    /// 4. Signature over header+payload with the resolved key
    /// 5. `exp` / `nbf` with leeway, then `iat` not in the future
    ///
    /// # Errors
    ///
    /// Returns the specific [`AuthError`] for the first failed check.
    #[instrument(skip_all)]
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = extract_header(token).map_err(|e| {
            tracing::debug!(target: "payments.auth.jwt", error = ?e, "Token header extraction failed");
            AuthError::MalformedToken
        })?;

        if !ALLOWED_ALGORITHMS.contains(&header.alg.as_str()) {
            tracing::warn!(target: "payments.auth.jwt", alg = %header.alg, "Token rejected: algorithm not allow-listed");
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }

        let jwk = self.jwks_client.get_key(&header.kid).await?;

        let claims = verify_signature(token, &header, &jwk, self.clock_skew_seconds)?;

        if let Err(e) = validate_iat(claims.iat, self.clock_skew()) {
            tracing::debug!(target: "payments.auth.jwt", error = ?e, "Token iat validation failed");
            return Err(AuthError::TokenNotYetValid);
        }

        tracing::debug!(target: "payments.auth.jwt", "Token verified successfully");
        Ok(claims)
    }

    // Safe cast: config validation guarantees a positive bounded value
    #[allow(clippy::cast_sign_loss)]
    fn clock_skew(&self) -> Duration {
        Duration::from_secs(self.clock_skew_seconds as u64)
    }
}

/// Verify the token signature and temporal claims against a resolved key.
fn verify_signature(
    token: &str,
    header: &RawHeader,
    jwk: &Jwk,
    clock_skew_seconds: i64,
) -> Result<Claims, AuthError> {
    if let Some(key_alg) = &jwk.alg {
        if key_alg != &header.alg {
            tracing::warn!(
                target: "payments.auth.jwt",
                token_alg = %header.alg,
                key_alg = %key_alg,
                "Token algorithm does not match key algorithm"
            );
            return Err(AuthError::InvalidSignature);
        }
    }

    let decoding_key = decoding_key_for(jwk)?;
    let algorithm = match header.alg.as_str() {
        "RS256" => Algorithm::RS256,
        "ES256" => Algorithm::ES256,
        other => return Err(AuthError::UnsupportedAlgorithm(other.to_string())),
    };

    let mut validation = Validation::new(algorithm);
    #[allow(clippy::cast_sign_loss)]
    {
        validation.leeway = clock_skew_seconds as u64;
    }
    validation.validate_exp = true;
    validation.validate_nbf = true;
    // Issuer and audience are checked by the claim validator chain
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp"]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
        let mapped = map_jwt_error(&e);
        tracing::debug!(target: "payments.auth.jwt", error = %e, reason = ?mapped, "Token verification failed");
        mapped
    })?;

    Ok(token_data.claims)
}

/// Build a `jsonwebtoken` decoding key from JWK components.
fn decoding_key_for(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    match jwk.kty.as_str() {
        "RSA" => {
            let (n, e) = match (jwk.n.as_deref(), jwk.e.as_deref()) {
                (Some(n), Some(e)) => (n, e),
                _ => {
                    tracing::error!(target: "payments.auth.jwt", kid = %jwk.kid, "RSA JWK missing n/e components");
                    return Err(AuthError::InvalidSignature);
                }
            };
            DecodingKey::from_rsa_components(n, e).map_err(|e| {
                tracing::error!(target: "payments.auth.jwt", kid = %jwk.kid, error = %e, "Invalid RSA key components");
                AuthError::InvalidSignature
            })
        }
        "EC" => {
            let (x, y) = match (jwk.x.as_deref(), jwk.y.as_deref()) {
                (Some(x), Some(y)) => (x, y),
                _ => {
                    tracing::error!(target: "payments.auth.jwt", kid = %jwk.kid, "EC JWK missing x/y coordinates");
                    return Err(AuthError::InvalidSignature);
                }
            };
            DecodingKey::from_ec_components(x, y).map_err(|e| {
                tracing::error!(target: "payments.auth.jwt", kid = %jwk.kid, error = %e, "Invalid EC key components");
                AuthError::InvalidSignature
            })
        }
        other => {
            tracing::error!(target: "payments.auth.jwt", kid = %jwk.kid, kty = %other, "Unusable JWK key type");
            Err(AuthError::InvalidSignature)
        }
    }
}

/// Map `jsonwebtoken` failures onto the pipeline's error taxonomy.
fn map_jwt_error(e: &jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
        ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            AuthError::MalformedToken
        }
        _ => AuthError::InvalidSignature,
    }
}
