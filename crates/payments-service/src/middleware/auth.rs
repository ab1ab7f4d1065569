//! Request authentication pipeline.
//!
//! Every request passes through here. The route policy decides whether a
//! token is required; for protected routes the middleware extracts the
//! bearer token, verifies it, runs the claim validator chain, checks the
//! route's scope requirement, and hands the derived principal to the
//! handler through request extensions.
//!
//! A request moves through the stages in order - extracted, verified,
//! claims validated, authorized, dispatched - and any stage can reject it.

use crate::auth::{authorize, Principal, RouteAccess, RoutePolicy, TokenVerifier, ValidatorChain};
use crate::errors::AuthError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    /// Token verifier with JWKS-backed key resolution.
    pub verifier: Arc<TokenVerifier>,

    /// Issuer/audience claim validator chain.
    pub validators: Arc<ValidatorChain>,

    /// Per-route access requirements.
    pub policy: Arc<RoutePolicy>,
}

/// Authentication middleware applied to the whole router.
///
/// # Authorization Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
///
/// # Response
///
/// - Public routes pass through untouched
/// - Missing/malformed credentials on protected routes return 401 with a
///   `WWW-Authenticate` header
/// - Verification and claim failures return 401; scope denials return 403
/// - On success the `Principal` (and full `Claims`) are stored in request
///   extensions and the inner handler runs
#[instrument(skip_all, name = "payments.middleware.auth")]
pub async fn authenticate(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let access = state.policy.required_access(req.method(), req.uri().path());

    if access == RouteAccess::Public {
        return Ok(next.run(req).await);
    }

    let token = bearer_token(req.headers()).ok_or_else(|| {
        tracing::debug!(target: "payments.middleware.auth", "Missing or malformed Authorization header");
        AuthError::NoCredentials
    })?;

    let claims = state.verifier.verify(token).await?;

    state.validators.validate(&claims)?;

    let principal = Principal::from_claims(&claims);
    authorize(&principal, access)?;

    // Explicit context passing: handlers receive the identity as a value
    req.extensions_mut().insert(claims);
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}

/// Extract the bearer token from the Authorization header, if present.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
