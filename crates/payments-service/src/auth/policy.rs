//! Route authorization policy and the authorization gate.
//!
//! Required scopes are declared in one static table built at startup,
//! consulted by the auth middleware for every request. Scope matching is
//! exact-string and case-sensitive; `payments.read` is not satisfied by
//! `payments.write`, `payments.*` or `payments.readwrite`.

use crate::auth::claims::Principal;
use crate::errors::AuthError;
use axum::http::Method;

/// Scope required to read account state.
pub const SCOPE_PAYMENTS_READ: &str = "payments.read";

/// Scope required to move money.
pub const SCOPE_PAYMENTS_WRITE: &str = "payments.write";

/// Access requirement for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// No token required.
    Public,

    /// A verified token is required, but no particular scope.
    Authenticated,

    /// A verified token carrying this exact scope is required.
    Scope(&'static str),
}

/// Static route-to-requirement table, immutable after startup.
pub struct RoutePolicy {
    rules: Vec<(Method, &'static str, RouteAccess)>,
}

impl RoutePolicy {
    /// The policy table for this service's routes.
    pub fn payments_default() -> Self {
        Self {
            rules: vec![
                (Method::GET, "/health", RouteAccess::Public),
                (
                    Method::GET,
                    "/api/payments/balance",
                    RouteAccess::Scope(SCOPE_PAYMENTS_READ),
                ),
                (
                    Method::POST,
                    "/api/payments/transfer",
                    RouteAccess::Scope(SCOPE_PAYMENTS_WRITE),
                ),
                (
                    Method::GET,
                    "/api/payments/info",
                    RouteAccess::Authenticated,
                ),
            ],
        }
    }

    /// Look up the access requirement for a request.
    ///
    /// Unlisted routes require authentication: anonymous clients get the
    /// same 401 for unknown and unrouted paths, so the route table cannot
    /// be enumerated without a token.
    pub fn required_access(&self, method: &Method, path: &str) -> RouteAccess {
        self.rules
            .iter()
            .find(|(m, p, _)| m == method && *p == path)
            .map_or(RouteAccess::Authenticated, |(_, _, access)| *access)
    }
}

/// The authorization gate: does this principal satisfy the requirement?
///
/// Public routes never reach the gate with a token; they are short-circuited
/// by the middleware before authentication.
///
/// # Errors
///
/// Returns `AuthError::InsufficientScope` when a scoped route's requirement
/// is not in the principal's scope set.
pub fn authorize(principal: &Principal, access: RouteAccess) -> Result<(), AuthError> {
    match access {
        RouteAccess::Public | RouteAccess::Authenticated => Ok(()),
        RouteAccess::Scope(required) => {
            if principal.has_scope(required) {
                Ok(())
            } else {
                Err(AuthError::InsufficientScope {
                    required: required.to_string(),
                })
            }
        }
    }
}
