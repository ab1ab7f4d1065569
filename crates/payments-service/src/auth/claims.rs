//! JWT claims structure and the derived request principal.
//!
//! Claims are deserialized once during verification and treated as immutable
//! for the rest of the request. The `sub` field is redacted in Debug output
//! to prevent exposure in logs.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// JWT claims for validated tokens.
///
/// The `aud` claim may be published as a single string or an array; both
/// forms deserialize to a set. Scopes arrive either as a space-separated
/// string (`scope`) or a string array (`scp`), normalized to the former.
#[derive(Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user or client ID) - redacted in Debug output.
    pub sub: String,

    /// Issuer URI this token claims to come from.
    #[serde(default)]
    pub iss: String,

    /// Audience set.
    #[serde(default, deserialize_with = "string_or_seq")]
    pub aud: Vec<String>,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Not-before timestamp (Unix epoch seconds), if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Space-separated scopes granted to this token.
    #[serde(default, alias = "scp", deserialize_with = "scope_string_or_seq")]
    pub scope: String,

    /// Display name claim, if the issuer includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Custom Debug implementation that redacts the `sub` field.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("iss", &self.iss)
            .field("aud", &self.aud)
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .field("nbf", &self.nbf)
            .field("scope", &self.scope)
            .finish()
    }
}

impl Claims {
    /// Check if the token has a specific scope.
    ///
    /// Matching is exact-string and case-sensitive; there is no scope
    /// hierarchy or wildcard expansion.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.split_whitespace().any(|s| s == scope)
    }

    /// Get all scopes as a vector.
    pub fn scopes(&self) -> Vec<&str> {
        self.scope.split_whitespace().collect()
    }
}

/// Authenticated identity handed to business handlers.
///
/// Derived from verified [`Claims`] and threaded explicitly through request
/// extensions; handlers never consult ambient security state.
#[derive(Clone)]
pub struct Principal {
    /// Subject of the verified token - redacted in Debug output.
    pub sub: String,

    /// Display name, if the token carried one.
    pub name: Option<String>,

    /// Scopes granted to the token.
    pub scopes: Vec<String>,
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("sub", &"[REDACTED]")
            .field("name", &self.name)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl Principal {
    /// Derive the principal view from verified claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            sub: claims.sub.clone(),
            name: claims.name.clone(),
            scopes: claims.scopes().iter().map(ToString::to_string).collect(),
        }
    }

    /// Check if the principal holds a specific scope (exact match).
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Value::deserialize(deserializer)? {
        Value::One(s) => vec![s],
        Value::Many(v) => v,
    })
}

fn scope_string_or_seq<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        Joined(String),
        List(Vec<String>),
    }

    Ok(match Value::deserialize(deserializer)? {
        Value::Joined(s) => s,
        Value::List(v) => v.join(" "),
    })
}
