//! JWKS client for fetching and caching the issuer's public signing keys.
//!
//! The client locates the issuer's key-set endpoint through the OpenID
//! discovery document (`/.well-known/openid-configuration`), then fetches
//! and caches the JSON Web Key Set with a configurable TTL.
//!
//! # Security
//!
//! - Keys are cached to reduce load on the issuer and improve latency
//! - Cache is invalidated on TTL expiry to pick up key rotations
//! - A key ID missing from a fresh cache triggers exactly one forced
//!   refresh before the token is rejected
//! - Keys with non-allow-listed algorithms never enter the cache

use crate::errors::AuthError;
use common::jwt::ALLOWED_ALGORITHMS;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

/// Default cache TTL in seconds (5 minutes).
const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

/// Timeout applied to each issuer HTTP request.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Well-known path of the issuer metadata document.
const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";

/// JSON Web Key from the issuer's key set.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type ("RSA" or "EC" for the accepted algorithms).
    pub kty: String,

    /// Key ID - used to select the correct key for verification.
    pub kid: String,

    /// Algorithm (e.g. "RS256").
    #[serde(default)]
    pub alg: Option<String>,

    /// Key use (should be "sig" for signing).
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,

    /// RSA modulus (base64url encoded).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url encoded).
    #[serde(default)]
    pub e: Option<String>,

    /// EC curve name.
    #[serde(default)]
    pub crv: Option<String>,

    /// EC x coordinate (base64url encoded).
    #[serde(default)]
    pub x: Option<String>,

    /// EC y coordinate (base64url encoded).
    #[serde(default)]
    pub y: Option<String>,
}

impl Jwk {
    /// Whether this key may enter the cache.
    ///
    /// The cached set must never contain a key outside the asymmetric
    /// allow-list; a symmetric key in a public JWKS would let any client
    /// forge tokens if it were ever selected for verification.
    fn is_acceptable(&self) -> bool {
        let kty_ok = matches!(self.kty.as_str(), "RSA" | "EC");
        let alg_ok = self
            .alg
            .as_deref()
            .map_or(true, |a| ALLOWED_ALGORITHMS.contains(&a));
        let use_ok = self.key_use.as_deref().map_or(true, |u| u == "sig");
        kty_ok && alg_ok && use_ok
    }
}

/// JWKS response from the issuer.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    /// List of JSON Web Keys.
    pub keys: Vec<Jwk>,
}

/// The only field of the issuer metadata document this service needs.
#[derive(Debug, Deserialize)]
struct DiscoveryDocument {
    jwks_uri: String,
}

/// Cached key set with refresh bookkeeping.
struct CachedJwks {
    /// Map of key ID to JWK.
    keys: HashMap<String, Jwk>,

    /// When this set was fetched; lets concurrent requesters recognize a
    /// refresh that already happened while they waited.
    fetched_at: Instant,

    /// When this cache entry expires.
    expires_at: Instant,
}

/// JWKS client bound to a single issuer.
///
/// Thread-safe: the cache sits behind an `RwLock` and refreshes are
/// serialized through a fetch lock so concurrent cold-cache requests
/// produce a single network fetch.
pub struct JwksClient {
    /// Issuer base URI; discovery and `iss` expectations derive from it.
    issuer_uri: String,

    /// HTTP client for issuer requests.
    http_client: reqwest::Client,

    /// Key-set endpoint learned from the discovery document.
    jwks_uri: RwLock<Option<String>>,

    /// Cached key set.
    cache: RwLock<Option<CachedJwks>>,

    /// Serializes refreshes (single-flight).
    fetch_lock: Mutex<()>,

    /// Cache TTL duration.
    cache_ttl: Duration,
}

impl JwksClient {
    /// Create a new JWKS client for the given issuer.
    pub fn new(issuer_uri: String) -> Self {
        Self::with_ttl(issuer_uri, Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS))
    }

    /// Create a new JWKS client with custom cache TTL.
    pub fn with_ttl(issuer_uri: String, cache_ttl: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "payments.auth.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            issuer_uri: issuer_uri.trim_end_matches('/').to_string(),
            http_client,
            jwks_uri: RwLock::new(None),
            cache: RwLock::new(None),
            fetch_lock: Mutex::new(()),
            cache_ttl,
        }
    }

    /// Resolve a signing key by key ID.
    ///
    /// Serves from cache while it is fresh. A miss (cold cache, expired
    /// cache, or unknown `kid`) takes the fetch lock and refreshes at most
    /// once for this call; a refresh completed by another request while
    /// waiting for the lock counts as this call's attempt.
    ///
    /// # Errors
    ///
    /// - `KeyFetchFailed` - issuer unreachable or returned bad data
    /// - `KeyNotFound` - key set fetched but does not contain `kid`
    #[instrument(skip(self), fields(kid = %kid))]
    pub async fn get_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        let attempt_started = Instant::now();

        if let Some(key) = self.lookup_fresh(kid).await {
            tracing::debug!(target: "payments.auth.jwks", kid = %kid, "JWKS cache hit");
            return Ok(key);
        }

        let _guard = self.fetch_lock.lock().await;

        if !self.refreshed_since(attempt_started).await {
            self.refresh_cache().await?;
        }

        match self.lookup_fresh(kid).await {
            Some(key) => Ok(key),
            None => {
                tracing::warn!(target: "payments.auth.jwks", kid = %kid, "Key not found in JWKS after refresh");
                Err(AuthError::KeyNotFound(kid.to_string()))
            }
        }
    }

    /// Look up `kid` in the cache if the cache is still fresh.
    async fn lookup_fresh(&self, kid: &str) -> Option<Jwk> {
        let cache = self.cache.read().await;
        let cached = cache.as_ref()?;
        if cached.expires_at <= Instant::now() {
            return None;
        }
        cached.keys.get(kid).cloned()
    }

    /// Whether a refresh completed after the given instant.
    async fn refreshed_since(&self, instant: Instant) -> bool {
        self.cache
            .read()
            .await
            .as_ref()
            .is_some_and(|cached| cached.fetched_at > instant)
    }

    /// Refresh the key set from the issuer, replacing the cache wholesale.
    #[instrument(skip(self))]
    async fn refresh_cache(&self) -> Result<(), AuthError> {
        let jwks_uri = self.resolve_jwks_uri().await?;

        tracing::debug!(target: "payments.auth.jwks", url = %jwks_uri, "Fetching JWKS from issuer");
        let jwks: JwksResponse = self.get_json(&jwks_uri).await?;

        let published = jwks.keys.len();
        let keys: HashMap<String, Jwk> = jwks
            .keys
            .into_iter()
            .filter(Jwk::is_acceptable)
            .map(|key| (key.kid.clone(), key))
            .collect();

        if keys.len() < published {
            tracing::debug!(
                target: "payments.auth.jwks",
                skipped = published - keys.len(),
                "Skipped keys outside the signing allow-list"
            );
        }

        tracing::info!(
            target: "payments.auth.jwks",
            key_count = keys.len(),
            "JWKS cache refreshed"
        );

        let now = Instant::now();
        let mut cache = self.cache.write().await;
        *cache = Some(CachedJwks {
            keys,
            fetched_at: now,
            expires_at: now + self.cache_ttl,
        });

        Ok(())
    }

    /// Locate the key-set endpoint via the issuer metadata document.
    ///
    /// The `jwks_uri` is cached after the first successful discovery; the
    /// document is refetched only if discovery previously failed.
    async fn resolve_jwks_uri(&self) -> Result<String, AuthError> {
        if let Some(uri) = self.jwks_uri.read().await.clone() {
            return Ok(uri);
        }

        let discovery_url = format!("{}{}", self.issuer_uri, DISCOVERY_PATH);
        tracing::debug!(target: "payments.auth.jwks", url = %discovery_url, "Fetching issuer metadata");

        let document: DiscoveryDocument = self.get_json(&discovery_url).await?;

        let mut jwks_uri = self.jwks_uri.write().await;
        *jwks_uri = Some(document.jwks_uri.clone());
        Ok(document.jwks_uri)
    }

    /// GET a JSON document from the issuer with exactly one retry.
    ///
    /// Verification errors elsewhere in the pipeline are never retried;
    /// issuer fetches get a single second attempt because a transient
    /// network failure is the one recoverable condition here.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AuthError> {
        match self.try_get_json(url).await {
            Ok(value) => Ok(value),
            Err(first) => {
                tracing::warn!(target: "payments.auth.jwks", url = %url, error = %first, "Issuer fetch failed, retrying once");
                self.try_get_json(url).await.map_err(|retry| {
                    tracing::error!(target: "payments.auth.jwks", url = %url, error = %retry, "Issuer fetch failed after retry");
                    AuthError::KeyFetchFailed(retry)
                })
            }
        }
    }

    async fn try_get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, String> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("issuer endpoint returned {}", status));
        }

        response.json().await.map_err(|e| e.to_string())
    }
}
