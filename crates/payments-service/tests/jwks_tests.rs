//! Key resolver integration tests.
//!
//! Exercises the JWKS client directly against a mocked issuer: discovery,
//! caching, single-flight refresh coalescing, rotation, and fetch-failure
//! retry behavior.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use anyhow::Result;
use futures::future::join_all;
use payments_service::auth::JwksClient;
use payments_service::errors::AuthError;
use std::sync::Arc;
use std::time::Duration;
use support::{mount_discovery, mount_issuer, requests_for_path, TestKey, JWKS_PATH};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DISCOVERY_PATH: &str = "/.well-known/openid-configuration";

/// Discovery document is fetched and the advertised jwks_uri honored.
#[tokio::test]
async fn test_resolves_key_via_discovery() -> Result<()> {
    let mock_server = MockServer::start().await;
    let key = TestKey::primary();
    mount_issuer(&mock_server, &[&key]).await;

    let client = JwksClient::new(mock_server.uri());

    let jwk = client.get_key(&key.kid).await.unwrap();
    assert_eq!(jwk.kid, key.kid);
    assert_eq!(jwk.kty, "RSA");

    assert_eq!(requests_for_path(&mock_server, DISCOVERY_PATH).await, 1);
    assert_eq!(requests_for_path(&mock_server, JWKS_PATH).await, 1);

    Ok(())
}

/// Cached keys are served without renewed network fetches.
#[tokio::test]
async fn test_cache_hit_avoids_network() -> Result<()> {
    let mock_server = MockServer::start().await;
    let key = TestKey::primary();
    mount_issuer(&mock_server, &[&key]).await;

    let client = JwksClient::new(mock_server.uri());

    for _ in 0..5 {
        client.get_key(&key.kid).await.unwrap();
    }

    assert_eq!(requests_for_path(&mock_server, JWKS_PATH).await, 1);

    Ok(())
}

/// 50 concurrent cold-cache requests coalesce into one fetch, and every
/// requester receives the resolved key.
#[tokio::test]
async fn test_concurrent_requests_are_single_flight() -> Result<()> {
    let mock_server = MockServer::start().await;
    let key = TestKey::primary();
    mount_issuer(&mock_server, &[&key]).await;

    let client = Arc::new(JwksClient::new(mock_server.uri()));

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let client = Arc::clone(&client);
            let kid = key.kid.clone();
            tokio::spawn(async move { client.get_key(&kid).await })
        })
        .collect();

    let results = join_all(tasks).await;
    for result in results {
        let jwk = result.unwrap().unwrap();
        assert_eq!(jwk.kid, key.kid);
    }

    assert_eq!(
        requests_for_path(&mock_server, JWKS_PATH).await,
        1,
        "Concurrent cold-cache requests must produce exactly one fetch"
    );
    assert_eq!(requests_for_path(&mock_server, DISCOVERY_PATH).await, 1);

    Ok(())
}

/// Unknown kid triggers exactly one forced refresh, then KeyNotFound.
#[tokio::test]
async fn test_unknown_kid_forces_single_refresh() -> Result<()> {
    let mock_server = MockServer::start().await;
    let key = TestKey::primary();
    mount_issuer(&mock_server, &[&key]).await;

    let client = JwksClient::new(mock_server.uri());

    client.get_key(&key.kid).await.unwrap();

    let result = client.get_key("no-such-key").await;
    assert!(matches!(result, Err(AuthError::KeyNotFound(kid)) if kid == "no-such-key"));

    // One priming fetch plus one forced refresh
    assert_eq!(requests_for_path(&mock_server, JWKS_PATH).await, 2);

    Ok(())
}

/// Rotation: a kid published after the cache was primed resolves after a
/// forced refresh.
#[tokio::test]
async fn test_rotation_converges_without_restart() -> Result<()> {
    let mock_server = MockServer::start().await;
    let primary = TestKey::primary();
    mount_issuer(&mock_server, &[&primary]).await;

    let client = JwksClient::new(mock_server.uri());
    client.get_key(&primary.kid).await.unwrap();

    let secondary = TestKey::secondary();
    mock_server.reset().await;
    mount_issuer(&mock_server, &[&primary, &secondary]).await;

    let jwk = client.get_key(&secondary.kid).await.unwrap();
    assert_eq!(jwk.kid, secondary.kid);

    Ok(())
}

/// Cache expiry triggers a refetch instead of serving stale keys.
#[tokio::test]
async fn test_cache_expiry_triggers_refresh() -> Result<()> {
    let mock_server = MockServer::start().await;
    let key = TestKey::primary();
    mount_issuer(&mock_server, &[&key]).await;

    let client = JwksClient::with_ttl(mock_server.uri(), Duration::from_millis(100));

    client.get_key(&key.kid).await.unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    client.get_key(&key.kid).await.unwrap();

    assert_eq!(requests_for_path(&mock_server, JWKS_PATH).await, 2);
    // jwks_uri stays cached across key-set refreshes
    assert_eq!(requests_for_path(&mock_server, DISCOVERY_PATH).await, 1);

    Ok(())
}

/// An unreachable key endpoint fails as KeyFetchFailed after exactly one
/// retry.
#[tokio::test]
async fn test_fetch_failure_retries_once() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_discovery(&mock_server).await;

    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = JwksClient::new(mock_server.uri());

    let result = client.get_key("any-key").await;
    assert!(matches!(result, Err(AuthError::KeyFetchFailed(_))));

    assert_eq!(
        requests_for_path(&mock_server, JWKS_PATH).await,
        2,
        "Fetch failure gets exactly one retry"
    );

    Ok(())
}

/// Discovery failure also surfaces as KeyFetchFailed, not KeyNotFound.
#[tokio::test]
async fn test_discovery_failure_is_fetch_failure() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(DISCOVERY_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = JwksClient::new(mock_server.uri());

    let result = client.get_key("any-key").await;
    assert!(matches!(result, Err(AuthError::KeyFetchFailed(_))));

    Ok(())
}

/// Keys outside the signing allow-list never become resolvable.
#[tokio::test]
async fn test_disallowed_keys_are_filtered() -> Result<()> {
    let mock_server = MockServer::start().await;
    mount_discovery(&mock_server).await;

    let key = TestKey::primary();
    let jwks = serde_json::json!({
        "keys": [
            key.jwk_json(),
            {"kty": "oct", "kid": "hmac-key", "alg": "HS256", "k": "c2VjcmV0"},
        ]
    });
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(&jwks))
        .mount(&mock_server)
        .await;

    let client = JwksClient::new(mock_server.uri());

    assert!(client.get_key(&key.kid).await.is_ok());
    let result = client.get_key("hmac-key").await;
    assert!(matches!(result, Err(AuthError::KeyNotFound(_))));

    Ok(())
}
