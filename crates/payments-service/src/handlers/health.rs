//! Health check handler.

use crate::models::HealthResponse;
use axum::Json;
use tracing::instrument;

/// Handler for `GET /health`.
///
/// Public liveness endpoint; the service has no backing stores to probe.
#[instrument(skip_all, name = "payments.health.check")]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
