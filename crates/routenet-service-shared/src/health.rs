//! Health check handlers for Kubernetes probes.
//!
//! `/health/live` answers as long as the process runs. `/health/ready`
//! answers 503 until the first route network has been published.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use routenet_lib::StoreState;

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    /// Crate version from build time.
    pub version: String,

    /// Version of the published graph snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_version: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes_loaded: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments_loaded: Option<usize>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            graph_version: None,
            nodes_loaded: None,
            segments_loaded: None,
        }
    }

    pub fn ready(
        service: &str,
        version: &str,
        graph_version: u64,
        nodes: usize,
        segments: usize,
    ) -> Self {
        Self {
            graph_version: Some(graph_version),
            nodes_loaded: Some(nodes),
            segments_loaded: Some(segments),
            ..Self::alive(service, version)
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            ..Self::alive(service, version)
        }
    }
}

/// Liveness probe handler.
///
/// ```text
/// GET /health/live
/// {"status":"ok","service":"routenet-service-shared","version":"0.1.0"}
/// ```
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// Readiness probe handler.
///
/// ```text
/// GET /health/ready
/// {"status":"ok","service":"routenet-service-shared","version":"0.1.0","graph_version":2,"nodes_loaded":3,"segments_loaded":3}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let snapshot = match (state.service().state(), state.service().current()) {
        (StoreState::Ready, Some(snapshot)) => snapshot,
        _ => {
            let status = HealthStatus::not_ready(service, version, "no route network published");
            return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
        }
    };

    let status = HealthStatus::ready(
        service,
        version,
        snapshot.version(),
        snapshot.node_count(),
        snapshot.segment_count(),
    );
    (StatusCode::OK, Json(status)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::apply_network;
    use crate::test_utils::{fixture_network, test_state};

    #[test]
    fn test_health_status_alive() {
        let status = HealthStatus::alive("plan", "1.0.0");
        assert_eq!(status.status, "ok");
        assert!(status.graph_version.is_none());
        assert!(status.nodes_loaded.is_none());
    }

    #[test]
    fn test_health_status_not_ready() {
        let status = HealthStatus::not_ready("plan", "1.0.0", "no data");
        assert!(status.status.starts_with("not_ready:"));
        assert!(status.status.contains("no data"));
        assert_eq!(status.service, "plan");
    }

    #[test]
    fn test_health_status_serialization() {
        let json = serde_json::to_string(&HealthStatus::alive("plan", "0.1.0")).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(!json.contains("graph_version"));
    }

    #[tokio::test]
    async fn test_ready_is_503_before_first_network() {
        let (state, _worker) = crate::AppState::with_options(Default::default(), 1);
        let response = health_ready(State(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_ready_is_ok_once_published() {
        let state = test_state();
        let response = health_ready(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);

        apply_network(state.service(), fixture_network()).unwrap();
        let response = health_ready(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
