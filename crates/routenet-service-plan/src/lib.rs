//! Route network planning HTTP microservice.
//!
//! # Endpoints
//!
//! - `POST /api/v1/plan` - Minimum-cost plan between two nodes
//! - `PUT /api/v1/network` - Replace the route network
//! - `GET /api/v1/network` - Summary of the published network
//! - `GET /metrics` - Prometheus metrics endpoint
//! - `GET /health/live` - Kubernetes liveness probe
//! - `GET /health/ready` - Kubernetes readiness probe
//!
//! The plan endpoint always answers 200 with a [`PlanResponse`]; malformed
//! bodies, a missing network and planner faults all come back as
//! `success=false` with a machine-readable `failure` kind. The network
//! endpoints use RFC 9457 problem responses.

#![deny(warnings)]

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{HeaderName, Method},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use routenet_lib::{PlanFailure, PlanOutcome, PlanResponse, RouteNetwork};
use routenet_service_shared::{
    from_update_error, health_live, health_ready, metrics_handler, record_network_update,
    record_plan_computed, record_plan_failed, record_plan_segments, AppState, MetricsLayer,
    ProblemDetails, PlanQuery, RequestId, ServiceResponse, Validate,
};

/// Name attached to logs and metrics.
pub const SERVICE_NAME: &str = "plan";

/// Largest accepted route network body.
pub const MAX_NETWORK_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Build the service router over `state`, serving metrics at `metrics_path`.
pub fn build_router(state: AppState, metrics_path: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ]);

    Router::new()
        .route("/api/v1/plan", post(plan_handler))
        .route(
            "/api/v1/network",
            put(network_update_handler).get(network_info_handler),
        )
        .route(metrics_path, get(metrics_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(DefaultBodyLimit::max(MAX_NETWORK_BODY_BYTES))
        .layer(cors)
        .layer(MetricsLayer)
        .with_state(state)
}

/// Handle `POST /api/v1/plan`.
pub async fn plan_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Result<Json<PlanQuery>, JsonRejection>,
) -> Json<PlanResponse> {
    let query = match body {
        Ok(Json(query)) => query,
        Err(rejection) => {
            let failure = PlanFailure::invalid_request(rejection.body_text());
            return Json(reject(&state, &request_id, failure));
        }
    };

    if let Err(problem) = query.validate(request_id.as_str()) {
        let failure = PlanFailure::invalid_request(problem.detail.unwrap_or_default());
        return Json(reject(&state, &request_id, failure));
    }

    info!(
        request_id = %request_id,
        start = %query.start_node_id,
        goal = %query.goal_node_id,
        "handling plan request"
    );

    let service = state.service_arc();
    let request = query.to_plan_request();
    let algorithm = service.options().algorithm.to_string();

    // The search is CPU-bound; run it on the blocking pool so concurrent
    // plans proceed in parallel without stalling the async workers.
    let (snapshot, outcome) =
        match tokio::task::spawn_blocking(move || service.plan_outcome(&request)).await {
            Ok(result) => result,
            Err(e) => {
                warn!(request_id = %request_id, error = %e, "plan task failed");
                let failure = PlanFailure::Internal {
                    message: e.to_string(),
                };
                (state.service().current(), Err(failure))
            }
        };

    record_outcome(&request_id, &algorithm, &outcome);
    Json(PlanResponse::from_outcome(outcome, snapshot.as_deref()))
}

fn reject(state: &AppState, request_id: &RequestId, failure: PlanFailure) -> PlanResponse {
    let snapshot = state.service().current();
    let outcome: PlanOutcome = Err(failure);
    record_outcome(request_id, "none", &outcome);
    PlanResponse::from_outcome(outcome, snapshot.as_deref())
}

fn record_outcome(request_id: &RequestId, algorithm: &str, outcome: &PlanOutcome) {
    match outcome {
        Ok(plan) => {
            record_plan_computed(algorithm);
            record_plan_segments(plan.segment_count(), algorithm);
            info!(
                request_id = %request_id,
                segments = plan.segment_count(),
                total_cost = plan.total_cost,
                version = plan.version,
                "plan computed"
            );
        }
        Err(failure) => {
            record_plan_failed(failure.kind().as_str());
            info!(
                request_id = %request_id,
                kind = %failure.kind(),
                "plan failed: {failure}"
            );
        }
    }
}

/// Handle `PUT /api/v1/network`: replace the route network.
pub async fn network_update_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    body: Result<Json<RouteNetwork>, JsonRejection>,
) -> Response {
    let network = match body {
        Ok(Json(network)) => network,
        Err(rejection) => {
            record_network_update("rejected");
            warn!(request_id = %request_id, error = %rejection.body_text(), "malformed network update");
            return ProblemDetails::bad_request(rejection.body_text(), request_id.as_str())
                .into_response();
        }
    };

    info!(
        request_id = %request_id,
        frame_id = %network.frame_id,
        nodes = network.nodes.len(),
        segments = network.segments.len(),
        "received network update"
    );

    match state.submit_update(network).await {
        Ok(summary) => ServiceResponse::new(summary).into_response(),
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "network update rejected");
            from_update_error(&e, request_id.as_str()).into_response()
        }
    }
}

/// Handle `GET /api/v1/network`: summary of the published snapshot.
pub async fn network_info_handler(State(state): State<AppState>, request_id: RequestId) -> Response {
    match state.service().current() {
        Some(snapshot) => ServiceResponse::new(snapshot.summary()).into_response(),
        None => ProblemDetails::graph_unavailable(request_id.as_str()).into_response(),
    }
}
