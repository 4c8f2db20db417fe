//! Transport-independent planning service.
//!
//! [`PlanningService`] binds a [`GraphStore`] to the planner and defines the
//! request/response contract exposed to navigation clients. The HTTP service
//! and the CLI are thin wrappers around it.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::GraphSnapshot;
use crate::network::RouteNetwork;
use crate::routing::{
    plan_with, Plan, PlanFailure, PlanFailureKind, PlanOptions, PlanOutcome, PlanRequest,
    PlanSegment,
};
use crate::store::{GraphStore, StoreState};

/// Metadata stamped on every plan response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanHeader {
    /// Response construction time.
    pub timestamp: DateTime<Utc>,
    /// Frame id of the snapshot used; empty when none was available.
    pub frame_id: String,
    /// Version of the snapshot used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

/// Path portion of a plan response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePath {
    pub header: PlanHeader,
    pub segments: Vec<PlanSegment>,
    pub total_cost: f64,
}

/// Response returned for every planning call, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub success: bool,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<PlanFailureKind>,
    pub plan: RoutePath,
}

impl PlanResponse {
    /// Successful response for a computed plan.
    pub fn from_plan(plan: Plan) -> Self {
        let status = if plan.is_empty() {
            "start and goal coincide; empty plan".to_string()
        } else {
            format!(
                "planned {} segment(s) with total cost {}",
                plan.segment_count(),
                plan.total_cost
            )
        };

        Self {
            success: true,
            status,
            failure: None,
            plan: RoutePath {
                header: PlanHeader {
                    timestamp: Utc::now(),
                    frame_id: plan.frame_id,
                    version: Some(plan.version),
                },
                segments: plan.segments,
                total_cost: plan.total_cost,
            },
        }
    }

    /// Failure response; the plan is empty and the header names the snapshot
    /// consulted, if any.
    pub fn from_failure(failure: &PlanFailure, snapshot: Option<&GraphSnapshot>) -> Self {
        Self {
            success: false,
            status: failure.to_string(),
            failure: Some(failure.kind()),
            plan: RoutePath {
                header: PlanHeader {
                    timestamp: Utc::now(),
                    frame_id: snapshot
                        .map(|s| s.frame_id().to_string())
                        .unwrap_or_default(),
                    version: snapshot.map(GraphSnapshot::version),
                },
                segments: Vec::new(),
                total_cost: 0.0,
            },
        }
    }

    pub fn from_outcome(outcome: PlanOutcome, snapshot: Option<&GraphSnapshot>) -> Self {
        match outcome {
            Ok(plan) => Self::from_plan(plan),
            Err(failure) => Self::from_failure(&failure, snapshot),
        }
    }
}

/// Binds the snapshot store and the planner.
///
/// Graph updates go through [`apply_update`](Self::apply_update), the only
/// operation that mutates shared state. Planning calls capture one snapshot
/// and use it for their whole duration.
#[derive(Debug)]
pub struct PlanningService {
    store: GraphStore,
    options: PlanOptions,
    next_version: AtomicU64,
}

impl Default for PlanningService {
    fn default() -> Self {
        Self::new(PlanOptions::default())
    }
}

impl PlanningService {
    pub fn new(options: PlanOptions) -> Self {
        Self {
            store: GraphStore::new(),
            options,
            next_version: AtomicU64::new(1),
        }
    }

    pub fn options(&self) -> PlanOptions {
        self.options
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn state(&self) -> StoreState {
        self.store.state()
    }

    pub fn current(&self) -> Option<Arc<GraphSnapshot>> {
        self.store.current()
    }

    /// Build a snapshot from `network` and publish it.
    ///
    /// Versions increase with every attempt; a rejected network leaves a gap
    /// and the previously published snapshot stays current.
    pub fn apply_update(&self, network: RouteNetwork) -> Result<Arc<GraphSnapshot>> {
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        let frame_id = network.frame_id.clone();

        let snapshot = match GraphSnapshot::build(network, version) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(err) => {
                tracing::warn!(version, frame_id = %frame_id, error = %err, "rejected route network update");
                return Err(err);
            }
        };

        self.store.replace(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Plan against the current snapshot and return the outcome together
    /// with the snapshot it was computed on.
    pub fn plan_outcome(&self, request: &PlanRequest) -> (Option<Arc<GraphSnapshot>>, PlanOutcome) {
        let Some(snapshot) = self.store.current() else {
            return (None, Err(PlanFailure::GraphUnavailable));
        };
        let outcome = plan_isolated(&snapshot, request, &self.options);
        (Some(snapshot), outcome)
    }

    /// Plan against the current snapshot and build the client response.
    pub fn plan(&self, request: &PlanRequest) -> PlanResponse {
        let (snapshot, outcome) = self.plan_outcome(request);
        if let Err(failure) = &outcome {
            tracing::info!(
                start = %request.start,
                goal = %request.goal,
                kind = %failure.kind(),
                "plan request failed: {failure}"
            );
        }
        PlanResponse::from_outcome(outcome, snapshot.as_deref())
    }
}

/// Run the planner, converting a panic into an `Internal` failure so one
/// faulty call cannot take down its caller.
pub fn plan_isolated(
    snapshot: &GraphSnapshot,
    request: &PlanRequest,
    options: &PlanOptions,
) -> PlanOutcome {
    isolate(request, || plan_with(snapshot, request, options))
}

fn isolate<F>(request: &PlanRequest, search: F) -> PlanOutcome
where
    F: FnOnce() -> PlanOutcome,
{
    catch_unwind(AssertUnwindSafe(search)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "planner panicked".to_string());
        tracing::error!(start = %request.start, goal = %request.goal, %message, "planner panicked");
        Err(PlanFailure::Internal { message })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{NodeSpec, SegmentSpec};

    fn network() -> RouteNetwork {
        RouteNetwork::new("map")
            .with_node(NodeSpec::new("A", 0.0, 0.0))
            .with_node(NodeSpec::new("B", 0.0, 0.001))
            .with_segment(SegmentSpec::new("ab", "A", "B", 10.0))
    }

    #[test]
    fn plan_before_update_is_graph_unavailable() {
        let service = PlanningService::default();
        let response = service.plan(&PlanRequest::new("A", "B"));

        assert!(!response.success);
        assert_eq!(response.failure, Some(PlanFailureKind::GraphUnavailable));
        assert!(response.plan.segments.is_empty());
        assert_eq!(response.plan.header.frame_id, "");
        assert_eq!(response.plan.header.version, None);
    }

    #[test]
    fn update_moves_service_to_ready() {
        let service = PlanningService::default();
        assert_eq!(service.state(), StoreState::Uninitialized);

        let snapshot = service.apply_update(network()).unwrap();
        assert_eq!(snapshot.version(), 1);
        assert_eq!(service.state(), StoreState::Ready);

        let response = service.plan(&PlanRequest::new("A", "B"));
        assert!(response.success);
        assert_eq!(response.failure, None);
        assert_eq!(response.plan.total_cost, 10.0);
        assert_eq!(response.plan.header.frame_id, "map");
        assert_eq!(response.plan.header.version, Some(1));
    }

    #[test]
    fn rejected_update_keeps_previous_snapshot() {
        let service = PlanningService::default();
        service.apply_update(network()).unwrap();

        let broken = network().with_segment(SegmentSpec::new("bz", "B", "Z", 1.0));
        assert!(service.apply_update(broken).is_err());

        let current = service.current().unwrap();
        assert_eq!(current.version(), 1);

        let next = service.apply_update(network()).unwrap();
        assert_eq!(next.version(), 3);
    }

    #[test]
    fn failure_response_names_snapshot() {
        let service = PlanningService::default();
        service.apply_update(network()).unwrap();

        let response = service.plan(&PlanRequest::new("A", "Q"));
        assert!(!response.success);
        assert_eq!(response.failure, Some(PlanFailureKind::InvalidRequest));
        assert_eq!(response.plan.header.frame_id, "map");
        assert_eq!(response.plan.header.version, Some(1));
    }

    #[test]
    fn response_serializes_camel_case() {
        let service = PlanningService::default();
        service.apply_update(network()).unwrap();
        let response = service.plan(&PlanRequest::new("A", "B"));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["plan"]["totalCost"], 10.0);
        assert_eq!(json["plan"]["header"]["frameId"], "map");
        assert!(json["plan"]["header"]["timestamp"].is_string());
        assert_eq!(json["plan"]["segments"][0]["id"], "ab");
        assert!(json.get("failure").is_none());
    }

    #[test]
    fn panicking_search_becomes_internal_failure() {
        let request = PlanRequest::new("A", "B");

        let outcome = isolate(&request, || panic!("adjacency corrupted"));
        match outcome {
            Err(PlanFailure::Internal { message }) => assert_eq!(message, "adjacency corrupted"),
            other => panic!("expected internal failure, got {:?}", other),
        }

        let node = "B";
        let outcome = isolate(&request, || panic!("lost parent of {}", node));
        match outcome {
            Err(failure @ PlanFailure::Internal { .. }) => {
                assert_eq!(failure.kind(), PlanFailureKind::Internal);
                assert!(failure.to_string().contains("lost parent of B"));
            }
            other => panic!("expected internal failure, got {:?}", other),
        }

        let outcome = isolate(&request, || std::panic::panic_any(7_u32));
        assert!(matches!(
            outcome,
            Err(PlanFailure::Internal { ref message }) if message == "planner panicked"
        ));
    }

    #[test]
    fn isolate_passes_outcomes_through() {
        let snapshot = GraphSnapshot::build(network(), 1).unwrap();
        let request = PlanRequest::new("A", "B");
        let plan = isolate(&request, || plan_with(&snapshot, &request, &PlanOptions::default()))
            .unwrap();
        assert_eq!(plan.total_cost, 10.0);
    }
}
