//! Shortest-path planning over route network snapshots.
//!
//! This module provides:
//! - [`PlanRequest`] - start/goal pair for one query
//! - [`PlanOptions`] - algorithm choice and optional time budget
//! - [`Plan`] - ordered segments plus total cost and snapshot metadata
//! - [`PlanFailure`] - closed set of reasons a query has no plan
//! - [`plan`] / [`plan_with`] - main entry points
//!
//! # Tie-breaking
//!
//! When several paths share the minimum cost, the plan is the one discovered
//! first when nodes are expanded by ascending (cost, node id) and neighbours
//! are relaxed by ascending (neighbour id, segment id). A node's predecessor
//! only changes on a strictly cheaper arrival. The rule depends on ids alone,
//! never on the order the network was delivered in.
//!
//! # Example
//!
//! ```
//! use routenet_lib::{plan, GraphSnapshot, NodeSpec, PlanRequest, RouteNetwork, SegmentSpec};
//!
//! let network = RouteNetwork::new("map")
//!     .with_node(NodeSpec::new("A", 0.0, 0.0))
//!     .with_node(NodeSpec::new("B", 0.0, 0.001))
//!     .with_segment(SegmentSpec::new("ab", "A", "B", 10.0));
//! let snapshot = GraphSnapshot::build(network, 1).unwrap();
//!
//! let plan = plan(&snapshot, &PlanRequest::new("A", "B")).unwrap();
//! assert_eq!(plan.total_cost, 10.0);
//! ```

mod planner;

pub use planner::{select_planner, AStarPlanner, DijkstraPlanner, RoutePlanner};

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::format_suggestions;
use crate::graph::{GraphSnapshot, NodeId, SegmentId};
use crate::path::{SearchPath, SearchStop};

/// Number of "did you mean" suggestions attached to unknown node errors.
const MAX_SUGGESTIONS: usize = 3;

/// Supported search algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RouteAlgorithm {
    /// Dijkstra's algorithm.
    #[default]
    Dijkstra,
    /// A* with a great-circle lower bound.
    AStar,
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteAlgorithm::Dijkstra => "dijkstra",
            RouteAlgorithm::AStar => "a-star",
        };
        f.write_str(value)
    }
}

impl FromStr for RouteAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dijkstra" => Ok(RouteAlgorithm::Dijkstra),
            "a-star" | "astar" | "a_star" => Ok(RouteAlgorithm::AStar),
            other => Err(format!("unknown routing algorithm '{other}'")),
        }
    }
}

/// Start/goal pair for one planning query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub start: NodeId,
    pub goal: NodeId,
}

impl PlanRequest {
    pub fn new(start: impl Into<NodeId>, goal: impl Into<NodeId>) -> Self {
        Self {
            start: start.into(),
            goal: goal.into(),
        }
    }
}

/// Knobs applied to a single planning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlanOptions {
    pub algorithm: RouteAlgorithm,
    /// Upper bound on search time; exceeding it yields [`PlanFailure::Timeout`].
    pub budget: Option<Duration>,
}

impl PlanOptions {
    pub fn with_algorithm(mut self, algorithm: RouteAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = Some(budget);
        self
    }
}

/// One segment of a plan, oriented in travel direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSegment {
    pub id: SegmentId,
    /// Node the traversal leaves from.
    pub start: NodeId,
    /// Node the traversal arrives at.
    pub end: NodeId,
    pub length: f64,
    pub cost: f64,
}

/// Minimum-cost path through one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub algorithm: RouteAlgorithm,
    pub start: NodeId,
    pub goal: NodeId,
    /// Visited nodes, `start` first and `goal` last.
    pub nodes: Vec<NodeId>,
    pub segments: Vec<PlanSegment>,
    pub total_cost: f64,
    pub frame_id: String,
    pub version: u64,
    /// Creation time of the snapshot the plan was computed against.
    pub snapshot_created_at: DateTime<Utc>,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|segment| segment.length).sum()
    }
}

/// Machine-readable failure classification carried in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanFailureKind {
    GraphUnavailable,
    InvalidRequest,
    NoPathToGoal,
    Timeout,
    Internal,
}

impl PlanFailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanFailureKind::GraphUnavailable => "graph_unavailable",
            PlanFailureKind::InvalidRequest => "invalid_request",
            PlanFailureKind::NoPathToGoal => "no_path_to_goal",
            PlanFailureKind::Timeout => "timeout",
            PlanFailureKind::Internal => "internal",
        }
    }
}

impl fmt::Display for PlanFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a planning call produced no plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanFailure {
    /// No snapshot has been published yet.
    #[error("no route network available for planning")]
    GraphUnavailable,

    /// The request names nodes the snapshot does not contain, or is malformed.
    #[error("invalid plan request: {detail}")]
    InvalidRequest { detail: String },

    /// The goal is not reachable from the start.
    #[error("no path from '{start}' to '{goal}'")]
    NoPathToGoal { start: String, goal: String },

    /// The search exceeded its time budget.
    #[error("planning exceeded its budget of {budget_ms} ms")]
    Timeout { budget_ms: u64 },

    /// The planner faulted; raised by the service boundary only.
    #[error("internal planner error: {message}")]
    Internal { message: String },
}

impl PlanFailure {
    pub fn kind(&self) -> PlanFailureKind {
        match self {
            PlanFailure::GraphUnavailable => PlanFailureKind::GraphUnavailable,
            PlanFailure::InvalidRequest { .. } => PlanFailureKind::InvalidRequest,
            PlanFailure::NoPathToGoal { .. } => PlanFailureKind::NoPathToGoal,
            PlanFailure::Timeout { .. } => PlanFailureKind::Timeout,
            PlanFailure::Internal { .. } => PlanFailureKind::Internal,
        }
    }

    pub fn invalid_request(detail: impl Into<String>) -> Self {
        PlanFailure::InvalidRequest {
            detail: detail.into(),
        }
    }
}

/// Result of one planning call.
pub type PlanOutcome = std::result::Result<Plan, PlanFailure>;

/// Plan with default options (Dijkstra, no budget).
pub fn plan(snapshot: &GraphSnapshot, request: &PlanRequest) -> PlanOutcome {
    plan_with(snapshot, request, &PlanOptions::default())
}

/// Compute the minimum-cost plan for `request` over `snapshot`.
///
/// 1. Resolves start and goal, failing with `InvalidRequest` if either is
///    absent.
/// 2. Returns an empty plan when start equals goal.
/// 3. Runs the selected planner, mapping exhaustion to `NoPathToGoal` and an
///    expired budget to `Timeout`.
pub fn plan_with(
    snapshot: &GraphSnapshot,
    request: &PlanRequest,
    options: &PlanOptions,
) -> PlanOutcome {
    let start = resolve_node(snapshot, &request.start, "start")?;
    let goal = resolve_node(snapshot, &request.goal, "goal")?;

    let planner = select_planner(options.algorithm);
    let deadline = options.budget.map(|budget| Instant::now() + budget);

    let path = match planner.find_path(snapshot, start, goal, deadline) {
        Ok(path) => path,
        Err(SearchStop::Exhausted) => {
            return Err(PlanFailure::NoPathToGoal {
                start: request.start.to_string(),
                goal: request.goal.to_string(),
            });
        }
        Err(SearchStop::DeadlineExceeded) => {
            let budget_ms = options
                .budget
                .map(|budget| budget.as_millis() as u64)
                .unwrap_or_default();
            tracing::warn!(
                start = %request.start,
                goal = %request.goal,
                budget_ms,
                "plan search exceeded its budget"
            );
            return Err(PlanFailure::Timeout { budget_ms });
        }
    };

    Ok(build_plan(snapshot, request, planner.algorithm(), path))
}

fn resolve_node(snapshot: &GraphSnapshot, id: &NodeId, role: &str) -> Result<usize, PlanFailure> {
    snapshot.index_of(id.as_str()).ok_or_else(|| {
        let suggestions = snapshot.suggest_nodes(id.as_str(), MAX_SUGGESTIONS);
        PlanFailure::invalid_request(format!(
            "unknown {role} node '{id}'{}",
            format_suggestions(&suggestions)
        ))
    })
}

fn build_plan(
    snapshot: &GraphSnapshot,
    request: &PlanRequest,
    algorithm: RouteAlgorithm,
    path: SearchPath,
) -> Plan {
    let segments = path
        .edges
        .iter()
        .map(|edge| {
            let segment = snapshot.segment_at(edge.segment);
            let (start, end) = if edge.forward {
                (segment.start.clone(), segment.end.clone())
            } else {
                (segment.end.clone(), segment.start.clone())
            };
            PlanSegment {
                id: segment.id.clone(),
                start,
                end,
                length: segment.length,
                cost: edge.cost,
            }
        })
        .collect();

    let nodes = path
        .nodes
        .iter()
        .map(|&index| snapshot.node_at(index).id.clone())
        .collect();

    Plan {
        algorithm,
        start: request.start.clone(),
        goal: request.goal.clone(),
        nodes,
        segments,
        total_cost: path.cost,
        frame_id: snapshot.frame_id().to_string(),
        version: snapshot.version(),
        snapshot_created_at: snapshot.created_at(),
    }
}
