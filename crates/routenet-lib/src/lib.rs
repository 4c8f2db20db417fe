//! Route network library entry points.
//!
//! This crate exposes the route network wire format, immutable graph
//! snapshots, the shortest-path planner, and the snapshot store that lets
//! graph replacements race safely with in-flight queries. Higher-level
//! consumers (CLI, HTTP service) should only depend on the items exported
//! here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod error;
pub mod geo;
pub mod graph;
pub mod network;
pub mod path;
pub mod routing;
pub mod service;
pub mod store;

pub use error::{Error, Result};
pub use geo::GeoPoint;
pub use graph::{GraphSnapshot, Node, NodeId, Segment, SegmentId, SnapshotSummary};
pub use network::{load_network, NodeSpec, RouteNetwork, SegmentSpec};
pub use routing::{
    plan, plan_with, Plan, PlanFailure, PlanFailureKind, PlanOptions, PlanOutcome, PlanRequest,
    PlanSegment, RouteAlgorithm,
};
pub use service::{plan_isolated, PlanHeader, PlanResponse, PlanningService, RoutePath};
pub use store::{GraphStore, StoreState};
