//! Test utilities for handler testing.
//!
//! Provides fixture networks and [`AppState`] values with a running update
//! worker. The state helpers spawn onto the current tokio runtime, so call
//! them from inside `#[tokio::test]`.

use routenet_lib::{NodeSpec, PlanOptions, RouteNetwork, SegmentSpec};

use crate::state::{apply_network, AppState};

/// Known node ids in [`fixture_network`].
pub mod fixture_nodes {
    pub const A: &str = "A";
    pub const B: &str = "B";
    pub const C: &str = "C";
}

/// Three nodes; `A–B` (10), `B–C` (5) and `A–C` (20). The cheapest route
/// from `A` to `C` runs through `B` at cost 15.
pub fn fixture_network() -> RouteNetwork {
    RouteNetwork::new("map")
        .with_node(NodeSpec::new(fixture_nodes::A, 30.2850, -97.7335))
        .with_node(NodeSpec::new(fixture_nodes::B, 30.2860, -97.7335))
        .with_node(NodeSpec::new(fixture_nodes::C, 30.2870, -97.7335))
        .with_segment(SegmentSpec::new("A-B", "A", "B", 10.0))
        .with_segment(SegmentSpec::new("B-C", "B", "C", 5.0))
        .with_segment(SegmentSpec::new("A-C", "A", "C", 20.0))
}

/// Two nodes joined by a segment plus an isolated node `Z`.
pub fn two_component_network() -> RouteNetwork {
    RouteNetwork::new("islands")
        .with_node(NodeSpec::new("X", 0.0, 0.0))
        .with_node(NodeSpec::new("Y", 0.0, 0.001))
        .with_node(NodeSpec::new("Z", 1.0, 1.0))
        .with_segment(SegmentSpec::new("X-Y", "X", "Y", 111.0))
}

/// State with a running worker and no published network.
pub fn empty_state() -> AppState {
    empty_state_with(PlanOptions::default())
}

/// Like [`empty_state`] with explicit planning options.
pub fn empty_state_with(options: PlanOptions) -> AppState {
    let (state, worker) = AppState::with_options(options, 8);
    tokio::spawn(worker.run());
    state
}

/// State with a running worker and [`fixture_network`] published as
/// version 1.
pub fn test_state() -> AppState {
    let state = empty_state();
    apply_network(state.service(), fixture_network())
        .unwrap_or_else(|e| panic!("fixture network rejected: {}", e));
    state
}

/// Generate a unique request ID for testing.
pub fn test_request_id() -> String {
    format!("test-{}", uuid::Uuid::now_v7())
}
