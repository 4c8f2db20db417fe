//! Search strategies behind [`plan_with`](super::plan_with).
//!
//! Each algorithm is a [`RoutePlanner`] so the orchestration in the parent
//! module stays independent of which search runs.

use std::time::Instant;

use crate::graph::{GraphSnapshot, NodeIndex};
use crate::path::{find_route_a_star, find_route_dijkstra, SearchPath, SearchStop};

use super::RouteAlgorithm;

/// Trait for route planning strategies.
pub trait RoutePlanner: Send + Sync {
    /// The algorithm identifier for this planner.
    fn algorithm(&self) -> RouteAlgorithm;

    /// Search `snapshot` for the cheapest path from `start` to `goal`.
    fn find_path(
        &self,
        snapshot: &GraphSnapshot,
        start: NodeIndex,
        goal: NodeIndex,
        deadline: Option<Instant>,
    ) -> Result<SearchPath, SearchStop>;
}

/// Plain Dijkstra; expands nodes in (cost, node id) order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraPlanner;

impl RoutePlanner for DijkstraPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::Dijkstra
    }

    fn find_path(
        &self,
        snapshot: &GraphSnapshot,
        start: NodeIndex,
        goal: NodeIndex,
        deadline: Option<Instant>,
    ) -> Result<SearchPath, SearchStop> {
        find_route_dijkstra(snapshot, start, goal, deadline)
    }
}

/// A* guided by the great-circle distance to the goal.
///
/// The distance is scaled by the snapshot's smallest cost-per-metre ratio,
/// which keeps the heuristic admissible for any segment lengths and cost
/// multipliers. Networks whose costs are unrelated to geography degrade to
/// Dijkstra (scale 0).
#[derive(Debug, Clone, Copy, Default)]
pub struct AStarPlanner;

impl RoutePlanner for AStarPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::AStar
    }

    fn find_path(
        &self,
        snapshot: &GraphSnapshot,
        start: NodeIndex,
        goal: NodeIndex,
        deadline: Option<Instant>,
    ) -> Result<SearchPath, SearchStop> {
        if snapshot.heuristic_scale() <= 0.0 {
            tracing::debug!("snapshot has no geographic lower bound; A* runs as Dijkstra");
        }
        find_route_a_star(snapshot, start, goal, deadline)
    }
}

/// Select the planner for an algorithm.
pub fn select_planner(algorithm: RouteAlgorithm) -> Box<dyn RoutePlanner> {
    match algorithm {
        RouteAlgorithm::Dijkstra => Box::new(DijkstraPlanner),
        RouteAlgorithm::AStar => Box::new(AStarPlanner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dijkstra_planner_returns_correct_algorithm() {
        assert_eq!(DijkstraPlanner.algorithm(), RouteAlgorithm::Dijkstra);
    }

    #[test]
    fn astar_planner_returns_correct_algorithm() {
        assert_eq!(AStarPlanner.algorithm(), RouteAlgorithm::AStar);
    }

    #[test]
    fn select_planner_chooses_correct_type() {
        assert_eq!(
            select_planner(RouteAlgorithm::Dijkstra).algorithm(),
            RouteAlgorithm::Dijkstra
        );
        assert_eq!(
            select_planner(RouteAlgorithm::AStar).algorithm(),
            RouteAlgorithm::AStar
        );
    }
}
