//! Property tests comparing the planner against exhaustive enumeration on
//! small random networks.

use proptest::prelude::*;
use routenet_lib::{
    plan, plan_with, GraphSnapshot, NodeSpec, PlanFailureKind, PlanOptions, PlanRequest,
    RouteAlgorithm, RouteNetwork, SegmentSpec,
};

#[derive(Debug, Clone)]
struct RawSegment {
    a: usize,
    b: usize,
    length: u32,
    one_way: bool,
}

fn node_id(index: usize) -> String {
    format!("n{index}")
}

fn network_strategy() -> impl Strategy<Value = (usize, Vec<RawSegment>)> {
    (2usize..7).prop_flat_map(|nodes| {
        let segment = (0..nodes, 0..nodes, 1u32..50, prop::bool::weighted(0.25)).prop_map(
            |(a, b, length, one_way)| RawSegment {
                a,
                b,
                length,
                one_way,
            },
        );
        (Just(nodes), prop::collection::vec(segment, 0..12))
    })
}

fn to_network(nodes: usize, segments: &[RawSegment]) -> RouteNetwork {
    let mut network = RouteNetwork::new("prop");
    for index in 0..nodes {
        // Spread nodes on a small circle so great-circle spans differ.
        let angle = index as f64 * std::f64::consts::TAU / nodes as f64;
        network = network.with_node(NodeSpec::new(
            node_id(index),
            0.01 * angle.sin(),
            0.01 * angle.cos(),
        ));
    }
    for (index, raw) in segments.iter().enumerate() {
        let mut spec = SegmentSpec::new(
            format!("s{index:02}"),
            node_id(raw.a),
            node_id(raw.b),
            f64::from(raw.length),
        );
        if raw.one_way {
            spec = spec.one_way();
        }
        network = network.with_segment(spec);
    }
    network
}

/// Cheapest cost over every simple path, found by depth-first enumeration.
fn brute_force(nodes: usize, segments: &[RawSegment], start: usize, goal: usize) -> Option<f64> {
    fn walk(
        at: usize,
        goal: usize,
        cost: f64,
        visited: &mut Vec<bool>,
        segments: &[RawSegment],
        best: &mut Option<f64>,
    ) {
        if at == goal {
            if best.map_or(true, |b| cost < b) {
                *best = Some(cost);
            }
            return;
        }
        for raw in segments {
            let next = if raw.a == at {
                Some(raw.b)
            } else if raw.b == at && !raw.one_way {
                Some(raw.a)
            } else {
                None
            };
            if let Some(next) = next {
                if !visited[next] {
                    visited[next] = true;
                    walk(next, goal, cost + f64::from(raw.length), visited, segments, best);
                    visited[next] = false;
                }
            }
        }
    }

    let mut visited = vec![false; nodes];
    visited[start] = true;
    let mut best = None;
    walk(start, goal, 0.0, &mut visited, segments, &mut best);
    best
}

fn snapshot(nodes: usize, segments: &[RawSegment]) -> GraphSnapshot {
    GraphSnapshot::build(to_network(nodes, segments), 1).expect("generated network is valid")
}

proptest! {
    #[test]
    fn planner_cost_matches_exhaustive_search(
        (nodes, segments) in network_strategy(),
        start_seed in 0usize..64,
        goal_seed in 0usize..64,
    ) {
        let start = start_seed % nodes;
        let goal = goal_seed % nodes;
        let snapshot = snapshot(nodes, &segments);
        let request = PlanRequest::new(node_id(start), node_id(goal));

        let expected = brute_force(nodes, &segments, start, goal);
        for algorithm in [RouteAlgorithm::Dijkstra, RouteAlgorithm::AStar] {
            let options = PlanOptions::default().with_algorithm(algorithm);
            match (plan_with(&snapshot, &request, &options), expected) {
                (Ok(plan), Some(cost)) => {
                    prop_assert!((plan.total_cost - cost).abs() < 1e-9);
                }
                (Err(failure), None) => {
                    prop_assert_eq!(failure.kind(), PlanFailureKind::NoPathToGoal);
                }
                (outcome, expected) => {
                    prop_assert!(false, "planner gave {:?}, enumeration gave {:?}", outcome, expected);
                }
            }
        }
    }

    #[test]
    fn plans_are_connected_walks(
        (nodes, segments) in network_strategy(),
        start_seed in 0usize..64,
        goal_seed in 0usize..64,
    ) {
        let start = node_id(start_seed % nodes);
        let goal = node_id(goal_seed % nodes);
        let snapshot = snapshot(nodes, &segments);

        if let Ok(plan) = plan(&snapshot, &PlanRequest::new(start.clone(), goal.clone())) {
            let mut at = start.clone();
            let mut cost = 0.0;
            for step in &plan.segments {
                prop_assert_eq!(step.start.as_str(), at.as_str());
                let segment = snapshot.segment(step.id.as_str()).expect("segment exists");
                prop_assert!(segment.is_incident_to(at.as_str()));
                prop_assert!(segment.is_incident_to(step.end.as_str()));
                if segment.one_way {
                    prop_assert_eq!(&step.start, &segment.start);
                }
                cost += step.cost;
                at = step.end.to_string();
            }
            prop_assert_eq!(at, goal);
            prop_assert!((plan.total_cost - cost).abs() < 1e-9);
        }
    }

    #[test]
    fn planning_is_deterministic(
        (nodes, segments) in network_strategy(),
        start_seed in 0usize..64,
        goal_seed in 0usize..64,
    ) {
        let request = PlanRequest::new(node_id(start_seed % nodes), node_id(goal_seed % nodes));
        let first = plan(&snapshot(nodes, &segments), &request);

        let mut network = to_network(nodes, &segments);
        network.segments.rotate_left(segments.len() / 2);
        network.nodes.reverse();
        let second = plan(&GraphSnapshot::build(network, 1).unwrap(), &request);

        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.segments, b.segments);
            }
            (Err(a), Err(b)) => {
                prop_assert_eq!(a, b);
            }
            (a, b) => {
                prop_assert!(false, "diverged: {:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn unknown_ids_are_invalid_requests(
        (nodes, segments) in network_strategy(),
        missing in "[a-z]{1,4}",
    ) {
        let snapshot = snapshot(nodes, &segments);
        let failure = plan(&snapshot, &PlanRequest::new(node_id(0), missing.clone()))
            .expect_err("goal is absent");
        prop_assert_eq!(failure.kind(), PlanFailureKind::InvalidRequest);

        let failure = plan(&snapshot, &PlanRequest::new(missing, node_id(0)))
            .expect_err("start is absent");
        prop_assert_eq!(failure.kind(), PlanFailureKind::InvalidRequest);
    }

    #[test]
    fn start_equal_to_goal_is_empty(
        (nodes, segments) in network_strategy(),
        seed in 0usize..64,
    ) {
        let id = node_id(seed % nodes);
        let plan = plan(&snapshot(nodes, &segments), &PlanRequest::new(id.clone(), id))
            .expect("degenerate query succeeds");
        prop_assert!(plan.is_empty());
        prop_assert_eq!(plan.total_cost, 0.0);
    }
}
