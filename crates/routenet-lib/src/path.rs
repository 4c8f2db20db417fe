//! Priority-queue searches over a [`GraphSnapshot`].
//!
//! Both searches share one frontier discipline: entries are popped by
//! ascending priority and then ascending node index (which is ascending node
//! id), neighbours are relaxed in adjacency order, and a node's predecessor
//! only changes on a strictly cheaper arrival. Among equal-cost paths the one
//! discovered first wins, independent of the order the network was supplied
//! in.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use crate::graph::{Edge, GraphSnapshot, NodeIndex};

/// Pops between two deadline checks.
const DEADLINE_CHECK_INTERVAL: usize = 256;

/// Why a search stopped without a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStop {
    /// The frontier emptied before the goal was settled.
    Exhausted,
    /// The deadline passed.
    DeadlineExceeded,
}

/// Node sequence plus the edges taken between consecutive nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPath {
    pub nodes: Vec<NodeIndex>,
    pub edges: Vec<Edge>,
    pub cost: f64,
}

/// Run Dijkstra's algorithm from `start` to `goal`.
pub fn find_route_dijkstra(
    snapshot: &GraphSnapshot,
    start: NodeIndex,
    goal: NodeIndex,
    deadline: Option<Instant>,
) -> Result<SearchPath, SearchStop> {
    search(snapshot, start, goal, deadline, |_| 0.0)
}

/// Run A* guided by the snapshot's great-circle lower bound.
pub fn find_route_a_star(
    snapshot: &GraphSnapshot,
    start: NodeIndex,
    goal: NodeIndex,
    deadline: Option<Instant>,
) -> Result<SearchPath, SearchStop> {
    search(snapshot, start, goal, deadline, |node| {
        snapshot.lower_bound(node, goal)
    })
}

fn search<H>(
    snapshot: &GraphSnapshot,
    start: NodeIndex,
    goal: NodeIndex,
    deadline: Option<Instant>,
    heuristic: H,
) -> Result<SearchPath, SearchStop>
where
    H: Fn(NodeIndex) -> f64,
{
    if start == goal {
        return Ok(SearchPath {
            nodes: vec![start],
            edges: Vec::new(),
            cost: 0.0,
        });
    }

    let node_count = snapshot.node_count();
    let mut best = vec![f64::INFINITY; node_count];
    let mut parents: Vec<Option<(NodeIndex, Edge)>> = vec![None; node_count];
    let mut queue = BinaryHeap::new();
    let mut pops = 0usize;

    best[start] = 0.0;
    queue.push(QueueEntry::new(start, 0.0, heuristic(start)));

    while let Some(entry) = queue.pop() {
        pops += 1;
        if pops % DEADLINE_CHECK_INTERVAL == 0 && deadline_passed(deadline) {
            return Err(SearchStop::DeadlineExceeded);
        }

        if entry.cost.0 > best[entry.node] {
            continue;
        }

        if entry.node == goal {
            return Ok(reconstruct_path(&parents, start, goal, entry.cost.0));
        }

        for edge in snapshot.edges(entry.node) {
            let next_cost = entry.cost.0 + edge.cost;
            if next_cost < best[edge.target] {
                best[edge.target] = next_cost;
                parents[edge.target] = Some((entry.node, *edge));
                queue.push(QueueEntry::new(
                    edge.target,
                    next_cost,
                    next_cost + heuristic(edge.target),
                ));
            }
        }
    }

    Err(SearchStop::Exhausted)
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|deadline| Instant::now() >= deadline)
}

fn reconstruct_path(
    parents: &[Option<(NodeIndex, Edge)>],
    start: NodeIndex,
    goal: NodeIndex,
    cost: f64,
) -> SearchPath {
    let mut nodes = vec![goal];
    let mut edges = Vec::new();
    let mut current = goal;
    while current != start {
        let Some((previous, edge)) = parents[current] else {
            break;
        };
        edges.push(edge);
        nodes.push(previous);
        current = previous;
    }
    nodes.reverse();
    edges.reverse();
    SearchPath { nodes, edges, cost }
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeIndex,
    cost: FloatOrd,
    priority: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeIndex, cost: f64, priority: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            priority: FloatOrd(priority),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the lowest priority, then lowest node.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.node.cmp(&self.node))
            .then_with(|| other.cost.cmp(&self.cost))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{NodeSpec, RouteNetwork, SegmentSpec};

    fn snapshot(network: RouteNetwork) -> GraphSnapshot {
        GraphSnapshot::build(network, 1).unwrap()
    }

    fn ids(snapshot: &GraphSnapshot, path: &SearchPath) -> Vec<String> {
        path.nodes
            .iter()
            .map(|&index| snapshot.node_at(index).id.to_string())
            .collect()
    }

    fn line() -> RouteNetwork {
        RouteNetwork::new("map")
            .with_node(NodeSpec::new("A", 0.0, 0.0))
            .with_node(NodeSpec::new("B", 0.0, 0.001))
            .with_node(NodeSpec::new("C", 0.0, 0.002))
            .with_segment(SegmentSpec::new("ab", "A", "B", 10.0))
            .with_segment(SegmentSpec::new("bc", "B", "C", 5.0))
            .with_segment(SegmentSpec::new("ac", "A", "C", 20.0))
    }

    #[test]
    fn dijkstra_prefers_cheaper_two_hop_route() {
        let snapshot = snapshot(line());
        let a = snapshot.index_of("A").unwrap();
        let c = snapshot.index_of("C").unwrap();

        let path = find_route_dijkstra(&snapshot, a, c, None).unwrap();
        assert_eq!(ids(&snapshot, &path), vec!["A", "B", "C"]);
        assert_eq!(path.cost, 15.0);
        assert_eq!(path.edges.len(), 2);
    }

    #[test]
    fn a_star_matches_dijkstra_cost() {
        let snapshot = snapshot(line());
        let a = snapshot.index_of("A").unwrap();
        let c = snapshot.index_of("C").unwrap();

        let dijkstra = find_route_dijkstra(&snapshot, a, c, None).unwrap();
        let a_star = find_route_a_star(&snapshot, a, c, None).unwrap();
        assert_eq!(dijkstra.cost, a_star.cost);
    }

    #[test]
    fn one_way_segment_blocks_reverse_travel() {
        let network = RouteNetwork::new("map")
            .with_node(NodeSpec::new("A", 0.0, 0.0))
            .with_node(NodeSpec::new("B", 0.0, 0.001))
            .with_segment(SegmentSpec::new("ab", "A", "B", 1.0).one_way());
        let snapshot = snapshot(network);
        let a = snapshot.index_of("A").unwrap();
        let b = snapshot.index_of("B").unwrap();

        assert!(find_route_dijkstra(&snapshot, a, b, None).is_ok());
        assert_eq!(
            find_route_dijkstra(&snapshot, b, a, None),
            Err(SearchStop::Exhausted)
        );
    }

    #[test]
    fn expired_deadline_stops_search() {
        // A long chain so the search pops more than one check interval.
        let mut network = RouteNetwork::new("map");
        for i in 0..600 {
            network = network.with_node(NodeSpec::new(format!("n{i:04}"), 0.0, 0.0));
        }
        for i in 0..599 {
            network = network.with_segment(SegmentSpec::new(
                format!("s{i:04}"),
                format!("n{i:04}"),
                format!("n{:04}", i + 1),
                1.0,
            ));
        }
        let snapshot = snapshot(network);
        let start = snapshot.index_of("n0000").unwrap();
        let goal = snapshot.index_of("n0599").unwrap();

        let past = Instant::now();
        let result = find_route_dijkstra(&snapshot, start, goal, Some(past));
        assert_eq!(result, Err(SearchStop::DeadlineExceeded));

        let path = find_route_dijkstra(&snapshot, start, goal, None).unwrap();
        assert_eq!(path.cost, 599.0);
    }

    #[test]
    fn queue_orders_by_priority_then_node() {
        let mut heap = BinaryHeap::new();
        heap.push(QueueEntry::new(3, 1.0, 1.0));
        heap.push(QueueEntry::new(1, 1.0, 1.0));
        heap.push(QueueEntry::new(2, 0.5, 0.5));

        assert_eq!(heap.pop().unwrap().node, 2);
        assert_eq!(heap.pop().unwrap().node, 1);
        assert_eq!(heap.pop().unwrap().node, 3);
    }
}
