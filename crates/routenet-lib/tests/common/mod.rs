#![allow(dead_code)]

use routenet_lib::{GraphSnapshot, NodeSpec, RouteNetwork, SegmentSpec};

/// Nodes `A,B,C`; segments `A–B` (10), `B–C` (5), `A–C` (20).
pub fn triangle_network() -> RouteNetwork {
    RouteNetwork::new("map")
        .with_node(NodeSpec::new("A", 30.2850, -97.7335))
        .with_node(NodeSpec::new("B", 30.2860, -97.7335))
        .with_node(NodeSpec::new("C", 30.2870, -97.7335))
        .with_segment(SegmentSpec::new("A-B", "A", "B", 10.0))
        .with_segment(SegmentSpec::new("B-C", "B", "C", 5.0))
        .with_segment(SegmentSpec::new("A-C", "A", "C", 20.0))
}

/// The triangle with `B–C` removed and no alternate route around it.
pub fn triangle_without_b_c() -> RouteNetwork {
    RouteNetwork::new("map")
        .with_node(NodeSpec::new("A", 30.2850, -97.7335))
        .with_node(NodeSpec::new("B", 30.2860, -97.7335))
        .with_node(NodeSpec::new("C", 30.2870, -97.7335))
        .with_segment(SegmentSpec::new("A-B", "A", "B", 10.0))
}

/// Two nodes with no connecting segment.
pub fn disconnected_pair() -> RouteNetwork {
    RouteNetwork::new("map")
        .with_node(NodeSpec::new("A", 0.0, 0.0))
        .with_node(NodeSpec::new("B", 0.0, 0.001))
}

/// Diamond with two equal-cost routes from `A` to `D`, one via `B` and one
/// via `C`, listed in an order that puts the `C` route first.
pub fn diamond_network() -> RouteNetwork {
    RouteNetwork::new("map")
        .with_node(NodeSpec::new("D", 0.0, 0.002))
        .with_node(NodeSpec::new("C", -0.001, 0.001))
        .with_node(NodeSpec::new("B", 0.001, 0.001))
        .with_node(NodeSpec::new("A", 0.0, 0.0))
        .with_segment(SegmentSpec::new("c-d", "C", "D", 1.0))
        .with_segment(SegmentSpec::new("a-c", "A", "C", 1.0))
        .with_segment(SegmentSpec::new("b-d", "B", "D", 1.0))
        .with_segment(SegmentSpec::new("a-b", "A", "B", 1.0))
}

/// Square grid with `size * size` nodes about 100 m apart and geodesic
/// segment lengths.
pub fn grid_network(size: usize) -> RouteNetwork {
    let mut network = RouteNetwork::new("grid");
    let step = 0.0009;
    for row in 0..size {
        for col in 0..size {
            network = network.with_node(NodeSpec::new(
                grid_id(row, col),
                row as f64 * step,
                col as f64 * step,
            ));
        }
    }
    for row in 0..size {
        for col in 0..size {
            if col + 1 < size {
                network = network.with_segment(
                    SegmentSpec::new(
                        format!("h-{row}-{col}"),
                        grid_id(row, col),
                        grid_id(row, col + 1),
                        0.0,
                    )
                    .geodesic(),
                );
            }
            if row + 1 < size {
                network = network.with_segment(
                    SegmentSpec::new(
                        format!("v-{row}-{col}"),
                        grid_id(row, col),
                        grid_id(row + 1, col),
                        0.0,
                    )
                    .geodesic(),
                );
            }
        }
    }
    network
}

pub fn grid_id(row: usize, col: usize) -> String {
    format!("n{row:03}-{col:03}")
}

pub fn build(network: RouteNetwork, version: u64) -> GraphSnapshot {
    GraphSnapshot::build(network, version).expect("fixture network is valid")
}
