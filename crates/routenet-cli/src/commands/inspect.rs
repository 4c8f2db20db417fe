//! Inspect command handler: validate a network file and summarize it.

use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use routenet_lib::{load_network, GraphSnapshot, Segment, SnapshotSummary};

use crate::commands::CommandStatus;
use crate::output::{render_json, render_report_text, OutputFormat};
use crate::terminal::ColorPalette;

/// Structural overview of a validated route network.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkReport {
    #[serde(flatten)]
    pub summary: SnapshotSummary,
    pub one_way_segments: usize,
    pub connectors: usize,
    pub total_length: f64,
    /// Weakly connected components; more than one means some goals are
    /// unreachable from some starts regardless of direction.
    pub components: usize,
    /// Nodes touched by no segment, sorted by id.
    pub isolated_nodes: Vec<String>,
}

impl NetworkReport {
    pub fn from_snapshot(snapshot: &GraphSnapshot) -> Self {
        let segments = snapshot.segments();
        let mut degree = vec![0usize; snapshot.node_count()];
        for segment in segments {
            degree[segment.start_index()] += 1;
            degree[segment.end_index()] += 1;
        }

        let mut isolated_nodes: Vec<String> = snapshot
            .nodes()
            .iter()
            .zip(&degree)
            .filter(|(_, d)| **d == 0)
            .map(|(node, _)| node.id.to_string())
            .collect();
        isolated_nodes.sort();

        Self {
            summary: snapshot.summary(),
            one_way_segments: segments.iter().filter(|s| s.one_way).count(),
            connectors: segments.iter().filter(|s| s.connector).count(),
            total_length: segments.iter().map(|s| s.length).sum(),
            components: count_components(snapshot.node_count(), segments),
            isolated_nodes,
        }
    }
}

/// Count weakly connected components with a breadth-first flood fill,
/// treating every segment as two-way.
fn count_components(node_count: usize, segments: &[Segment]) -> usize {
    let mut neighbours: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for segment in segments {
        neighbours[segment.start_index()].push(segment.end_index());
        neighbours[segment.end_index()].push(segment.start_index());
    }

    let mut visited = vec![false; node_count];
    let mut queue = VecDeque::new();
    let mut components = 0;

    for root in 0..node_count {
        if visited[root] {
            continue;
        }
        components += 1;
        visited[root] = true;
        queue.push_back(root);

        while let Some(current) = queue.pop_front() {
            for &next in &neighbours[current] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
    }
    components
}

/// Handle the inspect subcommand.
pub fn handle_inspect_command(network: &Path, format: OutputFormat) -> Result<CommandStatus> {
    let parsed = load_network(network)
        .with_context(|| format!("failed to load route network from {}", network.display()))?;
    let snapshot = GraphSnapshot::build(parsed, 1)
        .with_context(|| format!("route network at {} is invalid", network.display()))?;

    let report = NetworkReport::from_snapshot(&snapshot);
    match format {
        OutputFormat::Json => println!("{}", render_json(&report)?),
        OutputFormat::Text => println!("{}", render_report_text(&report, &ColorPalette::detect())),
    }
    Ok(CommandStatus::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use routenet_lib::{NodeSpec, RouteNetwork, SegmentSpec};

    fn snapshot() -> GraphSnapshot {
        let network = RouteNetwork::new("islands")
            .with_node(NodeSpec::new("A", 0.0, 0.0))
            .with_node(NodeSpec::new("B", 0.0, 0.001))
            .with_node(NodeSpec::new("C", 0.0, 0.002))
            .with_node(NodeSpec::new("D", 1.0, 1.0))
            .with_node(NodeSpec::new("E", 1.0, 1.001))
            .with_node(NodeSpec::new("Z", 5.0, 5.0))
            .with_segment(SegmentSpec::new("A-B", "A", "B", 10.0))
            .with_segment(SegmentSpec::new("B-C", "B", "C", 5.0).one_way())
            .with_segment(SegmentSpec::new("D-E", "D", "E", 0.0).connector());
        GraphSnapshot::build(network, 1).unwrap()
    }

    #[test]
    fn test_report_counts_structure() {
        let report = NetworkReport::from_snapshot(&snapshot());

        assert_eq!(report.summary.nodes, 6);
        assert_eq!(report.summary.segments, 3);
        assert_eq!(report.one_way_segments, 1);
        assert_eq!(report.connectors, 1);
        assert_eq!(report.total_length, 15.0);
        assert_eq!(report.components, 3);
        assert_eq!(report.isolated_nodes, vec!["Z".to_string()]);
    }

    #[test]
    fn test_report_json_flattens_summary() {
        let report = NetworkReport::from_snapshot(&snapshot());
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["frameId"], "islands");
        assert_eq!(json["nodes"], 6);
        assert_eq!(json["oneWaySegments"], 1);
        assert_eq!(json["isolatedNodes"][0], "Z");
    }

    #[test]
    fn test_report_text_lists_isolated_nodes() {
        let report = NetworkReport::from_snapshot(&snapshot());
        let text = render_report_text(&report, &ColorPalette::plain());

        assert!(text.contains("frame:        islands"));
        assert!(text.contains("segments:     3 (1 one-way, 1 connectors)"));
        assert!(text.contains("components:   3"));
        assert!(text.ends_with("isolated:     Z"));
    }
}
