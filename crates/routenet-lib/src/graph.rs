//! Immutable, versioned route network snapshots.
//!
//! A [`GraphSnapshot`] is built once from a [`RouteNetwork`] and never mutated
//! afterwards. Nodes and segments are stored sorted by identifier, so dense
//! indices order the same way identifiers do; the planner relies on that for
//! its tie-breaking rule.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::GeoPoint;
use crate::network::{NodeSpec, RouteNetwork, SegmentSpec};

/// Dense index of a node inside one snapshot.
pub type NodeIndex = usize;

/// Dense index of a segment inside one snapshot.
pub type SegmentIndex = usize;

/// Safety margin keeping the A* lower bound strictly admissible under
/// floating-point rounding.
const HEURISTIC_MARGIN: f64 = 1.0 - 1e-9;

/// Identifier of a navigable node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

/// Identifier of a segment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(NodeId);
string_id!(SegmentId);

/// Navigable point of a published snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: GeoPoint,
    pub properties: BTreeMap<String, String>,
}

/// Segment of a published snapshot with its endpoints resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    pub start: NodeId,
    pub end: NodeId,
    pub length: f64,
    pub one_way: bool,
    pub cost_multiplier: f64,
    pub connector: bool,
    start_index: NodeIndex,
    end_index: NodeIndex,
}

impl Segment {
    /// Effective traversal cost (length scaled by the multiplier).
    pub fn cost(&self) -> f64 {
        self.length * self.cost_multiplier
    }

    pub fn start_index(&self) -> NodeIndex {
        self.start_index
    }

    pub fn end_index(&self) -> NodeIndex {
        self.end_index
    }

    /// Whether the segment touches the given node.
    pub fn is_incident_to(&self, node: &str) -> bool {
        self.start.as_str() == node || self.end.as_str() == node
    }
}

/// One allowed traversal out of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: NodeIndex,
    pub segment: SegmentIndex,
    pub cost: f64,
    /// `true` when travelling from the segment's `start` to its `end`.
    pub forward: bool,
}

/// Compact description of a snapshot for health and info endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub version: u64,
    pub frame_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub nodes: usize,
    pub segments: usize,
}

/// Immutable route network at one point in time.
#[derive(Debug, Clone)]
pub struct GraphSnapshot {
    version: u64,
    frame_id: String,
    network_id: Option<String>,
    created_at: DateTime<Utc>,
    nodes: Vec<Node>,
    node_index: HashMap<NodeId, NodeIndex>,
    segments: Vec<Segment>,
    adjacency: Vec<Vec<Edge>>,
    heuristic_scale: f64,
}

impl GraphSnapshot {
    /// Validate a network and build its snapshot.
    ///
    /// Fails when an identifier is empty or duplicated, a coordinate is out
    /// of range, a segment references an unknown node, or a length or cost
    /// multiplier is negative or not finite. Zero-length segments are only
    /// accepted when flagged as connectors.
    pub fn build(network: RouteNetwork, version: u64) -> Result<Self> {
        let RouteNetwork {
            frame_id,
            id: network_id,
            nodes,
            segments,
        } = network;

        let nodes = build_nodes(nodes)?;
        let node_index: HashMap<NodeId, NodeIndex> = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();

        let segments = build_segments(segments, &nodes, &node_index)?;
        let adjacency = build_adjacency(nodes.len(), &segments);
        let heuristic_scale = compute_heuristic_scale(&nodes, &segments);

        tracing::debug!(
            version,
            frame_id = %frame_id,
            nodes = nodes.len(),
            segments = segments.len(),
            heuristic_scale,
            "built graph snapshot"
        );

        Ok(Self {
            version,
            frame_id,
            network_id,
            created_at: Utc::now(),
            nodes,
            node_index,
            segments,
            adjacency,
            heuristic_scale,
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    pub fn network_id(&self) -> Option<&str> {
        self.network_id.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Nodes in ascending identifier order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Segments in ascending identifier order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.node_index.get(id).copied()
    }

    pub fn node_at(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    pub fn segment_at(&self, index: SegmentIndex) -> &Segment {
        &self.segments[index]
    }

    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.segments
            .binary_search_by(|segment| segment.id.as_str().cmp(id))
            .ok()
            .map(|index| &self.segments[index])
    }

    /// Outgoing traversals of a node, ordered by (target id, segment id).
    pub fn edges(&self, index: NodeIndex) -> &[Edge] {
        self.adjacency
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cost-per-metre lower bound over every segment; multiplying it by the
    /// great-circle distance never overestimates the remaining cost.
    pub fn heuristic_scale(&self) -> f64 {
        self.heuristic_scale
    }

    /// Admissible lower bound on the cost from `from` to `goal`.
    pub fn lower_bound(&self, from: NodeIndex, goal: NodeIndex) -> f64 {
        if self.heuristic_scale <= 0.0 {
            return 0.0;
        }
        let a = self.nodes[from].position;
        let b = self.nodes[goal].position;
        self.heuristic_scale * a.distance_to(&b)
    }

    /// Node identifiers that closely resemble `name`, best match first.
    pub fn suggest_nodes(&self, name: &str, limit: usize) -> Vec<String> {
        let mut scored: Vec<(f64, &str)> = self
            .nodes
            .iter()
            .map(|node| (strsim::jaro_winkler(name, node.id.as_str()), node.id.as_str()))
            .filter(|(score, _)| *score >= 0.8)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, id)| id.to_string())
            .collect()
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            version: self.version,
            frame_id: self.frame_id.clone(),
            network_id: self.network_id.clone(),
            created_at: self.created_at,
            nodes: self.nodes.len(),
            segments: self.segments.len(),
        }
    }
}

fn validate_id(id: &str, kind: &'static str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::EmptyId { kind });
    }
    Ok(())
}

fn build_nodes(specs: Vec<NodeSpec>) -> Result<Vec<Node>> {
    let mut nodes = Vec::with_capacity(specs.len());
    for spec in specs {
        validate_id(&spec.id, "node")?;
        let position = GeoPoint::new(spec.latitude, spec.longitude);
        if !position.is_valid() {
            return Err(Error::InvalidCoordinate {
                id: spec.id,
                latitude: spec.latitude,
                longitude: spec.longitude,
            });
        }
        nodes.push(Node {
            id: NodeId(spec.id),
            position,
            properties: spec.properties,
        });
    }

    nodes.sort_by(|a, b| a.id.cmp(&b.id));
    if let Some(pair) = nodes.windows(2).find(|pair| pair[0].id == pair[1].id) {
        return Err(Error::DuplicateNode {
            id: pair[0].id.to_string(),
        });
    }
    Ok(nodes)
}

fn build_segments(
    specs: Vec<SegmentSpec>,
    nodes: &[Node],
    node_index: &HashMap<NodeId, NodeIndex>,
) -> Result<Vec<Segment>> {
    let resolve = |segment: &str, node: &str| {
        node_index
            .get(node)
            .copied()
            .ok_or_else(|| Error::DanglingEndpoint {
                segment: segment.to_string(),
                node: node.to_string(),
            })
    };

    let mut segments = Vec::with_capacity(specs.len());
    for spec in specs {
        validate_id(&spec.id, "segment")?;
        let start_index = resolve(&spec.id, &spec.start)?;
        let end_index = resolve(&spec.id, &spec.end)?;

        let length = match spec.length {
            Some(length) if !length.is_finite() || length < 0.0 => {
                return Err(Error::InvalidLength {
                    id: spec.id,
                    length,
                });
            }
            Some(length) => length,
            None => nodes[start_index]
                .position
                .distance_to(&nodes[end_index].position),
        };

        if !spec.cost_multiplier.is_finite() || spec.cost_multiplier < 0.0 {
            return Err(Error::InvalidCostMultiplier {
                id: spec.id,
                multiplier: spec.cost_multiplier,
            });
        }

        if !(length * spec.cost_multiplier).is_finite() {
            return Err(Error::InvalidCost {
                id: spec.id,
                length,
                multiplier: spec.cost_multiplier,
            });
        }

        if length == 0.0 && !spec.connector {
            return Err(Error::ZeroLengthSegment { id: spec.id });
        }

        segments.push(Segment {
            id: SegmentId(spec.id),
            start: NodeId(spec.start),
            end: NodeId(spec.end),
            length,
            one_way: spec.one_way,
            cost_multiplier: spec.cost_multiplier,
            connector: spec.connector,
            start_index,
            end_index,
        });
    }

    segments.sort_by(|a, b| a.id.cmp(&b.id));
    if let Some(pair) = segments.windows(2).find(|pair| pair[0].id == pair[1].id) {
        return Err(Error::DuplicateSegment {
            id: pair[0].id.to_string(),
        });
    }

    // Every path cost is bounded by this sum.
    let total: f64 = segments.iter().map(Segment::cost).sum();
    if !total.is_finite() {
        return Err(Error::CostOverflow);
    }
    Ok(segments)
}

fn build_adjacency(node_count: usize, segments: &[Segment]) -> Vec<Vec<Edge>> {
    let mut adjacency: Vec<Vec<Edge>> = vec![Vec::new(); node_count];

    for (index, segment) in segments.iter().enumerate() {
        let cost = segment.cost();
        adjacency[segment.start_index].push(Edge {
            target: segment.end_index,
            segment: index,
            cost,
            forward: true,
        });
        if !segment.one_way && segment.start_index != segment.end_index {
            adjacency[segment.end_index].push(Edge {
                target: segment.start_index,
                segment: index,
                cost,
                forward: false,
            });
        }
    }

    for edges in &mut adjacency {
        edges.sort_by(compare_edges);
    }
    adjacency
}

fn compare_edges(a: &Edge, b: &Edge) -> Ordering {
    a.target
        .cmp(&b.target)
        .then_with(|| a.segment.cmp(&b.segment))
}

fn compute_heuristic_scale(nodes: &[Node], segments: &[Segment]) -> f64 {
    let mut scale = f64::INFINITY;
    for segment in segments {
        let span = nodes[segment.start_index]
            .position
            .distance_to(&nodes[segment.end_index].position);
        if span > 0.0 {
            scale = scale.min(segment.cost() / span);
        }
    }

    if scale.is_finite() {
        scale * HEURISTIC_MARGIN
    } else {
        0.0
    }
}
