//! Wire representation of a full route network replacement.
//!
//! A [`RouteNetwork`] is what the update channel delivers: every node and
//! segment of the network plus the frame identifier it was published under.
//! It is plain data; [`GraphSnapshot::build`](crate::GraphSnapshot::build)
//! validates it and derives the routing structures.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Full route network as delivered by an update event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteNetwork {
    /// Coordinate frame / version label copied into every plan.
    #[serde(default)]
    pub frame_id: String,

    /// Optional upstream identifier for the network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub nodes: Vec<NodeSpec>,

    #[serde(default)]
    pub segments: Vec<SegmentSpec>,
}

/// Navigable point in the incoming network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

/// Connection between two nodes in the incoming network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSpec {
    pub id: String,
    pub start: String,
    pub end: String,

    /// Length in network units. Derived from the endpoints' great-circle
    /// distance (metres) when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    /// Traversable only from `start` to `end`.
    #[serde(default)]
    pub one_way: bool,

    #[serde(default = "default_cost_multiplier")]
    pub cost_multiplier: f64,

    /// Explicit zero-cost connector; the only way a zero length is accepted.
    #[serde(default)]
    pub connector: bool,
}

fn default_cost_multiplier() -> f64 {
    1.0
}

impl NodeSpec {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl SegmentSpec {
    /// Two-way segment with an explicit length.
    pub fn new(
        id: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        length: f64,
    ) -> Self {
        Self {
            id: id.into(),
            start: start.into(),
            end: end.into(),
            length: Some(length),
            one_way: false,
            cost_multiplier: default_cost_multiplier(),
            connector: false,
        }
    }

    pub fn one_way(mut self) -> Self {
        self.one_way = true;
        self
    }

    pub fn with_cost_multiplier(mut self, multiplier: f64) -> Self {
        self.cost_multiplier = multiplier;
        self
    }

    pub fn connector(mut self) -> Self {
        self.connector = true;
        self
    }

    /// Clear the explicit length so it is derived from the endpoints.
    pub fn geodesic(mut self) -> Self {
        self.length = None;
        self
    }
}

impl RouteNetwork {
    pub fn new(frame_id: impl Into<String>) -> Self {
        Self {
            frame_id: frame_id.into(),
            ..Self::default()
        }
    }

    pub fn with_node(mut self, node: NodeSpec) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_segment(mut self, segment: SegmentSpec) -> Self {
        self.segments.push(segment);
        self
    }

    /// Decode a network from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Load a route network JSON file from disk.
pub fn load_network(path: &Path) -> Result<RouteNetwork> {
    if !path.exists() {
        return Err(Error::NetworkNotFound {
            path: path.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(path)?;
    let network = RouteNetwork::from_json(&contents)?;
    tracing::debug!(
        path = %path.display(),
        nodes = network.nodes.len(),
        segments = network.segments.len(),
        "loaded route network"
    );
    Ok(network)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialization_applies_defaults() {
        let json = r#"{
            "frameId": "map",
            "nodes": [{"id": "A", "latitude": 1.0, "longitude": 2.0}],
            "segments": [{"id": "s", "start": "A", "end": "A"}]
        }"#;
        let network = RouteNetwork::from_json(json).unwrap();

        assert_eq!(network.frame_id, "map");
        assert!(network.id.is_none());
        assert!(network.nodes[0].properties.is_empty());
        let segment = &network.segments[0];
        assert_eq!(segment.length, None);
        assert!(!segment.one_way);
        assert!(!segment.connector);
        assert_eq!(segment.cost_multiplier, 1.0);
    }

    #[test]
    fn builder_helpers_set_flags() {
        let segment = SegmentSpec::new("s", "A", "B", 3.0)
            .one_way()
            .with_cost_multiplier(2.0);
        assert!(segment.one_way);
        assert_eq!(segment.cost_multiplier, 2.0);
        assert_eq!(segment.geodesic().length, None);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = load_network(Path::new("/nonexistent/network.json")).unwrap_err();
        assert!(matches!(err, Error::NetworkNotFound { .. }));
        assert!(err.to_string().contains("/nonexistent/network.json"));
    }

    #[test]
    fn load_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.json");
        let network = RouteNetwork::new("map")
            .with_node(NodeSpec::new("A", 0.0, 0.0).with_property("name", "corner"));
        fs::write(&path, serde_json::to_string(&network).unwrap()).unwrap();

        let loaded = load_network(&path).unwrap();
        assert_eq!(loaded, network);
    }

    #[test]
    fn malformed_json_is_json_error() {
        let err = RouteNetwork::from_json("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
