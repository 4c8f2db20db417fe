use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the route network library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// Every variant except the IO and JSON wrappers describes a route network
/// that cannot become a [`GraphSnapshot`](crate::GraphSnapshot).
#[derive(Debug, Error)]
pub enum Error {
    /// Network file could not be located at the given path.
    #[error("route network not found at {path}")]
    NetworkNotFound { path: PathBuf },

    /// Two nodes share the same identifier.
    #[error("duplicate node id '{id}'")]
    DuplicateNode { id: String },

    /// Two segments share the same identifier.
    #[error("duplicate segment id '{id}'")]
    DuplicateSegment { id: String },

    /// An identifier was empty or whitespace only.
    #[error("{kind} id must not be empty")]
    EmptyId { kind: &'static str },

    /// A segment references a node that is not part of the network.
    #[error("segment '{segment}' references unknown node '{node}'")]
    DanglingEndpoint { segment: String, node: String },

    /// A node carries a latitude/longitude outside the valid ranges.
    #[error("node '{id}' has invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate {
        id: String,
        latitude: f64,
        longitude: f64,
    },

    /// A segment length is negative or not finite.
    #[error("segment '{id}' has invalid length {length}")]
    InvalidLength { id: String, length: f64 },

    /// A segment cost multiplier is negative or not finite.
    #[error("segment '{id}' has invalid cost multiplier {multiplier}")]
    InvalidCostMultiplier { id: String, multiplier: f64 },

    /// A segment whose length scaled by its multiplier is not finite.
    #[error("segment '{id}' has non-finite cost ({length} x {multiplier})")]
    InvalidCost {
        id: String,
        length: f64,
        multiplier: f64,
    },

    /// The summed cost of all segments overflows, so path costs could too.
    #[error("total segment cost of the network is not finite")]
    CostOverflow,

    /// A zero-length segment that was not declared as a connector.
    #[error("segment '{id}' has zero length but is not flagged as a connector")]
    ZeroLengthSegment { id: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True when the error describes invalid network content rather than an
    /// IO or decoding problem.
    pub fn is_invalid_network(&self) -> bool {
        !matches!(
            self,
            Error::NetworkNotFound { .. } | Error::Io(_) | Error::Json(_)
        )
    }
}

/// Render "did you mean" suggestions for an unknown identifier.
pub(crate) fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_render_single_and_multiple() {
        assert_eq!(format_suggestions(&[]), "");
        assert_eq!(
            format_suggestions(&["A".to_string()]),
            ". Did you mean 'A'?"
        );
        assert_eq!(
            format_suggestions(&["A".to_string(), "AB".to_string()]),
            ". Did you mean one of: 'A', 'AB'?"
        );
    }

    #[test]
    fn invalid_network_classification() {
        let dangling = Error::DanglingEndpoint {
            segment: "s1".to_string(),
            node: "Z".to_string(),
        };
        assert!(dangling.is_invalid_network());

        let io = Error::Io(std::io::Error::other("boom"));
        assert!(!io.is_invalid_network());
    }
}
