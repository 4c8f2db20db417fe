//! RFC 9457 Problem Details for HTTP APIs.
//!
//! Used by every endpoint except `POST /api/v1/plan`, which always answers
//! with its own response contract.
//! See: <https://www.rfc-editor.org/rfc/rfc9457.html>

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use routenet_lib::Error as LibError;

use crate::state::UpdateError;

/// Problem type URI for route networks that fail validation.
pub const PROBLEM_INVALID_NETWORK: &str = "/problems/invalid-network";

/// Problem type URI for malformed request bodies.
pub const PROBLEM_INVALID_REQUEST: &str = "/problems/invalid-request";

/// Problem type URI for queries made before any network was published.
pub const PROBLEM_GRAPH_UNAVAILABLE: &str = "/problems/graph-unavailable";

/// Problem type URI for internal server errors.
pub const PROBLEM_INTERNAL_ERROR: &str = "/problems/internal-error";

/// Problem type URI for a service that cannot accept work right now.
pub const PROBLEM_SERVICE_UNAVAILABLE: &str = "/problems/service-unavailable";

/// RFC 9457 Problem Details response structure.
///
/// # Example
///
/// ```
/// use routenet_service_shared::{ProblemDetails, PROBLEM_INVALID_NETWORK};
/// use axum::http::StatusCode;
///
/// let problem = ProblemDetails::new(
///     PROBLEM_INVALID_NETWORK,
///     "Invalid Route Network",
///     StatusCode::UNPROCESSABLE_ENTITY,
/// )
/// .with_detail("segment 'A-B' references unknown node 'B'")
/// .with_request_id("req-12345");
/// assert_eq!(problem.status, 422);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    /// URI reference identifying the problem type (relative).
    #[serde(rename = "type")]
    pub type_uri: String,

    /// Short, human-readable summary of the problem.
    pub title: String,

    /// HTTP status code for this problem.
    pub status: u16,

    /// Human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request identifier of the failing call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Always "application/problem+json".
    pub content_type: String,
}

impl ProblemDetails {
    pub fn new(type_uri: impl Into<String>, title: impl Into<String>, status: StatusCode) -> Self {
        Self {
            type_uri: type_uri.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            content_type: "application/problem+json".to_string(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.instance = Some(request_id.into());
        self
    }

    /// 400 for a body that could not be decoded or failed field validation.
    pub fn bad_request(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_REQUEST,
            "Invalid Request",
            StatusCode::BAD_REQUEST,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 422 for a well-formed network that cannot become a snapshot.
    pub fn invalid_network(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INVALID_NETWORK,
            "Invalid Route Network",
            StatusCode::UNPROCESSABLE_ENTITY,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    /// 503 while no network has been published.
    pub fn graph_unavailable(request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_GRAPH_UNAVAILABLE,
            "Graph Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail("No route network has been published yet")
        .with_request_id(request_id)
    }

    pub fn internal_error(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_INTERNAL_ERROR,
            "Internal Error",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }

    pub fn service_unavailable(detail: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self::new(
            PROBLEM_SERVICE_UNAVAILABLE,
            "Service Unavailable",
            StatusCode::SERVICE_UNAVAILABLE,
        )
        .with_detail(detail)
        .with_request_id(request_id)
    }
}

impl std::fmt::Display for ProblemDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.title,
            self.detail.as_deref().unwrap_or("")
        )
    }
}

impl std::error::Error for ProblemDetails {}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, Json(&self)).into_response();
        response.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}

/// Convert library errors to ProblemDetails.
///
/// The `request_id` must be provided separately since library errors don't have it.
pub fn from_lib_error(error: &LibError, request_id: &str) -> ProblemDetails {
    match error {
        e if e.is_invalid_network() => ProblemDetails::invalid_network(e.to_string(), request_id),
        LibError::Json(e) => {
            ProblemDetails::bad_request(format!("malformed route network: {}", e), request_id)
        }
        LibError::NetworkNotFound { path } => ProblemDetails::service_unavailable(
            format!("Route network not available at {}", path.display()),
            request_id,
        ),
        _ => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}

/// Convert a failed graph update to ProblemDetails.
pub fn from_update_error(error: &UpdateError, request_id: &str) -> ProblemDetails {
    match error {
        UpdateError::Rejected(e) => from_lib_error(e, request_id),
        UpdateError::WorkerUnavailable => {
            ProblemDetails::service_unavailable(error.to_string(), request_id)
        }
        UpdateError::WorkerFailed(_) => ProblemDetails::internal_error(error.to_string(), request_id),
    }
}
