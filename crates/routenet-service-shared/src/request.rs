//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use routenet_lib::PlanRequest;

use crate::ProblemDetails;

/// Validation trait for request types.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` populates the `instance` field of the returned
    /// `ProblemDetails`, boxed to keep the `Err` variant small.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Body of `POST /api/v1/plan`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanQuery {
    /// Node the plan starts from.
    pub start_node_id: String,

    /// Node the plan ends at.
    pub goal_node_id: String,
}

impl PlanQuery {
    pub fn new(start: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            start_node_id: start.into(),
            goal_node_id: goal.into(),
        }
    }

    /// Library form of this query.
    pub fn to_plan_request(&self) -> PlanRequest {
        PlanRequest::new(self.start_node_id.as_str(), self.goal_node_id.as_str())
    }
}

impl Validate for PlanQuery {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.start_node_id.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'startNodeId' field is required and cannot be empty",
                request_id,
            )));
        }

        if self.goal_node_id.trim().is_empty() {
            return Err(Box::new(ProblemDetails::bad_request(
                "The 'goalNodeId' field is required and cannot be empty",
                request_id,
            )));
        }

        Ok(())
    }
}
