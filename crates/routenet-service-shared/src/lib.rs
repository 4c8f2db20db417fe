//! Shared infrastructure for the route network HTTP services.
//!
//! This crate provides the HTTP glue around `routenet-lib`:
//!
//! - [`AppState`]: the planning service plus the sender side of the update queue
//! - [`UpdateWorker`]: applies graph replacements one at a time, in arrival order
//! - [`ServiceConfig`]: environment-driven service settings
//! - [`health`]: liveness and readiness probes
//! - [`ProblemDetails`]: RFC 9457 Problem Details for non-plan endpoints
//! - [`ServiceResponse`]: wrapper for successful JSON responses
//! - [`metrics`]: Prometheus metrics infrastructure
//! - [`logging`]: structured JSON logging setup
//! - [`middleware`]: request tracking and metrics middleware
//! - [`PlanQuery`]: wire form of a plan request, with validation
//!
//! # Architecture
//!
//! Handlers stay thin; every planning decision lives in `routenet-lib`:
//!
//! ```text
//! ┌──────────────────────────────┐      ┌──────────────────────────────┐
//! │  PUT /api/v1/network         │      │  POST /api/v1/plan           │
//! │  - decode RouteNetwork       │      │  - decode PlanQuery          │
//! │  - enqueue on update channel │      │  - capture current snapshot  │
//! │  - await worker reply        │      │  - plan on blocking pool     │
//! └──────────────┬───────────────┘      └──────────────┬───────────────┘
//!                │ UpdateWorker                        │
//!                ▼                                     ▼
//!        ┌────────────────────────────────────────────────────┐
//!        │  PlanningService / GraphStore (routenet-lib)       │
//!        └────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides fixture networks and a ready-made state
//! for handler tests. Enable the `test-utils` feature to use it from
//! dependent crates.

#![deny(warnings)]

mod config;
mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::ServiceConfig;
pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use metrics::{
    init_metrics, metrics_handler, record_network_size, record_network_update,
    record_plan_computed, record_plan_failed, record_plan_segments, MetricsConfig, MetricsError,
};
pub use middleware::{extract_or_generate_request_id, MetricsLayer, RequestId};
pub use problem::{
    from_lib_error, from_update_error, ProblemDetails, PROBLEM_GRAPH_UNAVAILABLE,
    PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_NETWORK, PROBLEM_INVALID_REQUEST,
    PROBLEM_SERVICE_UNAVAILABLE,
};
pub use request::{PlanQuery, Validate};
pub use response::ServiceResponse;
pub use state::{apply_network, AppState, UpdateError, UpdateWorker};
