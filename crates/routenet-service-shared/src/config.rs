//! Environment-driven settings for the planning service.
//!
//! # Environment Variables
//!
//! - `SERVICE_PORT`: HTTP port (default: 8080)
//! - `ROUTE_NETWORK_PATH`: route network JSON published before serving (optional)
//! - `PLAN_TIMEOUT_MS`: per-plan search budget in milliseconds (optional)
//! - `PLAN_ALGORITHM`: `dijkstra` (default) or `a-star`
//! - `UPDATE_QUEUE_DEPTH`: pending graph updates before senders wait (default: 16)

use std::path::PathBuf;
use std::time::Duration;

use routenet_lib::{PlanOptions, RouteAlgorithm};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_UPDATE_QUEUE_DEPTH: usize = 16;

/// Settings for one planning service process.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub port: u16,
    pub network_path: Option<PathBuf>,
    pub plan_timeout: Option<Duration>,
    pub algorithm: RouteAlgorithm,
    pub update_queue_depth: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            network_path: None,
            plan_timeout: None,
            algorithm: RouteAlgorithm::default(),
            update_queue_depth: DEFAULT_UPDATE_QUEUE_DEPTH,
        }
    }
}

impl ServiceConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`. Unparseable values fall back to their
    /// defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = parse_or(&lookup, "SERVICE_PORT", defaults.port);
        let network_path = lookup("ROUTE_NETWORK_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let plan_timeout = lookup("PLAN_TIMEOUT_MS").and_then(|value| {
            match value.trim().parse::<u64>() {
                Ok(ms) => Some(Duration::from_millis(ms)),
                Err(_) => {
                    tracing::warn!(%value, "ignoring invalid PLAN_TIMEOUT_MS");
                    None
                }
            }
        });
        let algorithm = parse_or(&lookup, "PLAN_ALGORITHM", defaults.algorithm);
        let update_queue_depth =
            parse_or(&lookup, "UPDATE_QUEUE_DEPTH", defaults.update_queue_depth).max(1);

        Self {
            port,
            network_path,
            plan_timeout,
            algorithm,
            update_queue_depth,
        }
    }

    /// Options handed to every planning call.
    pub fn plan_options(&self) -> PlanOptions {
        let options = PlanOptions::default().with_algorithm(self.algorithm);
        match self.plan_timeout {
            Some(budget) => options.with_budget(budget),
            None => options,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, %value, "ignoring invalid setting");
            default
        }),
        None => default,
    }
}
