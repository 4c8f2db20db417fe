//! Plan command handler: minimum-cost plan over a network file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use routenet_lib::{
    load_network, PlanOptions, PlanRequest, PlanResponse, PlanningService, RouteAlgorithm,
};

use crate::commands::CommandStatus;
use crate::output::{render_failure_text, render_json, render_plan_text, OutputFormat};
use crate::terminal::{ColorPalette, Glyphs};

/// Arguments for the plan command.
#[derive(Debug, Clone)]
pub struct PlanCommandArgs {
    /// Route network JSON file.
    pub network: PathBuf,
    /// Start node id.
    pub from: String,
    /// Goal node id.
    pub to: String,
    pub algorithm: RouteAlgorithm,
    /// Search budget in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl PlanCommandArgs {
    pub fn options(&self) -> PlanOptions {
        let options = PlanOptions::default().with_algorithm(self.algorithm);
        match self.timeout_ms {
            Some(ms) => options.with_budget(Duration::from_millis(ms)),
            None => options,
        }
    }

    pub fn request(&self) -> PlanRequest {
        PlanRequest::new(self.from.as_str(), self.to.as_str())
    }
}

/// Handle the plan subcommand.
///
/// The network is validated exactly as the service validates an update, so
/// a file that loads here is accepted by `PUT /api/v1/network` too.
pub fn handle_plan_command(args: &PlanCommandArgs, format: OutputFormat) -> Result<CommandStatus> {
    let service = load_service(&args.network, args.options())?;
    let request = args.request();

    let (snapshot, outcome) = service.plan_outcome(&request);
    let status = if outcome.is_ok() {
        CommandStatus::Success
    } else {
        CommandStatus::Failure
    };

    match format {
        OutputFormat::Json => {
            let response = PlanResponse::from_outcome(outcome, snapshot.as_deref());
            println!("{}", render_json(&response)?);
        }
        OutputFormat::Text => match outcome {
            Ok(plan) => {
                println!(
                    "{}",
                    render_plan_text(&plan, &ColorPalette::detect(), &Glyphs::detect())
                );
            }
            Err(failure) => {
                eprintln!("{}", render_failure_text(&failure, &ColorPalette::detect()));
            }
        },
    }

    Ok(status)
}

fn load_service(path: &Path, options: PlanOptions) -> Result<PlanningService> {
    let network = load_network(path)
        .with_context(|| format!("failed to load route network from {}", path.display()))?;

    let service = PlanningService::new(options);
    let snapshot = service
        .apply_update(network)
        .with_context(|| format!("route network at {} is invalid", path.display()))?;
    tracing::debug!(
        nodes = snapshot.node_count(),
        segments = snapshot.segment_count(),
        frame_id = %snapshot.frame_id(),
        "route network ready"
    );
    Ok(service)
}
