use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use routenet_cli::commands::inspect::handle_inspect_command;
use routenet_cli::commands::plan::{handle_plan_command, PlanCommandArgs};
use routenet_cli::output::OutputFormat;
use routenet_lib::RouteAlgorithm;

#[derive(Parser, Debug)]
#[command(author, version, about = "Route network planning utilities")]
struct Cli {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the minimum-cost plan between two nodes of a network file.
    Plan {
        /// Route network JSON file.
        #[arg(long)]
        network: PathBuf,
        /// Start node id.
        #[arg(long = "from")]
        from: String,
        /// Goal node id.
        #[arg(long = "to")]
        to: String,
        /// Search algorithm: dijkstra or a-star.
        #[arg(long, default_value_t = RouteAlgorithm::Dijkstra)]
        algorithm: RouteAlgorithm,
        /// Abort the search after this many milliseconds.
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Validate a network file and print its structure.
    Inspect {
        /// Route network JSON file.
        #[arg(long)]
        network: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let status = match cli.command {
        Command::Plan {
            network,
            from,
            to,
            algorithm,
            timeout_ms,
        } => {
            let args = PlanCommandArgs {
                network,
                from,
                to,
                algorithm,
                timeout_ms,
            };
            handle_plan_command(&args, cli.format)?
        }
        Command::Inspect { network } => handle_inspect_command(&network, cli.format)?,
    };

    Ok(if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
