//! Route network planning HTTP microservice.
//!
//! # Configuration
//!
//! - `SERVICE_PORT` - HTTP port (default: 8080)
//! - `ROUTE_NETWORK_PATH` - route network JSON published before serving (optional)
//! - `PLAN_TIMEOUT_MS` - per-plan search budget (optional)
//! - `PLAN_ALGORITHM` - `dijkstra` (default) or `a-star`
//! - `UPDATE_QUEUE_DEPTH` - pending network updates (default: 16)
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `METRICS_ENABLED` / `METRICS_PATH` - Prometheus exporter settings

use std::net::SocketAddr;

use tracing::{error, info, warn};

use routenet_lib::load_network;
use routenet_service_plan::{build_router, SERVICE_NAME};
use routenet_service_shared::{
    apply_network, init_logging, init_metrics, AppState, LoggingConfig, MetricsConfig,
    ServiceConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service(SERVICE_NAME);
    init_logging(&logging_config);

    let metrics_config = MetricsConfig::from_env();
    if let Err(e) = init_metrics(&metrics_config) {
        // Metrics are optional; keep serving without them.
        warn!(error = %e, "failed to initialize metrics, continuing without metrics");
    }

    let config = ServiceConfig::from_env();
    info!(
        port = config.port,
        algorithm = %config.algorithm,
        plan_timeout_ms = config.plan_timeout.map(|t| t.as_millis() as u64),
        update_queue_depth = config.update_queue_depth,
        "starting plan service"
    );

    let (state, worker) = AppState::new(&config);

    if let Some(path) = &config.network_path {
        info!(path = %path.display(), "loading seed route network");
        let network = load_network(path).map_err(|e| {
            error!(error = %e, path = %path.display(), "failed to load seed route network");
            e
        })?;
        apply_network(state.service(), network).map_err(|e| {
            error!(error = %e, path = %path.display(), "seed route network rejected");
            e
        })?;
    } else {
        info!("no seed network configured; waiting for PUT /api/v1/network");
    }

    let worker = tokio::spawn(worker.run());
    let app = build_router(state, &metrics_config.path);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router held the last update sender, so the worker drains and exits.
    if let Err(e) = worker.await {
        error!(error = %e, "update worker ended abnormally");
    }
    info!("plan service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
