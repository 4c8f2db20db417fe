//! Application state and the graph update worker.
//!
//! Handlers reach the [`PlanningService`] through [`AppState`]. Planning
//! calls read the store directly; graph replacements are queued on a bounded
//! channel and applied by a single [`UpdateWorker`], so updates publish in
//! arrival order and never interleave.

use std::sync::Arc;

use routenet_lib::{
    Error as LibError, PlanOptions, PlanningService, RouteNetwork, SnapshotSummary,
};
use tokio::sync::{mpsc, oneshot};

use crate::metrics::{record_network_size, record_network_update};

/// Error returned to the sender of a graph update.
#[derive(Debug)]
pub enum UpdateError {
    /// The network failed validation; the previous snapshot stays current.
    Rejected(LibError),

    /// The update worker has stopped and no longer accepts work.
    WorkerUnavailable,

    /// Building the snapshot panicked or was cancelled.
    WorkerFailed(String),
}

impl std::fmt::Display for UpdateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(e) => write!(f, "route network rejected: {}", e),
            Self::WorkerUnavailable => write!(f, "graph update worker is not running"),
            Self::WorkerFailed(reason) => write!(f, "graph update failed: {}", reason),
        }
    }
}

impl std::error::Error for UpdateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LibError> for UpdateError {
    fn from(err: LibError) -> Self {
        Self::Rejected(err)
    }
}

type UpdateReply = Result<SnapshotSummary, UpdateError>;

struct UpdateJob {
    network: RouteNetwork,
    reply: oneshot::Sender<UpdateReply>,
}

/// Shared application state for all axum handlers.
///
/// Cheap to clone; share it through axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::post, extract::State};
/// use routenet_service_shared::{AppState, ServiceConfig};
///
/// let (state, worker) = AppState::new(&ServiceConfig::from_env());
/// tokio::spawn(worker.run());
///
/// let app = Router::new()
///     .route("/api/v1/plan", post(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    service: Arc<PlanningService>,
    updates: mpsc::Sender<UpdateJob>,
}

impl AppState {
    /// Build the state and the worker that drains its update queue.
    ///
    /// The worker must be spawned (see [`UpdateWorker::run`]) before any
    /// update is submitted.
    pub fn new(config: &crate::ServiceConfig) -> (Self, UpdateWorker) {
        Self::with_options(config.plan_options(), config.update_queue_depth)
    }

    /// Build the state from explicit planning options and queue depth.
    pub fn with_options(options: PlanOptions, queue_depth: usize) -> (Self, UpdateWorker) {
        let service = Arc::new(PlanningService::new(options));
        let (sender, receiver) = mpsc::channel(queue_depth.max(1));

        let state = Self {
            inner: Arc::new(AppStateInner {
                service: Arc::clone(&service),
                updates: sender,
            }),
        };
        let worker = UpdateWorker { service, receiver };
        (state, worker)
    }

    /// Access the planning service.
    pub fn service(&self) -> &PlanningService {
        &self.inner.service
    }

    /// Arc-wrapped planning service, for moving into blocking tasks.
    pub fn service_arc(&self) -> Arc<PlanningService> {
        Arc::clone(&self.inner.service)
    }

    /// Queue a full replacement and wait until the worker has applied or
    /// rejected it.
    pub async fn submit_update(&self, network: RouteNetwork) -> UpdateReply {
        let (reply, response) = oneshot::channel();
        self.inner
            .updates
            .send(UpdateJob { network, reply })
            .await
            .map_err(|_| UpdateError::WorkerUnavailable)?;

        response.await.map_err(|_| UpdateError::WorkerUnavailable)?
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current = self.inner.service.current();
        f.debug_struct("AppState")
            .field("state", &self.inner.service.state())
            .field("graph_version", &current.as_ref().map(|s| s.version()))
            .field("options", &self.inner.service.options())
            .finish()
    }
}

/// Drains the update queue, applying one graph replacement at a time.
pub struct UpdateWorker {
    service: Arc<PlanningService>,
    receiver: mpsc::Receiver<UpdateJob>,
}

impl UpdateWorker {
    /// Run until every [`AppState`] clone has been dropped.
    pub async fn run(mut self) {
        tracing::info!("graph update worker started");
        while let Some(job) = self.receiver.recv().await {
            let service = Arc::clone(&self.service);
            let network = job.network;

            // Snapshot construction is CPU-bound; keep it off the async workers.
            let result =
                match tokio::task::spawn_blocking(move || apply_network(&service, network)).await {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::error!(error = %e, "graph update task failed");
                        Err(UpdateError::WorkerFailed(e.to_string()))
                    }
                };

            if job.reply.send(result).is_err() {
                tracing::debug!("update sender went away before the reply");
            }
        }
        tracing::info!("graph update worker stopped");
    }
}

/// Build and publish `network`, recording update metrics.
///
/// Used by the worker and by startup seeding.
pub fn apply_network(service: &PlanningService, network: RouteNetwork) -> UpdateReply {
    match service.apply_update(network) {
        Ok(snapshot) => {
            record_network_update("applied");
            record_network_size(snapshot.node_count(), snapshot.segment_count());
            tracing::info!(
                version = snapshot.version(),
                frame_id = %snapshot.frame_id(),
                nodes = snapshot.node_count(),
                segments = snapshot.segment_count(),
                "route network applied"
            );
            Ok(snapshot.summary())
        }
        Err(e) => {
            record_network_update("rejected");
            Err(UpdateError::Rejected(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fixture_network, two_component_network};
    use routenet_lib::{PlanRequest, StoreState};

    #[tokio::test]
    async fn updates_apply_in_order() {
        let (state, worker) = AppState::with_options(PlanOptions::default(), 4);
        tokio::spawn(worker.run());

        let first = state.submit_update(fixture_network()).await.unwrap();
        let second = state.submit_update(two_component_network()).await.unwrap();

        assert_eq!(first.version, 1);
        assert_eq!(second.version, 2);
        assert_eq!(state.service().current().unwrap().version(), 2);
    }

    #[tokio::test]
    async fn rejected_update_keeps_current_snapshot() {
        let (state, worker) = AppState::with_options(PlanOptions::default(), 4);
        tokio::spawn(worker.run());
        state.submit_update(fixture_network()).await.unwrap();

        let mut broken = fixture_network();
        broken.segments[0].end = "nowhere".to_string();
        let err = state.submit_update(broken).await.unwrap_err();

        assert!(matches!(err, UpdateError::Rejected(_)));
        assert!(err.to_string().contains("nowhere"));
        assert_eq!(state.service().current().unwrap().version(), 1);
    }

    #[tokio::test]
    async fn submit_without_worker_is_unavailable() {
        let (state, worker) = AppState::with_options(PlanOptions::default(), 1);
        drop(worker);

        let err = state.submit_update(fixture_network()).await.unwrap_err();
        assert!(matches!(err, UpdateError::WorkerUnavailable));
        assert_eq!(state.service().state(), StoreState::Uninitialized);
    }

    #[test]
    fn apply_network_publishes_synchronously() {
        let service = PlanningService::default();
        let summary = apply_network(&service, fixture_network()).unwrap();

        assert_eq!(summary.version, 1);
        assert_eq!(service.state(), StoreState::Ready);
        assert!(service.plan(&PlanRequest::new("A", "C")).success);
    }

    #[test]
    fn debug_reports_graph_version() {
        let (state, _worker) = AppState::with_options(PlanOptions::default(), 1);
        apply_network(state.service(), fixture_network()).unwrap();

        let debug = format!("{:?}", state);
        assert!(debug.contains("AppState"));
        assert!(debug.contains("graph_version: Some(1)"));
    }
}
