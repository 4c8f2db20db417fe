//! Publication cell for the current route network snapshot.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde::Serialize;

use crate::graph::GraphSnapshot;

/// Lifecycle of a [`GraphStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreState {
    /// No snapshot has ever been published.
    Uninitialized,
    /// At least one snapshot has been published. Never regresses.
    Ready,
}

/// Holds the current [`GraphSnapshot`] and swaps it atomically.
///
/// Readers get an owned `Arc` to whichever snapshot was current at the moment
/// of the read. A later [`replace`](Self::replace) never touches a snapshot a
/// reader already holds, so an in-flight query keeps a consistent view until
/// it drops its `Arc`.
#[derive(Default)]
pub struct GraphStore {
    current: ArcSwapOption<GraphSnapshot>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `snapshot` as current, returning the one it displaced.
    pub fn replace(&self, snapshot: Arc<GraphSnapshot>) -> Option<Arc<GraphSnapshot>> {
        let version = snapshot.version();
        let previous = self.current.swap(Some(snapshot));
        tracing::info!(
            version,
            previous_version = previous.as_ref().map(|s| s.version()),
            "published graph snapshot"
        );
        previous
    }

    /// The presently published snapshot, if any.
    pub fn current(&self) -> Option<Arc<GraphSnapshot>> {
        self.current.load_full()
    }

    pub fn state(&self) -> StoreState {
        if Option::is_some(&self.current.load()) {
            StoreState::Ready
        } else {
            StoreState::Uninitialized
        }
    }
}

impl fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.current();
        f.debug_struct("GraphStore")
            .field("state", &self.state())
            .field("version", &current.as_ref().map(|s| s.version()))
            .finish()
    }
}
