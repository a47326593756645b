//! Background package refresh.
//!
//! One periodic task per store instance re-fetches the package and swaps
//! the indices to the new generation. Refresh errors are logged and
//! swallowed; the store keeps serving the last good generation.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::store::IndexStore;

/// Configuration for the refresh worker.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// How often to re-fetch the package.
    pub interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
        }
    }
}

/// Handle to a running refresh task.
pub struct RefreshWorker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Start the periodic refresh task for `store`.
///
/// Call [`RefreshWorker::stop`] to shut it down; stopping is synchronous
/// in effect, no refresh runs after `stop` returns.
pub fn start(store: Arc<IndexStore>, config: RefreshConfig) -> RefreshWorker {
    let cancel = CancellationToken::new();

    let handle = {
        let cancel = cancel.clone();
        let interval = config.interval;

        tokio::spawn(async move {
            info!("catalog refresh worker started (interval={interval:?})");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("catalog refresh worker stopped");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        debug!("refreshing device catalog");
                        let store = Arc::clone(&store);
                        match tokio::task::spawn_blocking(move || store.refresh()).await {
                            Ok(Ok(())) => info!("device catalog refreshed"),
                            Ok(Err(e)) => error!("failed to refresh device catalog: {e}"),
                            Err(e) => error!("refresh task panicked: {e}"),
                        }
                    }
                }
            }
        })
    };

    RefreshWorker { cancel, handle }
}

impl RefreshWorker {
    /// Stop the worker and wait for it to finish. An in-flight refresh
    /// completes first; none starts afterwards.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}
