use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::store::Maps;

/// Store state shared between callers and the sweeper; `None` once closed
pub(crate) type SharedState = Arc<RwLock<Option<Maps>>>;

/// Background task that actively removes expired entries
///
/// The task only holds the shared state, never the store handle itself, so
/// dropping the last [`Store`](crate::Store) drops the sweeper and stops it.
pub(crate) struct ExpirationSweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl ExpirationSweeper {
    /// Spawns the sweeper on the current tokio runtime
    pub(crate) fn spawn(state: SharedState, resolution: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(Self::run(state, resolution, shutdown_rx));
        Self { shutdown_tx, handle }
    }

    async fn run(state: SharedState, resolution: Duration, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(resolution);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match sweep(&state) {
                        Some(0) => {}
                        Some(removed) => tracing::debug!(removed, "swept expired entries"),
                        None => break,
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("expiration sweeper stopped");
    }

    /// Signals the task to exit and aborts it, so it never sweeps again even if
    /// the runtime does not get around to polling it.
    pub(crate) fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        self.handle.abort();
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for ExpirationSweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Removes every expired entry under the write lock.
///
/// Returns `None` if the store has been closed.
pub(crate) fn sweep(state: &RwLock<Option<Maps>>) -> Option<usize> {
    let mut guard = state.write();
    let maps = guard.as_mut()?;
    Some(maps.remove_expired(Instant::now()))
}
