//! Poll-based view synchronization.
//!
//! There is no push channel: each logged-in session re-reads the shared
//! message list on a fixed interval and republishes its recomputed view
//! through a watch channel. A failed poll is skipped and the last good view
//! stays in place.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use sprout_types::MessageView;

use crate::session::Session;

/// Poll interval used by the app when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Owner handle for a session's poller. Dropping it cancels the background
/// task, so a logout cannot leave an orphaned timer behind.
pub struct SyncHandle {
    rx: watch::Receiver<Vec<MessageView>>,
    cancel: CancellationToken,
}

impl SyncHandle {
    /// Current view snapshot.
    pub fn view(&self) -> Vec<MessageView> {
        self.rx.borrow().clone()
    }

    /// A receiver for consumers that want to await updates themselves.
    pub fn subscribe(&self) -> watch::Receiver<Vec<MessageView>> {
        self.rx.clone()
    }

    /// Wait until the poller publishes a fresh view. Returns false if the
    /// poller has stopped.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

pub(crate) fn spawn(session: Session, interval: Duration) -> SyncHandle {
    // Start from the persisted dashboard cache so consumers render something
    // before the first poll lands.
    let initial = session.cached_view().unwrap_or_default();
    let (tx, rx) = watch::channel(initial);

    let cancel = CancellationToken::new();
    let token = cancel.clone();

    tokio::spawn(async move {
        let identity = session.identity().to_string();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    let worker = session.clone();
                    // Blocking store read runs off the async runtime.
                    match tokio::task::spawn_blocking(move || worker.refresh_view()).await {
                        Ok(Ok(view)) => {
                            debug!("poll for {} refreshed {} messages", identity, view.len());
                            if tx.send(view).is_err() {
                                break;
                            }
                        }
                        Ok(Err(e)) => warn!("poll for {} skipped, keeping last view: {}", identity, e),
                        Err(e) => warn!("poll task for {} failed: {}", identity, e),
                    }
                }
            }
        }

        debug!("sync loop for {} stopped", identity);
    });

    SyncHandle { rx, cancel }
}
