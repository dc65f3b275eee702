//! Law file hot reload.
//!
//! Polls the modification time of the law file and swaps in a freshly parsed
//! book when it changes. A file that fails to parse is logged and ignored:
//! the engine keeps serving the last good book.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, instrument, warn};

use super::engine::LawEngine;

/// Handle to a running law watcher. Dropping it does not stop the task; call `stop`.
pub struct LawWatcher {
    handle: JoinHandle<()>,
}

impl LawWatcher {
    /// Spawn the polling task on the current tokio runtime.
    ///
    /// The current modification time is taken before returning, so any later
    /// write to the file is picked up.
    pub fn spawn(engine: Arc<LawEngine>, path: PathBuf, every: Duration) -> Self {
        let baseline = std::fs::metadata(&path).and_then(|m| m.modified()).ok();
        let handle = tokio::spawn(watch(engine, path, every, baseline));
        Self { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

async fn modified_at(path: &Path) -> Option<SystemTime> {
    tokio::fs::metadata(path).await.ok()?.modified().ok()
}

#[instrument(skip(engine, path, baseline), fields(path = %path.display()))]
async fn watch(
    engine: Arc<LawEngine>,
    path: PathBuf,
    every: Duration,
    baseline: Option<SystemTime>,
) {
    let mut last_seen = baseline;
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    info!("Watching law file every {:?}", every);

    loop {
        ticker.tick().await;

        let current = modified_at(&path).await;
        if current.is_none() || current == last_seen {
            continue;
        }
        last_seen = current;

        let reload_engine = Arc::clone(&engine);
        let reload_path = path.clone();
        let outcome =
            tokio::task::spawn_blocking(move || reload_engine.reload_from_path(&reload_path)).await;

        match outcome {
            Ok(Ok(count)) => info!("Law file reloaded ({} laws)", count),
            Ok(Err(e)) => warn!("Law file rejected, keeping previous laws: {}", e),
            Err(e) => warn!("Law reload task failed: {}", e),
        }
    }
}
