//! Periodic remote sync task.
//!
//! # Responsibility
//! - Run one fetch+merge immediately on start, then once per period.
//! - Allow stop and restart of the periodic task.
//! - Publish the latest sync status for status indicators.
//!
//! # Invariants
//! - At most one attempt is outstanding; overlapping attempts are skipped.
//! - Missed ticks are not queued.
//! - `stop` does not abort an in-flight fetch; that tick is the last one.

use crate::model::quote::QuoteRecord;
use crate::storage::KeyValueStore;
use crate::store::quote_store::QuoteStore;
use crate::sync::remote::RemoteSource;
use crate::sync::{SyncError, SyncResult};
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Quote store shared between user-driven mutations and the sync task.
pub type SharedStore<S> = Arc<Mutex<QuoteStore<S>>>;

/// Latest observable state of the sync task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Syncing,
    Synced { added: usize },
    Failed { message: String },
}

/// Result of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Merged { added: usize },
    /// Another attempt was still outstanding.
    Skipped,
    Failed { message: String },
}

struct SyncShared<S: KeyValueStore> {
    store: SharedStore<S>,
    source: Arc<dyn RemoteSource>,
    in_flight: AtomicBool,
    status: watch::Sender<SyncStatus>,
}

struct RunningTask {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Stoppable, restartable, single-flight periodic sync.
pub struct SyncScheduler<S: KeyValueStore + 'static> {
    shared: Arc<SyncShared<S>>,
    task: Mutex<Option<RunningTask>>,
}

impl<S: KeyValueStore + 'static> SyncScheduler<S> {
    pub fn new(store: SharedStore<S>, source: Arc<dyn RemoteSource>) -> Self {
        let (status, _) = watch::channel(SyncStatus::Idle);
        Self {
            shared: Arc::new(SyncShared {
                store,
                source,
                in_flight: AtomicBool::new(false),
                status,
            }),
            task: Mutex::new(None),
        }
    }

    /// Subscribes to status changes.
    pub fn status(&self) -> watch::Receiver<SyncStatus> {
        self.shared.status.subscribe()
    }

    pub fn current_status(&self) -> SyncStatus {
        self.shared.status.borrow().clone()
    }

    /// Runs one attempt now.
    pub async fn sync_now(&self) -> SyncOutcome {
        self.shared.run_once().await
    }

    /// Starts the periodic task on the current tokio runtime.
    ///
    /// Returns `false` when the task is already running.
    pub fn start(&self, period: Duration) -> bool {
        let Ok(mut task) = self.task.lock() else {
            warn!("event=sync_start module=sync status=error reason=lock_poisoned");
            return false;
        };
        if task.as_ref().is_some_and(|running| !running.handle.is_finished()) {
            return false;
        }

        let (stop, mut stop_rx) = oneshot::channel();
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        shared.run_once().await;
                    }
                }
            }
            info!("event=sync_loop module=sync status=stopped");
        });

        info!(
            "event=sync_start module=sync status=ok period_ms={}",
            period.as_millis()
        );
        *task = Some(RunningTask { stop, handle });
        true
    }

    /// Signals the periodic task to exit. Returns `false` when not running.
    pub fn stop(&self) -> bool {
        let running = match self.task.lock() {
            Ok(mut task) => task.take(),
            Err(_) => None,
        };
        match running {
            Some(running) => {
                // The loop may already have exited; a closed channel is fine.
                let _ = running.stop.send(());
                info!("event=sync_stop module=sync status=ok");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().is_ok_and(|task| {
            task.as_ref()
                .is_some_and(|running| !running.handle.is_finished())
        })
    }
}

impl<S: KeyValueStore + 'static> Drop for SyncScheduler<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<S: KeyValueStore> SyncShared<S> {
    async fn run_once(&self) -> SyncOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            info!("event=sync_attempt module=sync status=skipped reason=in_flight");
            return SyncOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.in_flight);

        self.status.send_replace(SyncStatus::Syncing);
        let result = match self.source.fetch_remote().await {
            Ok(records) => self.merge(records),
            Err(err) => Err(err),
        };

        match result {
            Ok(added) => {
                info!("event=sync_attempt module=sync status=ok added={added}");
                self.status.send_replace(SyncStatus::Synced { added });
                SyncOutcome::Merged { added }
            }
            Err(err) => {
                let message = err.to_string();
                warn!("event=sync_attempt module=sync status=error error={message}");
                self.status.send_replace(SyncStatus::Failed {
                    message: message.clone(),
                });
                SyncOutcome::Failed { message }
            }
        }
    }

    fn merge(&self, records: Vec<QuoteRecord>) -> SyncResult<usize> {
        let mut store = self.store.lock().map_err(|_| SyncError::Poisoned)?;
        Ok(store.merge_remote(records)?)
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
