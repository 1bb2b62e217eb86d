//! Debounced snapshot persistence.
//!
//! Mutations queue the current working state here; a worker thread writes
//! it to the store once the graph has been quiet for the debounce window.
//! Rapid bursts coalesce into one write. The write path re-reads the
//! record from the store and appends there, so a concurrent session's
//! snapshots are not clobbered by stale in-memory history.

use ftc_core::id::Uid;
use ftc_core::project::Snapshot;
use ftc_store::ProjectStore;
use log::warn;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(1000);

enum Msg {
    Schedule,
    Flush,
    Shutdown,
}

/// Trailing-edge debouncer on a dedicated thread. Each `schedule` resets
/// the window; `on_fire` runs once the window elapses undisturbed. Pending
/// work is cancelled, not flushed, on drop.
pub struct Debouncer {
    tx: mpsc::Sender<Msg>,
    handle: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(window: Duration, mut on_fire: impl FnMut() + Send + 'static) -> Self {
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::spawn(move || {
            let mut deadline: Option<Instant> = None;
            loop {
                let msg = match deadline {
                    Some(d) => match rx.recv_timeout(d.saturating_duration_since(Instant::now())) {
                        Ok(msg) => msg,
                        Err(RecvTimeoutError::Timeout) => {
                            deadline = None;
                            on_fire();
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    },
                    None => match rx.recv() {
                        Ok(msg) => msg,
                        Err(_) => break,
                    },
                };
                match msg {
                    Msg::Schedule => deadline = Some(Instant::now() + window),
                    Msg::Flush => {
                        deadline = None;
                        on_fire();
                    }
                    Msg::Shutdown => break,
                }
            }
        });
        Self {
            tx,
            handle: Some(handle),
        }
    }

    pub fn schedule(&self) {
        let _ = self.tx.send(Msg::Schedule);
    }

    /// Run the pending work now, skipping the rest of the window.
    pub fn flush(&self) {
        let _ = self.tx.send(Msg::Flush);
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        let _ = self.tx.send(Msg::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

struct PendingSave {
    project_id: Uid,
    snapshot: Snapshot,
}

/// Debounced project autosave. Only the most recently queued state is
/// written; intermediate states from a burst are dropped.
pub struct AutosaveController {
    pending: Arc<Mutex<Option<PendingSave>>>,
    writes: Arc<AtomicU64>,
    debouncer: Debouncer,
}

impl AutosaveController {
    pub fn new(store: Arc<ProjectStore>) -> Self {
        Self::with_window(store, AUTOSAVE_DEBOUNCE)
    }

    pub fn with_window(store: Arc<ProjectStore>, window: Duration) -> Self {
        let pending: Arc<Mutex<Option<PendingSave>>> = Arc::new(Mutex::new(None));
        let writes = Arc::new(AtomicU64::new(0));
        let worker_pending = Arc::clone(&pending);
        let worker_writes = Arc::clone(&writes);
        let debouncer = Debouncer::new(window, move || {
            let taken = worker_pending.lock().ok().and_then(|mut slot| slot.take());
            let Some(save) = taken else {
                return;
            };
            let result = store.update_with(save.project_id.as_str(), |project| {
                project.push_snapshot(save.snapshot);
            });
            match result {
                Ok(_) => {
                    worker_writes.fetch_add(1, Ordering::SeqCst);
                }
                Err(e) => warn!("autosave failed for project {}: {e}", save.project_id),
            }
        });
        Self {
            pending,
            writes,
            debouncer,
        }
    }

    /// Queue the latest working state and reset the debounce window.
    pub fn queue(&self, project_id: Uid, snapshot: Snapshot) {
        if let Ok(mut slot) = self.pending.lock() {
            *slot = Some(PendingSave {
                project_id,
                snapshot,
            });
        }
        self.debouncer.schedule();
    }

    /// Write any pending state immediately and wait for it to land.
    pub fn flush(&self) {
        let before = self.writes.load(Ordering::SeqCst);
        let had_pending = self
            .pending
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        if !had_pending {
            return;
        }
        self.debouncer.flush();
        // The worker owns the write; poll until it lands or clearly failed.
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if self.writes.load(Ordering::SeqCst) > before {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}
