//! Lazily-loaded shared reference data.
//!
//! The store starts `Uninitialized` with a queue of callers waiting for the
//! data. Loading happens once on the blocking pool; publishing drains the
//! queue and every waiting callback receives the same `Arc`. Callbacks
//! always run after the state lock is released.

use std::mem;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::domain::InvalidTransition;

use super::data::ReferenceData;
use super::error::{GtfsError, StoreError};
use super::loader::load_reference_data;

/// A caller waiting for the reference data.
type Callback = Box<dyn FnOnce(Arc<ReferenceData>) + Send>;

enum StoreState {
    Uninitialized { pending: Vec<Callback> },
    Loaded { data: Arc<ReferenceData> },
    Failed { reason: String },
}

impl StoreState {
    fn name(&self) -> &'static str {
        match self {
            StoreState::Uninitialized { .. } => "Uninitialized",
            StoreState::Loaded { .. } => "Loaded",
            StoreState::Failed { .. } => "Failed",
        }
    }
}

struct Shared {
    state: Mutex<StoreState>,
    loader: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to the shared reference data. Cheap to clone.
#[derive(Clone)]
pub struct ReferenceStore {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ReferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceStore")
            .field("state", &self.lock_state().name())
            .finish()
    }
}

impl ReferenceStore {
    fn with_state(state: StoreState) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                loader: Mutex::new(None),
            }),
        }
    }

    /// A store that is already loaded with `data`.
    pub fn loaded(data: Arc<ReferenceData>) -> Self {
        Self::with_state(StoreState::Loaded { data })
    }

    /// Start loading the GTFS directory at `dir` in the background.
    ///
    /// Must be called from within a Tokio runtime. `on_error` runs once if
    /// the load fails.
    pub fn spawn(
        dir: impl Into<PathBuf>,
        on_error: impl FnOnce(&GtfsError) + Send + 'static,
    ) -> Self {
        let dir = dir.into();
        Self::spawn_with(move || load_reference_data(&dir), on_error)
    }

    /// Start loading with a custom load function.
    pub fn spawn_with<F>(load: F, on_error: impl FnOnce(&GtfsError) + Send + 'static) -> Self
    where
        F: FnOnce() -> Result<ReferenceData, GtfsError> + Send + 'static,
    {
        let store = Self::with_state(StoreState::Uninitialized {
            pending: Vec::new(),
        });
        let task_store = store.clone();

        let handle = tokio::spawn(async move {
            match tokio::task::spawn_blocking(load).await {
                Ok(Ok(data)) => {
                    if let Err(e) = task_store.publish(Arc::new(data)) {
                        error!(error = %e, "reference data published twice");
                        panic!("{e}");
                    }
                }
                Ok(Err(e)) => {
                    error!(error = %e, "failed to load reference data");
                    task_store.fail(e.to_string());
                    on_error(&e);
                }
                Err(e) => {
                    error!(error = %e, "reference data loader did not finish");
                    task_store.fail(e.to_string());
                }
            }
        });

        *lock(&store.shared.loader) = Some(handle);
        store
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        lock(&self.shared.state)
    }

    /// Ask for the data.
    ///
    /// If the data is loaded the callback runs immediately on the calling
    /// thread; otherwise it runs on the loader task once the data is
    /// published. If the store has failed the callback is dropped unrun.
    pub fn request(&self, callback: impl FnOnce(Arc<ReferenceData>) + Send + 'static) {
        let data = {
            let mut state = self.lock_state();
            match &mut *state {
                StoreState::Uninitialized { pending } => {
                    pending.push(Box::new(callback));
                    return;
                }
                StoreState::Loaded { data } => data.clone(),
                StoreState::Failed { reason } => {
                    debug!(%reason, "dropping reference data request");
                    return;
                }
            }
        };
        callback(data);
    }

    /// Wait for the data.
    ///
    /// The request is queued when this is called, not when the future is
    /// first polled, so it keeps its place behind earlier requests.
    pub fn get(
        &self,
    ) -> impl Future<Output = Result<Arc<ReferenceData>, StoreError>> + Send + use<> {
        let (tx, rx) = oneshot::channel();
        self.request(move |data| {
            let _ = tx.send(data);
        });

        let store = self.clone();
        async move {
            match rx.await {
                Ok(data) => Ok(data),
                Err(_) => Err(store.unavailable()),
            }
        }
    }

    fn unavailable(&self) -> StoreError {
        let reason = match &*self.lock_state() {
            StoreState::Failed { reason } => reason.clone(),
            other => format!("request dropped while {}", other.name()),
        };
        StoreError::Unavailable { reason }
    }

    /// Publish loaded data and run every queued callback.
    ///
    /// Publishing into a failed store discards the data. Publishing twice is
    /// an error.
    pub fn publish(&self, data: Arc<ReferenceData>) -> Result<(), InvalidTransition> {
        let mut state = self.lock_state();
        let pending = match &mut *state {
            StoreState::Uninitialized { pending } => mem::take(pending),
            StoreState::Loaded { .. } => {
                return Err(InvalidTransition {
                    state: "Loaded",
                    event: "Publish",
                });
            }
            StoreState::Failed { reason } => {
                debug!(%reason, "discarding reference data published after failure");
                return Ok(());
            }
        };
        *state = StoreState::Loaded { data: data.clone() };
        drop(state);

        info!(waiting = pending.len(), "reference data published");
        for callback in pending {
            callback(data.clone());
        }
        Ok(())
    }

    /// Mark the store as permanently unavailable.
    ///
    /// Queued callbacks are dropped unrun. Has no effect once loaded or
    /// already failed.
    pub fn fail(&self, reason: impl Into<String>) {
        let mut state = self.lock_state();
        if matches!(*state, StoreState::Uninitialized { .. }) {
            let previous = mem::replace(
                &mut *state,
                StoreState::Failed {
                    reason: reason.into(),
                },
            );
            drop(state);
            // Waiters observe the failure when their senders drop here.
            drop(previous);
        }
    }

    /// Abort an in-flight load. Published data is unaffected.
    pub fn cancel(&self) {
        if let Some(handle) = lock(&self.shared.loader).take() {
            handle.abort();
        }
        self.fail("cancelled");
    }

    pub fn is_loaded(&self) -> bool {
        matches!(&*self.lock_state(), StoreState::Loaded { .. })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
