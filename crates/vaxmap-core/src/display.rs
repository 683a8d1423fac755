//! In-memory list of centers shown to the user.
//!
//! The list is a snapshot of the store, kept current by a single collector
//! task subscribed to the store's change feed. Starting a new collector
//! aborts the previous one first, so at most one subscription is active.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::CenterStore;
use crate::models::VaccinationCenter;

/// Single slot for the collector task. Dropping the slot aborts the task.
#[derive(Default)]
struct CollectorSlot(Mutex<Option<JoinHandle<()>>>);

impl CollectorSlot {
    fn lock(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for CollectorSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.lock().take() {
            handle.abort();
        }
    }
}

/// Handle to the displayed center list. Clones share the same list.
#[derive(Clone, Default)]
pub struct DisplayedCenters {
    centers: Arc<RwLock<Vec<VaccinationCenter>>>,
    selected: Arc<RwLock<Option<VaccinationCenter>>>,
    collector: Arc<CollectorSlot>,
}

impl DisplayedCenters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active store subscription with a fresh one.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn begin_collecting(&self, store: &CenterStore) {
        let mut feed = store.get_all();
        let centers = Arc::clone(&self.centers);

        let mut slot = self.collector.lock();
        if let Some(previous) = slot.take() {
            previous.abort();
            debug!("Previous center collector cancelled");
        }

        *slot = Some(tokio::spawn(async move {
            loop {
                let snapshot = feed.borrow_and_update().clone();
                *centers.write().unwrap_or_else(PoisonError::into_inner) = snapshot.as_ref().clone();
                if feed.changed().await.is_err() {
                    debug!("Center store closed, collector stopping");
                    break;
                }
            }
        }));
    }

    /// Whether a collector is installed and still running.
    pub fn is_collecting(&self) -> bool {
        self.collector
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the active subscription, if any.
    pub fn stop_collecting(&self) {
        if let Some(handle) = self.collector.lock().take() {
            handle.abort();
        }
    }

    pub fn snapshot(&self) -> Vec<VaccinationCenter> {
        self.centers.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.centers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.centers.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Mark the center with `id` as selected (a marker tap). Returns the
    /// selected center, or `None` when no displayed center has that id.
    pub fn select(&self, id: i64) -> Option<VaccinationCenter> {
        let found = self
            .centers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|c| c.id == id)
            .cloned();
        if found.is_some() {
            *self.selected.write().unwrap_or_else(PoisonError::into_inner) = found.clone();
        }
        found
    }

    pub fn selected(&self) -> Option<VaccinationCenter> {
        self.selected.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn deselect(&self) {
        *self.selected.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
