//! Cache refresh orchestration.
//!
//! A refresh clears the store, fetches a fixed number of pages from the
//! center API in spawned tasks, and inserts every record as its page
//! arrives. The caller receives a [`ProgressStream`] that drives the splash
//! screen while the fetch runs in the background.

use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::{BoxStream, Stream, StreamExt};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::api::CenterSource;
use crate::cache::{CenterSnapshot, CenterStore};
use crate::display::DisplayedCenters;
use crate::models::VaccinationCenter;

use super::progress::{ProgressSimulator, ProgressState, ReadinessFlag};

// ============================================================================
// Constants
// ============================================================================

/// Number of pages requested per refresh.
pub const DEFAULT_PAGE_COUNT: u32 = 10;

/// Records requested per page.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Delay inserted after dispatching each page request in slow mode.
pub const SLOW_MODE_DELAY: Duration = Duration::from_millis(500);

#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Center store is busy - a refresh is already running")]
    Busy,

    #[error("Center store error: {0}")]
    Store(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshOptions {
    /// Trust the current store contents and make no network calls.
    pub skip_remote_fetch: bool,
    /// Wait [`SLOW_MODE_DELAY`] after dispatching each page, for manual testing.
    pub slow_mode: bool,
}

/// Holds the busy flag for as long as any clone is alive.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
        debug!("Center store released");
    }
}

/// Progress values for one refresh.
///
/// The busy flag is released once the terminal value has been yielded and
/// the background fetch has finished, or when the stream is dropped and the
/// fetch has finished.
pub struct ProgressStream {
    inner: BoxStream<'static, ProgressState>,
    guard: Option<Arc<BusyGuard>>,
}

impl Stream for ProgressStream {
    type Item = ProgressState;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let polled = self.inner.poll_next_unpin(cx);
        if let Poll::Ready(Some(state)) = &polled {
            if state.done {
                self.guard = None;
            }
        }
        polled
    }
}

/// Keeps the local store in step with the remote center API.
pub struct RefreshOrchestrator<S: CenterSource> {
    source: S,
    store: Arc<CenterStore>,
    displayed: DisplayedCenters,
    busy: Arc<AtomicBool>,
    page_count: u32,
    per_page: u32,
}

impl<S: CenterSource> RefreshOrchestrator<S> {
    pub fn new(source: S, store: Arc<CenterStore>, displayed: DisplayedCenters) -> Self {
        Self {
            source,
            store,
            displayed,
            busy: Arc::new(AtomicBool::new(false)),
            page_count: DEFAULT_PAGE_COUNT,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Override the number of pages and page size.
    pub fn with_paging(mut self, page_count: u32, per_page: u32) -> Self {
        self.page_count = page_count;
        self.per_page = per_page;
        self
    }

    pub fn store(&self) -> &Arc<CenterStore> {
        &self.store
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<Arc<BusyGuard>, RefreshError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RefreshError::Busy)?;
        Ok(Arc::new(BusyGuard(Arc::clone(&self.busy))))
    }

    /// Start a refresh and return its progress stream.
    ///
    /// Fails with [`RefreshError::Busy`] without touching the store when a
    /// refresh or clear is already running. Must be called inside a Tokio
    /// runtime.
    pub fn refresh(&self, options: RefreshOptions) -> Result<ProgressStream, RefreshError> {
        let guard = self.acquire()?;
        let ready = ReadinessFlag::new();

        if options.skip_remote_fetch {
            debug!("Skipping remote fetch, store already warm");
            ready.set();
        } else {
            info!(pages = self.page_count, slow_mode = options.slow_mode, "Starting center refresh");
            self.store.delete_all()?;
            self.displayed.clear();

            let job = FetchJob {
                source: self.source.clone(),
                store: Arc::clone(&self.store),
                page_count: self.page_count,
                per_page: self.per_page,
                slow_mode: options.slow_mode,
            };
            let ready = ready.clone();
            let guard = Arc::clone(&guard);
            tokio::spawn(async move {
                job.run().await;
                // The stream still holds its own guard until it yields `done`
                drop(guard);
                ready.set();
            });
        }

        Ok(ProgressStream {
            inner: ProgressSimulator::new(ready).into_stream().boxed(),
            guard: Some(guard),
        })
    }

    /// Delete every stored center. Fails while a refresh is running.
    pub fn clear(&self) -> Result<(), RefreshError> {
        let _guard = self.acquire()?;
        self.store.delete_all()?;
        info!("Center store cleared");
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    /// Log every stored row and return them.
    pub fn dump(&self) -> CenterSnapshot {
        let snapshot = self.store.snapshot();
        debug!(count = snapshot.len(), "-------- center store dump --------");
        for center in snapshot.iter() {
            debug!(
                id = center.id,
                name = %center.center_name,
                pos = %center.position.encode(),
                category = %center.category.label(),
                "stored center"
            );
        }
        debug!("-------- center store dump end --------");
        snapshot
    }
}

/// Everything a spawned refresh needs, detached from the orchestrator.
struct FetchJob<S: CenterSource> {
    source: S,
    store: Arc<CenterStore>,
    page_count: u32,
    per_page: u32,
    slow_mode: bool,
}

impl<S: CenterSource> FetchJob<S> {
    async fn run(self) {
        let started = Instant::now();
        let mut pages = JoinSet::new();

        for page in 1..=self.page_count {
            let source = self.source.clone();
            let store = Arc::clone(&self.store);
            let per_page = self.per_page;
            pages.spawn(async move { fetch_and_store(source, store, page, per_page).await });

            if self.slow_mode {
                tokio::time::sleep(SLOW_MODE_DELAY).await;
            }
        }

        let mut inserted = 0;
        while let Some(joined) = pages.join_next().await {
            match joined {
                Ok(count) => inserted += count,
                Err(e) => error!(error = %e, "Page task panicked"),
            }
        }

        info!(
            inserted,
            total = self.store.count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Center refresh complete"
        );
    }
}

/// Fetch one page and insert its records in arrival order.
/// Returns the number of centers inserted. Failures are logged, never raised.
async fn fetch_and_store<S: CenterSource>(
    source: S,
    store: Arc<CenterStore>,
    page: u32,
    per_page: u32,
) -> usize {
    let response = match source.fetch_page(page, per_page).await {
        Ok(response) => response,
        Err(e) => {
            warn!(page, error = %e, "Center page fetch failed");
            return 0;
        }
    };

    debug!(page, records = response.data.len(), "Storing center page");
    let mut inserted = 0;
    for record in response.data {
        let id = record.id;
        let center = match VaccinationCenter::try_from(record) {
            Ok(center) => center,
            Err(e) => {
                warn!(page, id, error = %e, "Skipping center with malformed coordinates");
                continue;
            }
        };
        match store.insert(std::slice::from_ref(&center)) {
            Ok(()) => inserted += 1,
            Err(e) => error!(page, id, error = %e, "Failed to store center"),
        }
    }
    inserted
}
