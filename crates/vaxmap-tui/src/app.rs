//! Application state management for vaxmap.
//!
//! This module contains the core `App` struct that manages UI state, the
//! refresh orchestrator, and the channel through which the background
//! progress task reports back to the event loop.

use std::sync::Arc;

use anyhow::Result;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use vaxmap_core::refresh::ProgressStream;
use vaxmap_core::utils::contains_ignore_case;
use vaxmap_core::{
    ApiClient, CenterStore, Config, DisplayedCenters, ProgressState, RefreshError,
    RefreshOptions, RefreshOrchestrator, VaccinationCenter,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the progress channel.
/// The simulator emits every 10ms and the UI drains every 100ms.
const CHANNEL_BUFFER_SIZE: usize = 64;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Maximum length for the search query.
const MAX_SEARCH_LENGTH: usize = 50;

// ============================================================================
// UI State Types
// ============================================================================

/// Top-level screen / overlay state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Splash,
    Normal,
    Searching,
    ShowingHelp,
    ShowingDebug,
    ConfirmingQuit,
    Quitting,
}

/// Current UI focus area (list panel or detail panel)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Detail,
}

pub struct App {
    pub config: Config,
    orchestrator: RefreshOrchestrator<ApiClient>,
    store: Arc<CenterStore>,
    pub displayed: DisplayedCenters,

    pub state: AppState,
    pub focus: Focus,
    pub selection: usize,
    pub search_query: String,

    // Splash progress, fed by the background progress task
    pub splash_progress: f64,
    progress_rx: Option<mpsc::Receiver<ProgressState>>,

    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config) -> Result<Self> {
        let displayed = DisplayedCenters::new();
        let orchestrator = open_orchestrator(&config, displayed.clone())?;
        let store = Arc::clone(orchestrator.store());

        Ok(Self {
            config,
            orchestrator,
            store,
            displayed,

            state: AppState::Splash,
            focus: Focus::List,
            selection: 0,
            search_query: String::new(),

            splash_progress: 0.0,
            progress_rx: None,

            status_message: None,
        })
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Splash-screen entry point: refresh from the API only if the store is
    /// below the freshness threshold.
    pub fn start_splash(&mut self) {
        let count = self.orchestrator.count();
        let options = self.config.refresh_options(count);
        info!(count, skip = options.skip_remote_fetch, "Starting splash");
        self.state = AppState::Splash;
        self.splash_progress = 0.0;
        self.start_refresh(options);
    }

    /// Force a full refresh from the API.
    pub fn recache(&mut self) {
        self.start_refresh(RefreshOptions {
            skip_remote_fetch: false,
            slow_mode: self.config.slow_mode,
        });
    }

    fn start_refresh(&mut self, options: RefreshOptions) {
        match self.orchestrator.refresh(options) {
            Ok(stream) => {
                let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
                tokio::spawn(forward_progress(stream, tx));
                self.progress_rx = Some(rx);
                if !options.skip_remote_fetch {
                    self.status_message = Some("Refreshing centers...".to_string());
                }
            }
            Err(RefreshError::Busy) => {
                self.status_message = Some("Center store currently in use!".to_string());
                // Nothing to wait for if the splash could not start a refresh
                if self.state == AppState::Splash && self.progress_rx.is_none() {
                    self.finish_refresh();
                }
            }
            Err(e) => {
                warn!(error = %e, "Refresh failed to start");
                self.status_message = Some(format!("Refresh failed: {}", e));
                if self.state == AppState::Splash {
                    self.finish_refresh();
                }
            }
        }
    }

    /// Drain progress values sent by the background task.
    pub fn check_background_tasks(&mut self) {
        let mut finished = false;
        if let Some(ref mut rx) = self.progress_rx {
            loop {
                match rx.try_recv() {
                    Ok(state) => {
                        self.splash_progress = state.progress;
                        if state.done {
                            finished = true;
                        }
                    }
                    Err(mpsc::error::TryRecvError::Empty) => break,
                    Err(mpsc::error::TryRecvError::Disconnected) => {
                        finished = true;
                        break;
                    }
                }
            }
        }

        if finished {
            self.progress_rx = None;
            self.finish_refresh();
        }
    }

    fn finish_refresh(&mut self) {
        self.orchestrator.dump();
        self.displayed.begin_collecting(&self.store);
        if self.state == AppState::Splash {
            self.state = AppState::Normal;
        }
        let count = self.orchestrator.count();
        self.status_message = Some(format!("Center cache ready ({} centers)", count));
        info!(count, "Refresh finished");
    }

    pub fn is_refreshing(&self) -> bool {
        self.progress_rx.is_some()
    }

    // =========================================================================
    // Store / debug actions
    // =========================================================================

    pub fn clear_cache(&mut self) {
        self.status_message = Some(match self.orchestrator.clear() {
            Ok(()) => format!("Cleared center cache (store size: {})", self.orchestrator.count()),
            Err(RefreshError::Busy) => "Center store currently in use!".to_string(),
            Err(e) => format!("Failed to clear cache: {}", e),
        });
        self.selection = 0;
    }

    pub fn toggle_slow_mode(&mut self) {
        self.config.slow_mode = !self.config.slow_mode;
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
        self.status_message = Some(format!(
            "Slow network emulation {}",
            if self.config.slow_mode { "on" } else { "off" }
        ));
    }

    pub fn log_count(&mut self) {
        let count = self.orchestrator.count();
        info!(count, "Center store size");
        self.status_message = Some(format!("Store size: {}", count));
    }

    pub fn store_count(&self) -> usize {
        self.orchestrator.count()
    }

    pub fn cache_age(&self) -> String {
        self.store.age_display()
    }

    pub fn is_store_busy(&self) -> bool {
        self.orchestrator.is_busy()
    }

    // =========================================================================
    // List and selection
    // =========================================================================

    fn center_matches_search(center: &VaccinationCenter, query: &str) -> bool {
        contains_ignore_case(&center.center_name, query)
            || contains_ignore_case(&center.facility_name, query)
            || contains_ignore_case(&center.address, query)
    }

    /// Displayed centers filtered by the search query, sorted by name
    pub fn visible_centers(&self) -> Vec<VaccinationCenter> {
        let query = self.search_query.trim();
        let mut centers: Vec<VaccinationCenter> = self
            .displayed
            .snapshot()
            .into_iter()
            .filter(|c| query.is_empty() || Self::center_matches_search(c, query))
            .collect();
        centers.sort_by(|a, b| a.center_name.cmp(&b.center_name).then(a.id.cmp(&b.id)));
        centers
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.visible_centers().len();
        if len == 0 {
            self.selection = 0;
            return;
        }
        let next = self.selection as isize + delta;
        self.selection = next.clamp(0, len as isize - 1) as usize;
    }

    /// Open the detail panel for the highlighted center (the marker tap)
    pub fn open_selected(&mut self) {
        let id = self.visible_centers().get(self.selection).map(|c| c.id);
        if let Some(id) = id {
            if self.displayed.select(id).is_some() {
                self.focus = Focus::Detail;
            }
        }
    }

    pub fn close_detail(&mut self) {
        self.displayed.deselect();
        self.focus = Focus::List;
    }

    pub fn push_search_char(&mut self, c: char) {
        if self.search_query.chars().count() < MAX_SEARCH_LENGTH && !c.is_control() {
            self.search_query.push(c);
            self.selection = 0;
        }
    }

    pub fn pop_search_char(&mut self) {
        self.search_query.pop();
        self.selection = 0;
    }
}

/// Open the on-disk store and wire it to the API client.
pub fn open_orchestrator(
    config: &Config,
    displayed: DisplayedCenters,
) -> Result<RefreshOrchestrator<ApiClient>> {
    let store_path = config.store_path()?;
    debug!(?store_path, "Center store configured");
    let store = Arc::new(CenterStore::open(store_path)?);

    let api_key = Config::api_key().unwrap_or_else(|| {
        warn!("CENTERS_API_KEY is not set, remote requests will be rejected");
        String::new()
    });
    let api = ApiClient::new(config.base_url.clone(), api_key)?;

    Ok(RefreshOrchestrator::new(api, store, displayed)
        .with_paging(config.page_count, config.per_page))
}

/// Forward every progress value to the event loop until the stream ends.
async fn forward_progress(mut stream: ProgressStream, tx: mpsc::Sender<ProgressState>) {
    while let Some(state) = stream.next().await {
        if tx.send(state).await.is_err() {
            debug!("Progress receiver dropped");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaxmap_core::{CenterCategory, Position};

    fn center(id: i64, name: &str, address: &str) -> VaccinationCenter {
        VaccinationCenter {
            id,
            position: Position::new(37.5, 127.0),
            address: address.to_string(),
            center_name: name.to_string(),
            facility_name: "시설".to_string(),
            phone_number: "02-000-0000".to_string(),
            updated_at: "2021-07-16 04:55:08".to_string(),
            category: CenterCategory::Regional,
        }
    }

    #[test]
    fn test_center_matches_search() {
        let c = center(1, "Seoul Vaccination Center", "서울특별시 중구");
        assert!(App::center_matches_search(&c, "seoul"));
        assert!(App::center_matches_search(&c, "중구"));
        assert!(App::center_matches_search(&c, "시설"));
        assert!(!App::center_matches_search(&c, "busan"));
    }
}
