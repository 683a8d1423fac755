//! Cache refresh and splash-screen progress.
//!
//! - `RefreshOrchestrator`: clears the store, fetches every page in the
//!   background and guards against overlapping refreshes
//! - `ProgressSimulator`: the synthetic progress sequence handed back to the
//!   caller, holding at 80% until the background fetch reports ready

pub mod orchestrator;
pub mod progress;

pub use orchestrator::{ProgressStream, RefreshError, RefreshOptions, RefreshOrchestrator};
pub use progress::{Phase, ProgressSimulator, ProgressState, ReadinessFlag};
