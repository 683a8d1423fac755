//! Synthetic splash-screen progress.
//!
//! The simulator animates a value from 0 to 1 over a fixed wall-clock budget
//! regardless of how far the real refresh has come. If the data is not ready
//! by the time the value reaches [`WAIT_THRESHOLD`], it holds there until the
//! readiness flag flips, then finishes the remaining distance over a shorter
//! catch-up budget.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream};
use tokio::time::Instant;
use tracing::info;

// ============================================================================
// Constants
// ============================================================================

/// Interval between two emitted progress values.
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Time the ramp takes to go from 0 to 1 when data is ready early enough.
pub const RAMP_BUDGET: Duration = Duration::from_millis(2000);

/// Time to go from the threshold to 1 once data becomes ready after a wait.
pub const CATCH_UP_BUDGET: Duration = Duration::from_millis(700);

/// Progress value held while waiting for data.
pub const WAIT_THRESHOLD: f64 = 0.8;

/// Shared "background refresh has finished writing" flag.
#[derive(Debug, Clone, Default)]
pub struct ReadinessFlag(Arc<AtomicBool>);

impl ReadinessFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag that is already set.
    pub fn ready() -> Self {
        let flag = Self::new();
        flag.set();
        flag
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// One value of the progress sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressState {
    /// Fraction in `[0, 1]`.
    pub progress: f64,
    pub done: bool,
}

impl ProgressState {
    pub fn complete() -> Self {
        Self {
            progress: 1.0,
            done: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ramping,
    Waiting,
    CatchUp,
    Finished,
    Exhausted,
}

/// Finite, non-restartable progress sequence.
///
/// Each call to [`ProgressSimulator::tick`] sleeps for one tick and yields
/// the current value, except the terminal `(1.0, true)` which is yielded
/// immediately after the value reaches 1. After that `tick` returns `None`.
pub struct ProgressSimulator {
    ready: ReadinessFlag,
    phase: Phase,
    progress: f64,
    budget: Duration,
    started: Instant,
    reference: Instant,
}

impl ProgressSimulator {
    pub fn new(ready: ReadinessFlag) -> Self {
        let now = Instant::now();
        Self {
            ready,
            phase: Phase::Ramping,
            progress: 0.0,
            budget: RAMP_BUDGET,
            started: now,
            reference: now,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub async fn tick(&mut self) -> Option<ProgressState> {
        match self.phase {
            Phase::Exhausted => return None,
            Phase::Finished => {
                self.phase = Phase::Exhausted;
                info!(
                    elapsed_ms = self.started.elapsed().as_millis() as u64,
                    "Progress complete"
                );
                return Some(ProgressState::complete());
            }
            _ => {}
        }

        tokio::time::sleep(TICK_INTERVAL).await;
        let state = ProgressState {
            progress: self.progress,
            done: false,
        };
        self.advance();
        Some(state)
    }

    fn advance(&mut self) {
        let ready = self.ready.is_set();

        if self.phase == Phase::Waiting {
            if !ready {
                return;
            }
            info!(
                waited_ms = self.reference.elapsed().as_millis() as u64,
                "Data ready, catching up"
            );
            self.phase = Phase::CatchUp;
            self.reference = Instant::now();
            self.budget = CATCH_UP_BUDGET;
        }

        // Spread the remaining distance over the ticks left in the budget,
        // so scheduler jitter in earlier ticks is absorbed here.
        let remaining = self.budget.saturating_sub(self.reference.elapsed());
        let ticks_left = (remaining.as_millis() / TICK_INTERVAL.as_millis()).max(1);
        let next = (self.progress + (1.0 - self.progress) / ticks_left as f64).min(1.0);

        if !ready && next >= WAIT_THRESHOLD {
            info!(
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                "Data not ready, waiting"
            );
            self.progress = WAIT_THRESHOLD;
            self.phase = Phase::Waiting;
            self.reference = Instant::now();
            return;
        }

        self.progress = next;
        if self.progress >= 1.0 {
            self.phase = Phase::Finished;
        }
    }

    /// Turn the simulator into a lazily polled stream.
    pub fn into_stream(self) -> impl Stream<Item = ProgressState> + Send {
        stream::unfold(self, |mut sim| async move {
            let state = sim.tick().await?;
            Some((state, sim))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn assert_well_formed(states: &[ProgressState]) {
        let (last, body) = states.split_last().expect("non-empty sequence");
        assert_eq!(*last, ProgressState::complete());
        assert!(body.iter().all(|s| !s.done));
        for pair in body.windows(2) {
            assert!(
                pair[1].progress >= pair[0].progress,
                "progress went backwards: {} -> {}",
                pair[0].progress,
                pair[1].progress
            );
            if pair[1].progress == pair[0].progress {
                assert_eq!(pair[0].progress, WAIT_THRESHOLD);
            }
        }
        assert!(body.iter().all(|s| (0.0..=1.0).contains(&s.progress)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_from_start_skips_waiting() {
        let started = Instant::now();
        let states: Vec<_> = ProgressSimulator::new(ReadinessFlag::ready())
            .into_stream()
            .collect()
            .await;

        assert_well_formed(&states);
        assert_eq!(states[0].progress, 0.0);
        // No plateau when the data was never late
        assert!(states.windows(2).all(|w| w[1].progress > w[0].progress));

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1900), "{:?}", elapsed);
        assert!(elapsed <= Duration::from_millis(2100), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_at_threshold_then_catches_up() {
        let ready = ReadinessFlag::new();
        let setter = ready.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            setter.set();
        });

        let started = Instant::now();
        let states: Vec<_> = ProgressSimulator::new(ready).into_stream().collect().await;
        let elapsed = started.elapsed();

        assert_well_formed(&states);

        let held = states.iter().filter(|s| s.progress == WAIT_THRESHOLD).count();
        assert!(held > 100, "expected a long plateau, held {} ticks", held);

        let last_held = states
            .iter()
            .rposition(|s| s.progress == WAIT_THRESHOLD)
            .unwrap();
        let catch_up_ticks = states.len() - 1 - last_held;
        assert!(
            (60..=75).contains(&catch_up_ticks),
            "catch-up took {} ticks",
            catch_up_ticks
        );

        assert!(elapsed >= Duration::from_millis(5600), "{:?}", elapsed);
        assert!(elapsed <= Duration::from_millis(5800), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_before_threshold_uses_full_ramp() {
        let ready = ReadinessFlag::new();
        let setter = ready.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            setter.set();
        });

        let mut sim = ProgressSimulator::new(ready);
        let mut states = Vec::new();
        while let Some(state) = sim.tick().await {
            assert_ne!(sim.phase(), Phase::Waiting);
            assert_ne!(sim.phase(), Phase::CatchUp);
            states.push(state);
        }

        assert_well_formed(&states);
        assert!(states.iter().all(|s| s.progress != WAIT_THRESHOLD));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequence_is_not_restartable() {
        let mut sim = ProgressSimulator::new(ReadinessFlag::ready());
        let mut done_count = 0;
        while let Some(state) = sim.tick().await {
            if state.done {
                done_count += 1;
            }
        }
        assert_eq!(done_count, 1);
        assert_eq!(sim.phase(), Phase::Exhausted);
        assert!(sim.tick().await.is_none());
    }

    #[test]
    fn test_readiness_flag_is_shared() {
        let flag = ReadinessFlag::new();
        let other = flag.clone();
        assert!(!other.is_set());
        flag.set();
        assert!(other.is_set());
        assert!(ReadinessFlag::ready().is_set());
    }
}
