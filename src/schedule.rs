//! Fixed-interval repetition of organization passes.
//!
//! The stop flag is only looked at between passes: a pass that has started
//! always runs to completion.

use crate::organizer::{OrganizeResult, Organizer, PassReport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Longest single sleep while waiting for the next pass.
const TICK: Duration = Duration::from_millis(250);

/// Runs an organizer every `interval` until asked to stop.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Convenience constructor for a whole number of minutes.
    pub fn every_minutes(minutes: u64) -> Self {
        Self::new(Duration::from_secs(minutes.saturating_mul(60)))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs passes until `stop` is set, handing the organizer and each result to `on_pass`.
    ///
    /// A pass that fails or stops early is logged and the loop carries on
    /// with the next one. Returns the number of passes run.
    pub fn run<F>(&self, organizer: &mut Organizer, stop: &AtomicBool, mut on_pass: F) -> usize
    where
        F: FnMut(&Organizer, &OrganizeResult<PassReport>),
    {
        info!(
            interval_secs = self.interval.as_secs(),
            "Scheduled organization started"
        );

        let mut passes = 0;
        while !stop.load(Ordering::Relaxed) {
            let result = organizer.organize();
            passes += 1;
            match &result {
                Err(e) => error!(error = %e, "Scheduled pass failed"),
                Ok(report) => {
                    if let Some(e) = &report.aborted {
                        error!(error = %e, "Scheduled pass stopped early");
                    }
                }
            }
            on_pass(&*organizer, &result);

            if !self.wait(stop) {
                break;
            }
        }

        info!(passes, "Scheduled organization stopped");
        passes
    }

    /// Sleeps for one interval. Returns false if `stop` was set meanwhile.
    fn wait(&self, stop: &AtomicBool) -> bool {
        let deadline = Instant::now() + self.interval;
        loop {
            if stop.load(Ordering::Relaxed) {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(TICK.min(deadline - now));
        }
    }
}
