//! The sampling loop.
//!
//! A [`Monitor`] owns one source, one detector, one filter, and one store,
//! and runs the acquire / detect / count / persist cycle on a fixed period.
//! Cycle failures are contained: a bad frame or a failed append costs that
//! sample only, and the loop carries on at the next deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use thiserror::Error;

use crate::detect::{DetectionFilter, Detector};
use crate::ingest::ImageSource;
use crate::store::{CountRecord, CountStore};

/// Granularity of shutdown checks while waiting out a period.
const SLEEP_SLICE: Duration = Duration::from_millis(250);

/// A failed sampling cycle, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("image acquisition failed: {0:#}")]
    Acquisition(anyhow::Error),
    #[error("detection failed: {0:#}")]
    Detection(anyhow::Error),
    #[error("persistence failed: {0:#}")]
    Persistence(anyhow::Error),
}

impl CycleError {
    pub fn stage(&self) -> &'static str {
        match self {
            CycleError::Acquisition(_) => "acquisition",
            CycleError::Detection(_) => "detection",
            CycleError::Persistence(_) => "persistence",
        }
    }
}

/// Fixed-period scheduler with phase-aligned deadlines.
///
/// Deadlines are absolute multiples of the period from construction time.
/// When a cycle overruns, the deadlines that passed in the meantime are
/// forfeited rather than fired late back-to-back, so samples stay on phase
/// and the output never bunches up.
pub struct Ticker {
    period: Duration,
    next_deadline: Instant,
}

impl Ticker {
    /// Create a ticker whose first deadline is one full period from now.
    ///
    /// `period` must be non-zero and bounded (config validation enforces
    /// both), keeping the deadline arithmetic within `Instant` range.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_deadline: Instant::now() + period,
        }
    }

    /// Block until the next deadline, checking `shutdown` along the way.
    ///
    /// Returns `false` once shutdown is requested; `true` means a tick fired.
    pub fn wait(&mut self, shutdown: &AtomicBool) -> bool {
        let (deadline, forfeited) = advance_past(self.next_deadline, self.period, Instant::now());
        if forfeited > 0 {
            log::warn!(
                "sampling cycle overran its period; forfeited {} tick(s)",
                forfeited
            );
        }
        self.next_deadline = deadline;

        loop {
            if shutdown.load(Ordering::SeqCst) {
                return false;
            }
            let now = Instant::now();
            if now >= self.next_deadline {
                break;
            }
            thread::sleep((self.next_deadline - now).min(SLEEP_SLICE));
        }

        self.next_deadline += self.period;
        !shutdown.load(Ordering::SeqCst)
    }
}

/// Advance `deadline` by whole periods until it is no longer in the past.
///
/// Returns the adjusted deadline and the number of deadlines forfeited.
fn advance_past(mut deadline: Instant, period: Duration, now: Instant) -> (Instant, u64) {
    let mut forfeited = 0u64;
    while deadline < now {
        deadline += period;
        forfeited += 1;
    }
    (deadline, forfeited)
}

/// Periodic sampling pipeline.
pub struct Monitor {
    source: Box<dyn ImageSource>,
    detector: Box<dyn Detector>,
    filter: DetectionFilter,
    store: Box<dyn CountStore>,
}

impl Monitor {
    pub fn new(
        source: Box<dyn ImageSource>,
        detector: Box<dyn Detector>,
        filter: DetectionFilter,
        store: Box<dyn CountStore>,
    ) -> Self {
        Self {
            source,
            detector,
            filter,
            store,
        }
    }

    /// Run one acquire / detect / count / persist cycle.
    ///
    /// The record's timestamp is taken after detection completes, so it
    /// reflects when the count was known rather than when the frame was
    /// requested.
    pub fn run_cycle(&mut self) -> Result<CountRecord, CycleError> {
        let frame = self.source.acquire().map_err(CycleError::Acquisition)?;
        log::debug!(
            "acquired {}x{} frame ({} bytes)",
            frame.width(),
            frame.height(),
            frame.byte_len()
        );

        let detections = self.detector.detect(&frame).map_err(CycleError::Detection)?;
        drop(frame);

        let count = self.filter.count(&detections);
        let record = CountRecord::now(count);
        self.store.append(&record).map_err(CycleError::Persistence)?;
        Ok(record)
    }

    /// Run cycles on `period` until `shutdown` is set.
    ///
    /// Store initialization failures are fatal; per-cycle failures are
    /// logged and absorbed. The first cycle runs one full period after this
    /// call, never immediately.
    pub fn run(&mut self, period: Duration, shutdown: &AtomicBool) -> Result<()> {
        self.store.ensure_initialized()?;

        log::info!(
            "sampling {} with {} detector every {:?}",
            self.source.describe(),
            self.detector.name(),
            period
        );
        log::info!("appending counts to {}", self.store.describe());

        let mut ticker = Ticker::new(period);
        loop {
            if !ticker.wait(shutdown) {
                break;
            }
            match self.run_cycle() {
                Ok(record) => {
                    log::info!("recorded {} vehicle(s) at {}", record.count, record.timestamp())
                }
                Err(err) => log::warn!("sampling cycle failed: {}", err),
            }
        }

        log::info!("sampling loop stopped");
        Ok(())
    }
}
