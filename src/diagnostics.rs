/*
 * Diagnostics Module
 *
 * The correlation histogram is expensive (all pairs, every image) so it is
 * built on rayon's thread pool while the simulation keeps ticking. There is a
 * single slot: a request made while a job is still running is dropped rather
 * than queued. Finished histograms are published behind a mutex for the
 * display layer to poll.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use crate::stats::CorrelationHistogram;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Started,
    // A previous job still holds the slot
    Skipped,
}

pub struct CorrelationMonitor {
    busy: Arc<AtomicBool>,
    latest: Arc<Mutex<Option<CorrelationHistogram>>>,
}

// Releases the slot when the job finishes, even if it panicked
struct SlotGuard(Arc<AtomicBool>);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for CorrelationMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrelationMonitor {
    pub fn new() -> Self {
        Self {
            busy: Arc::new(AtomicBool::new(false)),
            latest: Arc::new(Mutex::new(None)),
        }
    }

    pub fn request<F>(&self, job: F) -> RequestOutcome
    where
        F: FnOnce() -> CorrelationHistogram + Send + 'static,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!("correlation job still running, skipping request");
            return RequestOutcome::Skipped;
        }

        let guard = SlotGuard(Arc::clone(&self.busy));
        let latest = Arc::clone(&self.latest);
        rayon::spawn(move || {
            let _guard = guard;
            let histogram = job();
            *latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(histogram);
        });
        RequestOutcome::Started
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    // Most recently published histogram, if any job has finished yet
    pub fn latest(&self) -> Option<CorrelationHistogram> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    // Block until the slot is free, for headless runs and tests
    pub fn wait_until_idle(&self) {
        while self.is_busy() {
            std::thread::yield_now();
        }
    }
}
