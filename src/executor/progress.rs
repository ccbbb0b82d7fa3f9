//! Live run counters shared by all virtual users

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Lock-free counters updated by every VU while the run is in progress
#[derive(Debug)]
pub struct RunProgress {
    started: Instant,
    active_vus: AtomicU32,
    peak_vus: AtomicU32,
    requests: AtomicU64,
    failures: AtomicU64,
    iterations: AtomicU64,
}

/// Point-in-time copy of the progress counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub elapsed: Duration,
    pub active_vus: u32,
    pub peak_vus: u32,
    pub requests: u64,
    pub failures: u64,
    pub iterations: u64,
}

impl RunProgress {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            active_vus: AtomicU32::new(0),
            peak_vus: AtomicU32::new(0),
            requests: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            iterations: AtomicU64::new(0),
        }
    }

    pub fn vu_started(&self) {
        let active = self.active_vus.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_vus.fetch_max(active, Ordering::SeqCst);
    }

    pub fn vu_finished(&self) {
        self.active_vus.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn record_request(&self, success: bool) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_iteration(&self) {
        self.iterations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn active_vus(&self) -> u32 {
        self.active_vus.load(Ordering::SeqCst)
    }

    pub fn peak_vus(&self) -> u32 {
        self.peak_vus.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            elapsed: self.started.elapsed(),
            active_vus: self.active_vus(),
            peak_vus: self.peak_vus(),
            requests: self.requests.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            iterations: self.iterations.load(Ordering::Relaxed),
        }
    }
}

impl Default for RunProgress {
    fn default() -> Self {
        Self::new()
    }
}
