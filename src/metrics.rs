//! In-process engine counters
//!
//! Counters are plain atomics so the tick path and the background reporter can
//! bump them without taking the tracker lock. Nothing is exported over the
//! network; `summary()` renders a single line for the shutdown log.

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Rolling window size for tick timing percentiles
const TICK_HISTORY: usize = 1000;

/// Counters for the engine
#[derive(Debug)]
pub struct EngineMetrics {
    // Tick path
    pub ticks_processed: AtomicU64,
    pub ticks_skipped: AtomicU64,
    pub entities_skipped: AtomicU64,
    pub goals_detected: AtomicU64,
    pub possession_changes: AtomicU64,

    // Reporter
    pub reports_emitted: AtomicU64,
    pub reports_suppressed: AtomicU64,
    pub waiting_reports: AtomicU64,

    // Command path
    pub commands_filtered: AtomicU64,

    start_time: Instant,

    // Rolling tick times (microseconds), percentiles computed on read
    tick_history: RwLock<VecDeque<u64>>,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self {
            ticks_processed: AtomicU64::new(0),
            ticks_skipped: AtomicU64::new(0),
            entities_skipped: AtomicU64::new(0),
            goals_detected: AtomicU64::new(0),
            possession_changes: AtomicU64::new(0),
            reports_emitted: AtomicU64::new(0),
            reports_suppressed: AtomicU64::new(0),
            waiting_reports: AtomicU64::new(0),
            commands_filtered: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(TICK_HISTORY)),
        }
    }

    #[inline]
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record how long one tick took
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;

        let mut history = self.tick_history.write();
        if history.len() == TICK_HISTORY {
            history.pop_front();
        }
        history.push_back(us);
    }

    /// p95 and max over the rolling window, once there are enough samples
    pub fn tick_percentiles(&self) -> Option<(u64, u64)> {
        let mut sorted: Vec<u64> = self.tick_history.read().iter().copied().collect();
        if sorted.len() < 10 {
            return None;
        }
        sorted.sort_unstable();

        let p95_idx = ((sorted.len() as f32 * 0.95) as usize).min(sorted.len() - 1);
        let max = sorted[sorted.len() - 1];
        Some((sorted[p95_idx], max))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// One-line counter summary
    pub fn summary(&self) -> String {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        let (p95, max) = self.tick_percentiles().unwrap_or((0, 0));
        format!(
            "ticks={} skipped={} entity_faults={} goals={} possession_changes={} reports={} suppressed={} waiting={} commands={} tick_p95={}us tick_max={}us",
            load(&self.ticks_processed),
            load(&self.ticks_skipped),
            load(&self.entities_skipped),
            load(&self.goals_detected),
            load(&self.possession_changes),
            load(&self.reports_emitted),
            load(&self.reports_suppressed),
            load(&self.waiting_reports),
            load(&self.commands_filtered),
            p95,
            max,
        )
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = EngineMetrics::new();
        EngineMetrics::incr(&metrics.goals_detected);
        EngineMetrics::incr(&metrics.goals_detected);
        assert_eq!(metrics.goals_detected.load(Ordering::Relaxed), 2);
        assert!(metrics.summary().contains("goals=2"));
    }

    #[test]
    fn test_percentiles_need_samples() {
        let metrics = EngineMetrics::new();
        for _ in 0..5 {
            metrics.record_tick_time(Duration::from_micros(100));
        }
        assert_eq!(metrics.tick_percentiles(), None);
        assert!(metrics.summary().contains("tick_max=0us"));

        for us in 0..20 {
            metrics.record_tick_time(Duration::from_micros(us * 10));
        }
        let (p95, max) = metrics.tick_percentiles().unwrap();
        assert_eq!(max, 190);
        assert!(p95 >= 100);
        assert!(metrics.summary().contains("tick_max=190us"));
    }

    #[test]
    fn test_history_bounded() {
        let metrics = EngineMetrics::new();
        for _ in 0..(TICK_HISTORY + 50) {
            metrics.record_tick_time(Duration::from_micros(1));
        }
        assert_eq!(metrics.tick_history.read().len(), TICK_HISTORY);
    }
}
