//! Call timing and per-operation counters.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Calls slower than this are logged at `warn`.
pub const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Default)]
struct Counters {
    calls: u64,
    errors: u64,
    total: Duration,
}

/// Per-operation summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationStats {
    pub calls: u64,
    pub total_ms: f64,
    pub avg_ms: f64,
    pub errors: u64,
    /// Percentage of failed calls, two decimals.
    pub error_rate: f64,
}

/// Registry of call timings, shared by whoever wraps operations with it.
pub struct PerfStats {
    slow_threshold: Duration,
    counters: Mutex<BTreeMap<String, Counters>>,
}

impl Default for PerfStats {
    fn default() -> Self {
        Self::new(DEFAULT_SLOW_THRESHOLD)
    }
}

impl PerfStats {
    pub fn new(slow_threshold: Duration) -> Self {
        Self {
            slow_threshold,
            counters: Mutex::new(BTreeMap::new()),
        }
    }

    /// Run `op`, log its duration and record it under `name`.
    pub fn track<T, E, F>(&self, name: &str, op: F) -> Result<T, E>
    where
        E: Display,
        F: FnOnce() -> Result<T, E>,
    {
        let started = Instant::now();
        let result = op();
        let elapsed = started.elapsed();

        match &result {
            Ok(_) if elapsed > self.slow_threshold => {
                tracing::warn!(operation = name, elapsed_ms = millis(elapsed), "Slow operation");
            }
            Ok(_) => {
                tracing::debug!(operation = name, elapsed_ms = millis(elapsed), "Operation finished");
            }
            Err(e) => {
                tracing::error!(operation = name, elapsed_ms = millis(elapsed), error = %e, "Operation failed");
            }
        }

        self.record(name, elapsed, result.is_err());
        result
    }

    pub fn record(&self, name: &str, elapsed: Duration, failed: bool) {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = counters.entry(name.to_string()).or_default();
        entry.calls += 1;
        entry.total += elapsed;
        if failed {
            entry.errors += 1;
        }
    }

    pub fn snapshot(&self) -> BTreeMap<String, OperationStats> {
        let counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        counters
            .iter()
            .map(|(name, c)| {
                let total_ms = millis(c.total);
                let stats = OperationStats {
                    calls: c.calls,
                    total_ms: round2(total_ms),
                    avg_ms: round2(total_ms / c.calls as f64),
                    errors: c.errors,
                    error_rate: round2(c.errors as f64 / c.calls as f64 * 100.0),
                };
                (name.clone(), stats)
            })
            .collect()
    }

    pub fn reset(&self) {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_counts_calls_and_errors() {
        let perf = PerfStats::default();
        let ok: Result<u8, String> = perf.track("load", || Ok(1));
        let failed: Result<u8, String> = perf.track("load", || Err("nope".to_string()));
        assert_eq!(ok, Ok(1));
        assert!(failed.is_err());

        let snapshot = perf.snapshot();
        let load = &snapshot["load"];
        assert_eq!(load.calls, 2);
        assert_eq!(load.errors, 1);
        assert_eq!(load.error_rate, 50.0);
    }

    #[test]
    fn record_accumulates_time() {
        let perf = PerfStats::default();
        perf.record("q", Duration::from_millis(10), false);
        perf.record("q", Duration::from_millis(30), false);

        let q = &perf.snapshot()["q"];
        assert_eq!(q.total_ms, 40.0);
        assert_eq!(q.avg_ms, 20.0);
    }

    #[test]
    fn reset_clears_everything() {
        let perf = PerfStats::default();
        perf.record("q", Duration::from_millis(1), false);
        perf.reset();
        assert!(perf.snapshot().is_empty());
    }
}
