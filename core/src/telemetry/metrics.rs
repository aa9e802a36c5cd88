use std::sync::Mutex;

/// Point-in-time copy of the scan counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanCounters {
    pub scans_launched: usize,
    pub aggregations: usize,
    pub cache_hits: usize,
    pub scanner_failures: usize,
    pub scanner_timeouts: usize,
}

pub struct MetricsRecorder {
    inner: Mutex<ScanCounters>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ScanCounters::default()),
        }
    }

    pub fn record_launch(&self) {
        self.update(|c| c.scans_launched += 1);
    }

    pub fn record_aggregation(&self) {
        self.update(|c| c.aggregations += 1);
    }

    pub fn record_cache_hit(&self) {
        self.update(|c| c.cache_hits += 1);
    }

    pub fn record_failure(&self) {
        self.update(|c| c.scanner_failures += 1);
    }

    pub fn record_timeouts(&self, count: usize) {
        self.update(|c| c.scanner_timeouts += count);
    }

    pub fn snapshot(&self) -> ScanCounters {
        if let Ok(counters) = self.inner.lock() {
            *counters
        } else {
            ScanCounters::default()
        }
    }

    fn update(&self, apply: impl FnOnce(&mut ScanCounters)) {
        if let Ok(mut counters) = self.inner.lock() {
            apply(&mut counters);
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
