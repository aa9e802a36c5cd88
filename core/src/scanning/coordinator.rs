use crate::clock::{Clock, SystemClock};
use crate::prelude::{ScanConfig, ScanError, ScanResult};
use crate::scanning::scanner::{ScanContext, Scanner};
use crate::signal::SignalRecord;
use crate::telemetry::{LogManager, MetricsRecorder, ScanCounters};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Scanning,
}

struct CoordinatorState {
    phase: ScanPhase,
    cached: Vec<SignalRecord>,
    last_scan_at: Option<Instant>,
}

struct ScannerReport {
    scanner: String,
    result: ScanResult<Vec<SignalRecord>>,
}

/// Runs every registered scanner concurrently under one rate limit and one
/// scan window, and serves copies of the last aggregate without ever making
/// the caller wait on I/O.
pub struct ScanCoordinator {
    scanners: RwLock<Vec<Arc<dyn Scanner>>>,
    config: Arc<ScanConfig>,
    state: RwLock<CoordinatorState>,
    clock: Arc<dyn Clock>,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl ScanCoordinator {
    pub fn new(config: Arc<ScanConfig>) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Arc<ScanConfig>, clock: Arc<dyn Clock>) -> Self {
        Self {
            scanners: RwLock::new(Vec::new()),
            config,
            state: RwLock::new(CoordinatorState {
                phase: ScanPhase::Idle,
                cached: Vec::new(),
                last_scan_at: None,
            }),
            clock,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("coordinator"),
        }
    }

    /// Adds a scanner if its availability check passes. A scanner rejected
    /// here is never asked again.
    pub fn register(&self, scanner: Arc<dyn Scanner>) -> ScanResult<()> {
        if !scanner.is_available() {
            self.logger
                .warn(&format!("{} unavailable, excluding it", scanner.name()));
            return Err(ScanError::ScannerUnavailable(scanner.name().to_string()));
        }
        self.logger.record(&format!("registered {}", scanner.name()));
        self.scanners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(scanner);
        Ok(())
    }

    pub fn scanner_names(&self) -> Vec<String> {
        self.registered()
            .iter()
            .map(|scanner| scanner.name().to_string())
            .collect()
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn shared_config(&self) -> Arc<ScanConfig> {
        Arc::clone(&self.config)
    }

    pub fn phase(&self) -> ScanPhase {
        self.read_state().phase
    }

    pub fn metrics(&self) -> ScanCounters {
        self.metrics.snapshot()
    }

    /// Copy of the last aggregate, with no side effects.
    pub fn cached(&self) -> Vec<SignalRecord> {
        self.read_state().cached.clone()
    }

    /// Non-blocking scan. Returns a copy of the cache immediately; when the
    /// rate limit allows and no cycle is outstanding, a background
    /// aggregation is launched first.
    pub fn scan(self: &Arc<Self>, ctx: &ScanContext) -> Vec<SignalRecord> {
        let now = self.clock.now();
        {
            let state = self.read_state();
            if self.within_interval(&state, now) {
                self.metrics.record_cache_hit();
                self.logger.detail("rate limited, serving cache");
                return state.cached.clone();
            }
        }

        let mut state = self.write_state();
        if state.phase == ScanPhase::Idle && !self.within_interval(&state, now) {
            state.phase = ScanPhase::Scanning;
            self.metrics.record_launch();

            let coordinator = Arc::clone(self);
            let cycle_ctx = ctx.clone();
            tokio::spawn(async move {
                coordinator.run_cycle(&cycle_ctx).await;
            });
        }
        state.cached.clone()
    }

    /// Runs one aggregation inline and returns the refreshed cache. If a
    /// cycle is already in flight the current cache is returned untouched.
    pub async fn refresh(&self, ctx: &ScanContext) -> Vec<SignalRecord> {
        {
            let mut state = self.write_state();
            if state.phase == ScanPhase::Scanning {
                return state.cached.clone();
            }
            state.phase = ScanPhase::Scanning;
            self.metrics.record_launch();
        }
        self.run_cycle(ctx).await;
        self.cached()
    }

    async fn run_cycle(&self, ctx: &ScanContext) {
        // Returns to Idle even if this future is dropped mid-aggregation.
        let mut cycle = ScanCycle {
            coordinator: self,
            records: None,
        };
        cycle.records = Some(self.aggregate(ctx).await);
    }

    async fn aggregate(&self, ctx: &ScanContext) -> Vec<SignalRecord> {
        let scanners = self.registered();
        if scanners.is_empty() {
            return Vec::new();
        }

        let scan_ctx = ctx.with_timeout(self.config.scan_timeout());
        let (tx, mut rx) = mpsc::channel::<ScannerReport>(scanners.len());
        let mut units = JoinSet::new();
        for scanner in &scanners {
            let scanner = Arc::clone(scanner);
            let tx = tx.clone();
            let unit_ctx = scan_ctx.clone();
            units.spawn(async move {
                let result = scanner.scan(&unit_ctx).await;
                let _ = tx
                    .send(ScannerReport {
                        scanner: scanner.name().to_string(),
                        result,
                    })
                    .await;
            });
        }
        drop(tx);

        let expected = scanners.len();
        let mut reported = 0;
        let mut records = Vec::new();
        while reported < expected {
            tokio::select! {
                biased;
                report = rx.recv() => {
                    let Some(report) = report else { break };
                    reported += 1;
                    self.absorb(report, &mut records);
                }
                _ = scan_ctx.done() => break,
            }
        }

        if reported < expected {
            let missing = expected - reported;
            self.metrics.record_timeouts(missing);
            self.logger.warn(&format!(
                "{} of {} scanners missed the scan window",
                missing, expected
            ));
        }
        scan_ctx.cancel();
        units.abort_all();

        records.truncate(self.config.max_signals);
        self.metrics.record_aggregation();
        self.logger.record(&format!(
            "aggregated {} signals from {}/{} scanners",
            records.len(),
            reported,
            expected
        ));
        records
    }

    fn absorb(&self, report: ScannerReport, records: &mut Vec<SignalRecord>) {
        match report.result {
            Ok(mut found) => {
                self.logger
                    .detail(&format!("{} reported {} signals", report.scanner, found.len()));
                records.append(&mut found);
            }
            Err(ScanError::ScanTimeout { scanner }) => {
                self.metrics.record_timeouts(1);
                self.logger.warn(&format!("{} timed out", scanner));
            }
            Err(err) => {
                self.metrics.record_failure();
                self.logger.warn(&format!("{}: {}", report.scanner, err));
            }
        }
    }

    fn finish(&self, records: Option<Vec<SignalRecord>>) {
        let now = self.clock.now();
        let mut state = self.write_state();
        if let Some(records) = records {
            state.cached = records;
        }
        state.phase = ScanPhase::Idle;
        state.last_scan_at = Some(now);
    }

    fn within_interval(&self, state: &CoordinatorState, now: Instant) -> bool {
        state
            .last_scan_at
            .map(|last| now.saturating_duration_since(last) < self.config.scan_interval())
            .unwrap_or(false)
    }

    fn registered(&self) -> Vec<Arc<dyn Scanner>> {
        self.scanners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CoordinatorState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CoordinatorState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

struct ScanCycle<'a> {
    coordinator: &'a ScanCoordinator,
    records: Option<Vec<SignalRecord>>,
}

impl Drop for ScanCycle<'_> {
    fn drop(&mut self) {
        self.coordinator.finish(self.records.take());
    }
}
