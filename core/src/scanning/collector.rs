use crate::clock::Clock;
use crate::prelude::{ScanConfig, ScanError, ScanResult};
use crate::scanning::coordinator::ScanCoordinator;
use crate::scanning::scanner::{ScanContext, Scanner};
use crate::signal::{Signal, SignalKind, SignalLimits, SignalOrigin, SignalRecord};
use crate::telemetry::LogManager;
use std::f64::consts::PI;
use std::sync::Arc;
use std::time::Instant;

enum Source {
    Coordinated(Arc<ScanCoordinator>),
    /// Runs scanners one after another without a coordinator.
    Direct(Vec<Arc<dyn Scanner>>),
}

/// Bridges scan output into engine signals under a hard time budget.
///
/// Every call to [`RealDataCollector::collect`] returns within
/// `collect_timeout`, falling back to the previous result or to placeholder
/// signals when the real sources are slow or empty.
pub struct RealDataCollector {
    source: Source,
    config: Arc<ScanConfig>,
    limits: SignalLimits,
    clock: Arc<dyn Clock>,
    ctx: ScanContext,
    cached: Vec<Signal>,
    last_collect_at: Option<Instant>,
    logger: LogManager,
}

impl RealDataCollector {
    pub fn with_coordinator(coordinator: Arc<ScanCoordinator>, clock: Arc<dyn Clock>) -> Self {
        let config = coordinator.shared_config();
        Self::build(Source::Coordinated(coordinator), config, clock)
    }

    pub fn standalone(
        scanners: Vec<Arc<dyn Scanner>>,
        config: Arc<ScanConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let available = scanners
            .into_iter()
            .filter(|scanner| scanner.is_available())
            .collect();
        Self::build(Source::Direct(available), config, clock)
    }

    fn build(source: Source, config: Arc<ScanConfig>, clock: Arc<dyn Clock>) -> Self {
        let limits = SignalLimits::new(config.min_distance, config.max_scan_range, config.max_history);
        Self {
            source,
            config,
            limits,
            clock,
            ctx: ScanContext::new(),
            cached: Vec::new(),
            last_collect_at: None,
            logger: LogManager::new("collector"),
        }
    }

    pub fn cached(&self) -> &[Signal] {
        &self.cached
    }

    /// Returns renderable signals, never taking longer than
    /// `collect_timeout`.
    pub async fn collect(&mut self) -> Vec<Signal> {
        let now = self.clock.now();
        if let Some(last) = self.last_collect_at {
            if now.saturating_duration_since(last) < self.config.scan_interval() {
                return self.cached.clone();
            }
        }
        self.last_collect_at = Some(now);

        let budget = self.config.collect_timeout();
        let raced = tokio::time::timeout(budget, self.fetch()).await;
        let outcome = match raced {
            Ok(outcome) => outcome,
            Err(_) => {
                self.logger
                    .warn(&format!("real-data path exceeded {:?}", budget));
                return self.degrade(now);
            }
        };

        match outcome {
            Ok(records) => {
                let signals: Vec<Signal> = records
                    .iter()
                    .map(|record| {
                        Signal::from_record(record, SignalOrigin::Detected, now, self.limits)
                    })
                    .collect();
                self.logger
                    .detail(&format!("collected {} real signals", signals.len()));
                self.cached = signals.clone();
                signals
            }
            Err(err) => {
                self.logger.detail(&err.to_string());
                self.degrade(now)
            }
        }
    }

    async fn fetch(&self) -> ScanResult<Vec<SignalRecord>> {
        let records = match &self.source {
            Source::Coordinated(coordinator) => coordinator.scan(&self.ctx),
            Source::Direct(scanners) => {
                let scan_ctx = self.ctx.with_timeout(self.config.scan_timeout());
                let mut records = Vec::new();
                for scanner in scanners {
                    match scanner.scan(&scan_ctx).await {
                        Ok(mut found) => records.append(&mut found),
                        Err(err) => self.logger.warn(&format!("{}: {}", scanner.name(), err)),
                    }
                }
                records.truncate(self.config.max_signals);
                records
            }
        };

        if records.is_empty() {
            Err(ScanError::AggregateEmpty)
        } else {
            Ok(records)
        }
    }

    fn degrade(&mut self, now: Instant) -> Vec<Signal> {
        if !self.cached.is_empty() {
            return self.cached.clone();
        }
        if self.config.use_simulated_fallback {
            self.cached = fallback_signals(now, self.limits);
            return self.cached.clone();
        }
        Vec::new()
    }
}

impl Drop for RealDataCollector {
    fn drop(&mut self) {
        self.ctx.cancel();
    }
}

/// Deterministic stand-ins shown when no real source produced anything.
pub fn fallback_signals(now: Instant, limits: SignalLimits) -> Vec<Signal> {
    let placeholders = [
        SignalRecord::new(SignalKind::WiFi, "Unknown-WiFi", 60, 3.0, PI / 4.0),
        SignalRecord::new(SignalKind::Network, "Network-Activity", 55, 4.5, 5.0 * PI / 4.0),
    ];
    placeholders
        .iter()
        .map(|record| Signal::from_record(record, SignalOrigin::Placeholder, now, limits))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FixedScanner(Vec<SignalRecord>);

    #[async_trait]
    impl Scanner for FixedScanner {
        async fn scan(&self, _ctx: &ScanContext) -> ScanResult<Vec<SignalRecord>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    struct BrokenScanner;

    #[async_trait]
    impl Scanner for BrokenScanner {
        async fn scan(&self, _ctx: &ScanContext) -> ScanResult<Vec<SignalRecord>> {
            Err(ScanError::ScanFailed {
                scanner: "broken".into(),
                reason: "exit status 1".into(),
            })
        }

        fn name(&self) -> &str {
            "broken"
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    struct StuckScanner;

    #[async_trait]
    impl Scanner for StuckScanner {
        async fn scan(&self, _ctx: &ScanContext) -> ScanResult<Vec<SignalRecord>> {
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "stuck"
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    /// Answers once, then never again.
    struct FlakyScanner {
        calls: AtomicUsize,
        records: Vec<SignalRecord>,
    }

    #[async_trait]
    impl Scanner for FlakyScanner {
        async fn scan(&self, _ctx: &ScanContext) -> ScanResult<Vec<SignalRecord>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Ok(self.records.clone());
            }
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "flaky"
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    fn config(fallback: bool) -> Arc<ScanConfig> {
        Arc::new(ScanConfig {
            use_simulated_fallback: fallback,
            ..Default::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn failing_sources_yield_deterministic_fallback_within_budget() {
        let clock = Arc::new(ManualClock::new());
        let scanners: Vec<Arc<dyn Scanner>> = vec![Arc::new(BrokenScanner), Arc::new(StuckScanner)];
        let mut collector = RealDataCollector::standalone(scanners, config(true), clock);

        let started = tokio::time::Instant::now();
        let signals = collector.collect().await;

        assert!(started.elapsed() <= Duration::from_millis(1_010));
        let names: Vec<&str> = signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Unknown-WiFi", "Network-Activity"]);
        assert!(signals.iter().all(|s| s.origin == SignalOrigin::Placeholder));
        assert_eq!(signals[0].strength(), 60);
        assert!((signals[0].angle() - PI / 4.0).abs() < 1e-12);
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_disabled_returns_nothing() {
        let clock = Arc::new(ManualClock::new());
        let scanners: Vec<Arc<dyn Scanner>> = vec![Arc::new(BrokenScanner)];
        let mut collector = RealDataCollector::standalone(scanners, config(false), clock);
        assert!(collector.collect().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn successful_collection_is_cached_until_interval_elapses() {
        let clock = Arc::new(ManualClock::new());
        let records = vec![SignalRecord::new(SignalKind::WiFi, "home", 80, 2.0, 1.0)];
        let scanners: Vec<Arc<dyn Scanner>> = vec![Arc::new(FixedScanner(records))];
        let mut collector = RealDataCollector::standalone(scanners, config(true), clock.clone());

        let first = collector.collect().await;
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].origin, SignalOrigin::Detected);
        let created = first[0].created_at();

        clock.advance(Duration::from_secs(2));
        let cached = collector.collect().await;
        assert_eq!(cached[0].created_at(), created);

        clock.advance(Duration::from_secs(8));
        let fresh = collector.collect().await;
        assert!(fresh[0].created_at() > created);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_rescan_serves_the_previous_result_within_budget() {
        let clock = Arc::new(ManualClock::new());
        let scanner = FlakyScanner {
            calls: AtomicUsize::new(0),
            records: vec![SignalRecord::new(SignalKind::WiFi, "home", 80, 2.0, 1.0)],
        };
        let scanners: Vec<Arc<dyn Scanner>> = vec![Arc::new(scanner)];
        let mut collector = RealDataCollector::standalone(scanners, config(true), clock.clone());

        let first = collector.collect().await;
        let created = first[0].created_at();

        clock.advance(Duration::from_secs(9));
        let started = tokio::time::Instant::now();
        let second = collector.collect().await;

        assert!(started.elapsed() <= Duration::from_millis(1_010));
        let names: Vec<&str> = second.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["home"]);
        assert_eq!(second[0].origin, SignalOrigin::Detected);
        assert_eq!(second[0].created_at(), created);
    }

    #[tokio::test(start_paused = true)]
    async fn coordinator_cache_is_served_while_a_cycle_runs() {
        let clock = Arc::new(ManualClock::new());
        let config = config(true);
        let coordinator = Arc::new(ScanCoordinator::with_clock(config, clock.clone()));
        coordinator
            .register(Arc::new(FixedScanner(vec![SignalRecord::new(
                SignalKind::Cellular,
                "tower",
                70,
                5.0,
                2.0,
            )])))
            .unwrap();
        coordinator.refresh(&ScanContext::new()).await;

        let mut collector = RealDataCollector::with_coordinator(coordinator.clone(), clock.clone());
        let first = collector.collect().await;
        assert_eq!(first[0].name, "tower");

        coordinator.register(Arc::new(StuckScanner)).unwrap();
        clock.advance(Duration::from_secs(9));
        let second = collector.collect().await;
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "tower");
    }

    #[tokio::test(start_paused = true)]
    async fn empty_coordinator_cache_triggers_fallback() {
        let clock = Arc::new(ManualClock::new());
        let coordinator = Arc::new(ScanCoordinator::with_clock(config(true), clock.clone()));
        let mut collector = RealDataCollector::with_coordinator(coordinator, clock);

        let signals = collector.collect().await;
        assert_eq!(signals.len(), 2);
        assert!(signals.iter().all(|s| s.origin == SignalOrigin::Placeholder));
    }
}
