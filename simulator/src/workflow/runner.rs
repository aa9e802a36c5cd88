use crate::generator::profile::SyntheticScanner;
use crate::render_bridge::bridge::RenderBridge;
use crate::scanners::netstat::NetstatScanner;
use crate::workflow::config::SimulationConfig;
use anyhow::Context;
use log::{debug, info, warn};
use radarcore::clock::{Clock, SystemClock};
use radarcore::engine::KindCount;
use radarcore::signal::SignalOrigin;
use radarcore::telemetry::ScanCounters;
use radarcore::{RadarEngine, RealDataCollector, ScanContext, ScanCoordinator, Scanner};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// What a finished run looked like on its last frame.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub frames: u64,
    pub tracked: usize,
    pub visible: usize,
    pub detected: usize,
    pub placeholders: usize,
    pub counts: Vec<KindCount>,
    pub scanners: Vec<String>,
    pub scan: ScanCounters,
}

#[derive(Clone)]
pub struct Runner {
    config: SimulationConfig,
    clock: Arc<dyn Clock>,
}

impl Runner {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: SimulationConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    fn scanners(&self) -> Vec<Arc<dyn Scanner>> {
        let mut scanners: Vec<Arc<dyn Scanner>> = self
            .config
            .scanners
            .iter()
            .cloned()
            .map(|profile| {
                Arc::new(SyntheticScanner::new(profile, self.config.scan.max_scan_range))
                    as Arc<dyn Scanner>
            })
            .collect();
        if self.config.netstat {
            scanners.push(Arc::new(NetstatScanner::new(self.config.scan.max_signals)));
        }
        scanners
    }

    /// Registers scanners, warms the scan cache when real data is on, and
    /// primes the engine with its opening picture.
    pub async fn build_engine(&self) -> anyhow::Result<(RadarEngine, Arc<ScanCoordinator>)> {
        let period = self.config.radar.refresh_rate();
        anyhow::ensure!(
            period > Duration::ZERO,
            "radar.refresh_rate_secs must be positive"
        );

        let coordinator = Arc::new(ScanCoordinator::with_clock(
            Arc::new(self.config.scan.clone()),
            self.clock.clone(),
        ));
        for scanner in self.scanners() {
            if let Err(err) = coordinator.register(scanner) {
                warn!("skipping scanner: {}", err);
            }
        }

        if self.config.radar.use_real_data {
            let warmed = coordinator.refresh(&ScanContext::new()).await;
            info!(
                "warm-up scan over {:?} returned {} records",
                coordinator.scanner_names(),
                warmed.len()
            );
        }

        let collector = RealDataCollector::with_coordinator(coordinator.clone(), self.clock.clone());
        let mut engine = RadarEngine::new(self.config.radar.clone(), self.clock.clone())
            .with_collector(collector);
        engine.prime().await;
        debug!("engine primed with {} signals", engine.signals().len());
        Ok((engine, coordinator))
    }

    /// Ticks at the configured refresh rate until `frames` have run or Ctrl+C
    /// arrives. Without a frame limit only Ctrl+C stops the loop.
    pub async fn run(
        &self,
        frames: Option<u64>,
        bridge: Option<&RenderBridge>,
    ) -> anyhow::Result<RunSummary> {
        let (mut engine, coordinator) = self.build_engine().await?;

        let mut interval = tokio::time::interval(self.config.radar.refresh_rate());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let mut frame = 0u64;
        while frames.map_or(true, |limit| frame < limit) {
            tokio::select! {
                _ = interval.tick() => {}
                interrupted = &mut shutdown => {
                    interrupted.context("listening for Ctrl+C")?;
                    info!("interrupted after {} frames", frame);
                    break;
                }
            }

            if let Some(bridge) = bridge {
                for command in bridge.drain_commands() {
                    debug!("applying {:?}", command);
                    engine.apply(command);
                }
            }
            engine.tick().await;
            frame += 1;
            if let Some(bridge) = bridge {
                bridge.publish(engine.snapshot());
            }
        }

        let snapshot = engine.snapshot();
        let count_origin = |origin: SignalOrigin| {
            engine
                .signals()
                .iter()
                .filter(|signal| signal.origin == origin)
                .count()
        };
        let summary = RunSummary {
            frames: frame,
            tracked: snapshot.tracked,
            visible: snapshot.visible_count(),
            detected: count_origin(SignalOrigin::Detected),
            placeholders: count_origin(SignalOrigin::Placeholder),
            counts: snapshot.counts,
            scanners: coordinator.scanner_names(),
            scan: coordinator.metrics(),
        };
        info!(
            "run finished: frames={} tracked={} visible={}",
            summary.frames, summary.tracked, summary.visible
        );
        Ok(summary)
    }
}
