use crate::clock::Clock;
use crate::engine::filter::KindFilter;
use crate::engine::snapshot::{KindCount, RadarSnapshot, SignalView};
use crate::engine::spawn::{initial_signals, simulated_signal};
use crate::math::angle::{normalize_angle, within_beam};
use crate::prelude::{probability, RadarConfig};
use crate::scanning::RealDataCollector;
use crate::signal::{Signal, SignalId, SignalKind, SignalLimits};
use crate::telemetry::LogManager;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Instant;

/// Owns every live signal and the sweep. One instance per radar; nothing is
/// global, so several engines can run side by side.
pub struct RadarEngine {
    pub(super) config: RadarConfig,
    pub(super) limits: SignalLimits,
    pub(super) signals: Vec<Signal>,
    pub(super) next_id: u64,
    pub(super) sweep_angle: f64,
    pub(super) paused: bool,
    pub(super) real_data: bool,
    pub(super) filter: KindFilter,
    pub(super) selected: Option<SignalId>,
    pub(super) collector: Option<RealDataCollector>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) rng: StdRng,
    last_history_update: Instant,
    last_management: Instant,
    logger: LogManager,
}

impl RadarEngine {
    /// Empty engine; call [`RadarEngine::prime`] or
    /// [`RadarEngine::populate`] to put signals on the scope.
    pub fn new(config: RadarConfig, clock: Arc<dyn Clock>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let limits = SignalLimits::new(config.min_distance, config.max_scan_range, config.max_history);
        let now = clock.now();
        Self {
            real_data: config.use_real_data,
            config,
            limits,
            signals: Vec::new(),
            next_id: 1,
            sweep_angle: 0.0,
            paused: false,
            filter: KindFilter::new(),
            selected: None,
            collector: None,
            clock,
            rng,
            last_history_update: now,
            last_management: now,
            logger: LogManager::new("engine"),
        }
    }

    pub fn with_collector(mut self, collector: RealDataCollector) -> Self {
        self.collector = Some(collector);
        self
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    pub fn limits(&self) -> SignalLimits {
        self.limits
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn get(&self, id: SignalId) -> Option<&Signal> {
        self.signals.iter().find(|signal| signal.id == id)
    }

    pub fn sweep_angle(&self) -> f64 {
        self.sweep_angle
    }

    pub fn set_sweep_angle(&mut self, angle: f64) {
        self.sweep_angle = normalize_angle(angle);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn uses_real_data(&self) -> bool {
        self.real_data
    }

    /// Adds a signal and hands back its stable handle.
    pub fn insert(&mut self, mut signal: Signal) -> SignalId {
        let id = SignalId(self.next_id);
        self.next_id += 1;
        signal.id = id;
        self.signals.push(signal);
        id
    }

    /// Replaces the live set with a fresh simulated opening picture.
    pub fn populate(&mut self) {
        let now = self.clock.now();
        let opening = initial_signals(&mut self.rng, now, self.limits);
        self.signals.clear();
        for signal in opening {
            self.insert(signal);
        }
    }

    /// Seeds the scope from real data when enabled, falling back to the
    /// simulated opening picture when nothing came back.
    pub async fn prime(&mut self) {
        if self.real_data {
            if let Some(collector) = self.collector.as_mut() {
                let collected = collector.collect().await;
                for signal in collected {
                    self.insert(signal);
                }
            }
        }
        if self.signals.is_empty() {
            self.populate();
        }
    }

    pub async fn tick(&mut self) {
        let now = self.clock.now();
        self.tick_at(now).await;
    }

    /// One animation frame.
    pub async fn tick_at(&mut self, now: Instant) {
        if self.paused {
            return;
        }

        if self.config.enable_history
            && now.saturating_duration_since(self.last_history_update)
                >= self.config.history_update_rate()
        {
            self.update_history(now);
            self.last_history_update = now;
        }

        // Every signal sees the same sweep position within a frame.
        let sweep = self.sweep_angle;
        let beam_width = self.config.beam_width;
        let jitter_probability = probability(self.config.jitter_probability);
        for signal in self.signals.iter_mut() {
            signal.advance_phase(self.config.max_phase);
            if within_beam(signal.angle(), sweep, beam_width) {
                signal.illuminate(now);
                if self.rng.gen_bool(jitter_probability) {
                    signal.jitter_strength(&mut self.rng);
                }
            } else {
                signal.decay(now);
            }
        }

        self.sweep_angle = normalize_angle(sweep + self.config.sweep_speed);

        if now.saturating_duration_since(self.last_management) >= self.config.management_interval() {
            self.manage(now).await;
            self.last_management = now;
        }
    }

    fn update_history(&mut self, now: Instant) {
        let sweep = self.sweep_angle;
        for signal in self.signals.iter_mut() {
            signal.drift(&mut self.rng);
            let swept = within_beam(signal.angle(), sweep, self.config.beam_width);
            signal.record_position(now, swept);
        }
    }

    async fn manage(&mut self, now: Instant) {
        let lifetime = self.config.signal_lifetime();
        let before = self.signals.len();
        self.signals
            .retain(|signal| !signal.is_expired(now, lifetime) && signal.is_visible());
        let pruned = before - self.signals.len();
        if pruned > 0 {
            self.logger.detail(&format!("pruned {} signals", pruned));
        }

        if self.real_data {
            if let Some(collector) = self.collector.as_mut() {
                let incoming = collector.collect().await;
                self.merge(incoming);
            }
        }

        let spawn_probability = probability(self.config.spawn_probability);
        if self.signals.len() < self.config.max_signals && self.rng.gen_bool(spawn_probability) {
            let signal = simulated_signal(&mut self.rng, now, self.limits);
            self.logger.detail(&format!("spawned {}", signal.name));
            self.insert(signal);
        }

        if let Some(selected) = self.selected {
            if self.get(selected).is_none() {
                self.selected = None;
            }
        }
    }

    /// Appends signals not already live (same kind and name), then keeps the
    /// newest `max_signals`.
    fn merge(&mut self, incoming: Vec<Signal>) {
        for signal in incoming {
            let duplicate = self
                .signals
                .iter()
                .any(|live| live.kind == signal.kind && live.name == signal.name);
            if !duplicate {
                self.insert(signal);
            }
        }

        let max = self.config.max_signals;
        if self.signals.len() > max {
            let excess = self.signals.len() - max;
            self.signals.drain(..excess);
        }
    }

    /// Signals that are both fresh enough to draw and pass the kind filter.
    pub(super) fn displayable(&self) -> impl Iterator<Item = &Signal> + '_ {
        self.signals
            .iter()
            .filter(|signal| signal.is_visible() && self.filter.allows(signal.kind))
    }

    pub fn snapshot(&self) -> RadarSnapshot {
        let now = self.clock.now();
        let signals: Vec<SignalView> = self
            .displayable()
            .map(|signal| SignalView::from_signal(signal, now, Some(signal.id) == self.selected))
            .collect();
        let counts = SignalKind::ALL
            .iter()
            .map(|kind| KindCount {
                kind: *kind,
                count: signals.iter().filter(|view| view.kind == *kind).count(),
            })
            .collect();

        RadarSnapshot {
            sweep_angle: self.sweep_angle,
            sweep_speed: self.config.sweep_speed,
            paused: self.paused,
            real_data: self.real_data,
            filtering: self.filter.is_enabled(),
            hidden_kinds: self.filter.hidden_kinds(),
            selected: self.selected,
            tracked: self.signals.len(),
            signals,
            counts,
        }
    }
}
