use crate::math::angle::normalize_angle;
use crate::prelude::probability;
use crate::signal::history::{PositionHistory, PositionSample};
use crate::signal::kind::SignalKind;
use crate::signal::record::SignalRecord;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Persistence lost per second without sweep contact; a signal fades out
/// completely eight seconds after its last illumination.
pub const DECAY_RATE: f64 = 1.0 / 8.0;

/// A signal is drawn only while its persistence is above this level.
pub const VISIBILITY_THRESHOLD: f64 = 0.1;

const MIN_JITTERED_STRENGTH: i32 = 10;

/// Stable handle assigned when a signal enters the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct SignalId(pub u64);

/// Where a signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalOrigin {
    Simulated,
    Detected,
    /// Stand-in produced when every real source failed.
    Placeholder,
}

/// Geometry bounds every signal is clamped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalLimits {
    pub min_distance: f64,
    pub max_distance: f64,
    pub max_history: usize,
}

impl SignalLimits {
    pub fn new(min_distance: f64, max_distance: f64, max_history: usize) -> Self {
        let max_distance = max_distance.max(min_distance);
        Self {
            min_distance,
            max_distance,
            max_history,
        }
    }

    pub fn clamp_distance(&self, distance: f64) -> f64 {
        if distance.is_nan() {
            return self.min_distance;
        }
        distance.clamp(self.min_distance, self.max_distance)
    }
}

impl Default for SignalLimits {
    fn default() -> Self {
        Self::new(1.0, 10.0, 20)
    }
}

#[derive(Debug, Clone)]
pub struct Signal {
    pub id: SignalId,
    pub kind: SignalKind,
    pub icon: String,
    pub name: String,
    pub origin: SignalOrigin,
    strength: u8,
    distance: f64,
    angle: f64,
    phase: u32,
    created_at: Instant,
    last_illuminated_at: Instant,
    persistence: f64,
    history: PositionHistory,
    limits: SignalLimits,
}

impl Signal {
    /// Builds a freshly seen signal from a scanner record. The signal starts
    /// fully persistent with one illuminated history sample.
    pub fn from_record(
        record: &SignalRecord,
        origin: SignalOrigin,
        now: Instant,
        limits: SignalLimits,
    ) -> Self {
        let mut signal = Self {
            id: SignalId::default(),
            kind: record.kind,
            icon: record.icon_or_default().to_string(),
            name: record.name.clone(),
            origin,
            strength: clamp_strength(record.strength, 0),
            distance: limits.clamp_distance(record.distance),
            angle: normalize_angle(record.angle),
            phase: 0,
            created_at: now,
            last_illuminated_at: now,
            persistence: 1.0,
            history: PositionHistory::with_capacity(limits.max_history),
            limits,
        };
        signal.record_position(now, true);
        signal
    }

    pub fn with_phase(mut self, phase: u32) -> Self {
        self.phase = phase;
        self
    }

    pub fn strength(&self) -> u8 {
        self.strength
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn last_illuminated_at(&self) -> Instant {
        self.last_illuminated_at
    }

    pub fn persistence(&self) -> f64 {
        self.persistence
    }

    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    pub fn is_visible(&self) -> bool {
        self.persistence > VISIBILITY_THRESHOLD
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    pub fn is_expired(&self, now: Instant, lifetime: Duration) -> bool {
        self.age(now) > lifetime
    }

    pub fn advance_phase(&mut self, max_phase: u32) {
        self.phase = (self.phase + 1) % max_phase.max(1);
    }

    /// Sweep contact: the signal is fully fresh again.
    pub fn illuminate(&mut self, now: Instant) {
        self.last_illuminated_at = now;
        self.persistence = 1.0;
    }

    /// Linear fade from the last sweep contact.
    pub fn decay(&mut self, now: Instant) {
        let elapsed = now
            .saturating_duration_since(self.last_illuminated_at)
            .as_secs_f64();
        self.persistence = (1.0 - elapsed * DECAY_RATE).clamp(0.0, 1.0);
    }

    pub fn record_position(&mut self, now: Instant, was_illuminated: bool) {
        self.history.push(PositionSample {
            distance: self.distance,
            angle: self.angle,
            strength: self.strength,
            timestamp: now,
            was_illuminated,
        });
    }

    /// Per-kind stochastic movement. Returns whether the signal moved.
    pub fn drift<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let profile = self.kind.drift_profile();
        if !rng.gen_bool(probability(profile.probability)) {
            return false;
        }

        self.distance += (rng.gen::<f64>() - 0.5) * profile.distance_step;
        self.angle += (rng.gen::<f64>() - 0.5) * profile.angle_step + profile.orbital_advance;
        self.distance = self.limits.clamp_distance(self.distance);
        self.angle = normalize_angle(self.angle);
        true
    }

    /// Random ±10 change, kept within `[10, 100]`.
    pub fn jitter_strength<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let delta = rng.gen_range(-10..=10);
        self.strength = clamp_strength(i32::from(self.strength) + delta, MIN_JITTERED_STRENGTH);
    }

    pub fn set_strength(&mut self, strength: i32) {
        self.strength = clamp_strength(strength, 0);
    }
}

fn clamp_strength(value: i32, floor: i32) -> u8 {
    value.clamp(floor, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::f64::consts::{PI, TAU};

    fn wifi_at(now: Instant, distance: f64, angle: f64) -> Signal {
        let record = SignalRecord::new(SignalKind::WiFi, "test-net", 70, distance, angle);
        Signal::from_record(&record, SignalOrigin::Detected, now, SignalLimits::default())
    }

    #[test]
    fn record_conversion_clamps_geometry_and_strength() {
        let now = Instant::now();
        let record = SignalRecord::new(SignalKind::IoT, "cam", 250, 99.0, -PI / 2.0);
        let signal = Signal::from_record(&record, SignalOrigin::Detected, now, SignalLimits::default());

        assert_eq!(signal.strength(), 100);
        assert_eq!(signal.distance(), 10.0);
        assert!((signal.angle() - 3.0 * PI / 2.0).abs() < 1e-12);
        assert_eq!(signal.icon, "◇");
        assert_eq!(signal.history().len(), 1);
        assert!(signal.history().latest().map(|s| s.was_illuminated).unwrap_or(false));
    }

    #[test]
    fn decay_reaches_zero_eight_seconds_after_contact() {
        let t0 = Instant::now();
        let mut signal = wifi_at(t0, 3.0, 0.0);
        signal.illuminate(t0);

        signal.decay(t0 + Duration::from_secs(4));
        assert!((signal.persistence() - 0.5).abs() < 1e-9);
        assert!(signal.is_visible());

        signal.decay(t0 + Duration::from_secs(8));
        assert_eq!(signal.persistence(), 0.0);
        assert!(!signal.is_visible());

        signal.decay(t0 + Duration::from_secs(12));
        assert_eq!(signal.persistence(), 0.0);
    }

    #[test]
    fn persistence_never_increases_between_illuminations() {
        let t0 = Instant::now();
        let mut signal = wifi_at(t0, 3.0, 0.0);
        let mut previous = signal.persistence();
        for step in 1..=20 {
            signal.decay(t0 + Duration::from_millis(step * 450));
            assert!(signal.persistence() <= previous);
            previous = signal.persistence();
        }

        signal.illuminate(t0 + Duration::from_secs(10));
        assert_eq!(signal.persistence(), 1.0);
    }

    #[test]
    fn history_is_capped_and_keeps_newest() {
        let t0 = Instant::now();
        let mut signal = wifi_at(t0, 3.0, 0.0);
        let capacity = SignalLimits::default().max_history;
        let first = *signal.history().oldest().unwrap();

        for step in 1..=capacity as u64 {
            signal.record_position(t0 + Duration::from_secs(step), false);
        }

        assert_eq!(signal.history().len(), capacity);
        assert!(signal.history().iter().all(|s| s.timestamp != first.timestamp));
        assert_eq!(
            signal.history().latest().map(|s| s.timestamp),
            Some(t0 + Duration::from_secs(capacity as u64))
        );
    }

    #[test]
    fn drift_respects_bounds_for_every_kind() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Instant::now();
        for kind in SignalKind::ALL {
            let record = SignalRecord::new(kind, "edge", 50, 1.0, TAU - 0.001);
            let mut signal =
                Signal::from_record(&record, SignalOrigin::Simulated, now, SignalLimits::default());
            for _ in 0..500 {
                signal.drift(&mut rng);
                assert!((1.0..=10.0).contains(&signal.distance()));
                assert!((0.0..TAU).contains(&signal.angle()));
            }
        }
    }

    #[test]
    fn satellites_advance_their_orbit_when_drifting() {
        let mut rng = StdRng::seed_from_u64(11);
        let now = Instant::now();
        let record = SignalRecord::new(SignalKind::Satellite, "ISS", 80, 5.0, 1.0);
        let mut signal = Signal::from_record(&record, SignalOrigin::Simulated, now, SignalLimits::default());

        let mut moved = 0;
        for _ in 0..200 {
            let before = signal.angle();
            if signal.drift(&mut rng) {
                moved += 1;
                assert!((signal.angle() - before - 0.05).abs() < 1e-9);
            }
        }
        assert!(moved > 0);
    }

    #[test]
    fn jitter_keeps_strength_within_floor_and_ceiling() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut signal = wifi_at(Instant::now(), 3.0, 0.0);
        signal.set_strength(12);
        for _ in 0..200 {
            signal.jitter_strength(&mut rng);
            assert!((10..=100).contains(&signal.strength()));
        }
    }

    #[test]
    fn expiry_is_strictly_after_lifetime() {
        let t0 = Instant::now();
        let signal = wifi_at(t0, 3.0, 0.0);
        let lifetime = Duration::from_secs(30);
        assert!(!signal.is_expired(t0 + Duration::from_secs(30), lifetime));
        assert!(signal.is_expired(t0 + Duration::from_secs(31), lifetime));
    }
}
