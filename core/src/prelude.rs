use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::time::Duration;

/// Configuration shared by every data-acquisition component.
///
/// Durations are expressed in seconds so the struct round-trips through YAML
/// without custom serializers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub scan_interval_secs: f64,
    pub max_signals: usize,
    pub max_scan_range: f64,
    pub use_real_data: bool,
    pub enable_consent: bool,
    /// Hard ceiling for one coordinator aggregation cycle.
    pub scan_timeout_secs: f64,
    /// Hard ceiling the collector imposes on the whole real-data path.
    pub collect_timeout_secs: f64,
    pub use_simulated_fallback: bool,
    /// Closest a converted record may sit to the centre.
    pub min_distance: f64,
    pub max_history: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: 8.0,
            max_signals: 8,
            max_scan_range: 10.0,
            use_real_data: true,
            enable_consent: false,
            scan_timeout_secs: 5.0,
            collect_timeout_secs: 1.0,
            use_simulated_fallback: true,
            min_distance: 1.0,
            max_history: 20,
        }
    }
}

impl ScanConfig {
    pub fn scan_interval(&self) -> Duration {
        secs(self.scan_interval_secs)
    }

    pub fn scan_timeout(&self) -> Duration {
        secs(self.scan_timeout_secs)
    }

    pub fn collect_timeout(&self) -> Duration {
        secs(self.collect_timeout_secs)
    }
}

/// Tick-engine tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub refresh_rate_secs: f64,
    /// Radians advanced per tick.
    pub sweep_speed: f64,
    pub max_signals: usize,
    pub signal_lifetime_secs: f64,
    /// Half-width of the beam in radians.
    pub beam_width: f64,
    pub max_phase: u32,
    pub history_update_rate_secs: f64,
    pub max_history: usize,
    pub enable_history: bool,
    pub min_distance: f64,
    pub max_scan_range: f64,
    pub management_interval_secs: f64,
    pub spawn_probability: f64,
    pub jitter_probability: f64,
    pub use_real_data: bool,
    pub seed: Option<u64>,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            refresh_rate_secs: 0.08,
            sweep_speed: PI / 30.0,
            max_signals: 8,
            signal_lifetime_secs: 30.0,
            beam_width: PI / 60.0,
            max_phase: 8,
            history_update_rate_secs: 0.5,
            max_history: 20,
            enable_history: true,
            min_distance: 1.0,
            max_scan_range: 10.0,
            management_interval_secs: 2.0,
            spawn_probability: 0.3,
            jitter_probability: 0.1,
            use_real_data: true,
            seed: None,
        }
    }
}

impl RadarConfig {
    pub fn refresh_rate(&self) -> Duration {
        secs(self.refresh_rate_secs)
    }

    pub fn signal_lifetime(&self) -> Duration {
        secs(self.signal_lifetime_secs)
    }

    pub fn history_update_rate(&self) -> Duration {
        secs(self.history_update_rate_secs)
    }

    pub fn management_interval(&self) -> Duration {
        secs(self.management_interval_secs)
    }
}

/// Non-positive and NaN become zero; values too large for a `Duration`
/// saturate.
fn secs(value: f64) -> Duration {
    if value.is_nan() || value <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(value).unwrap_or(Duration::MAX)
}

/// Clamps a configured chance into `[0, 1]`; NaN counts as never.
pub fn probability(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Failure taxonomy for data sources. None of these ever reach the tick loop.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("scanner unavailable: {0}")]
    ScannerUnavailable(String),
    #[error("scanner {scanner} exceeded its scan window")]
    ScanTimeout { scanner: String },
    #[error("scanner {scanner} failed: {reason}")]
    ScanFailed { scanner: String, reason: String },
    #[error("no scanner produced any signal")]
    AggregateEmpty,
}

pub type ScanResult<T> = Result<T, ScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_radar_tuning() {
        let scan = ScanConfig::default();
        assert_eq!(scan.scan_timeout(), Duration::from_secs(5));
        assert_eq!(scan.collect_timeout(), Duration::from_secs(1));

        let radar = RadarConfig::default();
        assert_eq!(radar.refresh_rate(), Duration::from_millis(80));
        assert_eq!(radar.signal_lifetime(), Duration::from_secs(30));
        assert_eq!(radar.max_history, 20);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: RadarConfig = serde_json::from_str(r#"{"max_signals": 3}"#).unwrap();
        assert_eq!(cfg.max_signals, 3);
        assert_eq!(cfg.max_phase, 8);
    }

    #[test]
    fn negative_durations_collapse_to_zero() {
        let cfg = ScanConfig {
            scan_interval_secs: -1.0,
            ..Default::default()
        };
        assert_eq!(cfg.scan_interval(), Duration::ZERO);
    }

    #[test]
    fn oversized_durations_saturate_instead_of_panicking() {
        let cfg = ScanConfig {
            scan_interval_secs: 1e30,
            scan_timeout_secs: f64::INFINITY,
            ..Default::default()
        };
        assert_eq!(cfg.scan_interval(), Duration::MAX);
        assert_eq!(cfg.scan_timeout(), Duration::MAX);
    }

    #[test]
    fn probabilities_are_clamped_and_nan_is_never() {
        assert_eq!(probability(f64::NAN), 0.0);
        assert_eq!(probability(-0.5), 0.0);
        assert_eq!(probability(3.0), 1.0);
        assert_eq!(probability(0.25), 0.25);
    }
}
