use crate::generator::profile::{default_profiles, ScannerProfile};
use anyhow::Context;
use radarcore::{RadarConfig, ScanConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything a headless radar run needs, as loaded from YAML.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub radar: RadarConfig,
    pub scan: ScanConfig,
    pub scanners: Vec<ScannerProfile>,
    /// Register the `netstat` connection scanner when it is on the PATH.
    pub netstat: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            radar: RadarConfig::default(),
            scan: ScanConfig::default(),
            scanners: default_profiles(),
            netstat: false,
        }
    }
}

impl SimulationConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading simulation config {}", path_ref.display()))?;
        let config: SimulationConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing simulation config {}", path_ref.display()))?;
        Ok(config.normalized())
    }

    pub fn from_args(seed: Option<u64>, real_data: bool, fallback: bool, netstat: bool) -> Self {
        let mut config = Self::default();
        config.apply_overrides(seed, real_data, fallback, netstat);
        config
    }

    /// Command-line flags win over file values, but only in the direction
    /// they point: `--no-real-data` disables, it never re-enables.
    pub fn apply_overrides(&mut self, seed: Option<u64>, real_data: bool, fallback: bool, netstat: bool) {
        if seed.is_some() {
            self.radar.seed = seed;
        }
        if !real_data {
            self.radar.use_real_data = false;
            self.scan.use_real_data = false;
        }
        if !fallback {
            self.scan.use_simulated_fallback = false;
        }
        self.netstat |= netstat;
        *self = std::mem::take(self).normalized();
    }

    /// Keeps the engine and the scan path agreeing on shared limits.
    fn normalized(mut self) -> Self {
        self.radar.use_real_data &= self.scan.use_real_data;
        self.scan.max_scan_range = self.radar.max_scan_range;
        self.scan.min_distance = self.radar.min_distance;
        self.scan.max_history = self.radar.max_history;
        self
    }
}
