use async_trait::async_trait;
use radarcore::math::{rssi_to_distance, rssi_to_strength};
use radarcore::prelude::probability;
use radarcore::{ScanContext, ScanError, ScanResult, Scanner, SignalKind, SignalRecord};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Configuration for one synthetic scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerProfile {
    pub name: String,
    pub kind: SignalKind,
    /// Emitters reported per scan.
    pub emitters: usize,
    pub rssi_min: i32,
    pub rssi_max: i32,
    pub latency_ms: u64,
    /// Chance in `[0, 1]` that a scan fails outright.
    pub failure_rate: f64,
    pub available: bool,
    pub seed: u64,
}

impl Default for ScannerProfile {
    fn default() -> Self {
        Self {
            name: "wifi-sim".into(),
            kind: SignalKind::WiFi,
            emitters: 3,
            rssi_min: -85,
            rssi_max: -35,
            latency_ms: 150,
            failure_rate: 0.0,
            available: true,
            seed: 0,
        }
    }
}

impl ScannerProfile {
    pub fn new(name: &str, kind: SignalKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            ..Default::default()
        }
    }

    fn rssi_bounds(&self) -> (i32, i32) {
        if self.rssi_min <= self.rssi_max {
            (self.rssi_min, self.rssi_max)
        } else {
            (self.rssi_max, self.rssi_min)
        }
    }
}

/// Profiles used when the configuration names none.
pub fn default_profiles() -> Vec<ScannerProfile> {
    vec![
        ScannerProfile::new("wifi-sim", SignalKind::WiFi),
        ScannerProfile {
            emitters: 2,
            rssi_min: -95,
            rssi_max: -50,
            latency_ms: 300,
            seed: 1,
            ..ScannerProfile::new("bluetooth-sim", SignalKind::Bluetooth)
        },
    ]
}

/// Scanner that fabricates RSSI readings from a seeded generator, with
/// configurable latency and failure injection.
pub struct SyntheticScanner {
    profile: ScannerProfile,
    max_range: f64,
    rng: Mutex<StdRng>,
}

impl SyntheticScanner {
    pub fn new(profile: ScannerProfile, max_range: f64) -> Self {
        let rng = StdRng::seed_from_u64(profile.seed);
        Self {
            profile,
            max_range,
            rng: Mutex::new(rng),
        }
    }

    fn draw(&self) -> ScanResult<Vec<SignalRecord>> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        if rng.gen_bool(probability(self.profile.failure_rate)) {
            return Err(ScanError::ScanFailed {
                scanner: self.profile.name.clone(),
                reason: "injected failure".into(),
            });
        }

        let (low, high) = self.profile.rssi_bounds();
        let names = self.profile.kind.catalog_names();
        let records = (0..self.profile.emitters)
            .map(|index| {
                let rssi = rng.gen_range(low..=high);
                let name = match names.get(index) {
                    Some(name) => (*name).to_string(),
                    None => format!("{}-{}", self.profile.name, index),
                };
                SignalRecord::new(
                    self.profile.kind,
                    name,
                    i32::from(rssi_to_strength(rssi)),
                    rssi_to_distance(rssi, self.max_range),
                    rng.gen_range(0.0..TAU),
                )
            })
            .collect();
        Ok(records)
    }
}

#[async_trait]
impl Scanner for SyntheticScanner {
    async fn scan(&self, ctx: &ScanContext) -> ScanResult<Vec<SignalRecord>> {
        let latency = Duration::from_millis(self.profile.latency_ms);
        ctx.guard(&self.profile.name, async {
            tokio::time::sleep(latency).await;
            self.draw()
        })
        .await
    }

    fn name(&self) -> &str {
        &self.profile.name
    }

    fn is_available(&self) -> bool {
        self.profile.available
    }
}
