use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of emitter shown on the radar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignalKind {
    WiFi,
    Bluetooth,
    Cellular,
    Radio,
    IoT,
    Satellite,
    Network,
}

/// How a kind moves between history updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mobility {
    Stationary,
    Mobile,
    Orbital,
}

/// Stochastic movement parameters. Deltas are symmetric: a step of `0.2`
/// moves by up to `±0.1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftProfile {
    pub probability: f64,
    pub distance_step: f64,
    pub angle_step: f64,
    /// Deterministic angular advance applied when the drift fires.
    pub orbital_advance: f64,
}

impl SignalKind {
    pub const ALL: [SignalKind; 7] = [
        SignalKind::WiFi,
        SignalKind::Bluetooth,
        SignalKind::Cellular,
        SignalKind::Radio,
        SignalKind::IoT,
        SignalKind::Satellite,
        SignalKind::Network,
    ];

    /// Kinds the simulated generator draws from.
    pub const SIMULATED: [SignalKind; 6] = [
        SignalKind::WiFi,
        SignalKind::Bluetooth,
        SignalKind::Cellular,
        SignalKind::Radio,
        SignalKind::IoT,
        SignalKind::Satellite,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SignalKind::WiFi => "WiFi",
            SignalKind::Bluetooth => "Bluetooth",
            SignalKind::Cellular => "Cellular",
            SignalKind::Radio => "Radio",
            SignalKind::IoT => "IoT",
            SignalKind::Satellite => "Satellite",
            SignalKind::Network => "Network",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            SignalKind::WiFi => "≋",
            SignalKind::Bluetooth => "β",
            SignalKind::Cellular => "▲",
            SignalKind::Radio => "◈",
            SignalKind::IoT => "◇",
            SignalKind::Satellite => "★",
            SignalKind::Network => "⚡",
        }
    }

    pub fn mobility(self) -> Mobility {
        match self {
            SignalKind::Bluetooth | SignalKind::Cellular => Mobility::Mobile,
            SignalKind::Satellite => Mobility::Orbital,
            _ => Mobility::Stationary,
        }
    }

    /// Movement follows [`SignalKind::mobility`]; cellular towers hand off
    /// more often and further than bluetooth peers.
    pub fn drift_profile(self) -> DriftProfile {
        match self.mobility() {
            Mobility::Mobile if self == SignalKind::Cellular => DriftProfile {
                probability: 0.25,
                distance_step: 0.8,
                angle_step: 0.3,
                orbital_advance: 0.0,
            },
            Mobility::Mobile => DriftProfile {
                probability: 0.15,
                distance_step: 0.5,
                angle_step: 0.2,
                orbital_advance: 0.0,
            },
            Mobility::Orbital => DriftProfile {
                probability: 0.20,
                distance_step: 0.3,
                angle_step: 0.0,
                orbital_advance: 0.05,
            },
            Mobility::Stationary => DriftProfile {
                probability: 0.05,
                distance_step: 0.2,
                angle_step: 0.1,
                orbital_advance: 0.0,
            },
        }
    }

    /// Names the simulated generator picks from.
    pub fn catalog_names(self) -> &'static [&'static str] {
        match self {
            SignalKind::WiFi => &["MyWiFi_5G", "NETGEAR_2.4G", "Linksys_AC", "TP-Link_Guest"],
            SignalKind::Bluetooth => &["iPhone-12", "AirPods-Pro", "MacBook", "Xbox-Controller"],
            SignalKind::Cellular => &["Verizon-LTE", "AT&T-5G", "T-Mobile", "Cell-Tower-1"],
            SignalKind::Radio => &["FM-101.5", "AM-680", "HAM-Radio", "Emergency-Freq"],
            SignalKind::IoT => &["Smart-TV", "Nest-Cam", "Ring-Door", "Alexa-Echo"],
            SignalKind::Satellite => &["GPS-III", "Starlink", "ISS", "Weather-Sat"],
            SignalKind::Network => &["HTTP", "SSH", "DNS", "Other"],
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}
