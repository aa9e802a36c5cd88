use async_trait::async_trait;
use log::debug;
use radarcore::{ScanContext, ScanError, ScanResult, Scanner, SignalKind, SignalRecord};
use rand::Rng;
use std::collections::BTreeMap;
use std::env;
use std::f64::consts::TAU;
use tokio::process::Command;

const NAME: &str = "netstat";

/// Connection buckets in display order, with their icons.
const BUCKETS: [(&str, &str); 4] = [("HTTP", "⚡"), ("SSH", "🔐"), ("DNS", "🌐"), ("Other", "▲")];

/// Turns established TCP connections reported by `netstat -n` into Network
/// signals, one per protocol bucket, followed by one signal per active
/// interface from `netstat -i`.
#[derive(Debug, Clone, Default)]
pub struct NetstatScanner {
    max_signals: usize,
}

impl NetstatScanner {
    pub fn new(max_signals: usize) -> Self {
        Self { max_signals }
    }

    async fn run(&self, flag: &str) -> ScanResult<String> {
        let output = Command::new(NAME)
            .arg(flag)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| ScanError::ScanFailed {
                scanner: NAME.into(),
                reason: err.to_string(),
            })?;
        if !output.status.success() {
            return Err(ScanError::ScanFailed {
                scanner: NAME.into(),
                reason: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Port of a `netstat` address column, after its last `:` or `.`.
fn port_of(address: &str) -> Option<u16> {
    address
        .rsplit(|c: char| c == ':' || c == '.')
        .next()
        .and_then(|port| port.parse().ok())
}

/// Established connections per bucket, keyed on the foreign address port.
pub fn count_connections(listing: &str) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for line in listing.lines().filter(|line| line.contains("ESTABLISHED")) {
        let bucket = match line.split_whitespace().nth(4).and_then(port_of) {
            Some(80 | 443) => "HTTP",
            Some(22) => "SSH",
            Some(53) => "DNS",
            _ => "Other",
        };
        *counts.entry(bucket).or_insert(0) += 1;
    }
    counts
}

pub fn connection_records<R: Rng + ?Sized>(
    counts: &BTreeMap<&'static str, usize>,
    rng: &mut R,
) -> Vec<SignalRecord> {
    BUCKETS
        .iter()
        .filter_map(|(bucket, icon)| {
            let count = counts.get(bucket).copied().unwrap_or(0);
            if count == 0 {
                return None;
            }
            let strength = (count * 20).min(100) as i32;
            let record = SignalRecord::new(
                SignalKind::Network,
                format!("{} ({})", bucket, count),
                strength,
                rng.gen_range(1.0..4.0),
                rng.gen_range(0.0..TAU),
            )
            .with_icon(*icon);
            Some(record)
        })
        .collect()
}

/// One signal per interface that moved packets, skipping loopback and
/// interfaces marked down with `*`. The first line is the table title.
pub fn interface_records<R: Rng + ?Sized>(listing: &str, rng: &mut R) -> Vec<SignalRecord> {
    listing
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let name = *fields.first()?;
            if fields.len() < 4 || name.starts_with("lo") || name.contains('*') {
                return None;
            }

            let packets = |index: usize| -> u64 {
                fields
                    .get(index)
                    .and_then(|value| value.parse().ok())
                    .unwrap_or(0)
            };
            let total = if fields.len() >= 8 {
                packets(3).saturating_add(packets(7))
            } else {
                0
            };
            if total == 0 {
                return None;
            }

            let (kind, icon) = if name.starts_with("en") || name.starts_with("eth") {
                (SignalKind::Network, "≋")
            } else if name.starts_with("wl") || name.starts_with("wifi") {
                (SignalKind::WiFi, "≋")
            } else {
                (SignalKind::Network, "▲")
            };
            let strength = (total / 1000).clamp(10, 100) as i32;
            let record = SignalRecord::new(
                kind,
                format!("{} Interface", name),
                strength,
                rng.gen_range(0.5..2.5),
                rng.gen_range(0.0..TAU),
            )
            .with_icon(icon);
            Some(record)
        })
        .collect()
}

#[async_trait]
impl Scanner for NetstatScanner {
    /// Either pass may fail on its own; the scan only fails when both do.
    async fn scan(&self, ctx: &ScanContext) -> ScanResult<Vec<SignalRecord>> {
        let (connections, interfaces) = ctx
            .guard(NAME, async {
                Ok(tokio::join!(self.run("-n"), self.run("-i")))
            })
            .await?;

        let mut rng = rand::thread_rng();
        let mut records = match connections {
            Ok(listing) => connection_records(&count_connections(&listing), &mut rng),
            Err(err) if interfaces.is_err() => return Err(err),
            Err(err) => {
                debug!("connection pass failed: {}", err);
                Vec::new()
            }
        };
        match interfaces {
            Ok(listing) => records.extend(interface_records(&listing, &mut rng)),
            Err(err) => debug!("interface pass failed: {}", err),
        }
        records.truncate(self.max_signals);
        Ok(records)
    }

    fn name(&self) -> &str {
        NAME
    }

    fn is_available(&self) -> bool {
        env::var_os("PATH")
            .map(|paths| env::split_paths(&paths).any(|dir| dir.join(NAME).is_file()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const LISTING: &str = "\
Active Internet connections (w/o servers)
Proto Recv-Q Send-Q Local Address           Foreign Address         State
tcp        0      0 10.0.0.5:51234          142.250.1.1:443         ESTABLISHED
tcp        0      0 10.0.0.5:51235          93.184.216.34:80        ESTABLISHED
tcp        0      0 10.0.0.5:40022          10.0.0.9:22             ESTABLISHED
tcp        0      0 10.0.0.5:51236          10.0.0.1:8080           ESTABLISHED
tcp        0      0 10.0.0.5:51237          10.0.0.1:9000           TIME_WAIT
";

    const INTERFACES: &str = "\
Kernel Interface table
Iface      MTU    RX-OK RX-ERR RX-DRP RX-OVR    TX-OK TX-ERR TX-DRP TX-OVR Flg
eth0      1500        0 250000      0      0        0 150000      0      0 BMRU
wlan0     1500        0   4000      0      0        0   1000      0      0 BMRU
lo       65536        0  90000      0      0        0  90000      0      0 LRU
tun0*     1500        0   9000      0      0        0   9000      0      0 MOPRU
docker0   1500        0 900000      0      0        0 900000      0      0 BMU
veth1     1500        0      0      0      0        0      0      0      0 BMRU
short0    1500        0  70000
";

    #[test]
    fn established_connections_are_bucketed_by_port() {
        let counts = count_connections(LISTING);
        assert_eq!(counts.get("HTTP"), Some(&2));
        assert_eq!(counts.get("SSH"), Some(&1));
        assert_eq!(counts.get("Other"), Some(&1));
        assert_eq!(counts.get("DNS"), None);
    }

    #[test]
    fn buckets_become_network_signals() {
        let counts = count_connections(LISTING);
        let mut rng = StdRng::seed_from_u64(4);
        let records = connection_records(&counts, &mut rng);

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["HTTP (2)", "SSH (1)", "Other (1)"]);
        assert_eq!(records[0].strength, 40);
        assert_eq!(records[1].icon.as_deref(), Some("🔐"));
        assert!(records.iter().all(|r| r.kind == SignalKind::Network));
        assert!(records.iter().all(|r| (1.0..4.0).contains(&r.distance)));
    }

    #[test]
    fn busy_buckets_cap_strength() {
        let listing = "tcp 0 0 a:1 b:443 ESTABLISHED\n".repeat(9);
        let counts = count_connections(&listing);
        let records = connection_records(&counts, &mut StdRng::seed_from_u64(1));
        assert_eq!(records[0].strength, 100);
    }

    #[test]
    fn ports_match_exactly_on_the_foreign_address() {
        let listing = "\
tcp        0      0 10.0.0.5:53124          10.0.0.9:22             ESTABLISHED
tcp        0      0 10.0.0.5:53999          10.0.0.1:8443           ESTABLISHED
tcp        0      0 10.0.0.5:22             10.0.0.7:53000          ESTABLISHED
tcp4       0      0 10.0.0.5.60000          10.0.0.2.53             ESTABLISHED
";
        let counts = count_connections(listing);
        assert_eq!(counts.get("SSH"), Some(&1));
        assert_eq!(counts.get("DNS"), Some(&1));
        assert_eq!(counts.get("Other"), Some(&2));
        assert_eq!(counts.get("HTTP"), None);
    }

    #[test]
    fn active_interfaces_become_signals() {
        let mut rng = StdRng::seed_from_u64(9);
        let records = interface_records(INTERFACES, &mut rng);

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["eth0 Interface", "wlan0 Interface", "docker0 Interface"]
        );

        assert_eq!(records[0].kind, SignalKind::Network);
        assert_eq!(records[0].icon.as_deref(), Some("≋"));
        assert_eq!(records[0].strength, 100);

        assert_eq!(records[1].kind, SignalKind::WiFi);
        assert_eq!(records[1].icon.as_deref(), Some("≋"));
        assert_eq!(records[1].strength, 10);

        assert_eq!(records[2].kind, SignalKind::Network);
        assert_eq!(records[2].icon.as_deref(), Some("▲"));
        assert!(records.iter().all(|r| (0.5..2.5).contains(&r.distance)));
    }

    #[test]
    fn interface_strength_scales_with_packets() {
        let listing = "Kernel Interface table\neno1 1500 0 40000 0 0 0 25000 0 0 BMRU\n";
        let records = interface_records(listing, &mut StdRng::seed_from_u64(2));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].strength, 65);
    }
}
