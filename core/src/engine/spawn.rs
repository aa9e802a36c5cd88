use crate::signal::{Signal, SignalKind, SignalLimits, SignalOrigin, SignalRecord};
use rand::seq::SliceRandom;
use rand::Rng;
use std::f64::consts::TAU;
use std::time::Instant;

/// Probability that a kind past the first four joins the opening picture.
const OPTIONAL_KIND_PROBABILITY: f64 = 0.7;

/// One simulated emitter of a random kind.
pub fn simulated_signal<R: Rng + ?Sized>(rng: &mut R, now: Instant, limits: SignalLimits) -> Signal {
    let kind = SignalKind::SIMULATED
        .choose(rng)
        .copied()
        .unwrap_or(SignalKind::WiFi);
    let record = random_record(rng, kind, format!("SIM-{}", kind.label()));
    Signal::from_record(&record, SignalOrigin::Simulated, now, limits)
}

/// Opening set of simulated signals: the first four kinds always, the rest
/// by chance, each with a catalog name and a random animation phase.
pub fn initial_signals<R: Rng + ?Sized>(
    rng: &mut R,
    now: Instant,
    limits: SignalLimits,
) -> Vec<Signal> {
    let mut signals = Vec::new();
    for (index, kind) in SignalKind::SIMULATED.iter().copied().enumerate() {
        if index >= 4 && !rng.gen_bool(OPTIONAL_KIND_PROBABILITY) {
            continue;
        }
        let name = kind
            .catalog_names()
            .choose(rng)
            .copied()
            .unwrap_or_else(|| kind.label());
        let record = random_record(rng, kind, name.to_string());
        let phase = rng.gen_range(0..4);
        signals.push(Signal::from_record(&record, SignalOrigin::Simulated, now, limits).with_phase(phase));
    }
    signals
}

fn random_record<R: Rng + ?Sized>(rng: &mut R, kind: SignalKind, name: String) -> SignalRecord {
    SignalRecord::new(
        kind,
        name,
        rng.gen_range(50..=100),
        rng.gen_range(2.0..6.0),
        rng.gen_range(0.0..TAU),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn initial_set_always_contains_the_core_kinds() {
        let mut rng = StdRng::seed_from_u64(42);
        let signals = initial_signals(&mut rng, Instant::now(), SignalLimits::default());

        assert!((4..=6).contains(&signals.len()));
        for kind in &SignalKind::SIMULATED[..4] {
            assert!(signals.iter().any(|s| s.kind == *kind));
        }
        for signal in &signals {
            assert!(signal.kind.catalog_names().contains(&signal.name.as_str()));
            assert!(signal.phase() < 4);
            assert!((50..=100).contains(&signal.strength()));
        }
    }

    #[test]
    fn simulated_signals_are_tagged_and_named_after_their_kind() {
        let mut rng = StdRng::seed_from_u64(1);
        let signal = simulated_signal(&mut rng, Instant::now(), SignalLimits::default());
        assert_eq!(signal.origin, SignalOrigin::Simulated);
        assert_eq!(signal.name, format!("SIM-{}", signal.kind.label()));
        assert_ne!(signal.kind, SignalKind::Network);
    }
}
