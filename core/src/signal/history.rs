use std::collections::VecDeque;
use std::time::Instant;

/// Position of a signal at one history update. Never mutated once recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub distance: f64,
    pub angle: f64,
    pub strength: u8,
    pub timestamp: Instant,
    pub was_illuminated: bool,
}

/// Bounded trail of samples, oldest first. Pushing onto a full trail drops
/// the oldest sample.
#[derive(Debug, Clone)]
pub struct PositionHistory {
    samples: VecDeque<PositionSample>,
    capacity: usize,
}

impl PositionHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: PositionSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn oldest(&self) -> Option<&PositionSample> {
        self.samples.front()
    }

    pub fn latest(&self) -> Option<&PositionSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &PositionSample> + '_ {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample(at: Instant, distance: f64) -> PositionSample {
        PositionSample {
            distance,
            angle: 0.0,
            strength: 50,
            timestamp: at,
            was_illuminated: false,
        }
    }

    #[test]
    fn history_evicts_oldest_when_full() {
        let start = Instant::now();
        let mut history = PositionHistory::with_capacity(3);
        for step in 0..4 {
            history.push(sample(start + Duration::from_secs(step), step as f64));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.oldest().map(|s| s.distance), Some(1.0));
        assert_eq!(history.latest().map(|s| s.distance), Some(3.0));
    }

    #[test]
    fn zero_capacity_still_keeps_latest_sample() {
        let mut history = PositionHistory::with_capacity(0);
        history.push(sample(Instant::now(), 1.0));
        history.push(sample(Instant::now(), 2.0));
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.latest().map(|s| s.distance), Some(2.0));
    }
}
