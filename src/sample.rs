//! The bounded per-channel sample ring and the deltas computed over it.

use std::collections::VecDeque;

/// One row per periodic tick, per channel.
///
/// `packets_local` is the side this channel's direction accounts for
/// (sent, for a sender channel; received, for a receiver channel).
/// `packets_remote` is the counterpart reported by the peer, when the
/// transport provided it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub t_ms: f64,
    pub packets_local: u64,
    pub packets_remote: Option<u64>,
    pub packets_lost: i64,
    pub rtt_seconds: Option<f64>,
}

/// Deltas computed over a [`SampleRing`]'s window (baseline → latest).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowDeltas {
    pub delta_local: i64,
    pub delta_lost: i64,
    /// `None` when neither end of the window had a remote packet count;
    /// callers fall back to `delta_local - delta_lost` in that case.
    pub delta_remote: Option<i64>,
    pub delta_t_seconds: f64,
    pub rtt_seconds: Option<f64>,
}

/// Fixed-capacity, ordered buffer of the most recent [`Sample`]s for one
/// channel.
///
/// The oldest retained sample is the "baseline" used as the left end of
/// every delta computation; it is evicted once the ring is full and a
/// new sample is pushed. A verdict requires `capacity + 1` distinct
/// samples (`capacity` deltas) to be held.
#[derive(Clone, Debug)]
pub struct SampleRing {
    capacity: usize,
    samples: VecDeque<Sample>,
}

impl SampleRing {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "sample ring capacity must be positive");
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Pushes a new sample, evicting the oldest once the ring exceeds
    /// `capacity + 1` entries (baseline + `capacity` window samples).
    pub fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity + 1 {
            self.samples.pop_front();
        }
    }

    /// Removes all retained samples, e.g. on epoch change.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of samples currently retained (including the baseline).
    #[must_use]
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Whether enough samples are retained to produce a verdict.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.count() >= self.capacity + 1
    }

    /// The oldest retained sample, used as the delta reference.
    #[must_use]
    pub fn baseline(&self) -> Option<&Sample> {
        self.samples.front()
    }

    /// The most recently pushed sample.
    #[must_use]
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// The sample pushed immediately before [`Self::latest`], used by
    /// the stall-detection state machine to test the single-tick delta
    /// rather than the whole window.
    #[must_use]
    pub fn previous(&self) -> Option<&Sample> {
        self.samples.iter().rev().nth(1)
    }

    /// Computes the deltas over the full window (baseline → latest).
    ///
    /// Returns `None` if fewer than two samples are held.
    #[must_use]
    pub fn window_deltas(&self) -> Option<WindowDeltas> {
        let baseline = self.baseline()?;
        let latest = self.latest()?;
        if std::ptr::eq(baseline, latest) {
            return None;
        }

        let delta_remote = match (baseline.packets_remote, latest.packets_remote)
        {
            (Some(b), Some(l)) => Some(l as i64 - b as i64),
            _ => None,
        };

        Some(WindowDeltas {
            delta_local: latest.packets_local as i64
                - baseline.packets_local as i64,
            delta_lost: latest.packets_lost - baseline.packets_lost,
            delta_remote,
            delta_t_seconds: (latest.t_ms - baseline.t_ms) / 1000.0,
            rtt_seconds: latest.rtt_seconds,
        })
    }

    /// Single-tick local-packet delta between the two most recent
    /// samples, used for zero-delta (stall) detection.
    #[must_use]
    pub fn last_tick_delta_local(&self) -> Option<i64> {
        let previous = self.previous()?;
        let latest = self.latest()?;
        Some(latest.packets_local as i64 - previous.packets_local as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t_ms: f64, packets_local: u64) -> Sample {
        Sample {
            t_ms,
            packets_local,
            packets_remote: Some(packets_local),
            packets_lost: 0,
            rtt_seconds: Some(0.1),
        }
    }

    #[test]
    fn not_ready_until_capacity_plus_one() {
        let mut ring = SampleRing::new(5);
        for i in 0..5 {
            ring.push(sample(f64::from(i) * 1000.0, i as u64 * 10));
            assert!(!ring.is_ready());
        }
        ring.push(sample(5000.0, 50));
        assert!(ring.is_ready());
        assert_eq!(ring.count(), 6);
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut ring = SampleRing::new(5);
        for i in 0..8 {
            ring.push(sample(f64::from(i) * 1000.0, i as u64 * 10));
        }
        assert_eq!(ring.count(), 6);
        assert_eq!(ring.baseline().unwrap().packets_local, 20);
        assert_eq!(ring.latest().unwrap().packets_local, 70);
    }

    #[test]
    fn window_deltas_use_baseline_and_latest() {
        let mut ring = SampleRing::new(5);
        for i in 0..6 {
            ring.push(sample(f64::from(i) * 1000.0, i as u64 * 50));
        }
        let deltas = ring.window_deltas().unwrap();
        assert_eq!(deltas.delta_local, 250);
        assert!((deltas.delta_t_seconds - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clear_resets_ring() {
        let mut ring = SampleRing::new(5);
        ring.push(sample(0.0, 1));
        ring.clear();
        assert_eq!(ring.count(), 0);
        assert!(!ring.is_ready());
    }
}
