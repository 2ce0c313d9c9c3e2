//! Per-channel state machine: warmup, steady-state classification, and
//! stall tolerance leading to a terminal "dead" (no transmitted data)
//! state.

use crate::{
    classifier::classify,
    model::QualityLevel,
    sample::{Sample, SampleRing},
};

/// Consecutive zero-delta ticks tolerated before a channel is declared
/// dead (§4.5).
const STALL_TICKS_BEFORE_DEAD: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunState {
    /// Fewer than `capacity + 1` samples retained; level is `Unknown`.
    Warmup,
    /// Enough samples retained; the classifier runs each non-stalled
    /// tick.
    Ready,
    /// Three consecutive zero-delta ticks observed; level is pinned to
    /// `NoTransmittedData` until a positive delta is seen again.
    Dead,
}

/// State owned by one (direction, kind) analyzer.
#[derive(Debug)]
pub struct ChannelState {
    ring: SampleRing,
    current_level: QualityLevel,
    consecutive_stall_count: u8,
    run_state: RunState,
    epoch: u64,
}

impl ChannelState {
    #[must_use]
    pub fn new(ring_capacity: usize) -> Self {
        Self {
            ring: SampleRing::new(ring_capacity),
            current_level: QualityLevel::Unknown,
            consecutive_stall_count: 0,
            run_state: RunState::Warmup,
            epoch: 0,
        }
    }

    #[must_use]
    pub fn current_level(&self) -> QualityLevel {
        self.current_level
    }

    /// Resets the channel to a fresh warmup phase under the given
    /// epoch; used on detach, transport failure, or a transition out of
    /// the connected set.
    pub fn reset(&mut self, epoch: u64) {
        self.ring.clear();
        self.current_level = QualityLevel::Unknown;
        self.consecutive_stall_count = 0;
        self.run_state = RunState::Warmup;
        self.epoch = epoch;
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Advances the channel by one tick and returns the resulting
    /// level. `sample` is `None` when the extractor produced nothing
    /// usable this tick (a transient read failure or malformed stats);
    /// such ticks are treated as stalled reads.
    pub fn advance(&mut self, sample: Option<Sample>) -> QualityLevel {
        let sample = match sample {
            Some(sample) => sample,
            None => {
                self.register_stall_if_running();
                return self.current_level;
            }
        };

        self.ring.push(sample);

        if !self.ring.is_ready() {
            self.run_state = RunState::Warmup;
            self.current_level = QualityLevel::Unknown;
            return self.current_level;
        }

        let last_tick_delta = self.ring.last_tick_delta_local().unwrap_or(0);
        if last_tick_delta == 0 {
            self.register_stall_if_running();
            return self.current_level;
        }

        self.consecutive_stall_count = 0;
        self.run_state = RunState::Ready;
        self.current_level = classify(&self.ring);
        self.current_level
    }

    /// Records a zero-delta (or failed) tick: the previously emitted
    /// level is retained unless the stall has now persisted for
    /// [`STALL_TICKS_BEFORE_DEAD`] consecutive ticks, in which case the
    /// channel is declared dead.
    fn register_stall_if_running(&mut self) {
        if self.run_state == RunState::Warmup {
            return;
        }
        self.consecutive_stall_count =
            self.consecutive_stall_count.saturating_add(1);
        if self.consecutive_stall_count >= STALL_TICKS_BEFORE_DEAD {
            self.run_state = RunState::Dead;
            self.current_level = QualityLevel::NoTransmittedData;
        }
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
    fn unknown_until_warmup_completes() {
        let mut channel = ChannelState::new(5);
        for i in 0..5 {
            let level = channel.advance(Some(sample(
                f64::from(i) * 1000.0,
                u64::from(i) * 50,
            )));
            assert_eq!(level, QualityLevel::Unknown);
        }
        let level = channel.advance(Some(sample(5000.0, 250)));
        assert_eq!(level, QualityLevel::Good);
    }

    #[test]
    fn single_stall_tick_retains_level() {
        let mut channel = ChannelState::new(5);
        for i in 0..6 {
            channel.advance(Some(sample(f64::from(i) * 1000.0, u64::from(i) * 50)));
        }
        assert_eq!(channel.current_level(), QualityLevel::Good);

        // One stalled tick (same packet count): level retained.
        let level = channel.advance(Some(sample(6000.0, 250)));
        assert_eq!(level, QualityLevel::Good);
    }

    #[test]
    fn three_consecutive_stalls_declare_dead() {
        let mut channel = ChannelState::new(5);
        for i in 0..6 {
            channel.advance(Some(sample(f64::from(i) * 1000.0, u64::from(i) * 50)));
        }
        assert_eq!(channel.current_level(), QualityLevel::Good);

        channel.advance(Some(sample(6000.0, 250)));
        channel.advance(Some(sample(7000.0, 250)));
        let level = channel.advance(Some(sample(8000.0, 250)));
        assert_eq!(level, QualityLevel::NoTransmittedData);
    }

    #[test]
    fn positive_delta_after_stall_resumes_classification() {
        let mut channel = ChannelState::new(5);
        for i in 0..6 {
            channel.advance(Some(sample(f64::from(i) * 1000.0, u64::from(i) * 50)));
        }
        channel.advance(Some(sample(6000.0, 250)));
        let level = channel.advance(Some(sample(7000.0, 300)));
        assert_eq!(level, QualityLevel::Good);
    }

    #[test]
    fn failed_extraction_counts_as_stall() {
        let mut channel = ChannelState::new(5);
        for i in 0..6 {
            channel.advance(Some(sample(f64::from(i) * 1000.0, u64::from(i) * 50)));
        }
        assert_eq!(channel.current_level(), QualityLevel::Good);
        channel.advance(None);
        channel.advance(None);
        let level = channel.advance(None);
        assert_eq!(level, QualityLevel::NoTransmittedData);
    }

    #[test]
    fn reset_returns_to_warmup() {
        let mut channel = ChannelState::new(5);
        for i in 0..6 {
            channel.advance(Some(sample(f64::from(i) * 1000.0, u64::from(i) * 50)));
        }
        assert_eq!(channel.current_level(), QualityLevel::Good);
        channel.reset(1);
        assert_eq!(channel.current_level(), QualityLevel::Unknown);
        assert_eq!(channel.epoch(), 1);
        let level = channel.advance(Some(sample(0.0, 0)));
        assert_eq!(level, QualityLevel::Unknown);
    }
}
