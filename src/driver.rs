//! The periodic tick: reads a stats snapshot, feeds the extractors,
//! advances each channel's state machine, and reports what changed.
//!
//! One [`Driver`] tracks the two channels (audio, video) for whichever
//! [`PeerDirection`] it is currently bound to — attaching with
//! [`PeerDirection::Sender`] tracks the two sender channels, attaching
//! with [`PeerDirection::Receiver`] tracks the two receiver channels.
//! A deployment that needs both directions at once runs two analyzers.

use crate::{
    channel::ChannelState,
    config::AnalyzerConfig,
    extractor::extract_sample,
    model::{MediaKind, PeerDirection, QualityLevel},
    stats::StatRecord,
};

/// Outcome of classifying one channel during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelTickResult {
    pub kind: MediaKind,
    pub level: QualityLevel,
    pub changed: bool,
}

/// Outcome of a single driver tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickOutcome {
    /// Audio result first, then video — the order in which the facade
    /// must fire events for this tick.
    pub results: [ChannelTickResult; 2],
}

/// Owns the two per-media-kind [`ChannelState`]s for one direction and
/// advances them from a stats snapshot.
pub struct Driver {
    direction: PeerDirection,
    audio: ChannelState,
    video: ChannelState,
}

impl Driver {
    #[must_use]
    pub fn new(direction: PeerDirection, config: &AnalyzerConfig) -> Self {
        Self {
            direction,
            audio: ChannelState::new(config.ring_capacity),
            video: ChannelState::new(config.ring_capacity),
        }
    }

    #[must_use]
    pub fn direction(&self) -> PeerDirection {
        self.direction
    }

    #[must_use]
    pub fn level(&self, kind: MediaKind) -> QualityLevel {
        match kind {
            MediaKind::Audio => self.audio.current_level(),
            MediaKind::Video => self.video.current_level(),
        }
    }

    /// Resets both channels to a fresh warmup phase under `epoch`,
    /// e.g. on detach or on a transport transition out of the
    /// connected set.
    pub fn reset(&mut self, epoch: u64) {
        self.audio.reset(epoch);
        self.video.reset(epoch);
    }

    /// Advances both channels from one stats snapshot. The snapshot may
    /// be `None` when the stats read failed or its epoch went stale
    /// before it resolved — both channels are then treated as stalled
    /// this tick.
    pub fn advance(&mut self, snapshot: Option<&[StatRecord]>) -> TickOutcome {
        let audio_before = self.audio.current_level();
        let video_before = self.video.current_level();

        let audio_sample = snapshot
            .and_then(|s| extract_sample(s, self.direction, MediaKind::Audio));
        let video_sample = snapshot
            .and_then(|s| extract_sample(s, self.direction, MediaKind::Video));

        let audio_level = self.audio.advance(audio_sample);
        let video_level = self.video.advance(video_sample);

        TickOutcome {
            results: [
                ChannelTickResult {
                    kind: MediaKind::Audio,
                    level: audio_level,
                    changed: audio_level != audio_before,
                },
                ChannelTickResult {
                    kind: MediaKind::Video,
                    level: video_level,
                    changed: video_level != video_before,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatKind;

    fn outbound(media: MediaKind, sent: u64, t_ms: f64) -> StatRecord {
        StatRecord::new(StatKind::OutboundRtp, media)
            .with_packets_sent(sent)
            .with_timestamp(t_ms)
    }

    fn remote_inbound(media: MediaKind, received: u64) -> StatRecord {
        StatRecord::new(StatKind::RemoteInboundRtp, media)
            .with_packets_received(received)
            .with_packets_lost(0)
            .with_round_trip_time(0.1)
    }

    #[test]
    fn independent_audio_and_video_channels() {
        let mut driver =
            Driver::new(PeerDirection::Sender, &AnalyzerConfig::default());

        for i in 0..6u64 {
            let t_ms = i as f64 * 1000.0;
            let snapshot = vec![
                outbound(MediaKind::Audio, i * 50, t_ms),
                remote_inbound(MediaKind::Audio, i * 50),
                outbound(MediaKind::Video, i * 50, t_ms),
                StatRecord::new(StatKind::RemoteInboundRtp, MediaKind::Video)
                    .with_packets_received(0)
                    .with_packets_lost(i * 50)
                    .with_round_trip_time(0.1),
            ];
            driver.advance(Some(&snapshot));
        }

        assert_eq!(driver.level(MediaKind::Audio), QualityLevel::Good);
        assert_eq!(
            driver.level(MediaKind::Video),
            QualityLevel::NoTransmittedData
        );
    }

    #[test]
    fn missing_snapshot_stalls_both_channels() {
        let mut driver =
            Driver::new(PeerDirection::Sender, &AnalyzerConfig::default());
        for i in 0..6u64 {
            let t_ms = i as f64 * 1000.0;
            let snapshot = vec![
                outbound(MediaKind::Audio, i * 50, t_ms),
                remote_inbound(MediaKind::Audio, i * 50),
                outbound(MediaKind::Video, i * 50, t_ms),
                remote_inbound(MediaKind::Video, i * 50),
            ];
            driver.advance(Some(&snapshot));
        }
        assert_eq!(driver.level(MediaKind::Audio), QualityLevel::Good);

        let outcome = driver.advance(None);
        assert!(!outcome.results[0].changed);
        assert_eq!(driver.level(MediaKind::Audio), QualityLevel::Good);
    }
}
