//! Per-direction metric extraction from a raw stats snapshot.

use crate::{
    model::{MediaKind, PeerDirection},
    sample::Sample,
    stats::{StatKind, StatRecord},
};

/// Pulls the values needed for one channel's [`Sample`] out of a
/// snapshot, tolerating absent counters and unrelated records.
///
/// Returns `None` if the required local record is missing, lacks its
/// mandatory counter, or lacks a timestamp — the caller treats this as
/// a stalled tick (see [`crate::channel`]).
#[must_use]
pub fn extract_sample(
    snapshot: &[StatRecord],
    direction: PeerDirection,
    kind: MediaKind,
) -> Option<Sample> {
    let (local_kind, remote_kind) = match direction {
        PeerDirection::Sender => {
            (StatKind::OutboundRtp, StatKind::RemoteInboundRtp)
        }
        PeerDirection::Receiver => {
            (StatKind::InboundRtp, StatKind::RemoteOutboundRtp)
        }
    };

    let local = match find_record(snapshot, local_kind, kind) {
        Some(local) => local,
        None => {
            log::debug!(
                "no {:?}/{:?} record in this tick's snapshot",
                local_kind,
                kind
            );
            return None;
        }
    };
    let packets_local = match direction {
        PeerDirection::Sender => local.packets_sent,
        PeerDirection::Receiver => local.packets_received,
    };
    let (packets_local, timestamp) = match (packets_local, local.timestamp) {
        (Some(packets_local), Some(timestamp)) => (packets_local, timestamp),
        _ => {
            log::debug!(
                "{:?}/{:?} record missing its mandatory counter or timestamp",
                local_kind,
                kind
            );
            return None;
        }
    };

    let remote = find_record(snapshot, remote_kind, kind);
    let packets_remote = remote.and_then(|r| r.packets_received);
    let packets_lost = remote.and_then(|r| r.packets_lost).unwrap_or(0);
    let rtt_seconds = remote.and_then(|r| r.round_trip_time);

    log::debug!(
        "{:?} sample: packets_local={} packets_remote={:?} packets_lost={} \
         rtt_seconds={:?}",
        kind,
        packets_local,
        packets_remote,
        packets_lost,
        rtt_seconds
    );

    Some(Sample {
        t_ms: timestamp,
        packets_local,
        packets_remote,
        packets_lost,
        rtt_seconds,
    })
}

fn find_record(
    snapshot: &[StatRecord],
    kind_tag: StatKind,
    media: MediaKind,
) -> Option<&StatRecord> {
    snapshot
        .iter()
        .find(|record| record.kind_tag == kind_tag && record.media == media)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_sender_sample() {
        let snapshot = vec![
            StatRecord::new(StatKind::OutboundRtp, MediaKind::Audio)
                .with_packets_sent(100)
                .with_timestamp(5000.0),
            StatRecord::new(StatKind::RemoteInboundRtp, MediaKind::Audio)
                .with_packets_received(95)
                .with_packets_lost(5)
                .with_round_trip_time(0.2),
        ];
        let sample =
            extract_sample(&snapshot, PeerDirection::Sender, MediaKind::Audio)
                .unwrap();
        assert_eq!(sample.packets_local, 100);
        assert_eq!(sample.packets_remote, Some(95));
        assert_eq!(sample.packets_lost, 5);
        assert_eq!(sample.rtt_seconds, Some(0.2));
        assert_eq!(sample.t_ms, 5000.0);
    }

    #[test]
    fn missing_local_counter_stalls() {
        let snapshot = vec![StatRecord::new(
            StatKind::OutboundRtp,
            MediaKind::Audio,
        )
        .with_timestamp(5000.0)];
        assert!(extract_sample(
            &snapshot,
            PeerDirection::Sender,
            MediaKind::Audio
        )
        .is_none());
    }

    #[test]
    fn missing_remote_record_degrades_gracefully() {
        let snapshot = vec![StatRecord::new(
            StatKind::OutboundRtp,
            MediaKind::Video,
        )
        .with_packets_sent(10)
        .with_timestamp(1000.0)];
        let sample =
            extract_sample(&snapshot, PeerDirection::Sender, MediaKind::Video)
                .unwrap();
        assert_eq!(sample.packets_remote, None);
        assert_eq!(sample.packets_lost, 0);
        assert_eq!(sample.rtt_seconds, None);
    }

    #[test]
    fn ignores_records_of_other_media_kind() {
        let snapshot = vec![
            StatRecord::new(StatKind::OutboundRtp, MediaKind::Video)
                .with_packets_sent(10)
                .with_timestamp(1000.0),
        ];
        assert!(extract_sample(
            &snapshot,
            PeerDirection::Sender,
            MediaKind::Audio
        )
        .is_none());
    }

    #[test]
    fn receiver_reads_inbound_and_remote_outbound() {
        let snapshot = vec![
            StatRecord::new(StatKind::InboundRtp, MediaKind::Audio)
                .with_packets_received(40)
                .with_timestamp(2000.0),
            StatRecord::new(StatKind::RemoteOutboundRtp, MediaKind::Audio)
                .with_round_trip_time(0.05),
        ];
        let sample = extract_sample(
            &snapshot,
            PeerDirection::Receiver,
            MediaKind::Audio,
        )
        .unwrap();
        assert_eq!(sample.packets_local, 40);
        assert_eq!(sample.rtt_seconds, Some(0.05));
    }
}
