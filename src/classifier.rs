//! The pure quality classifier.
//!
//! Stall detection (consecutive zero-delta ticks) lives in
//! [`crate::channel`]; this module only implements the threshold rules
//! evaluated once a ring has a full window and at least one packet was
//! transmitted this window.

use crate::{model::QualityLevel, sample::SampleRing};

const VERY_BAD_LOSS_RATIO: f64 = 0.2;
const BAD_LOSS_RATIO: f64 = 0.1;
const MEDIUM_LOSS_RATIO: f64 = 0.03;

const VERY_BAD_RTT_SECONDS: f64 = 1.0;
const BAD_RTT_SECONDS: f64 = 0.5;
const MEDIUM_RTT_SECONDS: f64 = 0.3;

const STARVED_PACKETS_PER_SECOND: f64 = 10.0;

/// Classifies a channel whose ring already has a full window
/// (`ring.is_ready()`), applying the §4.4 threshold rules in order.
///
/// Does not account for stall handling — callers must have already
/// decided this tick is not a suspended (stalled) one.
#[must_use]
pub fn classify(ring: &SampleRing) -> QualityLevel {
    let deltas = match ring.window_deltas() {
        Some(deltas) => deltas,
        None => return QualityLevel::Unknown,
    };

    let delta_remote = deltas
        .delta_remote
        .unwrap_or(deltas.delta_local - deltas.delta_lost);

    if delta_remote <= 0 && deltas.delta_local > 0 {
        return QualityLevel::NoTransmittedData;
    }

    let packet_loss_ratio =
        deltas.delta_lost as f64 / deltas.delta_local.max(1) as f64;
    let packets_per_second = if deltas.delta_t_seconds > 0.0 {
        deltas.delta_local as f64 / deltas.delta_t_seconds
    } else {
        0.0
    };
    let rtt = deltas.rtt_seconds;

    if packet_loss_ratio >= VERY_BAD_LOSS_RATIO
        || packets_per_second < STARVED_PACKETS_PER_SECOND
        || rtt.map_or(false, |rtt| rtt > VERY_BAD_RTT_SECONDS)
    {
        return QualityLevel::VeryBad;
    }

    if (BAD_LOSS_RATIO..VERY_BAD_LOSS_RATIO).contains(&packet_loss_ratio)
        || rtt.map_or(false, |rtt| {
            rtt > BAD_RTT_SECONDS && rtt <= VERY_BAD_RTT_SECONDS
        })
    {
        return QualityLevel::Bad;
    }

    if (MEDIUM_LOSS_RATIO..BAD_LOSS_RATIO).contains(&packet_loss_ratio)
        || rtt.map_or(false, |rtt| {
            rtt > MEDIUM_RTT_SECONDS && rtt <= BAD_RTT_SECONDS
        })
    {
        return QualityLevel::Medium;
    }

    QualityLevel::Good
}
