//! Stats source contract and the record types read from it.
//!
//! Mirrors the WebRTC `getStats()` report shape, but keeps only the
//! handful of record types and fields the analyzer consumes. Absent
//! numeric fields are modeled as `Option`, never silently coerced to
//! zero — the extractor (see [`crate::extractor`]) is the only place
//! that resolves an absent remote packet count to a derived value.

use async_trait::async_trait;
use derive_more::Display;

use crate::model::{MediaKind, TransportState};

/// Discriminant of a [`StatRecord`], mirroring the WebRTC stats report
/// `type` field for the four record kinds the analyzer reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatKind {
    OutboundRtp,
    InboundRtp,
    RemoteInboundRtp,
    RemoteOutboundRtp,
}

/// One entry of a stats snapshot returned by
/// [`StatsSource::read_stats`].
///
/// Any numeric field may be absent: the transport may not have
/// populated it yet, or the underlying report may simply not carry it
/// for this record kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatRecord {
    pub kind_tag: StatKind,
    pub media: MediaKind,
    pub packets_sent: Option<u64>,
    pub packets_received: Option<u64>,
    pub packets_lost: Option<i64>,
    pub round_trip_time: Option<f64>,
    pub timestamp: Option<f64>,
}

impl StatRecord {
    /// Convenience constructor for an otherwise-empty record of the
    /// given `kind_tag`/`media`; fields are filled in with the builder
    /// methods below.
    #[must_use]
    pub fn new(kind_tag: StatKind, media: MediaKind) -> Self {
        Self {
            kind_tag,
            media,
            packets_sent: None,
            packets_received: None,
            packets_lost: None,
            round_trip_time: None,
            timestamp: None,
        }
    }

    #[must_use]
    pub fn with_packets_sent(mut self, value: u64) -> Self {
        self.packets_sent = Some(value);
        self
    }

    #[must_use]
    pub fn with_packets_received(mut self, value: u64) -> Self {
        self.packets_received = Some(value);
        self
    }

    #[must_use]
    pub fn with_packets_lost(mut self, value: i64) -> Self {
        self.packets_lost = Some(value);
        self
    }

    #[must_use]
    pub fn with_round_trip_time(mut self, value: f64) -> Self {
        self.round_trip_time = Some(value);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, value: f64) -> Self {
        self.timestamp = Some(value);
        self
    }
}

/// Transient failure reading a stats snapshot from the transport.
///
/// Absorbed by the driver (see §7 of the design doc): a tick that fails
/// this way is treated as a stalled read rather than surfaced to the
/// caller.
#[derive(Clone, Debug, Display)]
#[display(fmt = "failed to read transport stats: {}", reason)]
pub struct ReadStatsError {
    pub reason: String,
}

impl ReadStatsError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Abstraction over the live media transport that the analyzer reads
/// from. Out of scope of this crate: establishing, negotiating, or
/// otherwise driving the transport itself.
///
/// `Send + Sync` so the driver can hold it as `Arc<dyn StatsSource>` and
/// read it from whichever `tokio` worker thread its periodic task
/// happens to run on.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Current transport phase.
    fn state(&self) -> TransportState;

    /// Registers a handler invoked whenever the transport's
    /// [`TransportState`] changes.
    fn on_state_change(&self, handler: Box<dyn Fn(TransportState) + Send>);

    /// Reads a stats snapshot for the current instant.
    ///
    /// Legitimately may return a snapshot that omits counters the
    /// transport has not yet populated; see the field docs on
    /// [`StatRecord`].
    async fn read_stats(&self) -> Result<Vec<StatRecord>, ReadStatsError>;
}
