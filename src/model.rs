//! Core enumerations shared by every layer of the analyzer.

/// Qualitative classification of a channel's perceived transport quality.
///
/// Ordered from worst to best for degradation comparisons, except
/// [`QualityLevel::Unknown`], which sits outside the ordering: it denotes
/// the absence of a verdict (warmup, detached transport, or a just-reset
/// channel) rather than a severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QualityLevel {
    NoTransmittedData,
    VeryBad,
    Bad,
    Medium,
    Good,
    Unknown,
}

impl QualityLevel {
    /// Ordinal used to compare two *classified* levels (i.e. neither is
    /// [`QualityLevel::Unknown`]). Higher is better.
    fn severity_rank(self) -> Option<u8> {
        match self {
            Self::NoTransmittedData => Some(0),
            Self::VeryBad => Some(1),
            Self::Bad => Some(2),
            Self::Medium => Some(3),
            Self::Good => Some(4),
            Self::Unknown => None,
        }
    }

    /// Compares two levels by severity, returning [`None`] if either side
    /// is [`QualityLevel::Unknown`] — `Unknown` is deliberately excluded
    /// from degradation comparisons rather than being given an arbitrary
    /// place in the ordering.
    #[must_use]
    pub fn degradation_cmp(
        self,
        other: Self,
    ) -> Option<std::cmp::Ordering> {
        Some(self.severity_rank()?.cmp(&other.severity_rank()?))
    }
}

/// Direction of a media transceiver relative to this peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeerDirection {
    Sender,
    Receiver,
}

/// Kind of media carried by a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

/// Phase of the underlying media transport, as reported by the
/// [`StatsSource`][crate::stats::StatsSource].
///
/// Analysis runs only while the transport is in [`Self::Connected`] or
/// [`Self::Completed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportState {
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

impl TransportState {
    /// Indicates whether the analyzer should be running while the
    /// transport is in this state.
    #[must_use]
    pub fn is_analyzable(self) -> bool {
        matches!(self, Self::Connected | Self::Completed)
    }
}
