//! The analyzer's sole caller-visible error type.
//!
//! Every other failure mode described in the design doc (transient
//! read failures, malformed stats, observer panics) is absorbed by the
//! internal state machine and never reaches the caller; see
//! [`crate::driver`] and [`crate::emitter`].

use derive_more::Display;

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq)]
pub enum AnalyzerError {
    /// Returned by [`crate::analyzer::ConnectionQualityAnalyzer::try_set_peer_connection`]
    /// when a source is already attached and the caller asked for the
    /// strict (non-replacing) attach behavior.
    #[display(fmt = "a peer connection is already attached")]
    AlreadyAttached,
}
