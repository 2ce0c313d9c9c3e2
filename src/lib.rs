//! Periodic sampling and classification of live media transport quality.
//!
//! [`ConnectionQualityAnalyzer`] attaches to a [`StatsSource`] — an
//! adapter over whatever transport the embedder is driving — and, once
//! attached, samples it on a fixed cadence, maintaining one ordered
//! [`QualityLevel`] per (audio, video) channel for the attached
//! [`PeerDirection`]. Embedders read the current level directly or
//! subscribe to change events; see [`ConnectionQualityAnalyzer`] for the
//! full surface.
//!
//! Out of scope: establishing or negotiating the transport itself, and
//! anything resembling a wire protocol — this crate only consumes a
//! `getStats()`-shaped snapshot and turns it into a verdict.

#![deny(broken_intra_doc_links)]
#![warn(missing_docs)]

mod analyzer;
mod channel;
mod classifier;
mod config;
mod driver;
mod emitter;
mod error;
mod extractor;
mod model;
mod sample;
mod stats;

pub use crate::{
    analyzer::ConnectionQualityAnalyzer,
    config::{AnalyzerConfig, DEFAULT_RING_CAPACITY, DEFAULT_TICK_PERIOD},
    emitter::SubscriptionId,
    error::AnalyzerError,
    model::{MediaKind, PeerDirection, QualityLevel, TransportState},
    stats::{ReadStatsError, StatKind, StatRecord, StatsSource},
};
