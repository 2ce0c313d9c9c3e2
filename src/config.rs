//! Constants the driver and classifier are calibrated against.
//!
//! Production code always uses [`AnalyzerConfig::default`]; the seam
//! exists so integration tests can drive the engine without depending
//! on the real 1-second cadence, and so the sample ring's capacity is
//! not hard-coded deep inside the driver.

use std::time::Duration;

/// The driver's fixed tick period, contractual for production use
/// (§6): the classifier's `packets_per_second` threshold is calibrated
/// to the ~5-second window this implies at the default ring capacity.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(1000);

/// Number of samples retained per channel (`N` in the design doc).
pub const DEFAULT_RING_CAPACITY: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalyzerConfig {
    pub tick_period: Duration,
    pub ring_capacity: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            ring_capacity: DEFAULT_RING_CAPACITY,
        }
    }
}
