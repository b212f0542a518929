use std::cmp::Ordering;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A point on the simulated clock, in seconds from simulation start.
///
/// Simulated time is distinct from wall-clock time: waits and samples are
/// scheduled against it, while run timeouts use the host clock.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimePoint(f64);

impl TimePoint {
    pub const ZERO: TimePoint = TimePoint(0.0);

    pub fn from_secs(secs: f64) -> Self {
        TimePoint(secs)
    }

    pub fn secs(self) -> f64 {
        self.0
    }

    /// Duration from simulation start to this point.
    pub fn as_duration(self) -> Duration {
        Duration::from_secs_f64(self.0.max(0.0))
    }

    /// Shift later by `secs` (guard band after an edge).
    pub fn plus(self, secs: f64) -> TimePoint {
        TimePoint(self.0 + secs)
    }

    /// Shift earlier by `secs`, clamped at zero (guard band before an edge
    /// is added, never subtracted past the start of simulation).
    pub fn minus_clamped(self, secs: f64) -> TimePoint {
        TimePoint((self.0 - secs).max(0.0))
    }

    /// Total order over timestamps, usable as a sort key.
    pub fn total_cmp(&self, other: &TimePoint) -> Ordering {
        self.0.total_cmp(&other.0)
    }

    /// Fixed six-decimal rendering used for artifact rows.
    pub fn render(self) -> String {
        format!("{:.6}", self.0)
    }
}

impl std::fmt::Display for TimePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}
