use std::time::Duration;

use lantern_plan::plan::RunSettings;

/// Knobs for one orchestrated run.
///
/// The guard band and completion timeout default to the empirically-chosen
/// values (2 ms, 6 s) but stay configurable per run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Wall-clock deadline for the completion sentinel.
    pub timeout: Duration,
    /// Simulated-seconds offset absorbing backend scheduling jitter around
    /// stimulus edges.
    pub guard_band_secs: f64,
    /// Line content that signals run completion.
    pub sentinel: String,
    /// Enabled artifacts.
    pub capture: bool,
    pub sampling: bool,
    /// Wall-clock window for driver/sampler to finish naturally after the
    /// completion race before they are cancelled.
    pub join_grace: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(6),
            guard_band_secs: 0.002,
            sentinel: "DONE".to_string(),
            capture: true,
            sampling: true,
            join_grace: Duration::from_secs(2),
        }
    }
}

impl RunConfig {
    pub fn from_settings(settings: &RunSettings) -> Self {
        Self {
            timeout: Duration::from_secs_f64(settings.timeout_secs),
            guard_band_secs: settings.guard_band_secs,
            sentinel: settings.sentinel.clone(),
            capture: settings.capture,
            sampling: settings.sampling,
            ..Self::default()
        }
    }
}
