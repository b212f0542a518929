use std::path::PathBuf;

use lantern_grade::compare::MatchMode;
use serde::{Deserialize, Serialize};

use crate::time::TimePoint;

/// A named (target, signal) pair sampled at scheduled timestamps.
/// `label` is the column identifier in the probe artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Probe {
    pub target: String,
    pub signal: String,
    pub label: String,
}

/// One assert/deassert pair on the stimulus control.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StimulusEvent {
    pub assert_time: TimePoint,
    pub deassert_time: TimePoint,
}

/// The ordered input-drive plan: which control to toggle, and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StimulusPlan {
    pub target: String,
    pub control: String,
    #[serde(default)]
    pub events: Vec<StimulusEvent>,
}

/// Inputs to the schedule builder: fixed checkpoints plus a seeded random
/// subset drawn uniformly from `window`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulePlan {
    #[serde(default)]
    pub fixed_times: Vec<TimePoint>,
    #[serde(default)]
    pub random_count: usize,
    pub window: (TimePoint, TimePoint),
    /// Fixed seed for reproducible runs; absent means entropy-seeded.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Run-level knobs. Defaults preserve the empirically-chosen constants
/// (6 s timeout, 2 ms guard band).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
    #[serde(default = "default_guard_band_secs")]
    pub guard_band_secs: f64,
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
    /// Enabled artifacts: serial capture and/or probe sampling.
    #[serde(default = "default_true")]
    pub capture: bool,
    #[serde(default = "default_true")]
    pub sampling: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            guard_band_secs: default_guard_band_secs(),
            sentinel: default_sentinel(),
            capture: true,
            sampling: true,
        }
    }
}

fn default_timeout_secs() -> f64 {
    6.0
}

fn default_guard_band_secs() -> f64 {
    0.002
}

fn default_sentinel() -> String {
    "DONE".to_string()
}

fn default_true() -> bool {
    true
}

/// Where run artifacts are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactPaths {
    #[serde(default = "default_artifact_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_capture_name")]
    pub capture: String,
    #[serde(default = "default_probes_name")]
    pub probes: String,
}

impl ArtifactPaths {
    pub fn capture_path(&self) -> PathBuf {
        self.dir.join(&self.capture)
    }

    pub fn probes_path(&self) -> PathBuf {
        self.dir.join(&self.probes)
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            dir: default_artifact_dir(),
            capture: default_capture_name(),
            probes: default_probes_name(),
        }
    }
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_capture_name() -> String {
    "serial.txt".to_string()
}

fn default_probes_name() -> String {
    "probes.csv".to_string()
}

/// Optional golden references and their match modes, per artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenPlan {
    #[serde(default)]
    pub capture: Option<PathBuf>,
    #[serde(default = "default_mode")]
    pub capture_mode: MatchMode,
    #[serde(default)]
    pub probes: Option<PathBuf>,
    #[serde(default = "default_mode")]
    pub probes_mode: MatchMode,
}

impl Default for GoldenPlan {
    fn default() -> Self {
        Self {
            capture: None,
            capture_mode: MatchMode::Exact,
            probes: None,
            probes_mode: MatchMode::Exact,
        }
    }
}

fn default_mode() -> MatchMode {
    MatchMode::Exact
}

/// The complete run plan: one parameterized document instead of per-variant
/// orchestration scripts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPlan {
    #[serde(default)]
    pub probes: Vec<Probe>,
    pub stimulus: StimulusPlan,
    pub schedule: SchedulePlan,
    #[serde(default)]
    pub run: RunSettings,
    #[serde(default)]
    pub artifacts: ArtifactPaths,
    #[serde(default)]
    pub golden: GoldenPlan,
}
