use std::path::Path;

use lantern_plan::time::TimePoint;
use serde::{Deserialize, Serialize};

/// Scripted behavior for the virtual bench: what the simulated device
/// prints, how its signals move, and how controls are wired onto signals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchScript {
    #[serde(default)]
    pub serial: Vec<SerialEvent>,
    #[serde(default)]
    pub signals: Vec<SignalTimeline>,
    #[serde(default)]
    pub taps: Vec<ControlTap>,
}

/// A line the device emits at a simulated timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialEvent {
    pub time: TimePoint,
    pub line: String,
}

/// Step timeline for one signal: the level holds from each step's time
/// until the next step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalTimeline {
    pub target: String,
    pub signal: String,
    pub steps: Vec<SignalStep>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SignalStep {
    pub time: TimePoint,
    pub level: u32,
}

/// Wires a control onto a signal, so driven stimuli become observable
/// levels (the wiring-descriptor analog for the virtual bench).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlTap {
    pub target: String,
    pub control: String,
    pub signal_target: String,
    pub signal: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

pub fn parse_script(json: &str) -> Result<BenchScript, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_script(path: &Path) -> Result<BenchScript, ScriptError> {
    let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_script(&text)
}
