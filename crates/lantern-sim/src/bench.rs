//! In-process simulator backend running on the tokio clock.
//!
//! The bench pins an epoch when the simulation starts; `wait_until(t)` is a
//! sleep to `epoch + t`, so under tokio's paused test clock whole runs
//! execute deterministically in microseconds. Scripted serial lines are
//! emitted at their simulated timestamps, and control taps reflect driven
//! stimuli into signal levels that probes can observe.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use lantern_plan::time::TimePoint;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::link::{LineStream, SimError, Simulator};
use crate::script::BenchScript;

/// A control change observed by the bench, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlChange {
    pub time: TimePoint,
    pub target: String,
    pub control: String,
    pub level: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Connected,
    Started,
}

struct BenchState {
    phase: Phase,
    script: BenchScript,
    uploads: HashMap<String, usize>,
    epoch: Option<Instant>,
    /// Tap-driven signal levels, keyed by (target, signal).
    levels: HashMap<(String, String), u32>,
    controls: Vec<ControlChange>,
    serial: Option<LineStream>,
    emitter: Option<JoinHandle<()>>,
}

/// Scripted virtual bench implementing the full capability surface.
pub struct VirtualBench {
    state: Mutex<BenchState>,
}

impl VirtualBench {
    pub fn new(script: BenchScript) -> Self {
        Self {
            state: Mutex::new(BenchState {
                phase: Phase::Idle,
                script,
                uploads: HashMap::new(),
                epoch: None,
                levels: HashMap::new(),
                controls: Vec::new(),
                serial: None,
                emitter: None,
            }),
        }
    }

    /// Every control change the bench has seen, for post-run assertions.
    pub fn control_log(&self) -> Vec<ControlChange> {
        self.state.lock().unwrap().controls.clone()
    }

    /// Names and sizes of uploaded artifacts.
    pub fn uploads(&self) -> Vec<(String, usize)> {
        let state = self.state.lock().unwrap();
        let mut uploads: Vec<_> = state
            .uploads
            .iter()
            .map(|(name, size)| (name.clone(), *size))
            .collect();
        uploads.sort();
        uploads
    }

    fn now(state: &BenchState) -> Result<TimePoint, SimError> {
        let epoch = state.epoch.ok_or(SimError::NotStarted)?;
        Ok(TimePoint::from_secs(epoch.elapsed().as_secs_f64()))
    }
}

#[async_trait]
impl Simulator for VirtualBench {
    async fn connect(&self) -> Result<(), SimError> {
        let mut state = self.state.lock().unwrap();
        if state.phase != Phase::Idle {
            return Err(SimError::AlreadyConnected);
        }
        state.phase = Phase::Connected;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), SimError> {
        let mut state = self.state.lock().unwrap();
        if state.phase == Phase::Idle {
            return Err(SimError::NotConnected);
        }
        if let Some(emitter) = state.emitter.take() {
            emitter.abort();
        }
        tracing::debug!("virtual bench session released");
        state.serial = None;
        state.epoch = None;
        state.phase = Phase::Idle;
        Ok(())
    }

    async fn upload(&self, name: &str, contents: Vec<u8>) -> Result<(), SimError> {
        let mut state = self.state.lock().unwrap();
        if state.phase != Phase::Connected {
            return Err(SimError::NotConnected);
        }
        state.uploads.insert(name.to_string(), contents.len());
        Ok(())
    }

    async fn start(&self, firmware: &str) -> Result<(), SimError> {
        let mut state = self.state.lock().unwrap();
        if state.phase != Phase::Connected {
            return Err(SimError::NotConnected);
        }
        if !state.uploads.contains_key(firmware) {
            return Err(SimError::FirmwareNotUploaded {
                name: firmware.to_string(),
            });
        }

        tracing::debug!(firmware, "starting virtual bench simulation");
        let epoch = Instant::now();
        let (tx, stream) = LineStream::channel();
        let serial_script = state.script.serial.clone();
        let emitter = tokio::spawn(async move {
            for event in serial_script {
                tokio::time::sleep_until(epoch + event.time.as_duration()).await;
                if tx.send(event.line).is_err() {
                    break;
                }
            }
        });

        state.epoch = Some(epoch);
        state.serial = Some(stream);
        state.emitter = Some(emitter);
        state.phase = Phase::Started;
        Ok(())
    }

    async fn wait_until(&self, time: TimePoint) -> Result<(), SimError> {
        let epoch = {
            let state = self.state.lock().unwrap();
            if state.phase != Phase::Started {
                return Err(SimError::NotStarted);
            }
            state.epoch.ok_or(SimError::NotStarted)?
        };
        tokio::time::sleep_until(epoch + time.as_duration()).await;
        Ok(())
    }

    async fn set_control(&self, target: &str, control: &str, level: u32) -> Result<(), SimError> {
        let mut state = self.state.lock().unwrap();
        if state.phase != Phase::Started {
            return Err(SimError::NotStarted);
        }
        let time = Self::now(&state)?;
        state.controls.push(ControlChange {
            time,
            target: target.to_string(),
            control: control.to_string(),
            level,
        });

        let tapped: Vec<(String, String)> = state
            .script
            .taps
            .iter()
            .filter(|tap| tap.target == target && tap.control == control)
            .map(|tap| (tap.signal_target.clone(), tap.signal.clone()))
            .collect();
        for key in tapped {
            state.levels.insert(key, level);
        }
        Ok(())
    }

    async fn read_signal(&self, target: &str, signal: &str) -> Result<u32, SimError> {
        let state = self.state.lock().unwrap();
        if state.phase != Phase::Started {
            return Err(SimError::NotStarted);
        }
        let now = Self::now(&state)?;

        // Scripted timeline wins over tap-driven level.
        let timeline = state
            .script
            .signals
            .iter()
            .find(|t| t.target == target && t.signal == signal);
        if let Some(timeline) = timeline {
            let step = timeline
                .steps
                .iter()
                .filter(|s| s.time <= now)
                .max_by(|a, b| a.time.total_cmp(&b.time));
            if let Some(step) = step {
                return Ok(step.level);
            }
        }

        let key = (target.to_string(), signal.to_string());
        Ok(state.levels.get(&key).copied().unwrap_or(0))
    }

    async fn serial_lines(&self) -> Result<LineStream, SimError> {
        let mut state = self.state.lock().unwrap();
        if state.phase != Phase::Started {
            return Err(SimError::NotStarted);
        }
        state.serial.take().ok_or(SimError::SerialTaken)
    }
}
