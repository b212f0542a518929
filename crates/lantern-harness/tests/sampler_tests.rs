use std::sync::Arc;

use async_trait::async_trait;
use lantern_harness::artifacts::SampleLog;
use lantern_harness::sampler::sample;
use lantern_plan::plan::Probe;
use lantern_plan::schedule::build_schedule;
use lantern_plan::time::TimePoint;
use lantern_sim::{LineStream, SimError, Simulator};
use tokio_util::sync::CancellationToken;

fn probes() -> Vec<Probe> {
    vec![
        Probe {
            target: "esp".to_string(),
            signal: "D26".to_string(),
            label: "LED".to_string(),
        },
        Probe {
            target: "esp".to_string(),
            signal: "D4".to_string(),
            label: "BTN".to_string(),
        },
        Probe {
            target: "esp".to_string(),
            signal: "BAD".to_string(),
            label: "D5".to_string(),
        },
    ]
}

fn fixed_times(times: &[f64]) -> Vec<TimePoint> {
    times.iter().map(|&t| TimePoint::from_secs(t)).collect()
}

/// Immediate-clock simulator: waits return at once, `D26` reads high,
/// `BAD` always fails, everything else reads low.
struct ScriptedReads;

#[async_trait]
impl Simulator for ScriptedReads {
    async fn connect(&self) -> Result<(), SimError> {
        Ok(())
    }
    async fn disconnect(&self) -> Result<(), SimError> {
        Ok(())
    }
    async fn upload(&self, _name: &str, _contents: Vec<u8>) -> Result<(), SimError> {
        Ok(())
    }
    async fn start(&self, _firmware: &str) -> Result<(), SimError> {
        Ok(())
    }
    async fn wait_until(&self, _time: TimePoint) -> Result<(), SimError> {
        Ok(())
    }
    async fn set_control(&self, _target: &str, _control: &str, _level: u32) -> Result<(), SimError> {
        Ok(())
    }
    async fn read_signal(&self, target: &str, signal: &str) -> Result<u32, SimError> {
        match signal {
            "D26" => Ok(1),
            "BAD" => Err(SimError::ReadFailed {
                target: target.to_string(),
                signal: signal.to_string(),
                reason: "no such pin".to_string(),
            }),
            _ => Ok(0),
        }
    }
    async fn serial_lines(&self) -> Result<LineStream, SimError> {
        Err(SimError::NotStarted)
    }
}

#[tokio::test]
async fn test_one_row_per_schedule_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("probes.csv");
    let labels: Vec<String> = probes().iter().map(|p| p.label.clone()).collect();
    let mut log = SampleLog::create(&path, &labels).unwrap();

    let schedule = build_schedule(
        &fixed_times(&[0.48, 0.70, 0.90, 1.10]),
        0,
        (TimePoint::from_secs(0.2), TimePoint::from_secs(1.6)),
        Some(1),
    );
    let cancel = CancellationToken::new();
    let report = sample(
        Arc::new(ScriptedReads) as Arc<dyn Simulator>,
        &probes(),
        &schedule,
        &mut log,
        &cancel,
    )
    .await
    .unwrap();
    log.finish().unwrap();

    assert_eq!(report.rows_written, schedule.len());
    assert_eq!(report.read_failures, schedule.len()); // one BAD probe per row

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1 + schedule.len());
    assert_eq!(lines[0], "time_s,LED,BTN,D5");

    // Rows arrive in schedule order with one value per probe; a failed read
    // marks its own cell only.
    assert_eq!(lines[1], "0.480000,1,0,ERR");
    assert_eq!(lines[4], "1.100000,1,0,ERR");
}

#[tokio::test]
async fn test_cancelled_sampler_leaves_partial_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("probes.csv");
    let labels: Vec<String> = probes().iter().map(|p| p.label.clone()).collect();
    let mut log = SampleLog::create(&path, &labels).unwrap();

    let schedule = build_schedule(
        &fixed_times(&[0.1, 0.2, 0.3]),
        0,
        (TimePoint::from_secs(0.0), TimePoint::from_secs(1.0)),
        Some(1),
    );
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = sample(
        Arc::new(ScriptedReads) as Arc<dyn Simulator>,
        &probes(),
        &schedule,
        &mut log,
        &cancel,
    )
    .await
    .unwrap();
    log.finish().unwrap();

    assert!(report.cancelled);
    assert_eq!(report.rows_written, 0);

    // Header only — truncated but still parseable.
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, "time_s,LED,BTN,D5\n");
}
