use std::sync::Arc;

use lantern_plan::plan::Probe;
use lantern_plan::schedule::Schedule;
use lantern_sim::Simulator;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::artifacts::{ArtifactError, SampleLog, SampleRow, SampleValue};

/// Outcome of one schedule walk.
#[derive(Debug, Clone, Default)]
pub struct SampleReport {
    pub rows_written: usize,
    /// Individual signal reads that produced an error marker.
    pub read_failures: usize,
    pub cancelled: bool,
}

/// Walk the schedule in increasing time order, reading every probe at each
/// timestamp into one row.
///
/// A failed read marks that cell `ERR` and the row continues; rows are
/// appended (and flushed) one at a time, so interruption leaves a partial
/// but well-formed probe log.
pub async fn sample(
    sim: Arc<dyn Simulator>,
    probes: &[Probe],
    schedule: &Schedule,
    log: &mut SampleLog,
    cancel: &CancellationToken,
) -> Result<SampleReport, ArtifactError> {
    let mut report = SampleReport::default();

    for &time in schedule.times() {
        let cancelled = tokio::select! {
            biased;
            _ = cancel.cancelled() => true,
            result = sim.wait_until(time) => {
                if let Err(error) = result {
                    warn!(%time, %error, "wait_until failed");
                }
                false
            }
        };
        if cancelled {
            report.cancelled = true;
            break;
        }

        let mut values = Vec::with_capacity(probes.len());
        for probe in probes {
            match sim.read_signal(&probe.target, &probe.signal).await {
                Ok(level) => values.push(SampleValue::Level(level)),
                Err(error) => {
                    warn!(
                        %time,
                        target = %probe.target,
                        signal = %probe.signal,
                        label = %probe.label,
                        %error,
                        "signal read failed"
                    );
                    report.read_failures += 1;
                    values.push(SampleValue::Error);
                }
            }
        }

        log.append(&SampleRow { time, values })?;
        report.rows_written += 1;
    }

    Ok(report)
}
