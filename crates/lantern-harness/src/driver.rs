use std::sync::Arc;

use lantern_plan::plan::StimulusPlan;
use lantern_plan::time::TimePoint;
use lantern_sim::Simulator;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Outcome of one stimulus walk.
#[derive(Debug, Clone, Default)]
pub struct DriveReport {
    /// Events whose full assert/deassert pair was issued.
    pub events_driven: usize,
    /// Control calls that failed and were skipped over.
    pub missed_edges: usize,
    pub cancelled: bool,
}

/// Wait for a simulated timestamp, bailing out early on cancellation.
/// Returns true when the wait was cancelled. A failed wait is logged and
/// treated as elapsed so the walk keeps its position in the sequence.
async fn wait_or_cancel(
    sim: &Arc<dyn Simulator>,
    time: TimePoint,
    cancel: &CancellationToken,
) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => true,
        result = sim.wait_until(time) => {
            if let Err(error) = result {
                warn!(%time, %error, "wait_until failed");
            }
            false
        }
    }
}

/// Walk the stimulus events in sequence, issuing paired set-control calls
/// with guard bands around each edge.
///
/// A failed control change is non-fatal: it is logged, counted, and the
/// walk proceeds to the next wait point. No two control changes are ever
/// issued concurrently.
pub async fn drive(
    sim: Arc<dyn Simulator>,
    stimulus: &StimulusPlan,
    guard_band_secs: f64,
    cancel: &CancellationToken,
) -> DriveReport {
    let mut report = DriveReport::default();

    for event in &stimulus.events {
        let pre_assert = event.assert_time.minus_clamped(guard_band_secs);
        if wait_or_cancel(&sim, pre_assert, cancel).await {
            report.cancelled = true;
            break;
        }
        if let Err(error) = sim.set_control(&stimulus.target, &stimulus.control, 1).await {
            warn!(
                time = %event.assert_time,
                target = %stimulus.target,
                control = %stimulus.control,
                %error,
                "control assert failed"
            );
            report.missed_edges += 1;
        }

        if wait_or_cancel(&sim, event.assert_time.plus(guard_band_secs), cancel).await
            || wait_or_cancel(&sim, event.deassert_time.plus(guard_band_secs), cancel).await
        {
            report.cancelled = true;
            break;
        }
        if let Err(error) = sim.set_control(&stimulus.target, &stimulus.control, 0).await {
            warn!(
                time = %event.deassert_time,
                target = %stimulus.target,
                control = %stimulus.control,
                %error,
                "control deassert failed"
            );
            report.missed_edges += 1;
        }

        report.events_driven += 1;
    }

    report
}
