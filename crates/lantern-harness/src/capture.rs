use lantern_sim::LineStream;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::artifacts::{ArtifactError, CaptureLog};

/// Outcome of the capture loop.
#[derive(Debug, Clone, Default)]
pub struct CaptureReport {
    pub lines_captured: usize,
    /// Whether the sentinel line was observed (and completion signaled).
    pub sentinel_seen: bool,
    pub cancelled: bool,
}

/// Consume the line stream, persisting and echoing each line as it arrives.
///
/// On the first line whose trimmed content equals the sentinel
/// (case-insensitive), triggers `completion` — the single run-wide
/// completion signal, which only this loop may set — and stops. A source
/// that ends without the sentinel just returns; the coordinator's timeout
/// governs. After `cancel` fires, no line is read and completion is never
/// signaled.
pub async fn capture(
    mut source: LineStream,
    log: &mut CaptureLog,
    sentinel: &str,
    completion: &CancellationToken,
    cancel: &CancellationToken,
) -> Result<CaptureReport, ArtifactError> {
    let mut report = CaptureReport::default();
    let sentinel = sentinel.trim();

    loop {
        let line = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                report.cancelled = true;
                break;
            }
            line = source.next_line() => match line {
                Some(line) => line,
                None => break, // source ended without the sentinel
            },
        };

        log.append(&line)?;
        println!("{line}");
        report.lines_captured += 1;

        if line.trim().eq_ignore_ascii_case(sentinel) {
            info!(line = %line.trim(), "completion sentinel observed");
            report.sentinel_seen = true;
            completion.cancel();
            break;
        }
    }

    Ok(report)
}
