//! End-to-end run orchestration.
//!
//! One coordinator, parameterized by the enabled-artifact set, replaces
//! per-variant orchestration scripts. Teardown policy is fixed: after the
//! completion race, driver and sampler get a grace window to finish
//! naturally, then the cancel token fires; capture is cancelled as soon as
//! the race is over; all activities are joined before grading reads
//! anything.

use std::sync::Arc;

use lantern_plan::plan::RunPlan;
use lantern_plan::schedule::build_schedule;
use lantern_sim::{SimError, Simulator};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::artifacts::{ArtifactError, CaptureLog, SampleLog};
use crate::capture::{self, CaptureReport};
use crate::config::RunConfig;
use crate::driver::{self, DriveReport};
use crate::sampler::{self, SampleReport};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("simulator session failure: {0}")]
    Session(#[from] SimError),

    #[error("artifact creation failed: {0}")]
    Artifact(#[from] ArtifactError),
}

/// A static artifact to upload before the simulation starts.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub contents: Vec<u8>,
}

/// Prepared inputs for one run: the upload set and the firmware name to
/// boot from.
#[derive(Debug, Clone)]
pub struct RunInputs {
    pub uploads: Vec<UploadFile>,
    pub firmware: String,
}

/// What ended the waiting phase of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionCause {
    /// Capture observed the sentinel line.
    Sentinel,
    /// The wall-clock deadline elapsed first.
    Timeout,
    /// No capture was enabled and all activities finished naturally.
    Drained,
}

/// Aggregate outcome of one run. Activity reports are absent when the
/// activity was disabled or its task failed outright.
#[derive(Debug)]
pub struct RunReport {
    pub completion: CompletionCause,
    pub drive: Option<DriveReport>,
    pub sample: Option<SampleReport>,
    pub capture: Option<CaptureReport>,
}

/// Execute one end-to-end run: connect, upload, start, run the three
/// activities, race completion against the timeout, tear down, and return
/// the aggregated report.
///
/// The session is released exactly once, on every exit path.
pub async fn run(
    sim: Arc<dyn Simulator>,
    plan: &RunPlan,
    inputs: RunInputs,
    config: &RunConfig,
) -> Result<RunReport, RunError> {
    sim.connect().await?;
    let result = run_connected(Arc::clone(&sim), plan, inputs, config).await;
    if let Err(error) = sim.disconnect().await {
        warn!(%error, "disconnect failed");
    }
    result
}

async fn run_connected(
    sim: Arc<dyn Simulator>,
    plan: &RunPlan,
    inputs: RunInputs,
    config: &RunConfig,
) -> Result<RunReport, RunError> {
    for file in inputs.uploads {
        info!(name = %file.name, bytes = file.contents.len(), "uploading artifact");
        sim.upload(&file.name, file.contents).await?;
    }
    sim.start(&inputs.firmware).await?;

    let cancel = CancellationToken::new();
    let completion = CancellationToken::new();

    // Acquire all resources before launching anything, so a failed create
    // leaves no task behind.
    let capture_setup = if config.capture {
        let source = sim.serial_lines().await?;
        let log = CaptureLog::create(&plan.artifacts.capture_path())?;
        Some((source, log))
    } else {
        None
    };

    let sample_setup = if config.sampling {
        let schedule = build_schedule(
            &plan.schedule.fixed_times,
            plan.schedule.random_count,
            plan.schedule.window,
            plan.schedule.seed,
        );
        info!(samples = schedule.len(), "probe schedule built");
        let labels: Vec<String> = plan.probes.iter().map(|p| p.label.clone()).collect();
        let log = SampleLog::create(&plan.artifacts.probes_path(), &labels)?;
        Some((schedule, log))
    } else {
        None
    };

    let capture_handle: Option<JoinHandle<Result<CaptureReport, ArtifactError>>> =
        capture_setup.map(|(source, mut log)| {
            let sentinel = config.sentinel.clone();
            let completion = completion.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let result =
                    capture::capture(source, &mut log, &sentinel, &completion, &cancel).await;
                if let Err(error) = log.finish() {
                    warn!(%error, "closing capture log failed");
                }
                result
            })
        });

    let drive_handle: JoinHandle<DriveReport> = {
        let sim = Arc::clone(&sim);
        let stimulus = plan.stimulus.clone();
        let guard_band = config.guard_band_secs;
        let cancel = cancel.clone();
        tokio::spawn(async move { driver::drive(sim, &stimulus, guard_band, &cancel).await })
    };

    let sample_handle: Option<JoinHandle<Result<SampleReport, ArtifactError>>> =
        sample_setup.map(|(schedule, mut log)| {
            let sim = Arc::clone(&sim);
            let probes = plan.probes.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let result = sampler::sample(sim, &probes, &schedule, &mut log, &cancel).await;
                if let Err(error) = log.finish() {
                    warn!(%error, "closing probe log failed");
                }
                result
            })
        });

    // Waiting phase: the completion signal races the wall-clock deadline.
    // Without capture there is nothing to race; the join deadline below
    // bounds the run instead.
    let mut cause = if capture_handle.is_some() {
        tokio::select! {
            _ = completion.cancelled() => CompletionCause::Sentinel,
            _ = tokio::time::sleep(config.timeout) => {
                warn!(
                    timeout_secs = config.timeout.as_secs_f64(),
                    "no completion sentinel before deadline"
                );
                CompletionCause::Timeout
            }
        }
    } else {
        CompletionCause::Drained
    };

    let deadline = Instant::now()
        + if capture_handle.is_some() {
            config.join_grace
        } else {
            config.timeout
        };

    let drive = join_by("driver", Some(drive_handle), deadline, &cancel).await;
    let sample = match join_by("sampler", sample_handle, deadline, &cancel).await {
        Some(Ok(report)) => Some(report),
        Some(Err(error)) => {
            error!(%error, "probe log write failed");
            None
        }
        None => None,
    };

    let capture = match capture_handle {
        None => None,
        Some(handle) => {
            if !handle.is_finished() {
                cancel.cancel();
            }
            match handle.await {
                Ok(Ok(report)) => Some(report),
                Ok(Err(error)) => {
                    error!(%error, "capture log write failed");
                    None
                }
                Err(error) => {
                    error!(%error, "capture task failed");
                    None
                }
            }
        }
    };

    if cause == CompletionCause::Drained {
        let cancelled = drive.as_ref().is_some_and(|d| d.cancelled)
            || sample.as_ref().is_some_and(|s| s.cancelled);
        if cancelled {
            warn!("activities cancelled at run deadline");
            cause = CompletionCause::Timeout;
        }
    }

    Ok(RunReport {
        completion: cause,
        drive,
        sample,
        capture,
    })
}

/// Join an activity, letting it finish naturally until `deadline`; past the
/// deadline, fire the cancel token and wait for the cooperative exit.
async fn join_by<T>(
    name: &'static str,
    handle: Option<JoinHandle<T>>,
    deadline: Instant,
    cancel: &CancellationToken,
) -> Option<T> {
    let mut handle = handle?;
    let result = match tokio::time::timeout_at(deadline, &mut handle).await {
        Ok(result) => result,
        Err(_) => {
            warn!(activity = name, "still running past join deadline, cancelling");
            cancel.cancel();
            handle.await
        }
    };
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            error!(activity = name, %error, "activity task failed");
            None
        }
    }
}
