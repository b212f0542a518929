use std::collections::HashSet;

use crate::plan::RunPlan;
use crate::time::TimePoint;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("duplicate probe label '{label}'")]
    DuplicateLabel { label: String },

    #[error("sampling is enabled but no probes are defined")]
    NoProbes,

    #[error("stimulus event {index}: assert time {assert_time} is not before deassert time {deassert_time}")]
    InvertedEvent {
        index: usize,
        assert_time: TimePoint,
        deassert_time: TimePoint,
    },

    #[error("stimulus event {index} overlaps or precedes the previous event")]
    OverlappingEvents { index: usize },

    #[error("random window ({min}, {max}) is not increasing")]
    InvertedWindow { min: TimePoint, max: TimePoint },

    #[error("negative fixed sample time {time}")]
    NegativeTime { time: TimePoint },

    #[error("run timeout must be positive (got {secs}s)")]
    BadTimeout { secs: f64 },

    #[error("completion sentinel is empty")]
    EmptySentinel,
}

/// Validate a parsed run plan, collecting every violation.
pub fn validate_plan(plan: &RunPlan) -> Result<(), Vec<PlanError>> {
    let mut errors = Vec::new();
    validate_probes(plan, &mut errors);
    validate_stimulus(plan, &mut errors);
    validate_schedule(plan, &mut errors);
    validate_settings(plan, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Probe labels are artifact column identifiers and must be unique.
fn validate_probes(plan: &RunPlan, errors: &mut Vec<PlanError>) {
    let mut seen = HashSet::new();
    for probe in &plan.probes {
        if !seen.insert(probe.label.as_str()) {
            errors.push(PlanError::DuplicateLabel {
                label: probe.label.clone(),
            });
        }
    }
    if plan.run.sampling && plan.probes.is_empty() {
        errors.push(PlanError::NoProbes);
    }
}

/// Events must be internally ordered, non-overlapping, and increasing.
fn validate_stimulus(plan: &RunPlan, errors: &mut Vec<PlanError>) {
    let events = &plan.stimulus.events;
    for (index, event) in events.iter().enumerate() {
        if event.assert_time >= event.deassert_time {
            errors.push(PlanError::InvertedEvent {
                index,
                assert_time: event.assert_time,
                deassert_time: event.deassert_time,
            });
        }
        if index > 0 && event.assert_time <= events[index - 1].deassert_time {
            errors.push(PlanError::OverlappingEvents { index });
        }
    }
}

fn validate_schedule(plan: &RunPlan, errors: &mut Vec<PlanError>) {
    let schedule = &plan.schedule;
    let (min, max) = schedule.window;
    if schedule.random_count > 0 && min >= max {
        errors.push(PlanError::InvertedWindow { min, max });
    }
    for time in &schedule.fixed_times {
        if time.secs() < 0.0 {
            errors.push(PlanError::NegativeTime { time: *time });
        }
    }
}

fn validate_settings(plan: &RunPlan, errors: &mut Vec<PlanError>) {
    if plan.run.timeout_secs <= 0.0 {
        errors.push(PlanError::BadTimeout {
            secs: plan.run.timeout_secs,
        });
    }
    if plan.run.capture && plan.run.sentinel.trim().is_empty() {
        errors.push(PlanError::EmptySentinel);
    }
}
