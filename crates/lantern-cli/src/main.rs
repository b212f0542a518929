//! The `lantern` runner: load a plan, execute one simulated run, grade the
//! artifacts against golden references, and exit 0 (pass), 1 (grading
//! fail), or 2 (fatal setup failure).

mod setup;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use lantern_grade::golden::{load_artifact, load_golden};
use lantern_grade::verdict::{ArtifactCheck, Verdict};
use lantern_harness::config::RunConfig;
use lantern_harness::coordinator;
use lantern_plan::parse::load_plan;
use lantern_plan::plan::RunPlan;
use lantern_plan::validate::validate_plan;
use lantern_sim::script::{load_script, BenchScript};
use lantern_sim::{Simulator, VirtualBench};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Setup(#[from] setup::SetupError),

    #[error("plan error: {0}")]
    Plan(#[from] lantern_plan::parse::ParseError),

    #[error("bench script error: {0}")]
    Script(#[from] lantern_sim::script::ScriptError),

    #[error("run failed: {0}")]
    Run(#[from] coordinator::RunError),

    #[error("golden reference error: {0}")]
    Golden(#[from] lantern_grade::golden::GoldenError),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match execute().await {
        Ok(verdict) if verdict.passed => {
            println!("\n=== GRADE: PASS ===");
            ExitCode::SUCCESS
        }
        Ok(_) => {
            println!("\n=== GRADE: FAIL ===");
            ExitCode::from(1)
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(2)
        }
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("LANTERN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn execute() -> Result<Verdict, CliError> {
    let _token = setup::require_token()?;

    let plan_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("plan.json"));
    let plan = load_plan(&plan_path)?;
    if let Err(errors) = validate_plan(&plan) {
        let details = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n  - ");
        return Err(setup::SetupError::PlanInvalid { details }.into());
    }
    info!(plan = %plan_path.display(), "plan loaded");

    let inputs = setup::collect_inputs(Path::new("diagram.json"), Path::new("build"))?;

    // The in-tree backend. Remote simulators implement the same capability
    // trait in their own crate.
    let bench_script_path = Path::new("bench.json");
    let script = if bench_script_path.exists() {
        load_script(bench_script_path)?
    } else {
        BenchScript::default()
    };
    let sim: Arc<dyn Simulator> = Arc::new(VirtualBench::new(script));
    info!("using the virtual bench backend");

    let config = RunConfig::from_settings(&plan.run);
    let report = coordinator::run(sim, &plan, inputs, &config).await?;
    info!(completion = ?report.completion, "run finished");

    let checks = build_checks(&plan)?;
    let verdict = lantern_grade::grade(&checks);
    print_outcomes(&checks, &verdict);
    Ok(verdict)
}

/// One grading check per enabled artifact that has a golden reference.
fn build_checks(plan: &RunPlan) -> Result<Vec<ArtifactCheck>, CliError> {
    let mut checks = Vec::new();

    if plan.run.capture {
        let golden_path = plan.golden.capture.as_deref();
        checks.push(ArtifactCheck {
            name: "capture".to_string(),
            expected: match golden_path {
                Some(path) => load_golden(path)?,
                None => None,
            },
            actual: load_artifact(&plan.artifacts.capture_path())?,
            mode: plan.golden.capture_mode,
            expected_label: label_for(golden_path),
            actual_label: plan.artifacts.capture_path().display().to_string(),
        });
    }

    if plan.run.sampling {
        let golden_path = plan.golden.probes.as_deref();
        checks.push(ArtifactCheck {
            name: "probes".to_string(),
            expected: match golden_path {
                Some(path) => load_golden(path)?,
                None => None,
            },
            actual: load_artifact(&plan.artifacts.probes_path())?,
            mode: plan.golden.probes_mode,
            expected_label: label_for(golden_path),
            actual_label: plan.artifacts.probes_path().display().to_string(),
        });
    }

    Ok(checks)
}

fn label_for(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "expected".to_string())
}

fn print_outcomes(checks: &[ArtifactCheck], verdict: &Verdict) {
    for check in checks {
        if check.expected.is_none() {
            println!("[--] no golden reference for {}, nothing to check", check.name);
            continue;
        }
        match verdict.diffs.iter().find(|(name, _)| *name == check.name) {
            Some((_, diff)) => {
                println!("\n[DIFF] {} mismatch:\n{diff}", check.name);
            }
            None => {
                println!("[OK] {} matches golden copy", check.name);
            }
        }
    }
}
