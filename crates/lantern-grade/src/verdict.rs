use crate::compare::{self, MatchMode};
use crate::diff::unified_diff;

/// One artifact to grade: the captured lines against an optional golden.
#[derive(Debug)]
pub struct ArtifactCheck {
    /// Artifact name used as the key in the verdict's diff map.
    pub name: String,
    /// Golden lines, or None when no golden exists ("nothing to check").
    pub expected: Option<Vec<String>>,
    /// Lines the run actually produced.
    pub actual: Vec<String>,
    pub mode: MatchMode,
    /// Label for the `---` side of the diff (golden path).
    pub expected_label: String,
    /// Label for the `+++` side of the diff (artifact path).
    pub actual_label: String,
}

/// Aggregate grading outcome. Produced once, terminal.
#[derive(Debug)]
pub struct Verdict {
    pub passed: bool,
    /// Artifact name -> rendered unified diff, one entry per failed check.
    pub diffs: Vec<(String, String)>,
}

/// Grade all artifact checks into one verdict.
///
/// A check with no golden passes unconditionally. The overall verdict passes
/// only when every check passes.
pub fn grade(checks: &[ArtifactCheck]) -> Verdict {
    let mut passed = true;
    let mut diffs = Vec::new();

    for check in checks {
        let expected = match &check.expected {
            Some(lines) => lines,
            None => continue,
        };
        if compare::matches(check.mode, expected, &check.actual) {
            continue;
        }
        passed = false;
        let mut diff = unified_diff(
            expected,
            &check.actual,
            &check.expected_label,
            &check.actual_label,
        );
        if check.mode == MatchMode::Subsequence {
            if let Some(idx) = compare::subsequence_unmatched(expected, &check.actual) {
                diff = format!(
                    "expected line {} not found in order: {:?}\n{}",
                    idx + 1,
                    expected[idx],
                    diff
                );
            }
        }
        diffs.push((check.name.clone(), diff));
    }

    Verdict { passed, diffs }
}
