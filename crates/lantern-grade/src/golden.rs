use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum GoldenError {
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
}

/// Load a golden reference file as lines.
///
/// A missing golden is a recognized state, not an error: grading treats it
/// as "nothing to check" for that artifact.
pub fn load_golden(path: &Path) -> Result<Option<Vec<String>>, GoldenError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|source| GoldenError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Some(split_lines(&text)))
}

/// Load a captured artifact as lines. A run that never produced the artifact
/// reads as empty, so grading sees a mismatch rather than an I/O fault.
pub fn load_artifact(path: &Path) -> Result<Vec<String>, GoldenError> {
    match load_golden(path)? {
        Some(lines) => Ok(lines),
        None => Ok(Vec::new()),
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(|l| l.to_string()).collect()
}
