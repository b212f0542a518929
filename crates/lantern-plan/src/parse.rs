use std::path::Path;

use crate::plan::RunPlan;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

pub fn parse_plan(json: &str) -> Result<RunPlan, ParseError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_plan(path: &Path) -> Result<RunPlan, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_plan(&text)
}
