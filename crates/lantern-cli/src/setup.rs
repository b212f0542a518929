//! Fatal-setup surface: everything that must be in place before any
//! simulation work begins. Failures here exit with the distinct setup
//! status and are never retried.

use std::path::{Path, PathBuf};

use lantern_harness::coordinator::{RunInputs, UploadFile};

/// Access token for the simulation gateway.
pub const TOKEN_ENV: &str = "LANTERN_SIM_TOKEN";
pub const TOKEN_URL: &str = "https://lantern-bench.dev/dashboard/ci";

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("LANTERN_SIM_TOKEN is not set (get a token from https://lantern-bench.dev/dashboard/ci)")]
    TokenMissing,

    #[error("firmware not found in {dir}/ (expected a *.bin build output — did you build the firmware?)")]
    FirmwareMissing { dir: String },

    #[error("wiring descriptor {path} is missing")]
    DiagramMissing { path: String },

    #[error("invalid plan:\n  - {details}")]
    PlanInvalid { details: String },

    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
}

pub fn require_token() -> Result<String, SetupError> {
    std::env::var(TOKEN_ENV)
        .ok()
        .filter(|token| !token.trim().is_empty())
        .ok_or(SetupError::TokenMissing)
}

/// Pick the first `*.bin` in the build directory (sorted by name, so the
/// choice is stable across runs).
pub fn find_firmware(build_dir: &Path) -> Result<PathBuf, SetupError> {
    let missing = || SetupError::FirmwareMissing {
        dir: build_dir.display().to_string(),
    };
    let entries = std::fs::read_dir(build_dir).map_err(|_| missing())?;
    let mut bins: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "bin"))
        .collect();
    bins.sort();
    bins.into_iter().next().ok_or_else(missing)
}

fn read_file(path: &Path) -> Result<Vec<u8>, SetupError> {
    std::fs::read(path).map_err(|source| SetupError::Unreadable {
        path: path.display().to_string(),
        source,
    })
}

/// Assemble the upload set: the wiring descriptor, the firmware image, and
/// its debug-symbol file when one sits next to it.
pub fn collect_inputs(diagram: &Path, build_dir: &Path) -> Result<RunInputs, SetupError> {
    if !diagram.exists() {
        return Err(SetupError::DiagramMissing {
            path: diagram.display().to_string(),
        });
    }

    let firmware_bin = find_firmware(build_dir)?;
    let mut uploads = vec![
        UploadFile {
            name: "diagram.json".to_string(),
            contents: read_file(diagram)?,
        },
        UploadFile {
            name: "firmware.bin".to_string(),
            contents: read_file(&firmware_bin)?,
        },
    ];

    let firmware_elf = firmware_bin.with_extension("elf");
    if firmware_elf.exists() {
        uploads.push(UploadFile {
            name: "firmware.elf".to_string(),
            contents: read_file(&firmware_elf)?,
        });
    }

    Ok(RunInputs {
        uploads,
        firmware: "firmware.bin".to_string(),
    })
}
