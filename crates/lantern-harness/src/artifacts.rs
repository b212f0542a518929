//! Append-only artifact writers.
//!
//! Each row or line is a single flushed write with no suspension point in
//! between, so an interrupted run leaves a truncated-but-parseable
//! artifact, never a torn record.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use lantern_plan::time::TimePoint;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One sampled cell: the raw read level, or an in-band error marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleValue {
    Level(u32),
    Error,
}

impl SampleValue {
    pub fn render(&self) -> String {
        match self {
            SampleValue::Level(level) => level.to_string(),
            SampleValue::Error => "ERR".to_string(),
        }
    }
}

/// One probe-log row: the schedule timestamp plus one value per probe, in
/// probe-list order.
#[derive(Debug, Clone)]
pub struct SampleRow {
    pub time: TimePoint,
    pub values: Vec<SampleValue>,
}

impl SampleRow {
    fn render(&self) -> String {
        let mut fields = vec![self.time.render()];
        fields.extend(self.values.iter().map(|v| v.render()));
        fields.join(",")
    }
}

fn create_file(path: &Path) -> Result<File, ArtifactError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

/// The tabular probe log: `time_s,<label1>,<label2>,...`.
pub struct SampleLog {
    file: File,
    rows_written: usize,
}

impl SampleLog {
    pub fn create(path: &Path, labels: &[String]) -> Result<Self, ArtifactError> {
        let mut file = create_file(path)?;
        let header = format!("time_s,{}\n", labels.join(","));
        file.write_all(header.as_bytes())?;
        file.flush()?;
        Ok(Self {
            file,
            rows_written: 0,
        })
    }

    pub fn append(&mut self, row: &SampleRow) -> Result<(), ArtifactError> {
        let line = format!("{}\n", row.render());
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn finish(mut self) -> Result<(), ArtifactError> {
        self.file.flush()?;
        Ok(())
    }
}

/// The line-oriented capture log, one entry per line, newline-terminated.
pub struct CaptureLog {
    file: File,
    lines_written: usize,
}

impl CaptureLog {
    pub fn create(path: &Path) -> Result<Self, ArtifactError> {
        let file = create_file(path)?;
        Ok(Self {
            file,
            lines_written: 0,
        })
    }

    pub fn append(&mut self, line: &str) -> Result<(), ArtifactError> {
        let entry = format!("{line}\n");
        self.file.write_all(entry.as_bytes())?;
        self.file.flush()?;
        self.lines_written += 1;
        Ok(())
    }

    pub fn lines_written(&self) -> usize {
        self.lines_written
    }

    pub fn finish(mut self) -> Result<(), ArtifactError> {
        self.file.flush()?;
        Ok(())
    }
}
