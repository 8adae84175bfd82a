//! CSV report files

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, info};
use serde::Serialize;

use crate::config::reports;
use crate::error::Result;

/// Writes report files that share one run timestamp
///
/// Files are named `<prefix>_<YYYYmmdd_HHMMSS>.csv` inside the output
/// directory. Empty row sets produce no file.
pub struct ReportWriter {
    output_dir: PathBuf,
    timestamp: String,
}

impl ReportWriter {
    /// Writer for a run starting now (local time)
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let timestamp = Local::now().format(reports::TIMESTAMP_FORMAT).to_string();
        Self::with_timestamp(output_dir, timestamp)
    }

    pub fn with_timestamp(output_dir: impl Into<PathBuf>, timestamp: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Path a report with `prefix` is written to
    pub fn path_for(&self, prefix: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.csv", prefix, self.timestamp))
    }

    /// Write `rows` with a header taken from the row type's field names
    ///
    /// Returns the file path, or `None` when there was nothing to write.
    pub fn write<T: Serialize>(&self, prefix: &str, rows: &[T]) -> Result<Option<PathBuf>> {
        if rows.is_empty() {
            debug!("No rows for '{}', skipping file", prefix);
            return Ok(None);
        }

        fs::create_dir_all(&self.output_dir)?;
        let path = self.path_for(prefix);
        let file = File::create(&path)?;
        let mut writer = csv::Writer::from_writer(file);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        info!("Exported {} records to {}", rows.len(), path.display());
        Ok(Some(path))
    }
}
