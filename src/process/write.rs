use anyhow::Result;
use arrow::{csv::WriterBuilder, record_batch::RecordBatch};
use std::{
    fmt::Display,
    fs::{self, File},
    path::{Path, PathBuf},
};
use tracing::info;

use crate::error::PipelineError;

/// Rendering of `datetime_utc` in the output file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

fn output_error(path: &Path, reason: impl Display) -> anyhow::Error {
    PipelineError::Output {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
    .into()
}

/// Write `batch` as comma-separated text with a header row and no index.
/// Goes to a temp file beside `path`, then renamed over it.
#[tracing::instrument(level = "info", skip(batch), fields(path = %path.display()))]
pub fn write_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| output_error(path, e))?;

    let file_name = path
        .file_name()
        .ok_or_else(|| output_error(path, "no file name"))?
        .to_string_lossy();
    let tmp_path = dir.join(format!(".{}.tmp", file_name));

    {
        let file = File::create(&tmp_path).map_err(|e| output_error(path, e))?;
        let mut writer = WriterBuilder::new()
            .with_header(true)
            .with_timestamp_tz_format(TIMESTAMP_FORMAT.to_string())
            .build(file);
        writer.write(batch).map_err(|e| output_error(path, e))?;
    }

    fs::rename(&tmp_path, path).map_err(|e| output_error(path, e))?;
    info!(rows = batch.num_rows(), "wrote output");
    Ok(())
}
