use std::path::PathBuf;
use thiserror::Error;

/// Fatal pipeline failures. Row-level data problems never surface here; they
/// resolve to sentinels inside the normalizer and cleaner.
///
/// Functions return `anyhow::Result` and attach these as the root cause, so
/// callers can `downcast_ref::<PipelineError>()` to tell the kinds apart.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("source `{id}`: file not found at {path}")]
    MissingSource { id: String, path: PathBuf },

    #[error("source `{id}`: sheet `{sheet}` not found (available: {available:?})")]
    MissingSheet {
        id: String,
        sheet: String,
        available: Vec<String>,
    },

    #[error("source `{id}`: column `{label}` not found in sheet `{sheet}`")]
    MissingColumn {
        id: String,
        sheet: String,
        label: String,
    },

    #[error("source `{id}`: expected {expected} header labels, got {got}")]
    BadRecipe {
        id: String,
        expected: usize,
        got: usize,
    },

    #[error("unknown source id `{0}`")]
    UnknownSource(String),

    #[error("source `{id}`: columns {got:?} do not match canonical {expected:?}")]
    SchemaMismatch {
        id: String,
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("unsupported workbook format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("writing output {path}: {reason}")]
    Output { path: PathBuf, reason: String },
}
