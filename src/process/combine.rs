use anyhow::Result;
use arrow::{compute::concat_batches, record_batch::RecordBatch};
use tracing::info;

use super::{canonical_schema, utils::column_names, CANONICAL_HEADERS};
use crate::error::PipelineError;

/// Check a loaded source has exactly the canonical columns, in order.
pub fn check_schema(id: &str, batch: &RecordBatch) -> Result<()> {
    let got = column_names(batch);
    if got.iter().map(String::as_str).eq(CANONICAL_HEADERS.iter().copied()) {
        Ok(())
    } else {
        Err(PipelineError::SchemaMismatch {
            id: id.to_string(),
            expected: CANONICAL_HEADERS.iter().map(|h| h.to_string()).collect(),
            got,
        }
        .into())
    }
}

/// Stack per-source tables in the order given. No dedupe, no reordering.
pub fn combine(tables: &[(String, RecordBatch)]) -> Result<RecordBatch> {
    for (id, batch) in tables {
        check_schema(id, batch)?;
    }
    let combined = concat_batches(&canonical_schema(), tables.iter().map(|(_, b)| b))?;
    info!(
        sources = tables.len(),
        rows = combined.num_rows(),
        "combined sources"
    );
    Ok(combined)
}
