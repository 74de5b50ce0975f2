// src/pipeline.rs
use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use crate::config::Config;
use crate::process::{
    clean::{add_clean_columns, CleanStats},
    combine::combine,
    fixups::Fixups,
    load::load_source,
    timestamp::{add_timestamps, TimestampStats},
    write::write_csv,
};
use crate::registry::Registry;

/// What one run produced, for logging and for callers that want counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Rows kept per source, in registry order.
    pub per_source: Vec<(String, usize)>,
    pub total_rows: usize,
    pub timestamps: TimestampStats,
    pub cleaning: CleanStats,
}

/// Load every source, stack them, and derive the timestamp and clean columns.
/// Sources are opened one at a time, in registry order.
pub fn build_table(
    registry: &Registry,
    fixups: &Fixups,
    data_dir: &Path,
) -> Result<(RecordBatch, RunSummary)> {
    registry.validate(data_dir)?;

    let mut tables = Vec::with_capacity(registry.sources().len());
    for recipe in registry.sources() {
        let batch = load_source(recipe, data_dir)
            .with_context(|| format!("loading source `{}`", recipe.id))?;
        tables.push((recipe.id.clone(), batch));
    }
    let per_source = tables
        .iter()
        .map(|(id, b)| (id.clone(), b.num_rows()))
        .collect();

    let combined = combine(&tables)?;
    drop(tables);
    let (stamped, timestamps) = add_timestamps(&combined, fixups)?;
    let (cleaned, cleaning) = add_clean_columns(&stamped, fixups)?;

    let summary = RunSummary {
        per_source,
        total_rows: cleaned.num_rows(),
        timestamps,
        cleaning,
    };
    Ok((cleaned, summary))
}

/// The whole batch job: config in, one CSV out.
#[tracing::instrument(level = "info", skip(config), fields(data_dir = %config.data_dir.display()))]
pub fn run(config: &Config) -> Result<RunSummary> {
    let start = Instant::now();
    let registry = config.registry()?;
    let fixups = config.fixups()?;

    let (table, summary) = build_table(&registry, &fixups, &config.data_dir)?;
    write_csv(&table, &config.output)?;

    info!(
        rows = summary.total_rows,
        unknown_dates = summary.timestamps.unknown_dates,
        elapsed = ?start.elapsed(),
        "pipeline complete"
    );
    Ok(summary)
}
