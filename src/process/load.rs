// src/process/load.rs
use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, BooleanArray, StringArray},
    compute::filter_record_batch,
    record_batch::RecordBatch,
};
use std::{path::Path, sync::Arc};
use tracing::{debug, info};

use super::{canonical_schema, utils::string_column, CANONICAL_HEADERS, FLIGHT_ID};
use crate::error::PipelineError;
use crate::registry::{Extraction, SourceRecipe};
use crate::workbook::{self, Sheet, Workbook};

/// Marker of the subtotal rows some yearly sheets embed between incidents.
pub const TOTAL_MARKER: &str = "Total";

type RawRow = Vec<Option<String>>;

/// Open the recipe's file under `data_dir` and load it.
#[tracing::instrument(level = "info", skip(recipe, data_dir), fields(id = %recipe.id))]
pub fn load_source(recipe: &SourceRecipe, data_dir: &Path) -> Result<RecordBatch> {
    let path = recipe.path(data_dir);
    if !path.exists() {
        return Err(PipelineError::MissingSource {
            id: recipe.id.clone(),
            path,
        }
        .into());
    }
    let mut wb = workbook::open(&path)
        .with_context(|| format!("opening source `{}` at {}", recipe.id, path.display()))?;
    load(recipe, wb.as_mut())
}

/// Read one source into the canonical schema, minus subtotal rows.
pub fn load(recipe: &SourceRecipe, wb: &mut dyn Workbook) -> Result<RecordBatch> {
    let rows = match &recipe.extraction {
        Extraction::Named { sheets } => {
            // Every declared sheet must exist before any is read.
            for named in sheets {
                sheet_name(recipe, wb, Some(named.sheet.as_str()))?;
            }
            let mut rows = Vec::new();
            for named in sheets {
                let sheet = read_sheet(recipe, wb, Some(named.sheet.as_str()))?;
                let part = extract_named(recipe, &sheet, &named.columns)?;
                debug!(sheet = %named.sheet, rows = part.len(), "extracted by label");
                rows.extend(part);
            }
            rows
        }
        Extraction::Positional => {
            let sheet = read_sheet(recipe, wb, recipe.sheet.as_deref())?;
            extract_positional(&sheet, recipe.skip_rows)
        }
    };

    let batch = to_batch(&rows)?;
    let kept = drop_total_rows(&batch)?;
    info!(
        read = batch.num_rows(),
        kept = kept.num_rows(),
        "loaded source"
    );
    Ok(kept)
}

/// Resolve a declared sheet (or the first one when `None`) against the workbook.
fn sheet_name(recipe: &SourceRecipe, wb: &dyn Workbook, name: Option<&str>) -> Result<String> {
    let available = wb.sheet_names();
    match name {
        Some(n) if available.iter().any(|a| a == n) => Ok(n.to_string()),
        None if !available.is_empty() => Ok(available[0].clone()),
        _ => Err(PipelineError::MissingSheet {
            id: recipe.id.clone(),
            sheet: name.unwrap_or("<first>").to_string(),
            available,
        }
        .into()),
    }
}

fn read_sheet(recipe: &SourceRecipe, wb: &mut dyn Workbook, name: Option<&str>) -> Result<Sheet> {
    let name = sheet_name(recipe, wb, name)?;
    wb.read_sheet(&name)
        .with_context(|| format!("reading sheet `{}` of source `{}`", name, recipe.id))
}

/// Locate each declared label in the header row and pull those columns, in
/// declaration order, for every data row below it.
fn extract_named(recipe: &SourceRecipe, sheet: &Sheet, labels: &[String]) -> Result<Vec<RawRow>> {
    if labels.len() != CANONICAL_HEADERS.len() {
        return Err(PipelineError::BadRecipe {
            id: recipe.id.clone(),
            expected: CANONICAL_HEADERS.len(),
            got: labels.len(),
        }
        .into());
    }
    let header_row = recipe.skip_rows;
    let width = sheet.width();

    let mut positions = Vec::with_capacity(labels.len());
    for label in labels {
        let wanted = label.trim();
        let pos = (0..width)
            .find(|&c| sheet.cell(header_row, c).map(str::trim) == Some(wanted))
            .ok_or_else(|| PipelineError::MissingColumn {
                id: recipe.id.clone(),
                sheet: sheet.name.clone(),
                label: label.clone(),
            })?;
        positions.push(pos);
    }

    Ok(data_rows(sheet, header_row, &positions))
}

/// Header row text is thrown away; the first ten columns are canonical as-is.
fn extract_positional(sheet: &Sheet, skip_rows: usize) -> Vec<RawRow> {
    let positions: Vec<usize> = (0..CANONICAL_HEADERS.len()).collect();
    data_rows(sheet, skip_rows, &positions)
}

fn data_rows(sheet: &Sheet, header_row: usize, positions: &[usize]) -> Vec<RawRow> {
    (header_row + 1..sheet.rows.len())
        .map(|r| {
            positions
                .iter()
                .map(|&c| sheet.cell(r, c).map(str::to_string))
                .collect::<RawRow>()
        })
        .filter(|row| row.iter().any(Option::is_some))
        .collect()
}

fn to_batch(rows: &[RawRow]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = (0..CANONICAL_HEADERS.len())
        .map(|c| {
            let col: StringArray = rows.iter().map(|r| r[c].as_deref()).collect();
            Arc::new(col) as ArrayRef
        })
        .collect();
    RecordBatch::try_new(canonical_schema(), columns).map_err(Into::into)
}

/// Drop rows whose flight id contains the subtotal marker. Null ids are kept.
pub fn drop_total_rows(batch: &RecordBatch) -> Result<RecordBatch> {
    let flight = string_column(batch, FLIGHT_ID)?;
    let keep: BooleanArray = flight
        .iter()
        .map(|id| Some(id.map_or(true, |s| !s.contains(TOTAL_MARKER))))
        .collect();
    filter_record_batch(batch, &keep).map_err(Into::into)
}
