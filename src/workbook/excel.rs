use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, DataType, Reader, Sheets};
use chrono::{Datelike, NaiveDateTime, NaiveTime};
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use tracing::debug;

use super::{Sheet, Workbook};

/// Any spreadsheet format calamine understands (xlsx, xlsb, xls, ods).
pub struct ExcelWorkbook {
    path: PathBuf,
    inner: Sheets<BufReader<File>>,
}

impl ExcelWorkbook {
    pub fn open(path: &Path) -> Result<Self> {
        let inner = open_workbook_auto(path)
            .with_context(|| format!("Failed to open workbook {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }
}

impl Workbook for ExcelWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Sheet> {
        let range = self.inner.worksheet_range(name).with_context(|| {
            format!("Failed to read sheet `{}` of {}", name, self.path.display())
        })?;

        // calamine trims the range to the used area; pad back to A1 so that
        // row and column positions match what a spreadsheet user sees.
        let (first_row, first_col) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<Option<String>>> = vec![Vec::new(); first_row as usize];
        for row in range.rows() {
            let mut cells = vec![None; first_col as usize];
            cells.extend(row.iter().map(cell_text));
            rows.push(cells);
        }
        debug!(sheet = name, rows = rows.len(), "read excel sheet");

        Ok(Sheet {
            name: name.to_string(),
            rows,
        })
    }
}

/// Flatten one Excel cell to text.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => (!s.is_empty()).then(|| s.clone()),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(render_float(*f)),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => Some(
            cell.as_datetime()
                .map(render_datetime)
                .unwrap_or_else(|| cell.to_string()),
        ),
        Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Excel stores every number as a float; `530.0` should read back as `530`.
pub(crate) fn render_float(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Dates keep their calendar form. Time-only cells (serial < 1, which lands
/// before 1900) become a bare `HHMM` clock token.
pub(crate) fn render_datetime(dt: NaiveDateTime) -> String {
    if dt.date().year() < 1900 {
        dt.format("%H%M").to_string()
    } else if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
