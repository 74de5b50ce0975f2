// src/workbook/mod.rs
//! Read-only access to the tabular documents each source ships as.
//!
//! The loader only needs three things from a document: list its sheets, pick
//! one by name, and read it as a grid of cell texts. Everything format-specific
//! (Excel cell types, CSV quoting) is flattened into `Option<String>` here.

pub mod delimited;
pub mod excel;
#[cfg(test)]
pub(crate) mod memory;

use anyhow::Result;
use std::path::Path;

use crate::error::PipelineError;
pub use delimited::CsvWorkbook;
pub use excel::ExcelWorkbook;

/// One sheet, as rows of optional cell texts. `None` is an empty cell.
/// Rows may be ragged; anything past the end of a row reads as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Sheet {
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }

    /// Widest row in the sheet.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

pub trait Workbook {
    /// Sheet names in document order.
    fn sheet_names(&self) -> Vec<String>;

    /// Read the whole sheet called `name`.
    fn read_sheet(&mut self, name: &str) -> Result<Sheet>;
}

/// Open the document at `path`, picking the reader from its extension.
/// A directory is treated as a workbook whose sheets are the `*.csv` files in it.
pub fn open(path: &Path) -> Result<Box<dyn Workbook>> {
    if path.is_dir() {
        return Ok(Box::new(CsvWorkbook::open_dir(path)?));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => Ok(Box::new(CsvWorkbook::open_file(path)?)),
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(Box::new(ExcelWorkbook::open(path)?)),
        _ => Err(PipelineError::UnsupportedFormat(path.to_path_buf()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn ragged_rows_read_as_empty() {
        let sheet = Sheet {
            name: "s".into(),
            rows: vec![vec![Some("a".into())], vec![None, Some("b".into())]],
        };
        assert_eq!(sheet.cell(0, 0), Some("a"));
        assert_eq!(sheet.cell(0, 1), None);
        assert_eq!(sheet.cell(1, 1), Some("b"));
        assert_eq!(sheet.cell(5, 0), None);
        assert_eq!(sheet.width(), 2);
    }

    #[test]
    fn open_rejects_unknown_extension() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello")?;

        let err = open(&path).err().expect("txt must be rejected");
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UnsupportedFormat(_))
        ));
        Ok(())
    }

    #[test]
    fn open_dispatches_csv_and_directories() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("2011.csv"), "a,b\n1,2\n")?;
        fs::write(dir.path().join("2010.csv"), "a,b\n3,4\n")?;

        let wb = open(dir.path())?;
        assert_eq!(wb.sheet_names(), vec!["2010", "2011"]);

        let mut single = open(&dir.path().join("2011.csv"))?;
        assert_eq!(single.sheet_names(), vec!["2011"]);
        assert_eq!(single.read_sheet("2011")?.cell(1, 0), Some("1"));
        Ok(())
    }
}
