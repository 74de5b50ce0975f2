use anyhow::{Context, Result};

use super::{Sheet, Workbook};

/// Workbook held entirely in memory, for loader tests.
#[derive(Default)]
pub(crate) struct MemoryWorkbook {
    sheets: Vec<Sheet>,
}

impl MemoryWorkbook {
    /// Add a sheet; empty strings are stored as empty cells.
    pub(crate) fn with_sheet(mut self, name: &str, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|r| {
                r.iter()
                    .map(|c| (!c.is_empty()).then(|| c.to_string()))
                    .collect()
            })
            .collect();
        self.sheets.push(Sheet {
            name: name.to_string(),
            rows,
        });
        self
    }
}

impl Workbook for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .with_context(|| format!("no sheet `{}`", name))
    }
}
