use anyhow::{Context, Result};
use csv::ReaderBuilder;
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{Sheet, Workbook};

/// CSV-backed workbook: either one file (one sheet) or a directory of files,
/// one sheet per `*.csv`, each named by its file stem.
pub struct CsvWorkbook {
    sheets: Vec<(String, PathBuf)>,
}

impl CsvWorkbook {
    pub fn open_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            anyhow::bail!("CSV file not found: {}", path.display());
        }
        Ok(Self {
            sheets: vec![(sheet_name(path), path.to_path_buf())],
        })
    }

    pub fn open_dir(dir: &Path) -> Result<Self> {
        let pattern = format!("{}/*.csv", dir.display());
        let mut sheets = Vec::new();
        for entry in glob(&pattern).with_context(|| format!("bad glob pattern '{}'", pattern))? {
            let path = entry.with_context(|| format!("listing {}", dir.display()))?;
            sheets.push((sheet_name(&path), path));
        }
        sheets.sort_by(|a, b| a.0.cmp(&b.0));
        debug!(dir = %dir.display(), sheets = sheets.len(), "opened CSV directory");
        Ok(Self { sheets })
    }
}

fn sheet_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl Workbook for CsvWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(n, _)| n.clone()).collect()
    }

    fn read_sheet(&mut self, name: &str) -> Result<Sheet> {
        let path = self
            .sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p)
            .with_context(|| format!("no CSV sheet named `{}`", name))?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("opening {}", path.display()))?;

        let mut rows = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result
                .with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
            rows.push(
                record
                    .iter()
                    .map(|s| (!s.is_empty()).then(|| s.to_string()))
                    .collect(),
            );
        }

        Ok(Sheet {
            name: name.to_string(),
            rows,
        })
    }
}
