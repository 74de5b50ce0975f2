// src/registry/mod.rs
//! Static description of every source file and how to pull canonical columns
//! out of it.

pub mod builtin;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::process::CANONICAL_HEADERS;

/// How one source maps onto the canonical columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRecipe {
    /// Year or year range, e.g. `2015` or `2010-2014`.
    pub id: String,
    /// File (or CSV directory), relative to the configured data dir.
    pub location: PathBuf,
    /// Sheet for positional sources. `None` reads the first sheet.
    #[serde(default)]
    pub sheet: Option<String>,
    /// Leading rows above the header row.
    #[serde(default)]
    pub skip_rows: usize,
    pub extraction: Extraction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Extraction {
    /// Read declared labels from each sub-sheet, rename positionally.
    Named { sheets: Vec<NamedSheet> },
    /// Drop the header row, take the first ten columns as-is.
    Positional,
}

/// One sub-sheet of a named-column source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedSheet {
    pub sheet: String,
    /// Original header labels, one per canonical column, in canonical order.
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Registry {
    pub sources: Vec<SourceRecipe>,
}

impl Registry {
    /// The nine FAA laser incident sources, in output order.
    pub fn builtin() -> Self {
        Self {
            sources: builtin::sources(),
        }
    }

    /// Load a replacement registry from YAML.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading registry {}", path.display()))?;
        let registry: Registry = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing registry {}", path.display()))?;
        info!(path = %path.display(), sources = registry.sources.len(), "loaded registry");
        Ok(registry)
    }

    pub fn sources(&self) -> &[SourceRecipe] {
        &self.sources
    }

    pub fn recipe(&self, id: &str) -> Result<&SourceRecipe> {
        self.sources
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| PipelineError::UnknownSource(id.to_string()).into())
    }

    /// Fail before any loading if a source file is absent or a named recipe is
    /// malformed. The output is only meaningful as the union of all sources.
    pub fn validate(&self, data_dir: &Path) -> Result<()> {
        for recipe in &self.sources {
            let path = recipe.path(data_dir);
            if !path.exists() {
                return Err(PipelineError::MissingSource {
                    id: recipe.id.clone(),
                    path,
                }
                .into());
            }
            if let Extraction::Named { sheets } = &recipe.extraction {
                for named in sheets {
                    if named.columns.len() != CANONICAL_HEADERS.len() {
                        return Err(PipelineError::BadRecipe {
                            id: recipe.id.clone(),
                            expected: CANONICAL_HEADERS.len(),
                            got: named.columns.len(),
                        }
                        .into());
                    }
                }
            }
            debug!(id = %recipe.id, path = %path.display(), "source present");
        }
        Ok(())
    }
}

impl SourceRecipe {
    pub fn path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builtin_has_nine_sources_in_order() {
        let reg = Registry::builtin();
        let ids: Vec<&str> = reg.sources().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["2010-2014", "2015", "2016", "2017", "2018", "2019", "2020", "2021", "2022"]
        );
    }

    #[test]
    fn multi_year_source_names_every_year() {
        let reg = Registry::builtin();
        let recipe = reg.recipe("2010-2014").unwrap();
        match &recipe.extraction {
            Extraction::Named { sheets } => {
                let names: Vec<&str> = sheets.iter().map(|s| s.sheet.as_str()).collect();
                assert_eq!(names, vec!["2010", "2011", "2012", "2013", "2014"]);
                assert!(sheets.iter().all(|s| s.columns.len() == CANONICAL_HEADERS.len()));
            }
            Extraction::Positional => panic!("2010-2014 must be named-column"),
        }
    }

    #[test]
    fn unknown_id_is_reported() {
        let err = Registry::builtin().recipe("1999").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::UnknownSource(id)) if id == "1999"
        ));
    }

    #[test]
    fn validate_fails_fast_on_missing_file() -> Result<()> {
        let dir = tempdir()?;
        let err = Registry::builtin().validate(dir.path()).unwrap_err();
        match err.downcast_ref::<PipelineError>() {
            Some(PipelineError::MissingSource { id, .. }) => assert_eq!(id, "2010-2014"),
            other => panic!("unexpected error: {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn validate_rejects_short_label_list() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("old.csv"), "x\n")?;
        let reg = Registry {
            sources: vec![SourceRecipe {
                id: "old".into(),
                location: "old.csv".into(),
                sheet: None,
                skip_rows: 0,
                extraction: Extraction::Named {
                    sheets: vec![NamedSheet {
                        sheet: "old".into(),
                        columns: vec!["DATE".into()],
                    }],
                },
            }],
        };
        let err = reg.validate(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::BadRecipe { got: 1, .. })
        ));
        Ok(())
    }

    #[test]
    fn registry_round_trips_through_yaml() -> Result<()> {
        let yaml = r#"
sources:
  - id: "2015"
    location: laser_2015.xlsx
    skip_rows: 1
    extraction:
      mode: positional
  - id: "2010-2014"
    location: old
    extraction:
      mode: named
      sheets:
        - sheet: "2010"
          columns: [DATE, TIME, ACID, TYPE, ALT, LOC, COLOR, INJ, CITY, STATE]
"#;
        let dir = tempdir()?;
        let path = dir.path().join("registry.yaml");
        fs::write(&path, yaml)?;

        let reg = Registry::from_yaml_file(&path)?;
        assert_eq!(reg.sources().len(), 2);
        let first = reg.recipe("2015")?;
        assert_eq!(first.skip_rows, 1);
        assert_eq!(first.sheet, None);
        assert_eq!(first.extraction, Extraction::Positional);
        assert_eq!(
            reg.recipe("2010-2014")?.path(Path::new("data")),
            PathBuf::from("data/old")
        );
        Ok(())
    }
}
