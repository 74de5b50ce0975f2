use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::process::fixups::Fixups;
use crate::registry::Registry;

/// Where to read sources, where to write the result, and optional
/// replacements for the built-in registry and fixup tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub output: PathBuf,
    pub registry: Option<PathBuf>,
    pub fixups: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output: PathBuf::from("faa-laser-incidents.csv"),
            registry: None,
            fixups: None,
        }
    }
}

impl Config {
    /// Read a YAML config, or use the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn registry(&self) -> Result<Registry> {
        match &self.registry {
            Some(path) => Registry::from_yaml_file(path),
            None => Ok(Registry::builtin()),
        }
    }

    pub fn fixups(&self) -> Result<Fixups> {
        match &self.fixups {
            Some(path) => Fixups::from_yaml_file(path),
            None => Ok(Fixups::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_path_means_defaults() -> Result<()> {
        let config = Config::load(None)?;
        assert_eq!(config, Config::default());
        assert_eq!(config.registry()?.sources().len(), 9);
        Ok(())
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("laserscraper.yaml");
        fs::write(&path, "data_dir: /srv/faa\n")?;

        let config = Config::load(Some(path.as_path()))?;
        assert_eq!(config.data_dir, PathBuf::from("/srv/faa"));
        assert_eq!(config.output, PathBuf::from("faa-laser-incidents.csv"));
        assert_eq!(config.fixups()?, Fixups::default());
        Ok(())
    }

    #[test]
    fn unreadable_config_is_an_error() {
        assert!(Config::load(Some(Path::new("/no/such/config.yaml"))).is_err());
    }
}
