//! Runtime configuration: where the algorithm catalog comes from and the
//! optional iteration ceiling.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::info;

use crate::Jasypt;
use crate::registry::Registry;

/// File name looked up in the platform config directory.
pub const CATALOG_FILE: &str = "algorithms.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Builtin,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub catalog: CatalogSource,
    pub max_iterations: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogSource::Builtin,
            max_iterations: None,
        }
    }
}

impl Config {
    /// Explicit catalog path, else a catalog in the config directory if one
    /// exists, else the built-in catalog.
    pub fn resolve(catalog: Option<PathBuf>, max_iterations: Option<u32>) -> Self {
        let catalog = match catalog {
            Some(path) => CatalogSource::File(path),
            None => default_catalog_path()
                .ok()
                .filter(|path| path.is_file())
                .map(CatalogSource::File)
                .unwrap_or(CatalogSource::Builtin),
        };

        Self {
            catalog,
            max_iterations,
        }
    }

    pub fn load_registry(&self) -> Result<Registry> {
        match &self.catalog {
            CatalogSource::Builtin => {
                Registry::builtin().context("built-in algorithm catalog is invalid")
            }
            CatalogSource::File(path) => {
                info!(path = %path.display(), "loading algorithm catalog");
                Registry::load(path).with_context(|| {
                    format!("failed to load algorithm catalog '{}'", path.display())
                })
            }
        }
    }

    /// Loads the registry and hands it to a new dispatcher.
    pub fn build(&self) -> Result<Jasypt> {
        let jasypt = Jasypt::new(self.load_registry()?);
        Ok(match self.max_iterations {
            Some(limit) => jasypt.with_max_iterations(limit),
            None => jasypt,
        })
    }
}

pub fn default_catalog_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "jasypt-pbe")
        .context("could not determine platform directories")?;

    Ok(project_dirs.config_dir().join(CATALOG_FILE))
}
