//! Runtime configuration, read from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, CatalogError};
use crate::logging::TracingConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed dice seed; entropy when absent
    pub seed: Option<u64>,
    /// Directory holding the roster file
    pub data_dir: PathBuf,
    /// RON catalog document replacing the built-in one
    pub catalog_path: Option<PathBuf>,
    pub tracing: TracingConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            data_dir: PathBuf::from("saves"),
            catalog_path: None,
            tracing: TracingConfig::default(),
        }
    }
}

impl GameConfig {
    /// Defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Built-in catalog, or the validated document at `catalog_path`
    pub fn catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path),
            None => Ok(Catalog::standard()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(&path, r#"{"seed": 7}"#).unwrap();
        let config = GameConfig::load(&path).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.data_dir, PathBuf::from("saves"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.json");
        std::fs::write(&path, "{seed: ").unwrap();
        assert!(matches!(
            GameConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_catalog_from_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.ron");
        let mut def = Catalog::standard().to_def();
        def.maps.truncate(1);
        let document = Catalog::from_def(def).unwrap().to_ron_string().unwrap();
        std::fs::write(&path, document).unwrap();
        let config = GameConfig {
            catalog_path: Some(path),
            ..GameConfig::default()
        };
        assert_eq!(config.catalog().unwrap().maps().len(), 1);
        assert_eq!(GameConfig::default().catalog().unwrap().maps().len(), 3);
    }
}
