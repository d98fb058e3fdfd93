//! Structured logging
//!
//! All crate code logs through `tracing`: rejected actions at `debug`, state
//! changes at `info`, storage trouble at `warn`. Per-encounter roll lines sit
//! at `debug` under `passive_core::combat` and are switched on with
//! `combat_rolls`. `RUST_LOG` takes precedence over the file config.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

const COMBAT_TARGET: &str = "passive_core::combat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    pub level: LogLevel,
    /// Overrides keyed by module path
    pub modules: BTreeMap<String, LogLevel>,
    /// Log every encounter roll of a batch run
    pub combat_rolls: bool,
    /// Append here instead of stderr
    pub log_file: Option<PathBuf>,
    pub show_targets: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        let modules = [
            ("passive_core::session", LogLevel::Info),
            (COMBAT_TARGET, LogLevel::Info),
            ("passive_core::storage", LogLevel::Warn),
            ("passive_core::balance", LogLevel::Info),
        ]
        .into_iter()
        .map(|(module, level)| (module.to_string(), level))
        .collect();

        Self {
            level: LogLevel::Warn,
            modules,
            combat_rolls: false,
            log_file: None,
            show_targets: true,
        }
    }
}

impl TracingConfig {
    /// `EnvFilter` directives: the base level, then one entry per module
    pub fn directives(&self) -> String {
        let mut modules = self.modules.clone();
        if self.combat_rolls {
            modules.insert(COMBAT_TARGET.to_string(), LogLevel::Debug);
        }
        std::iter::once(self.level.as_str().to_string())
            .chain(
                modules
                    .iter()
                    .map(|(module, level)| format!("{module}={}", level.as_str())),
            )
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn open_log(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

static INSTALLED: Once = Once::new();

/// Install the global subscriber; first call wins.
/// An unopenable `log_file` falls back to stderr with a warning.
pub fn init_tracing(config: &TracingConfig) {
    INSTALLED.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.directives()));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(config.show_targets)
            .compact();

        let mut fallback = None;
        let installed = match config.log_file.as_deref().map(open_log) {
            Some(Ok(file)) => builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init(),
            Some(Err(err)) => {
                fallback = Some(err);
                builder.with_writer(std::io::stderr).try_init()
            }
            None => builder.with_writer(std::io::stderr).try_init(),
        };

        // the host may have installed its own subscriber
        if installed.is_ok() {
            if let Some(err) = fallback {
                tracing::warn!(%err, "log file unavailable, logging to stderr");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        let directives = TracingConfig::default().directives();
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("passive_core::combat=info"));
        assert!(directives.contains("passive_core::storage=warn"));
    }

    #[test]
    fn test_combat_rolls_raise_combat_to_debug() {
        let config = TracingConfig {
            combat_rolls: true,
            ..TracingConfig::default()
        };
        let directives = config.directives();
        assert!(directives.contains("passive_core::combat=debug"));
        assert!(!directives.contains("passive_core::combat=info"));
    }

    #[test]
    fn test_custom_modules() {
        let config = TracingConfig {
            level: LogLevel::Debug,
            modules: BTreeMap::from([("my_module".to_string(), LogLevel::Trace)]),
            ..TracingConfig::default()
        };
        assert_eq!(config.directives(), "debug,my_module=trace");
    }

    #[test]
    fn test_config_json_partial() {
        let config: TracingConfig =
            serde_json::from_str(r#"{"level":"error","combat_rolls":true}"#).unwrap();
        assert_eq!(config.level, LogLevel::Error);
        assert!(config.combat_rolls);
        assert!(config.log_file.is_none());
        assert_eq!(config.modules, TracingConfig::default().modules);
    }

    #[test]
    fn test_log_file_opens_for_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passive.log");
        std::fs::write(&path, "earlier\n").unwrap();
        drop(open_log(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "earlier\n");
        assert!(open_log(&dir.path().join("missing/passive.log")).is_err());
    }

    #[test]
    fn test_init_tracing_idempotent() {
        init_tracing(&TracingConfig::default());
        init_tracing(&TracingConfig::default());
        tracing::info!("still fine");
    }
}
