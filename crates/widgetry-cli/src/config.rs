//! CLI configuration: `.widgetry/config.toml`, overridden by flags.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use widgetry_kernel::ResolveOptions;

pub const DEFAULT_CONFIG_PATH: &str = ".widgetry/config.toml";
pub const DEFAULT_STORE_PATH: &str = ".widgetry/schemas.jsonl";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

/// File-level settings; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store: Option<String>,
    pub max_depth: Option<usize>,
}

/// Effective settings for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store_path: PathBuf,
    pub options: ResolveOptions,
}

impl Config {
    /// Load `explicit` if given (it must exist), else the default path if
    /// present, else defaults.
    pub fn load(explicit: Option<&str>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_path(Path::new(path)),
            None => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_path(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&raw).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| e.to_string())
    }

    /// Merge command-line flags over the file settings.
    pub fn settings(&self, store: Option<String>, max_depth: Option<usize>) -> Settings {
        let store_path = store
            .or_else(|| self.store.clone())
            .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string());
        let options = max_depth
            .or(self.max_depth)
            .map(ResolveOptions::with_max_depth)
            .unwrap_or_default();
        Settings {
            store_path: PathBuf::from(store_path),
            options,
        }
    }
}
