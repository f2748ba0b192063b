//! Pipeline configuration, persisted as TOML.
//!
//! Built once per process (defaults, then the config file, then CLI
//! overrides) and handed to each stage by reference.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths::ChebiPaths;

/// Errors from loading or saving the config file.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(chebi::config::read),
        help("Ensure the config file exists and is readable, or create one with `chebi-rdf config init`.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(chebi::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(chebi::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config file already exists: {path}")]
    #[diagnostic(
        code(chebi::config::exists),
        help("Pass --force to overwrite it.")
    )]
    AlreadyExists { path: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

pub const DEFAULT_BASE_URL: &str = "https://ftp.ebi.ac.uk/pub/databases/chebi/Flat_file_tab_delimited";

/// Settings for every pipeline stage.
///
/// Directory fields left unset fall back to the XDG layout of [`ChebiPaths`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Where the ChEBI flat files are downloaded to and read from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Where turtle files and `ttls.tar.gz` are written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
    /// Persistent graph store directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_dir: Option<PathBuf>,
    /// Remote directory holding the flat files.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Attempts per file before giving up.
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Fetch files again even when present locally.
    #[serde(default)]
    pub redownload: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout_secs() -> u64 {
    300
}
fn default_retries() -> u32 {
    3
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            export_dir: None,
            graph_dir: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            redownload: false,
        }
    }
}

/// Concrete directories for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
    pub archive: PathBuf,
    pub graph_dir: PathBuf,
}

pub const ARCHIVE_NAME: &str = "ttls.tar.gz";

impl PipelineConfig {
    /// Fill unset directories from `paths`.
    pub fn layout(&self, paths: &ChebiPaths) -> Layout {
        let export_dir = self.export_dir.clone().unwrap_or_else(|| paths.export_dir());
        Layout {
            data_dir: self.data_dir.clone().unwrap_or_else(|| paths.flat_files_dir()),
            archive: export_dir.join(ARCHIVE_NAME),
            export_dir,
            graph_dir: self.graph_dir.clone().unwrap_or_else(|| paths.graph_dir()),
        }
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load from `path` if it exists, otherwise defaults.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.is_file() {
            let config = Self::load(path)?;
            tracing::debug!(path = %path.display(), "loaded config file");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = self.to_toml(path)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Render as TOML. `origin` names the destination in errors.
    pub fn to_toml(&self, origin: &Path) -> ConfigResult<String> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: origin.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}
