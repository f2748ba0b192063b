//! XDG-compliant path resolution for chebi-rdf.
//!
//! Flat files, turtle exports and the graph store live under
//! `$XDG_DATA_HOME/chebi-rdf/`; the config file under
//! `$XDG_CONFIG_HOME/chebi-rdf/`.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(chebi::paths::no_home),
        help("Set the HOME environment variable, or set XDG_DATA_HOME and XDG_CONFIG_HOME.")
    )]
    NoHome,
}

pub type PathResult<T> = std::result::Result<T, PathError>;

const APP_DIR: &str = "chebi-rdf";

/// Base directories for chebi-rdf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChebiPaths {
    /// `$XDG_CONFIG_HOME/chebi-rdf/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/chebi-rdf/`
    pub data_dir: PathBuf,
}

fn xdg_dir(var: &str, home: Option<&Path>, fallback: &str) -> PathResult<PathBuf> {
    match std::env::var_os(var).filter(|v| !v.is_empty()) {
        Some(dir) => Ok(PathBuf::from(dir).join(APP_DIR)),
        None => home
            .map(|h| h.join(fallback).join(APP_DIR))
            .ok_or(PathError::NoHome),
    }
}

impl ChebiPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Ok(Self {
            config_dir: xdg_dir("XDG_CONFIG_HOME", home.as_deref(), ".config")?,
            data_dir: xdg_dir("XDG_DATA_HOME", home.as_deref(), ".local/share")?,
        })
    }

    /// Keep everything under one directory. Used by tests and `--root`.
    pub fn rooted(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    /// `data_dir/flat_files/`: downloaded ChEBI tables.
    pub fn flat_files_dir(&self) -> PathBuf {
        self.data_dir.join("flat_files")
    }

    /// `data_dir/ttls/`: per-table turtle exports and their archive.
    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join("ttls")
    }

    /// `data_dir/graph/`: persistent graph store.
    pub fn graph_dir(&self) -> PathBuf {
        self.data_dir.join("graph")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}
