//! Rich diagnostic error types for chebi-rdf.
//!
//! Each pipeline stage defines its own error type with miette `#[diagnostic]`
//! derives, providing error codes, help text, and source chains. The mapper's
//! own error lives in [`crate::mapping::error`].

use miette::Diagnostic;
use thiserror::Error;

use crate::mapping::ConversionError;

/// Top-level error type for the pipeline stages.
///
/// Each variant wraps a stage-specific error, preserving the full diagnostic
/// chain through to the user. Config and path errors are raised before a
/// pipeline exists and reach the CLI directly.
#[derive(Debug, Error, Diagnostic)]
pub enum ChebiError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Flat-file source errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SourceError {
    #[error("flat file not found: {path}")]
    #[diagnostic(
        code(chebi::source::missing_file),
        help(
            "Run `chebi-rdf download` first, or point --data-dir at a directory \
             containing the ChEBI flat files."
        )
    )]
    MissingFile { path: String },

    #[error("failed to read {path}")]
    #[diagnostic(
        code(chebi::source::io),
        help("Check that the file is readable and, for .gz files, not truncated.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: missing column \"{column}\"")]
    #[diagnostic(
        code(chebi::source::missing_column),
        help("The header row does not name this column. The file may come from an unsupported ChEBI release.")
    )]
    MissingColumn { path: String, column: String },

    #[error("{path}:{line}: {message}")]
    #[diagnostic(
        code(chebi::source::malformed_row),
        help("The row could not be read. Check the value against the column's expected format.")
    )]
    MalformedRow {
        path: String,
        line: u64,
        message: String,
    },
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

// ---------------------------------------------------------------------------
// Download errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum DownloadError {
    #[error("download of {url} failed after {attempts} attempt(s): {message}")]
    #[diagnostic(
        code(chebi::download::failed),
        help(
            "Check network access to the ChEBI server. Increase `retries` or \
             `timeout_secs` in the config file for slow connections."
        )
    )]
    Failed {
        url: String,
        attempts: u32,
        message: String,
    },

    #[error("failed to write {path}")]
    #[diagnostic(
        code(chebi::download::write),
        help("Ensure the data directory exists and is writable.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type DownloadResult<T> = std::result::Result<T, DownloadError>;

// ---------------------------------------------------------------------------
// Turtle sink errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SinkError {
    #[error("invalid IRI <{iri}>: {message}")]
    #[diagnostic(
        code(chebi::sink::invalid_iri),
        help("An IRI built from the input data is not valid. This is a bug in the vocabulary.")
    )]
    InvalidIri { iri: String, message: String },

    #[error("failed to write turtle output to {path}")]
    #[diagnostic(
        code(chebi::sink::io),
        help("Check that the export directory exists, is writable, and the disk is not full.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type SinkResult<T> = std::result::Result<T, SinkError>;

// ---------------------------------------------------------------------------
// Graph store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("failed to open graph store at {path}: {message}")]
    #[diagnostic(
        code(chebi::store::open),
        help("Check the store directory permissions, and that no other process holds the store open.")
    )]
    Open { path: String, message: String },

    #[error("failed to load {origin}: {message}")]
    #[diagnostic(
        code(chebi::store::load),
        help("The turtle input could not be parsed or stored. Regenerate it with `chebi-rdf create-ttls`.")
    )]
    Load { origin: String, message: String },

    #[error("archive not found: {path}")]
    #[diagnostic(
        code(chebi::store::missing_archive),
        help("Create the archive with `chebi-rdf create-ttls` or pass --archive.")
    )]
    MissingArchive { path: String },

    #[error("SPARQL query error: {message}")]
    #[diagnostic(
        code(chebi::store::sparql),
        help("The SPARQL query failed. Check the query syntax.")
    )]
    Sparql { message: String },

    #[error("graph store error: {message}")]
    #[diagnostic(code(chebi::store::storage))]
    Storage { message: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Convenience alias for pipeline results.
pub type ChebiResult<T> = std::result::Result<T, ChebiError>;
