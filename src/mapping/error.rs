//! Rich diagnostic error types for the conversion stage.

use miette::Diagnostic;
use thiserror::Error;

/// Position of an input row: table name plus zero-based index in the slice
/// handed to the mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowRef {
    pub table: &'static str,
    pub index: usize,
}

impl RowRef {
    pub fn new(table: &'static str, index: usize) -> Self {
        Self { table, index }
    }
}

impl std::fmt::Display for RowRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.table, self.index)
    }
}

/// A single offending input row.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum Violation {
    #[error("{row}: references unknown entity {key}")]
    #[diagnostic(
        code(chebi::mapping::unresolved_reference),
        help(
            "The row points at an identifier that is not in the compound table. \
             Re-import the flat files so compounds and their dependent tables \
             come from the same release."
        )
    )]
    UnresolvedReference { row: RowRef, key: String },

    #[error("{row}: unknown relationship type \"{value}\"")]
    #[diagnostic(
        code(chebi::mapping::unknown_relationship_type),
        help(
            "Relationship types must be one of: has_functional_parent, has_parent_hydride, \
             has_part, has_patent, has_role, is_a, is_conjugate_acid_of, is_conjugate_base_of, \
             is_enantiomer_of, is_substituent_group_from, is_tautomer_of."
        )
    )]
    UnknownRelationshipType { row: RowRef, value: String },

    #[error("{row}: duplicate identifier {key} (first seen at {first})")]
    #[diagnostic(
        code(chebi::mapping::duplicate_identifier),
        help("Each compound must appear once. Deduplicate the compound table before converting.")
    )]
    DuplicateIdentifier {
        row: RowRef,
        key: String,
        first: RowRef,
    },
}

impl Violation {
    /// The row this violation was raised for.
    pub fn row(&self) -> RowRef {
        match self {
            Self::UnresolvedReference { row, .. }
            | Self::UnknownRelationshipType { row, .. }
            | Self::DuplicateIdentifier { row, .. } => *row,
        }
    }

    /// Short, stable name of the violation kind (used in reports).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnresolvedReference { .. } => "unresolved_reference",
            Self::UnknownRelationshipType { .. } => "unknown_relationship_type",
            Self::DuplicateIdentifier { .. } => "duplicate_identifier",
        }
    }
}

/// A conversion run that found at least one offending row.
///
/// Carries every violation of the run; no triples are produced.
#[derive(Debug, Error, Diagnostic)]
#[error("conversion rejected {} input row(s)", .violations.len())]
#[diagnostic(
    code(chebi::mapping::rejected),
    help("Fix the listed rows in the source data and rerun the conversion.")
)]
pub struct ConversionError {
    #[related]
    pub violations: Vec<Violation>,
}

impl ConversionError {
    /// Number of violations of the given kind.
    pub fn count(&self, kind: &str) -> usize {
        self.violations.iter().filter(|v| v.kind() == kind).count()
    }
}

/// Convenience alias for conversion results.
pub type ConversionResult<T> = std::result::Result<T, ConversionError>;
