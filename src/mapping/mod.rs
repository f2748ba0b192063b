//! Generic relational-to-RDF conversion engine.
//!
//! A domain supplies an [`EntitySchema`] (how entity keys become IRIs) and a
//! mapping table: one [`AttributeRow`] impl per dependent table, each naming
//! the predicate and object term that a row turns into. The engine owns the
//! parts every domain shares:
//!
//! - entity registration with duplicate detection
//! - foreign-key resolution
//! - deduplication and canonical ordering (via [`TripleSet`])
//! - batch validation: all violations of a run are collected and the run
//!   either yields the complete triple set or fails with every violation
//!
//! ChEBI's mapping table lives in [`chebi`].

pub mod chebi;
pub mod error;

use std::collections::HashMap;
use std::hash::Hash;

use crate::graph::{Term, Triple, TripleSet};

pub use error::{ConversionError, ConversionResult, RowRef, Violation};

/// Key type and IRI minting for the entities of one domain.
pub trait EntitySchema {
    /// Primary key of an entity row.
    type Key: Copy + Eq + Hash + std::fmt::Display;

    /// IRI of the node representing the entity.
    fn entity_iri(&self, key: Self::Key) -> String;
}

/// A row that contributes one statement about an existing entity.
///
/// Implementing this trait is the domain's entry in the row-type→predicate
/// mapping table. A row may also restate its object under a narrower
/// predicate (see [`AttributeRow::refinement`]).
pub trait AttributeRow<S: EntitySchema> {
    /// Table name used in violation reports.
    const TABLE: &'static str;

    /// Foreign key of the entity this row describes.
    fn entity(&self) -> S::Key;

    /// Predicate IRI of the emitted triple.
    fn predicate(&self) -> String;

    /// Object of the emitted triple.
    fn object(&self) -> Term;

    /// Narrower predicate that also carries the object, e.g. the kind of a
    /// name alongside the generic name predicate.
    fn refinement(&self) -> Option<String> {
        None
    }
}

/// State of a single conversion run.
///
/// Created per invocation and consumed by [`ConversionRun::finish`]; nothing
/// outlives the run.
pub struct ConversionRun<'s, S: EntitySchema> {
    schema: &'s S,
    entities: HashMap<S::Key, RowRef>,
    triples: TripleSet,
    violations: Vec<Violation>,
    rows_seen: usize,
}

impl<'s, S: EntitySchema> ConversionRun<'s, S> {
    pub fn new(schema: &'s S) -> Self {
        Self {
            schema,
            entities: HashMap::new(),
            triples: TripleSet::new(),
            violations: Vec::new(),
            rows_seen: 0,
        }
    }

    /// Register an entity key. Returns its IRI, or `None` (recording a
    /// [`Violation::DuplicateIdentifier`]) if the key was already registered.
    pub fn register(&mut self, row: RowRef, key: S::Key) -> Option<String> {
        self.rows_seen += 1;
        if let Some(first) = self.entities.get(&key) {
            self.violations.push(Violation::DuplicateIdentifier {
                row,
                key: key.to_string(),
                first: *first,
            });
            return None;
        }
        self.entities.insert(key, row);
        Some(self.schema.entity_iri(key))
    }

    /// Whether `key` has been registered.
    pub fn is_known(&self, key: S::Key) -> bool {
        self.entities.contains_key(&key)
    }

    /// Resolve a foreign key to the entity's IRI, recording a
    /// [`Violation::UnresolvedReference`] if it is unknown.
    ///
    /// Every entity must be registered before any reference is resolved.
    pub fn resolve(&mut self, row: RowRef, key: S::Key) -> Option<String> {
        if self.is_known(key) {
            Some(self.schema.entity_iri(key))
        } else {
            self.violations.push(Violation::UnresolvedReference {
                row,
                key: key.to_string(),
            });
            None
        }
    }

    /// Add a candidate triple. Identical triples collapse into one.
    pub fn emit(&mut self, triple: Triple) {
        self.triples.insert(triple);
    }

    /// Record a violation found by domain-specific checks.
    pub fn reject(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Count a dependent row as processed.
    pub fn mark_row(&mut self) {
        self.rows_seen += 1;
    }

    /// Map every row of an attribute table through its mapping-table entry.
    pub fn map_attributes<R: AttributeRow<S>>(&mut self, rows: &[R]) {
        for (index, row) in rows.iter().enumerate() {
            self.mark_row();
            let row_ref = RowRef::new(R::TABLE, index);
            let Some(subject) = self.resolve(row_ref, row.entity()) else {
                continue;
            };
            if let Some(narrower) = row.refinement() {
                self.emit(Triple::new(subject.as_str(), narrower, row.object()));
            }
            self.emit(Triple::new(subject, row.predicate(), row.object()));
        }
    }

    /// End the run: the complete triple set, or every violation found.
    pub fn finish(self) -> ConversionResult<TripleSet> {
        if self.violations.is_empty() {
            tracing::debug!(
                rows = self.rows_seen,
                triples = self.triples.len(),
                "conversion run complete"
            );
            Ok(self.triples)
        } else {
            tracing::debug!(
                rows = self.rows_seen,
                violations = self.violations.len(),
                "conversion run rejected"
            );
            Err(ConversionError {
                violations: self.violations,
            })
        }
    }
}
