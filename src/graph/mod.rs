//! RDF graph model produced by the mapper.
//!
//! - **Triples** ([`Triple`], [`Term`]): plain, totally ordered values
//! - **Triple sets** ([`TripleSet`]): deduplicated, sorted by subject, predicate, object
//! - **Turtle sink** ([`turtle`]): renders triple sets through oxigraph's serializer
//! - **Graph store** ([`store`]): persistent oxigraph store the turtle output is loaded into
//!
//! The model is kept independent of oxigraph so the mapper stays free of I/O
//! and the ordering of output is fully under our control.

pub mod store;
pub mod turtle;
pub mod vocab;

use std::collections::BTreeSet;
use std::collections::btree_set;

use serde::{Deserialize, Serialize};

/// Datatype of a literal object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Datatype {
    /// `xsd:string`
    String,
    /// `xsd:integer`
    Integer,
}

/// Object position of a triple: an IRI or a typed literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    Iri(String),
    Literal { value: String, datatype: Datatype },
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self::Iri(iri.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: Datatype::String,
        }
    }

    pub fn integer(value: i64) -> Self {
        Self::Literal {
            value: value.to_string(),
            datatype: Datatype::Integer,
        }
    }

    /// The IRI, if this term is one.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Self::Iri(iri) => Some(iri),
            Self::Literal { .. } => None,
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Iri(iri) => write!(f, "<{iri}>"),
            Self::Literal {
                value,
                datatype: Datatype::String,
            } => write!(f, "{value:?}"),
            Self::Literal {
                value,
                datatype: Datatype::Integer,
            } => f.write_str(value),
        }
    }
}

/// A statement (subject, predicate, object).
///
/// Field order matters: the derived `Ord` sorts by subject, then predicate,
/// then object, which is the canonical output order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}> <{}> {} .", self.subject, self.predicate, self.object)
    }
}

/// Deduplicated triples in canonical order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripleSet {
    triples: BTreeSet<Triple>,
}

impl TripleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple. Returns `false` if an identical triple was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterate in canonical order.
    pub fn iter(&self) -> btree_set::Iter<'_, Triple> {
        self.triples.iter()
    }

    /// All triples with the given subject and predicate.
    pub fn matching<'a, 'b>(
        &'a self,
        subject: &'b str,
        predicate: &'b str,
    ) -> impl Iterator<Item = &'a Triple> + 'b
    where
        'a: 'b,
    {
        self.triples
            .iter()
            .filter(move |t| t.subject == subject && t.predicate == predicate)
    }

    /// Number of triples using the given predicate.
    pub fn count_predicate(&self, predicate: &str) -> usize {
        self.triples.iter().filter(|t| t.predicate == predicate).count()
    }

    /// Split into groups keyed by `key`, each group keeping canonical order.
    pub fn partition_by<K: Ord>(&self, key: impl Fn(&Triple) -> K) -> Vec<(K, Vec<&Triple>)> {
        let mut groups: std::collections::BTreeMap<K, Vec<&Triple>> = Default::default();
        for triple in &self.triples {
            groups.entry(key(triple)).or_default().push(triple);
        }
        groups.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a TripleSet {
    type Item = &'a Triple;
    type IntoIter = btree_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl IntoIterator for TripleSet {
    type Item = Triple;
    type IntoIter = btree_set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl FromIterator<Triple> for TripleSet {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl Extend<Triple> for TripleSet {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}
