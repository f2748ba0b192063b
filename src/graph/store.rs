//! Persistent RDF graph store backed by oxigraph.
//!
//! The final pipeline stage: turtle files (or the `.tar.gz` archive produced
//! by [`super::turtle::export`]) are bulk-loaded here and can be inspected
//! with SPARQL.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use oxigraph::io::RdfFormat;
use oxigraph::model::vocab::xsd;
use oxigraph::model::{GraphNameRef, NamedNodeRef, Quad};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;

use crate::error::{StoreError, StoreResult};

use super::turtle::to_oxigraph;
use super::vocab::{BASIC_NODE_LABEL, NODE_NS, RDF_TYPE};
use super::{Datatype, Term, TripleSet};

/// One SELECT solution: variable name to bound value. Unbound variables and
/// blank nodes are left out.
pub type Bindings = BTreeMap<String, Term>;

fn sparql_err(context: &str, e: impl std::fmt::Display) -> StoreError {
    StoreError::Sparql {
        message: format!("{context}: {e}"),
    }
}

/// Read a query result term back into the crate's own model.
fn from_oxigraph(term: &oxigraph::model::Term) -> Option<Term> {
    match term {
        oxigraph::model::Term::NamedNode(node) => Some(Term::iri(node.as_str())),
        oxigraph::model::Term::Literal(literal) if literal.datatype() == xsd::INTEGER => {
            Some(Term::Literal {
                value: literal.value().to_string(),
                datatype: Datatype::Integer,
            })
        }
        oxigraph::model::Term::Literal(literal) => Some(Term::string(literal.value())),
        _ => None,
    }
}

/// Embedded SPARQL-capable RDF store.
pub struct GraphStore {
    store: Store,
}

impl GraphStore {
    /// Create a new in-memory store (no persistence).
    pub fn in_memory() -> StoreResult<Self> {
        let store = Store::new().map_err(|e| StoreError::Open {
            path: "<memory>".into(),
            message: e.to_string(),
        })?;
        Ok(Self { store })
    }

    /// Open or create a persistent store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(path).map_err(|e| StoreError::Open {
            path: path.display().to_string(),
            message: format!("failed to create directory: {e}"),
        })?;
        let store = Store::open(path).map_err(|e| StoreError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { store })
    }

    /// Insert an in-memory triple set directly.
    pub fn insert_all(&self, triples: &TripleSet) -> StoreResult<usize> {
        for triple in triples {
            let triple = to_oxigraph(triple).map_err(|e| StoreError::Load {
                origin: "<memory>".into(),
                message: e.to_string(),
            })?;
            let quad = Quad::new(
                triple.subject,
                triple.predicate,
                triple.object,
                GraphNameRef::DefaultGraph,
            );
            self.store.insert(&quad).map_err(|e| StoreError::Storage {
                message: format!("insert failed: {e}"),
            })?;
        }
        Ok(triples.len())
    }

    /// Load a turtle document from a reader.
    pub fn load_turtle(&self, reader: impl Read, origin: &str) -> StoreResult<()> {
        self.store
            .load_from_reader(RdfFormat::Turtle, reader)
            .map_err(|e| StoreError::Load {
                origin: origin.to_string(),
                message: e.to_string(),
            })
    }

    /// Load a single turtle file.
    pub fn load_file(&self, path: &Path) -> StoreResult<()> {
        let origin = path.display().to_string();
        let file = File::open(path).map_err(|e| StoreError::Load {
            origin: origin.clone(),
            message: e.to_string(),
        })?;
        self.load_turtle(BufReader::new(file), &origin)
    }

    /// Load every `.ttl` entry of a `.tar.gz` archive. Returns the number of
    /// files loaded.
    pub fn load_archive(&self, path: &Path) -> StoreResult<usize> {
        if !path.exists() {
            return Err(StoreError::MissingArchive {
                path: path.display().to_string(),
            });
        }
        let archive_name = path.display().to_string();
        let archive_err = |e: std::io::Error| StoreError::Load {
            origin: archive_name.clone(),
            message: e.to_string(),
        };

        let file = File::open(path).map_err(archive_err)?;
        let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
        let mut loaded = 0;
        for entry in archive.entries().map_err(archive_err)? {
            let entry = entry.map_err(archive_err)?;
            let name = entry.path().map_err(archive_err)?.display().to_string();
            if !name.ends_with(".ttl") {
                tracing::debug!(entry = %name, "skipping non-turtle archive entry");
                continue;
            }
            let origin = format!("{archive_name}:{name}");
            self.load_turtle(entry, &origin)?;
            tracing::info!(file = %name, "loaded turtle file into graph store");
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Remove every triple from the store.
    pub fn clear(&self) -> StoreResult<()> {
        self.store.clear().map_err(|e| StoreError::Storage {
            message: format!("clear failed: {e}"),
        })
    }

    /// Number of triples in the store.
    pub fn len(&self) -> StoreResult<usize> {
        self.store.len().map_err(|e| StoreError::Storage {
            message: e.to_string(),
        })
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> StoreResult<bool> {
        self.len().map(|n| n == 0)
    }

    /// Number of compound nodes (subjects typed `n:Compound`).
    pub fn compound_count(&self) -> StoreResult<usize> {
        let compound = format!("{NODE_NS}Compound");
        let rdf_type = NamedNodeRef::new_unchecked(RDF_TYPE);
        let class = NamedNodeRef::new_unchecked(&compound);
        let mut count = 0;
        for quad in self
            .store
            .quads_for_pattern(None, Some(rdf_type), Some(class.into()), None)
        {
            quad.map_err(|e| StoreError::Storage {
                message: e.to_string(),
            })?;
            count += 1;
        }
        Ok(count)
    }

    /// Whether any node carries the ChEBI database label.
    pub fn has_chebi_nodes(&self) -> StoreResult<bool> {
        self.query_ask(&format!(
            "ASK {{ ?s <{RDF_TYPE}> <{NODE_NS}{BASIC_NODE_LABEL}> }}"
        ))
    }

    /// Run a SPARQL SELECT query. Each solution maps variable names to terms.
    pub fn query_select(&self, sparql: &str) -> StoreResult<Vec<Bindings>> {
        let results = self
            .store
            .query(sparql)
            .map_err(|e| sparql_err("SPARQL query failed", e))?;
        let QueryResults::Solutions(solutions) = results else {
            return Err(sparql_err("expected solutions", "not a SELECT query"));
        };

        let mut rows = Vec::new();
        for solution in solutions {
            let solution = solution.map_err(|e| sparql_err("solution error", e))?;
            let row: Bindings = solution
                .iter()
                .filter_map(|(var, term)| Some((var.as_str().to_string(), from_oxigraph(term)?)))
                .collect();
            rows.push(row);
        }
        Ok(rows)
    }

    /// Run a SPARQL ASK query.
    pub fn query_ask(&self, sparql: &str) -> StoreResult<bool> {
        let results = self
            .store
            .query(sparql)
            .map_err(|e| sparql_err("SPARQL query failed", e))?;
        match results {
            QueryResults::Boolean(b) => Ok(b),
            _ => Err(sparql_err("expected a boolean", "not an ASK query")),
        }
    }
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Triple;

    fn sample() -> TripleSet {
        let s = "http://purl.obolibrary.org/obo/CHEBI_1";
        [
            Triple::new(s, RDF_TYPE, Term::iri(format!("{NODE_NS}Compound"))),
            Triple::new(s, RDF_TYPE, Term::iri(format!("{NODE_NS}{BASIC_NODE_LABEL}"))),
            Triple::new(
                "http://purl.obolibrary.org/obo/CHEBI_2",
                RDF_TYPE,
                Term::iri(format!("{NODE_NS}Compound")),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn insert_and_count() {
        let store = GraphStore::in_memory().unwrap();
        assert!(store.is_empty().unwrap());
        assert_eq!(store.insert_all(&sample()).unwrap(), 3);
        assert_eq!(store.len().unwrap(), 3);
        assert_eq!(store.compound_count().unwrap(), 2);
        assert!(store.has_chebi_nodes().unwrap());
    }

    #[test]
    fn clear_empties_store() {
        let store = GraphStore::in_memory().unwrap();
        store.insert_all(&sample()).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty().unwrap());
        assert!(!store.has_chebi_nodes().unwrap());
    }

    #[test]
    fn select_returns_bindings() {
        let store = GraphStore::in_memory().unwrap();
        store.insert_all(&sample()).unwrap();
        let rows = store
            .query_select(&format!(
                "SELECT ?s WHERE {{ ?s <{RDF_TYPE}> <{NODE_NS}Compound> }}"
            ))
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0]["s"],
            Term::iri("http://purl.obolibrary.org/obo/CHEBI_1")
        );
    }

    #[test]
    fn select_reads_typed_literals() {
        let store = GraphStore::in_memory().unwrap();
        let s = "http://purl.obolibrary.org/obo/CHEBI_1";
        let star = format!("{NODE_NS}star");
        let triples: TripleSet = [
            Triple::new(s, star.as_str(), Term::integer(3)),
            Triple::new(s, format!("{NODE_NS}name"), Term::string("caffeine")),
        ]
        .into_iter()
        .collect();
        store.insert_all(&triples).unwrap();

        let rows = store
            .query_select(&format!("SELECT ?p ?o WHERE {{ <{s}> ?p ?o }} ORDER BY ?p"))
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["o"], Term::string("caffeine"));
        assert_eq!(rows[1]["p"], Term::iri(star.as_str()));
        assert_eq!(rows[1]["o"], Term::integer(3));
    }

    #[test]
    fn select_rejects_ask_queries() {
        let store = GraphStore::in_memory().unwrap();
        let err = store.query_select("ASK { ?s ?p ?o }").unwrap_err();
        assert!(matches!(err, StoreError::Sparql { .. }));
    }

    #[test]
    fn single_turtle_file_loads() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("compound.ttl");
        std::fs::write(
            &path,
            format!("<http://purl.obolibrary.org/obo/CHEBI_1> a <{NODE_NS}Compound> .\n"),
        )
        .unwrap();
        let store = GraphStore::in_memory().unwrap();
        store.load_file(&path).unwrap();
        assert_eq!(store.compound_count().unwrap(), 1);

        let err = store.load_file(&dir.path().join("missing.ttl")).unwrap_err();
        assert!(matches!(err, StoreError::Load { .. }));
    }

    #[test]
    fn missing_archive_is_reported() {
        let store = GraphStore::in_memory().unwrap();
        let err = store
            .load_archive(Path::new("/nonexistent/ttls.tar.gz"))
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingArchive { .. }));
    }

    #[test]
    fn persistent_store_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let store = GraphStore::open(dir.path()).unwrap();
            store.insert_all(&sample()).unwrap();
        }
        let store = GraphStore::open(dir.path()).unwrap();
        assert_eq!(store.len().unwrap(), 3);
    }
}
