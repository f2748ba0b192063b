//! ChEBI mapping table and the `convert` operation.
//!
//! | row          | subject          | predicate                 | object                 |
//! |--------------|------------------|---------------------------|------------------------|
//! | Compound     | compound         | `rdf:type`                | `n:Compound`, `n:DbChEBI` |
//! | Compound     | compound         | `r:name` `r:status` `r:star` (+ optional `r:structure` `r:definition` `r:source`) | literal |
//! | Compound     | compound         | `r:has_parent`            | parent compound        |
//! | Name         | compound         | `r:has_name` (+ `r:synonym` `r:iupac_name` `r:brand_name` `r:inn` by name type) | name literal |
//! | InChI        | compound         | `r:has_inchi`             | InChI literal          |
//! | Patent       | compound         | `r:has_patent`            | patent literal         |
//! | CAS          | compound         | `r:has_cas`               | registry literal       |
//! | Xref         | compound         | `r:has_xref`              | external database entry |
//! | Relationship | source compound  | `r:<relationship type>`   | target compound        |
//!
//! Relationship edges are emitted only in the direction present in the data.

use serde::{Deserialize, Serialize};

use crate::graph::vocab::{self, BASIC_NODE_LABEL, Predicate, RDF_TYPE, REL_NS};
use crate::graph::{Term, Triple, TripleSet};
use crate::mapping::{AttributeRow, ConversionResult, ConversionRun, EntitySchema, RowRef, Violation};
use crate::model::{
    CasEntry, Compound, CompoundId, Inchi, Name, NameType, Patent, Relationship,
    RelationshipType, Xref,
};

pub const COMPOUND_TABLE: &str = "compound";
pub const RELATION_TABLE: &str = "relation";

/// Turtle files produced by an export, one per source table.
pub const EXPORT_FILES: [&str; 7] = [
    "cas.ttl",
    "compound.ttl",
    "inchi.ttl",
    "name.ttl",
    "patent.ttl",
    "relation.ttl",
    "xref.ttl",
];

/// IRI minting for ChEBI compounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChebiSchema;

impl EntitySchema for ChebiSchema {
    type Key = CompoundId;

    fn entity_iri(&self, key: CompoundId) -> String {
        vocab::compound_iri(key)
    }
}

impl AttributeRow<ChebiSchema> for Name {
    const TABLE: &'static str = "name";

    fn entity(&self) -> CompoundId {
        self.compound_id
    }

    fn predicate(&self) -> String {
        Predicate::HasName.iri()
    }

    fn object(&self) -> Term {
        Term::string(self.name.as_str())
    }

    fn refinement(&self) -> Option<String> {
        NameType::from_tag(&self.name_type).map(|kind| Predicate::NameKind(kind).iri())
    }
}

impl AttributeRow<ChebiSchema> for Inchi {
    const TABLE: &'static str = "inchi";

    fn entity(&self) -> CompoundId {
        self.compound_id
    }

    fn predicate(&self) -> String {
        Predicate::HasInchi.iri()
    }

    fn object(&self) -> Term {
        Term::string(self.inchi.as_str())
    }
}

impl AttributeRow<ChebiSchema> for Patent {
    const TABLE: &'static str = "patent";

    fn entity(&self) -> CompoundId {
        self.compound_id
    }

    fn predicate(&self) -> String {
        Predicate::HasPatent.iri()
    }

    fn object(&self) -> Term {
        Term::string(self.reference.as_str())
    }
}

impl AttributeRow<ChebiSchema> for CasEntry {
    const TABLE: &'static str = "cas";

    fn entity(&self) -> CompoundId {
        self.compound_id
    }

    fn predicate(&self) -> String {
        Predicate::HasCas.iri()
    }

    fn object(&self) -> Term {
        Term::string(self.registry_number.as_str())
    }
}

impl AttributeRow<ChebiSchema> for Xref {
    const TABLE: &'static str = "xref";

    fn entity(&self) -> CompoundId {
        self.compound_id
    }

    fn predicate(&self) -> String {
        Predicate::HasXref.iri()
    }

    fn object(&self) -> Term {
        Term::iri(vocab::xref_iri(self.database, &self.accession))
    }
}

/// Snapshot of all ChEBI tables for one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChebiTables {
    pub compounds: Vec<Compound>,
    pub names: Vec<Name>,
    pub inchis: Vec<Inchi>,
    pub patents: Vec<Patent>,
    pub cas_entries: Vec<CasEntry>,
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub xrefs: Vec<Xref>,
}

impl ChebiTables {
    /// Convert the whole snapshot, cross-references included. See [`convert`].
    pub fn convert(&self) -> ConversionResult<TripleSet> {
        convert_snapshot(self)
    }

    /// Total number of rows across all tables.
    pub fn row_count(&self) -> usize {
        self.compounds.len()
            + self.names.len()
            + self.inchis.len()
            + self.patents.len()
            + self.cas_entries.len()
            + self.relationships.len()
            + self.xrefs.len()
    }
}

/// Map ChEBI rows to a deduplicated, canonically ordered triple set.
///
/// Input order never affects the result. Every offending row is reported in
/// the returned [`ConversionError`](crate::mapping::ConversionError); when
/// there is any, no triples are returned.
pub fn convert(
    compounds: &[Compound],
    names: &[Name],
    inchis: &[Inchi],
    patents: &[Patent],
    cas_entries: &[CasEntry],
    relationships: &[Relationship],
) -> ConversionResult<TripleSet> {
    run_tables(compounds, names, inchis, patents, cas_entries, relationships, &[])
}

fn convert_snapshot(tables: &ChebiTables) -> ConversionResult<TripleSet> {
    run_tables(
        &tables.compounds,
        &tables.names,
        &tables.inchis,
        &tables.patents,
        &tables.cas_entries,
        &tables.relationships,
        &tables.xrefs,
    )
}

fn run_tables(
    compounds: &[Compound],
    names: &[Name],
    inchis: &[Inchi],
    patents: &[Patent],
    cas_entries: &[CasEntry],
    relationships: &[Relationship],
    xrefs: &[Xref],
) -> ConversionResult<TripleSet> {
    let schema = ChebiSchema;
    let mut run = ConversionRun::new(&schema);

    // Register every compound before resolving any reference, parents included.
    let mut registered = Vec::with_capacity(compounds.len());
    for (index, compound) in compounds.iter().enumerate() {
        if let Some(iri) = run.register(RowRef::new(COMPOUND_TABLE, index), compound.id) {
            registered.push((index, iri, compound));
        }
    }
    for (index, iri, compound) in registered {
        map_compound(&mut run, index, iri, compound);
    }

    run.map_attributes(names);
    run.map_attributes(inchis);
    run.map_attributes(patents);
    run.map_attributes(cas_entries);
    run.map_attributes(xrefs);

    for (index, relationship) in relationships.iter().enumerate() {
        map_relationship(&mut run, RowRef::new(RELATION_TABLE, index), relationship);
    }

    run.finish()
}

fn map_compound(run: &mut ConversionRun<'_, ChebiSchema>, index: usize, iri: String, compound: &Compound) {
    run.emit(Triple::new(iri.as_str(), RDF_TYPE, Term::iri(vocab::node_class("Compound"))));
    run.emit(Triple::new(iri.as_str(), RDF_TYPE, Term::iri(vocab::node_class(BASIC_NODE_LABEL))));

    // Curation provenance stays on the node as literals, never as edges.
    run.emit(Triple::new(iri.as_str(), Predicate::Status.iri(), Term::string(compound.status.code())));
    run.emit(Triple::new(
        iri.as_str(),
        Predicate::Star.iri(),
        Term::integer(i64::from(compound.star.get())),
    ));

    if !compound.name.trim().is_empty() {
        run.emit(Triple::new(iri.as_str(), Predicate::Name.iri(), Term::string(compound.name.as_str())));
    }
    let optional = [
        (Predicate::Structure, &compound.structure),
        (Predicate::Definition, &compound.definition),
        (Predicate::Source, &compound.source),
    ];
    for (predicate, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            run.emit(Triple::new(iri.as_str(), predicate.iri(), Term::string(value)));
        }
    }

    if let Some(parent) = compound.parent_id {
        if let Some(parent_iri) = run.resolve(RowRef::new(COMPOUND_TABLE, index), parent) {
            run.emit(Triple::new(iri, Predicate::HasParent.iri(), Term::iri(parent_iri)));
        }
    }
}

fn map_relationship(
    run: &mut ConversionRun<'_, ChebiSchema>,
    row: RowRef,
    relationship: &Relationship,
) {
    run.mark_row();
    let relation_type = relationship.relation_type.parse::<RelationshipType>();
    // Resolve both ends even when the type is bad so one pass reports everything.
    let source = run.resolve(row, relationship.source);
    let target = run.resolve(row, relationship.target);

    let relation_type = match relation_type {
        Ok(t) => t,
        Err(_) => {
            run.reject(Violation::UnknownRelationshipType {
                row,
                value: relationship.relation_type.clone(),
            });
            return;
        }
    };

    if let (Some(source), Some(target)) = (source, target) {
        run.emit(Triple::new(
            source,
            Predicate::Relationship(relation_type).iri(),
            Term::iri(target),
        ));
    }
}

/// Turtle file a triple belongs to when the triple set is split per table.
pub fn export_file(triple: &Triple) -> &'static str {
    let Some(local) = triple.predicate.strip_prefix(REL_NS) else {
        return "compound.ttl";
    };
    // `has_patent` names both the patent attribute and a compound edge;
    // the object kind tells them apart.
    let is_edge = triple.object.as_iri().is_some();
    match local {
        "has_name" => "name.ttl",
        "has_xref" => "xref.ttl",
        other if NameType::ALL.iter().any(|kind| kind.as_str() == other) => "name.ttl",
        "has_inchi" => "inchi.ttl",
        "has_cas" => "cas.ttl",
        "has_patent" if !is_edge => "patent.ttl",
        "has_parent" => "compound.ttl",
        other if is_edge && other.parse::<RelationshipType>().is_ok() => "relation.ttl",
        _ => "compound.ttl",
    }
}
