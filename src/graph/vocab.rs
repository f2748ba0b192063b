//! IRI namespaces and the stable predicate vocabulary.
//!
//! Downstream loaders key on these IRIs, so local names never change between
//! releases. New predicates may be added; existing ones are not renamed.

use crate::model::{CompoundId, NameType, RelationshipType, XrefDatabase};

/// Compound nodes: `CHEBI_{id}` in the OBO namespace.
pub const CHEBI_NS: &str = "http://purl.obolibrary.org/obo/CHEBI_";
/// Node classes (`rdf:type` targets).
pub const NODE_NS: &str = "https://biokb.scai.fraunhofer.de/chebi/node#";
/// Predicates.
pub const REL_NS: &str = "https://biokb.scai.fraunhofer.de/chebi/relation#";

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// Label shared by every node this crate creates, so a graph store can
/// delete the ChEBI subgraph without touching other datasets.
pub const BASIC_NODE_LABEL: &str = "DbChEBI";

/// Prefix declarations for turtle output, in declaration order.
pub const PREFIXES: [(&str, &str); 5] = [
    ("c", CHEBI_NS),
    ("n", NODE_NS),
    ("r", REL_NS),
    ("rdf", RDF_NS),
    ("xsd", XSD_NS),
];

/// Every predicate the ChEBI mapping can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Predicate {
    HasName,
    HasInchi,
    HasPatent,
    HasCas,
    HasParent,
    HasXref,
    /// Kind-specific name link, stated next to `has_name`.
    NameKind(NameType),
    Relationship(RelationshipType),
    // Literal properties of the compound node.
    Name,
    Status,
    Star,
    Structure,
    Definition,
    Source,
}

impl Predicate {
    pub fn local_name(self) -> &'static str {
        match self {
            Self::HasName => "has_name",
            Self::HasInchi => "has_inchi",
            Self::HasPatent => "has_patent",
            Self::HasCas => "has_cas",
            Self::HasParent => "has_parent",
            Self::HasXref => "has_xref",
            Self::NameKind(kind) => kind.as_str(),
            Self::Relationship(t) => t.as_str(),
            Self::Name => "name",
            Self::Status => "status",
            Self::Star => "star",
            Self::Structure => "structure",
            Self::Definition => "definition",
            Self::Source => "source",
        }
    }

    pub fn iri(self) -> String {
        format!("{REL_NS}{}", self.local_name())
    }
}

/// IRI of a compound node.
pub fn compound_iri(id: CompoundId) -> String {
    format!("{CHEBI_NS}{}", id.get())
}

/// Namespace under which an external database publishes its entries.
pub fn xref_namespace(db: XrefDatabase) -> &'static str {
    match db {
        XrefDatabase::BindingDb => "http://www.bindingdb.org/rwd/entry/",
        XrefDatabase::BioModels => "https://www.ebi.ac.uk/biomodels/",
        XrefDatabase::BrendaLigand => "https://www.brenda-enzymes.de/ligand.php?brenda_ligand_id=",
        XrefDatabase::Chembl => "https://www.ebi.ac.uk/chembl/id_lookup/",
        XrefDatabase::EcCode => "https://www.brenda-enzymes.org/enzyme.php?ecno=",
        XrefDatabase::ExpressionAtlas => "https://www.ebi.ac.uk/gxa/experiments/",
        XrefDatabase::GeneOntology => "https://amigo.geneontology.org/amigo/term/",
        XrefDatabase::Reactome => "https://reactome.org/content/detail/",
        XrefDatabase::Rhea => "https://www.rhea-db.org/rhea/",
        XrefDatabase::SureChembl => "https://www.surechembl.org/chemical/",
    }
}

/// IRI of an accession in an external database. Characters outside the
/// unreserved set (and `:`) are percent-encoded.
pub fn xref_iri(db: XrefDatabase, accession: &str) -> String {
    let mut iri = String::from(xref_namespace(db));
    for byte in accession.trim().bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~' | b':') {
            iri.push(char::from(byte));
        } else {
            iri.push_str(&format!("%{byte:02X}"));
        }
    }
    iri
}

/// IRI of a node class.
pub fn node_class(label: &str) -> String {
    format!("{NODE_NS}{label}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_iri_uses_obo_namespace() {
        let id = CompoundId::new(27732).unwrap();
        assert_eq!(compound_iri(id), "http://purl.obolibrary.org/obo/CHEBI_27732");
    }

    #[test]
    fn predicate_vocabulary_is_stable() {
        assert_eq!(
            Predicate::HasName.iri(),
            "https://biokb.scai.fraunhofer.de/chebi/relation#has_name"
        );
        assert_eq!(Predicate::HasCas.local_name(), "has_cas");
        assert_eq!(Predicate::HasInchi.local_name(), "has_inchi");
        assert_eq!(Predicate::HasPatent.local_name(), "has_patent");
        assert_eq!(
            Predicate::Relationship(RelationshipType::IsConjugateBaseOf).local_name(),
            "is_conjugate_base_of"
        );
        assert_eq!(Predicate::HasXref.local_name(), "has_xref");
        assert_eq!(Predicate::NameKind(NameType::IupacName).local_name(), "iupac_name");
    }

    #[test]
    fn xref_iris_are_encoded() {
        assert_eq!(
            xref_iri(XrefDatabase::GeneOntology, "GO:0005515"),
            "https://amigo.geneontology.org/amigo/term/GO:0005515"
        );
        assert_eq!(
            xref_iri(XrefDatabase::EcCode, "1.1.1.1"),
            "https://www.brenda-enzymes.org/enzyme.php?ecno=1.1.1.1"
        );
        assert_eq!(
            xref_iri(XrefDatabase::Reactome, "R-HSA 123/x"),
            "https://reactome.org/content/detail/R-HSA%20123%2Fx"
        );
    }
}
