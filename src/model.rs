//! Relational row types consumed by the RDF mapper.
//!
//! Rows mirror the ChEBI flat-file tables after import. They are plain data:
//! the mapper only ever borrows them, so a conversion run can never mutate
//! its input snapshot.

use std::num::NonZeroU64;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable integer key of a ChEBI compound (the number in `CHEBI:15365`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
#[repr(transparent)]
pub struct CompoundId(NonZeroU64);

impl CompoundId {
    /// Create a `CompoundId` from a raw `u64`.
    ///
    /// Returns `None` if `raw` is zero; ChEBI never assigns id 0.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(CompoundId)
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for CompoundId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CHEBI:{}", self.0)
    }
}

impl TryFrom<u64> for CompoundId {
    type Error = String;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw).ok_or_else(|| "compound id must be non-zero".to_string())
    }
}

impl From<CompoundId> for u64 {
    fn from(id: CompoundId) -> Self {
        id.get()
    }
}

impl FromStr for CompoundId {
    type Err = String;

    /// Accepts both `15365` and the accession form `CHEBI:15365`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s
            .strip_prefix("CHEBI:")
            .or_else(|| s.strip_prefix("chebi:"))
            .unwrap_or(s);
        let raw: u64 = digits
            .parse()
            .map_err(|_| format!("\"{s}\" is not a compound id"))?;
        Self::try_from(raw)
    }
}

/// Curation state of a compound entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompoundStatus {
    /// `C`: checked by a curator.
    Checked,
    /// `E`: exists, not yet checked.
    ExistsUnchecked,
    /// `D`: deleted.
    Deleted,
    /// `O`: obsolete.
    Obsolete,
    /// `S`: annotated by a third party (submitted).
    ThirdPartyAnnotated,
}

impl CompoundStatus {
    /// Single-letter status code as it appears in ChEBI.
    pub fn code(self) -> &'static str {
        match self {
            Self::Checked => "C",
            Self::ExistsUnchecked => "E",
            Self::Deleted => "D",
            Self::Obsolete => "O",
            Self::ThirdPartyAnnotated => "S",
        }
    }
}

impl std::fmt::Display for CompoundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CompoundStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "C" | "c" => Ok(Self::Checked),
            "E" | "e" => Ok(Self::ExistsUnchecked),
            "D" | "d" => Ok(Self::Deleted),
            "O" | "o" => Ok(Self::Obsolete),
            "S" | "s" => Ok(Self::ThirdPartyAnnotated),
            other => Err(format!("unknown status code \"{other}\"")),
        }
    }
}

/// ChEBI star rating, always in `1..=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct StarRating(u8);

impl StarRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 3;

    pub fn new(stars: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&stars).then_some(Self(stars))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for StarRating {
    type Error = String;

    fn try_from(stars: u8) -> Result<Self, Self::Error> {
        Self::new(stars).ok_or_else(|| format!("star rating {stars} is outside 1..=3"))
    }
}

impl From<StarRating> for u8 {
    fn from(rating: StarRating) -> Self {
        rating.0
    }
}

impl FromStr for StarRating {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stars: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("\"{s}\" is not a star rating"))?;
        Self::try_from(stars)
    }
}

/// A ChEBI compound entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compound {
    pub id: CompoundId,
    /// Canonical name.
    pub name: String,
    pub status: CompoundStatus,
    pub star: StarRating,
    /// Optional structural identifier (InChIKey or similar).
    pub structure: Option<String>,
    /// Compound this entry was merged into or derives from.
    pub parent_id: Option<CompoundId>,
    pub definition: Option<String>,
    /// Submitting database.
    pub source: Option<String>,
}

impl Compound {
    /// Compound with only the required columns filled.
    pub fn new(
        id: CompoundId,
        name: impl Into<String>,
        status: CompoundStatus,
        star: StarRating,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            status,
            star,
            structure: None,
            parent_id: None,
            definition: None,
            source: None,
        }
    }
}

/// A synonym, IUPAC name, brand name, etc. attached to a compound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub compound_id: CompoundId,
    pub name: String,
    /// Name-type tag such as `SYNONYM` or `IUPAC NAME`.
    pub name_type: String,
}

/// Name kinds that get their own predicate next to the generic name link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameType {
    Synonym,
    IupacName,
    BrandName,
    Inn,
}

impl NameType {
    pub const ALL: [NameType; 4] = [Self::Synonym, Self::IupacName, Self::BrandName, Self::Inn];

    /// Predicate local name for names of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Synonym => "synonym",
            Self::IupacName => "iupac_name",
            Self::BrandName => "brand_name",
            Self::Inn => "inn",
        }
    }

    /// Parse a ChEBI name-type tag (`SYNONYM`, `IUPAC NAME`, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_uppercase().as_str() {
            "SYNONYM" => Some(Self::Synonym),
            "IUPAC NAME" => Some(Self::IupacName),
            "BRAND NAME" => Some(Self::BrandName),
            "INN" => Some(Self::Inn),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inchi {
    pub compound_id: CompoundId,
    pub inchi: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patent {
    pub compound_id: CompoundId,
    pub reference: String,
}

/// A CAS Registry Number attached to a compound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CasEntry {
    pub compound_id: CompoundId,
    pub registry_number: String,
}

/// External databases whose accessions become cross-reference links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum XrefDatabase {
    BindingDb,
    BioModels,
    BrendaLigand,
    Chembl,
    EcCode,
    ExpressionAtlas,
    GeneOntology,
    Reactome,
    Rhea,
    SureChembl,
}

impl XrefDatabase {
    pub const ALL: [XrefDatabase; 10] = [
        Self::BindingDb,
        Self::BioModels,
        Self::BrendaLigand,
        Self::Chembl,
        Self::EcCode,
        Self::ExpressionAtlas,
        Self::GeneOntology,
        Self::Reactome,
        Self::Rhea,
        Self::SureChembl,
    ];

    /// Registry prefix of the database.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::BindingDb => "bindingdb",
            Self::BioModels => "biomodels.db",
            Self::BrendaLigand => "brenda.ligand",
            Self::Chembl => "chembl",
            Self::EcCode => "eccode",
            Self::ExpressionAtlas => "gxa.expt",
            Self::GeneOntology => "go",
            Self::Reactome => "reactome",
            Self::Rhea => "rhea",
            Self::SureChembl => "surechembl",
        }
    }

    /// Match an accession type or source label such as `ChEMBL accession`
    /// or `Rhea`. Case-insensitive; a trailing `accession` is ignored.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        let label = label.strip_suffix(" accession").unwrap_or(&label).trim();
        let db = match label {
            "bindingdb" => Self::BindingDb,
            "biomodels" | "biomodels.db" => Self::BioModels,
            "brenda" | "brenda.ligand" | "brenda ligand" => Self::BrendaLigand,
            "chembl" => Self::Chembl,
            "eccode" | "ec number" | "enzyme commission" => Self::EcCode,
            "gxa.expt" | "expression atlas" | "gene expression atlas" => Self::ExpressionAtlas,
            "go" | "gene ontology" => Self::GeneOntology,
            "reactome" => Self::Reactome,
            "rhea" => Self::Rhea,
            "surechembl" => Self::SureChembl,
            _ => return None,
        };
        Some(db)
    }
}

/// An accession of a compound in one of the [`XrefDatabase`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xref {
    pub compound_id: CompoundId,
    pub database: XrefDatabase,
    pub accession: String,
}

/// A typed edge between two compounds.
///
/// The type is kept as the raw text from the source table. The mapper
/// resolves it against [`RelationshipType`] and rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: CompoundId,
    pub target: CompoundId,
    pub relation_type: String,
}

impl Relationship {
    pub fn new(source: CompoundId, target: CompoundId, relation_type: impl Into<String>) -> Self {
        Self {
            source,
            target,
            relation_type: relation_type.into(),
        }
    }
}

/// The fixed ChEBI ontology relation vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    HasFunctionalParent,
    HasParentHydride,
    HasPart,
    HasPatent,
    HasRole,
    IsA,
    IsConjugateAcidOf,
    IsConjugateBaseOf,
    IsEnantiomerOf,
    IsSubstituentGroupFrom,
    IsTautomerOf,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 11] = [
        Self::HasFunctionalParent,
        Self::HasParentHydride,
        Self::HasPart,
        Self::HasPatent,
        Self::HasRole,
        Self::IsA,
        Self::IsConjugateAcidOf,
        Self::IsConjugateBaseOf,
        Self::IsEnantiomerOf,
        Self::IsSubstituentGroupFrom,
        Self::IsTautomerOf,
    ];

    /// The tag as written in ChEBI, which is also the predicate local name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HasFunctionalParent => "has_functional_parent",
            Self::HasParentHydride => "has_parent_hydride",
            Self::HasPart => "has_part",
            Self::HasPatent => "has_patent",
            Self::HasRole => "has_role",
            Self::IsA => "is_a",
            Self::IsConjugateAcidOf => "is_conjugate_acid_of",
            Self::IsConjugateBaseOf => "is_conjugate_base_of",
            Self::IsEnantiomerOf => "is_enantiomer_of",
            Self::IsSubstituentGroupFrom => "is_substituent_group_from",
            Self::IsTautomerOf => "is_tautomer_of",
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = String;

    /// Matching is exact after trimming; `IS_A` and `is a` are not accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown relationship type \"{s}\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compound_id_rejects_zero() {
        assert!(CompoundId::new(0).is_none());
        assert_eq!(CompoundId::new(15365).unwrap().get(), 15365);
    }

    #[test]
    fn compound_id_parses_accession_form() {
        let id: CompoundId = "CHEBI:27732".parse().unwrap();
        assert_eq!(id.get(), 27732);
        let id: CompoundId = " 27732 ".parse().unwrap();
        assert_eq!(id.get(), 27732);
        assert!("CHEBI:x".parse::<CompoundId>().is_err());
        assert!("0".parse::<CompoundId>().is_err());
    }

    #[test]
    fn status_codes_roundtrip() {
        for code in ["C", "E", "D", "O", "S"] {
            let status: CompoundStatus = code.parse().unwrap();
            assert_eq!(status.code(), code);
        }
        assert!("X".parse::<CompoundStatus>().is_err());
    }

    #[test]
    fn star_rating_bounds() {
        assert!(StarRating::new(0).is_none());
        assert_eq!(StarRating::new(3).unwrap().get(), 3);
        assert!(StarRating::new(4).is_none());
        assert!("2".parse::<StarRating>().is_ok());
        assert!("two".parse::<StarRating>().is_err());
    }

    #[test]
    fn name_tags_map_to_kinds() {
        assert_eq!(NameType::from_tag("IUPAC NAME"), Some(NameType::IupacName));
        assert_eq!(NameType::from_tag("synonym"), Some(NameType::Synonym));
        assert_eq!(NameType::from_tag("INN"), Some(NameType::Inn));
        assert_eq!(NameType::from_tag("ABBREVIATION"), None);
    }

    #[test]
    fn xref_labels_match_type_or_source() {
        assert_eq!(XrefDatabase::from_label("ChEMBL accession"), Some(XrefDatabase::Chembl));
        assert_eq!(XrefDatabase::from_label("SureChEMBL"), Some(XrefDatabase::SureChembl));
        assert_eq!(XrefDatabase::from_label(" Rhea "), Some(XrefDatabase::Rhea));
        assert_eq!(XrefDatabase::from_label("KEGG COMPOUND accession"), None);
        for db in XrefDatabase::ALL {
            assert_eq!(XrefDatabase::from_label(db.prefix()), Some(db));
        }
    }

    #[test]
    fn relationship_type_vocabulary_is_closed() {
        for t in RelationshipType::ALL {
            assert_eq!(t.as_str().parse::<RelationshipType>().unwrap(), t);
        }
        assert!("made_up_type".parse::<RelationshipType>().is_err());
        assert!("IS_A".parse::<RelationshipType>().is_err());
    }
}
