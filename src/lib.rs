// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # chebi-rdf
//!
//! Converts the ChEBI chemical entity database into an RDF triple graph.
//!
//! ## Architecture
//!
//! - **Rows** (`model`): typed compound, name, InChI, patent, CAS and relationship rows
//! - **Mapping** (`mapping`): a generic row-to-triple engine plus the ChEBI mapping table
//! - **Graph** (`graph`): canonical triple sets, the vocabulary, turtle output and an oxigraph store
//! - **Source** (`source`): flat-file reader and downloader
//! - **Pipeline** (`pipeline`): download, convert, export and import stages
//!
//! ## Library usage
//!
//! ```
//! use chebi_rdf::mapping::chebi::convert;
//! use chebi_rdf::model::{Compound, CompoundId, CompoundStatus, Name, StarRating};
//!
//! let caffeine = CompoundId::new(27732).unwrap();
//! let compounds = [Compound::new(
//!     caffeine,
//!     "caffeine",
//!     CompoundStatus::Checked,
//!     StarRating::new(3).unwrap(),
//! )];
//! let names = [Name {
//!     compound_id: caffeine,
//!     name: "guaranine".into(),
//!     name_type: "SYNONYM".into(),
//! }];
//! let triples = convert(&compounds, &names, &[], &[], &[], &[]).unwrap();
//! assert_eq!(triples.len(), 7);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod mapping;
pub mod model;
pub mod paths;
pub mod pipeline;
pub mod source;
