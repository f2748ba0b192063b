//! Turtle serialization sink.
//!
//! Renders triple sets with oxigraph's turtle serializer and packs per-table
//! files into a `.tar.gz` archive for the graph loader. Output is
//! byte-for-byte reproducible: triples arrive in canonical order, prefixes are
//! declared in a fixed order, and archive entries carry zeroed timestamps.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::vocab::xsd;
use oxigraph::model::{Literal, NamedNode};
use rayon::prelude::*;

use crate::error::{SinkError, SinkResult};

use super::vocab::PREFIXES;
use super::{Datatype, Term, Triple, TripleSet};

/// Files written by [`export`] and where the archive went.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExportSummary {
    /// `(file name, triple count)` in write order.
    pub files: Vec<(String, usize)>,
    pub archive: Option<PathBuf>,
}

impl ExportSummary {
    pub fn triple_count(&self) -> usize {
        self.files.iter().map(|(_, n)| n).sum()
    }
}

fn named_node(iri: &str) -> SinkResult<NamedNode> {
    NamedNode::new(iri).map_err(|e| SinkError::InvalidIri {
        iri: iri.to_string(),
        message: e.to_string(),
    })
}

/// Convert a mapper triple into oxigraph's model.
pub fn to_oxigraph(triple: &Triple) -> SinkResult<oxigraph::model::Triple> {
    let subject = named_node(&triple.subject)?;
    let predicate = named_node(&triple.predicate)?;
    let object: oxigraph::model::Term = match &triple.object {
        Term::Iri(iri) => named_node(iri)?.into(),
        Term::Literal {
            value,
            datatype: Datatype::String,
        } => Literal::new_simple_literal(value.as_str()).into(),
        Term::Literal {
            value,
            datatype: Datatype::Integer,
        } => Literal::new_typed_literal(value.as_str(), xsd::INTEGER).into(),
    };
    Ok(oxigraph::model::Triple::new(subject, predicate, object))
}

/// Serialize triples as turtle into `writer`, in iteration order.
///
/// `origin` names the destination in error messages.
pub fn write_turtle<'a, W: Write>(
    triples: impl IntoIterator<Item = &'a Triple>,
    writer: W,
    origin: &str,
) -> SinkResult<W> {
    let io_err = |e: std::io::Error| SinkError::Io {
        path: origin.to_string(),
        source: e,
    };

    let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle);
    for (prefix, namespace) in PREFIXES {
        serializer = serializer
            .with_prefix(prefix, namespace)
            .map_err(|e| SinkError::InvalidIri {
                iri: namespace.to_string(),
                message: e.to_string(),
            })?;
    }

    let mut out = serializer.for_writer(writer);
    for triple in triples {
        let triple = to_oxigraph(triple)?;
        out.serialize_triple(&triple).map_err(io_err)?;
    }
    out.finish().map_err(io_err)
}

/// Render a whole triple set as a turtle document.
pub fn to_turtle(triples: &TripleSet) -> SinkResult<Vec<u8>> {
    write_turtle(triples, Vec::new(), "<memory>")
}

/// Write a triple set to a single turtle file.
pub fn write_file(triples: &TripleSet, path: &Path) -> SinkResult<()> {
    let origin = path.display().to_string();
    let file = File::create(path).map_err(|e| SinkError::Io {
        path: origin.clone(),
        source: e,
    })?;
    let mut writer = write_turtle(triples, BufWriter::new(file), &origin)?;
    writer.flush().map_err(|e| SinkError::Io {
        path: origin,
        source: e,
    })
}

/// Split `triples` into one turtle file per entry of `files`, routed by
/// `classify`, write them under `dir`, and optionally pack them into a
/// `.tar.gz` at `archive`.
///
/// Every listed file is written, even when no triple is routed to it, so
/// consumers always see the same file set.
pub fn export(
    triples: &TripleSet,
    files: &[&'static str],
    classify: impl Fn(&Triple) -> &'static str,
    dir: &Path,
    archive: Option<&Path>,
) -> SinkResult<ExportSummary> {
    std::fs::create_dir_all(dir).map_err(|e| SinkError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    let groups = triples.partition_by(|t| classify(t));
    // Files are independent; render them in parallel, write in list order.
    let rendered: Vec<(&'static str, usize, Vec<u8>)> = files
        .par_iter()
        .map(|&file| {
            let group: &[&Triple] = groups
                .iter()
                .find(|(name, _)| *name == file)
                .map(|(_, g)| g.as_slice())
                .unwrap_or(&[]);
            let origin = dir.join(file).display().to_string();
            let bytes = write_turtle(group.iter().copied(), Vec::new(), &origin)?;
            Ok((file, group.len(), bytes))
        })
        .collect::<SinkResult<_>>()?;

    for (file, count, bytes) in &rendered {
        let path = dir.join(file);
        std::fs::write(&path, bytes).map_err(|e| SinkError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::info!(file = *file, triples = *count, "wrote turtle file");
    }

    let unrouted: usize = groups
        .iter()
        .filter(|(name, _)| !files.contains(name))
        .map(|(_, g)| g.len())
        .sum();
    if unrouted > 0 {
        tracing::warn!(unrouted, "triples routed to files outside the export list were dropped");
    }

    let archive = match archive {
        Some(path) => {
            write_archive(&rendered, path)?;
            tracing::info!(archive = %path.display(), "packed turtle archive");
            Some(path.to_path_buf())
        }
        None => None,
    };

    Ok(ExportSummary {
        files: rendered
            .into_iter()
            .map(|(file, count, _)| (file.to_string(), count))
            .collect(),
        archive,
    })
}

fn write_archive(entries: &[(&str, usize, Vec<u8>)], path: &Path) -> SinkResult<()> {
    let origin = path.display().to_string();
    let io_err = |e: std::io::Error| SinkError::Io {
        path: origin.clone(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    for (name, _, bytes) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(bytes.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(0);
        header.set_cksum();
        builder
            .append_data(&mut header, name, bytes.as_slice())
            .map_err(io_err)?;
    }
    let encoder = builder.into_inner().map_err(io_err)?;
    encoder.finish().map_err(io_err)?;
    Ok(())
}
