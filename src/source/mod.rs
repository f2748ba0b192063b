//! ChEBI flat-file reader: the upstream collaborator that supplies rows.
//!
//! Reads the tab-separated ChEBI dump (plain or gzip-compressed) into the
//! row types of [`crate::model`]. Header names are matched case-insensitively.
//! Rows are passed through as-is; dangling foreign keys are left for the
//! mapper to report.

pub mod download;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{SourceError, SourceResult};
use crate::mapping::chebi::ChebiTables;
use crate::model::{
    CasEntry, Compound, CompoundId, CompoundStatus, Inchi, Name, Patent, Relationship, StarRating,
    Xref, XrefDatabase,
};

/// The flat files the pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlatFile {
    Compounds,
    Names,
    Inchi,
    DatabaseAccessions,
    Relations,
}

impl FlatFile {
    pub const ALL: [FlatFile; 5] = [
        Self::Compounds,
        Self::Names,
        Self::Inchi,
        Self::DatabaseAccessions,
        Self::Relations,
    ];

    /// File name as published on the ChEBI server.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Compounds => "compounds.tsv.gz",
            Self::Names => "names.tsv.gz",
            Self::Inchi => "chebiId_inchi.tsv",
            Self::DatabaseAccessions => "database_accession.tsv",
            Self::Relations => "relation.tsv",
        }
    }

    /// Locate the file in `dir`, accepting either the compressed or the
    /// uncompressed variant of the published name.
    pub fn locate(self, dir: &Path) -> Option<PathBuf> {
        let name = self.file_name();
        let alternate = match name.strip_suffix(".gz") {
            Some(plain) => plain.to_string(),
            None => format!("{name}.gz"),
        };
        [dir.join(name), dir.join(alternate)]
            .into_iter()
            .find(|p| p.is_file())
    }
}

// ---------------------------------------------------------------------------
// Raw records as they appear in the files
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CompoundRecord {
    id: String,
    #[serde(default)]
    name: Option<String>,
    status: String,
    #[serde(alias = "stars")]
    star: String,
    #[serde(default, alias = "inchikey", alias = "standard_inchi_key")]
    structure: Option<String>,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    definition: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NameRecord {
    compound_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "type")]
    name_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InchiRecord {
    #[serde(alias = "chebi_id")]
    compound_id: String,
    #[serde(default, alias = "standard_inchi")]
    inchi: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccessionRecord {
    compound_id: String,
    #[serde(default)]
    accession_number: Option<String>,
    #[serde(rename = "type")]
    accession_type: String,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RelationRecord {
    #[serde(rename = "type")]
    relation_type: String,
    init_id: String,
    final_id: String,
}

/// ChEBI writes missing values as empty cells or the literal `null`.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}

fn parse_id(value: &str, column: &str) -> Result<CompoundId, String> {
    value
        .parse()
        .map_err(|e: String| format!("column {column}: {e}"))
}

// ---------------------------------------------------------------------------
// Table reading
// ---------------------------------------------------------------------------

fn open(path: &Path) -> SourceResult<Box<dyn Read>> {
    let file = File::open(path).map_err(|e| SourceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let reader = BufReader::new(file);
    let gz = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    Ok(if gz {
        Box::new(MultiGzDecoder::new(reader))
    } else {
        Box::new(reader)
    })
}

/// Read every row of a TSV file, deserializing into `T` and converting
/// with `convert`. `convert` returns `Ok(None)` to skip a row.
fn read_table<T, R>(
    path: &Path,
    required: &[&str],
    mut convert: impl FnMut(T) -> Result<Option<R>, String>,
) -> SourceResult<Vec<R>>
where
    T: DeserializeOwned,
{
    let display = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(open(path)?);

    let headers: csv::StringRecord = reader
        .byte_headers()
        .map_err(|e| SourceError::MalformedRow {
            path: display.clone(),
            line: 1,
            message: e.to_string(),
        })?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_lowercase())
        .collect();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(SourceError::MissingColumn {
                path: display,
                column: (*column).to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| SourceError::MalformedRow {
            path: display.clone(),
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        // Older dumps are Latin-1; replace undecodable bytes rather than fail.
        let record = csv::StringRecord::from_byte_record_lossy(record);
        let malformed = |message: String| SourceError::MalformedRow {
            path: display.clone(),
            line,
            message,
        };
        let raw: T = record
            .deserialize(Some(&headers))
            .map_err(|e| malformed(e.to_string()))?;
        if let Some(row) = convert(raw).map_err(malformed)? {
            rows.push(row);
        }
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "read flat file");
    Ok(rows)
}

pub fn read_compounds(path: &Path) -> SourceResult<Vec<Compound>> {
    read_table(path, &["id", "status"], |r: CompoundRecord| {
        let id = parse_id(&r.id, "id")?;
        let status: CompoundStatus = r.status.parse()?;
        let star: StarRating = r.star.parse()?;
        let parent_id = present(r.parent_id)
            .map(|p| parse_id(&p, "parent_id"))
            .transpose()?;
        Ok(Some(Compound {
            id,
            name: present(r.name).unwrap_or_default(),
            status,
            star,
            structure: present(r.structure),
            parent_id,
            definition: present(r.definition),
            source: present(r.source),
        }))
    })
}

pub fn read_names(path: &Path) -> SourceResult<Vec<Name>> {
    read_table(path, &["compound_id", "name"], |r: NameRecord| {
        let compound_id = parse_id(&r.compound_id, "compound_id")?;
        Ok(present(r.name).map(|name| Name {
            compound_id,
            name,
            name_type: present(r.name_type).unwrap_or_default(),
        }))
    })
}

pub fn read_inchis(path: &Path) -> SourceResult<Vec<Inchi>> {
    read_table(path, &[], |r: InchiRecord| {
        let compound_id = parse_id(&r.compound_id, "compound_id")?;
        Ok(present(r.inchi).map(|inchi| Inchi { compound_id, inchi }))
    })
}

/// Database accessions sorted by what they become in the graph.
#[derive(Debug, Default)]
pub struct Accessions {
    pub cas: Vec<CasEntry>,
    pub patents: Vec<Patent>,
    pub xrefs: Vec<Xref>,
}

/// Split database accessions into CAS, patent and cross-reference rows.
/// A cross-reference is recognised by its type, then by its source; any
/// other accession is skipped.
pub fn read_accessions(path: &Path) -> SourceResult<Accessions> {
    enum Accession {
        Cas(CasEntry),
        Patent(Patent),
        Xref(Xref),
    }

    let rows = read_table(
        path,
        &["compound_id", "accession_number", "type"],
        |r: AccessionRecord| {
            let compound_id = parse_id(&r.compound_id, "compound_id")?;
            let Some(number) = present(r.accession_number) else {
                return Ok(None);
            };
            let kind = r.accession_type.to_lowercase();
            if kind.contains("cas registry") {
                return Ok(Some(Accession::Cas(CasEntry {
                    compound_id,
                    registry_number: number,
                })));
            }
            if kind.contains("patent") {
                return Ok(Some(Accession::Patent(Patent {
                    compound_id,
                    reference: number,
                })));
            }
            let database = XrefDatabase::from_label(&r.accession_type)
                .or_else(|| r.source.as_deref().and_then(XrefDatabase::from_label));
            Ok(database.map(|database| {
                Accession::Xref(Xref {
                    compound_id,
                    database,
                    accession: number,
                })
            }))
        },
    )?;

    let mut accessions = Accessions::default();
    for row in rows {
        match row {
            Accession::Cas(c) => accessions.cas.push(c),
            Accession::Patent(p) => accessions.patents.push(p),
            Accession::Xref(x) => accessions.xrefs.push(x),
        }
    }
    Ok(accessions)
}

pub fn read_relationships(path: &Path) -> SourceResult<Vec<Relationship>> {
    read_table(path, &["type", "init_id", "final_id"], |r: RelationRecord| {
        Ok(Some(Relationship {
            source: parse_id(&r.init_id, "init_id")?,
            target: parse_id(&r.final_id, "final_id")?,
            relation_type: r.relation_type.trim().to_string(),
        }))
    })
}

fn require(dir: &Path, file: FlatFile) -> SourceResult<PathBuf> {
    file.locate(dir).ok_or_else(|| SourceError::MissingFile {
        path: dir.join(file.file_name()).display().to_string(),
    })
}

/// Read all tables from a data directory into one snapshot.
pub fn load_tables(dir: &Path) -> SourceResult<ChebiTables> {
    let compounds = read_compounds(&require(dir, FlatFile::Compounds)?)?;
    let names = read_names(&require(dir, FlatFile::Names)?)?;
    let inchis = read_inchis(&require(dir, FlatFile::Inchi)?)?;
    let accessions = read_accessions(&require(dir, FlatFile::DatabaseAccessions)?)?;
    let relationships = read_relationships(&require(dir, FlatFile::Relations)?)?;

    let tables = ChebiTables {
        compounds,
        names,
        inchis,
        patents: accessions.patents,
        cas_entries: accessions.cas,
        relationships,
        xrefs: accessions.xrefs,
    };
    tracing::info!(
        compounds = tables.compounds.len(),
        names = tables.names.len(),
        inchis = tables.inchis.len(),
        patents = tables.patents.len(),
        cas = tables.cas_entries.len(),
        relationships = tables.relationships.len(),
        xrefs = tables.xrefs.len(),
        "loaded ChEBI flat files"
    );
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn compounds_parse_with_uppercase_headers_and_nulls() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "compounds.tsv",
            "ID\tSTATUS\tCHEBI_ACCESSION\tSOURCE\tPARENT_ID\tNAME\tDEFINITION\tSTAR\n\
             27732\tC\tCHEBI:27732\tChEBI\tnull\tcaffeine\tA trimethylxanthine.\t3\n\
             41472\tE\tCHEBI:41472\tKEGG\t27732\tnull\tnull\t2\n",
        );
        let rows = read_compounds(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "caffeine");
        assert_eq!(rows[0].parent_id, None);
        assert_eq!(rows[0].status, CompoundStatus::Checked);
        assert_eq!(rows[1].parent_id, CompoundId::new(27732));
        assert_eq!(rows[1].name, "");
        assert_eq!(rows[1].definition, None);
        assert_eq!(rows[1].star.get(), 2);
    }

    #[test]
    fn bad_star_reports_line() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "compounds.tsv",
            "ID\tSTATUS\tNAME\tSTAR\n1\tC\ta\t3\n2\tC\tb\t7\n",
        );
        let err = read_compounds(&path).unwrap_err();
        match err {
            SourceError::MalformedRow { line, message, .. } => {
                assert_eq!(line, 3);
                assert!(message.contains("outside 1..=3"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(dir.path(), "relation.tsv", "ID\tTYPE\tINIT_ID\n1\tis_a\t2\n");
        let err = read_relationships(&path).unwrap_err();
        assert!(matches!(err, SourceError::MissingColumn { ref column, .. } if column == "final_id"));
    }

    #[test]
    fn accessions_split_into_cas_patents_and_xrefs() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "database_accession.tsv",
            "ID\tCOMPOUND_ID\tACCESSION_NUMBER\tTYPE\tSOURCE\n\
             1\t27732\t58-08-2\tCAS Registry Number\tChemIDplus\n\
             2\t27732\tUS5545617\tPatent accession\tPatent\n\
             3\t27732\tC07481\tKEGG COMPOUND accession\tKEGG COMPOUND\n\
             4\t27732\tCHEMBL113\tChEMBL accession\tChEMBL\n\
             5\t27732\tR-HSA-1\tPathway\tReactome\n",
        );
        let accessions = read_accessions(&path).unwrap();
        assert_eq!(accessions.cas.len(), 1);
        assert_eq!(accessions.cas[0].registry_number, "58-08-2");
        assert_eq!(accessions.patents.len(), 1);
        assert_eq!(accessions.patents[0].reference, "US5545617");

        // KEGG is not a cross-reference target; ChEMBL matches by type, Reactome by source.
        let dbs: Vec<_> = accessions.xrefs.iter().map(|x| x.database).collect();
        assert_eq!(dbs, vec![XrefDatabase::Chembl, XrefDatabase::Reactome]);
        assert_eq!(accessions.xrefs[1].accession, "R-HSA-1");
    }

    #[test]
    fn gzip_files_are_decompressed() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("names.tsv.gz");
        let mut enc = flate2::write::GzEncoder::new(
            File::create(&path).unwrap(),
            flate2::Compression::default(),
        );
        enc.write_all(b"ID\tCOMPOUND_ID\tTYPE\tSOURCE\tNAME\n1\t27732\tSYNONYM\tChEBI\tguaranine\n")
            .unwrap();
        enc.finish().unwrap();

        let names = read_names(&path).unwrap();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].name, "guaranine");
        assert_eq!(names[0].name_type, "SYNONYM");
    }

    #[test]
    fn inchi_file_accepts_chebi_id_header() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "chebiId_inchi.tsv",
            "CHEBI_ID\tInChI\n27732\tInChI=1S/C8H10N4O2/c1-10-4-9-6-5(10)7(13)12(3)8(14)11(6)2/h4H,1-3H3\n",
        );
        let rows = read_inchis(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].inchi.starts_with("InChI=1S/C8H10N4O2"));
    }

    #[test]
    fn locate_accepts_either_compression_variant() {
        let dir = tempfile::TempDir::new().unwrap();
        write(dir.path(), "compounds.tsv", "ID\tSTATUS\tSTAR\n");
        write(dir.path(), "relation.tsv.gz", "");
        assert_eq!(
            FlatFile::Compounds.locate(dir.path()),
            Some(dir.path().join("compounds.tsv"))
        );
        assert_eq!(
            FlatFile::Relations.locate(dir.path()),
            Some(dir.path().join("relation.tsv.gz"))
        );
        assert_eq!(FlatFile::Names.locate(dir.path()), None);
    }
}
