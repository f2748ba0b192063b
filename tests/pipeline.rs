//! Pipeline tests: flat files on disk through turtle export into the
//! graph store.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chebi_rdf::config::PipelineConfig;
use chebi_rdf::error::ChebiError;
use chebi_rdf::graph::Term;
use chebi_rdf::graph::store::GraphStore;
use chebi_rdf::graph::vocab::{NODE_NS, REL_NS};
use chebi_rdf::mapping::chebi::EXPORT_FILES;
use chebi_rdf::paths::ChebiPaths;
use chebi_rdf::pipeline::{self, Pipeline};

const COMPOUNDS: &str = "\
ID\tSTATUS\tCHEBI_ACCESSION\tSOURCE\tPARENT_ID\tNAME\tDEFINITION\tMODIFIED_ON\tCREATED_BY\tSTAR
27732\tC\tCHEBI:27732\tKEGG COMPOUND\tnull\tcaffeine\tA trimethylxanthine.\t2019-01-01\tCHEBI\t3
27134\tC\tCHEBI:27134\tChEBI\tnull\ttrimethylxanthine\tnull\t2019-01-01\tCHEBI\t3
41472\tE\tCHEBI:41472\tChEBI\t27732\ttheine\tnull\t2019-01-01\tCHEBI\t2
";

const NAMES: &str = "\
ID\tCOMPOUND_ID\tTYPE\tSOURCE\tNAME\tADAPTED\tLANGUAGE
1\t27732\tSYNONYM\tChEBI\tguaranine\tF\ten
2\t27732\tIUPAC NAME\tIUPAC\t1,3,7-trimethylxanthine\tF\ten
";

const INCHI: &str = "\
CHEBI_ID\tInChI
27732\tInChI=1S/C8H10N4O2/c1-10-4-9-6-5(10)7(13)12(3)8(14)11(6)2/h4H,1-3H3
";

const ACCESSIONS: &str = "\
ID\tCOMPOUND_ID\tACCESSION_NUMBER\tTYPE\tSOURCE
1\t27732\t58-08-2\tCAS Registry Number\tChemIDplus
2\t27732\tUS5545617\tPatent accession\tPatent
3\t27732\tC07481\tKEGG COMPOUND accession\tKEGG COMPOUND
4\t27732\tCHEMBL113\tChEMBL accession\tChEMBL
";

const RELATIONS: &str = "\
ID\tTYPE\tINIT_ID\tFINAL_ID\tSTATUS
1\tis_a\t27732\t27134\tC
";

fn write_gz(path: &Path, content: &str) {
    let mut enc = flate2::write::GzEncoder::new(
        File::create(path).unwrap(),
        flate2::Compression::default(),
    );
    enc.write_all(content.as_bytes()).unwrap();
    enc.finish().unwrap();
}

fn seed_flat_files(dir: &Path, relations: &str) {
    std::fs::create_dir_all(dir).unwrap();
    write_gz(&dir.join("compounds.tsv.gz"), COMPOUNDS);
    write_gz(&dir.join("names.tsv.gz"), NAMES);
    std::fs::write(dir.join("chebiId_inchi.tsv"), INCHI).unwrap();
    std::fs::write(dir.join("database_accession.tsv"), ACCESSIONS).unwrap();
    std::fs::write(dir.join("relation.tsv"), relations).unwrap();
}

fn pipeline(root: &Path) -> (Pipeline, ChebiPaths) {
    let paths = ChebiPaths::rooted(root);
    seed_flat_files(&paths.flat_files_dir(), RELATIONS);
    (Pipeline::new(PipelineConfig::default(), &paths), paths)
}

#[test]
fn flat_files_load_into_tables() {
    let root = tempfile::TempDir::new().unwrap();
    let (pipeline, _) = pipeline(root.path());
    let tables = pipeline.load_tables().unwrap();
    assert_eq!(tables.compounds.len(), 3);
    assert_eq!(tables.names.len(), 2);
    assert_eq!(tables.inchis.len(), 1);
    assert_eq!(tables.cas_entries.len(), 1);
    assert_eq!(tables.patents.len(), 1);
    assert_eq!(tables.relationships.len(), 1);
    assert_eq!(tables.xrefs.len(), 1);
}

#[test]
fn create_ttls_writes_all_files_and_archive() {
    let root = tempfile::TempDir::new().unwrap();
    let (pipeline, _) = pipeline(root.path());
    let summary = pipeline.create_ttls().unwrap();

    let export_dir = &pipeline.layout().export_dir;
    for file in EXPORT_FILES {
        assert!(export_dir.join(file).is_file(), "{file} missing");
    }
    assert!(pipeline.layout().archive.is_file());

    let count = |name: &str| {
        summary
            .files
            .iter()
            .find(|(f, _)| f == name)
            .map(|(_, n)| *n)
            .unwrap()
    };
    // Two name links plus one kind link each.
    assert_eq!(count("name.ttl"), 4);
    assert_eq!(count("xref.ttl"), 1);
    assert_eq!(count("inchi.ttl"), 1);
    assert_eq!(count("cas.ttl"), 1);
    assert_eq!(count("patent.ttl"), 1);
    assert_eq!(count("relation.ttl"), 1);

    let relation = std::fs::read_to_string(export_dir.join("relation.ttl")).unwrap();
    assert!(relation.contains("r:is_a"));
    let names = std::fs::read_to_string(export_dir.join("name.ttl")).unwrap();
    assert!(names.contains("r:iupac_name"));
    let xrefs = std::fs::read_to_string(export_dir.join("xref.ttl")).unwrap();
    assert!(xrefs.contains("CHEMBL113"));
}

#[test]
fn export_is_byte_identical_across_runs() {
    let root = tempfile::TempDir::new().unwrap();
    let (pipeline, _) = pipeline(root.path());
    pipeline.create_ttls().unwrap();
    let first = std::fs::read(&pipeline.layout().archive).unwrap();
    pipeline.create_ttls().unwrap();
    let second = std::fs::read(&pipeline.layout().archive).unwrap();
    assert_eq!(first, second);
}

#[test]
fn import_graph_loads_archive() {
    let root = tempfile::TempDir::new().unwrap();
    let (pipeline, _) = pipeline(root.path());
    let summary = pipeline.create_ttls().unwrap();

    let report = pipeline.import_graph(true).unwrap();
    assert_eq!(report.files_loaded, EXPORT_FILES.len());
    assert_eq!(report.triples, summary.triple_count());
    assert_eq!(report.compounds, 3);

    // Loading again is idempotent: the store holds a set of triples.
    let again = pipeline.import_graph(false).unwrap();
    assert_eq!(again.triples, report.triples);

    let store = GraphStore::open(&pipeline.layout().graph_dir).unwrap();
    assert!(store.has_chebi_nodes().unwrap());
    let rows = store
        .query_select(&format!(
            "SELECT ?o WHERE {{ <http://purl.obolibrary.org/obo/CHEBI_27732> <{REL_NS}has_cas> ?o }}"
        ))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["o"], Term::string("58-08-2"));
    assert!(store
        .query_ask(&format!(
            "ASK {{ <http://purl.obolibrary.org/obo/CHEBI_41472> a <{NODE_NS}Compound> }}"
        ))
        .unwrap());
}

#[test]
fn import_files_loads_individual_turtle_files() {
    let root = tempfile::TempDir::new().unwrap();
    let (pipeline, _) = pipeline(root.path());
    let summary = pipeline.create_ttls().unwrap();

    let export_dir = &pipeline.layout().export_dir;
    let files: Vec<PathBuf> = ["compound.ttl", "xref.ttl"]
        .iter()
        .map(|f| export_dir.join(f))
        .collect();
    let graph_dir = root.path().join("partial-graph");
    let report = pipeline::import_files(&files, &graph_dir, false).unwrap();
    assert_eq!(report.files_loaded, 2);
    assert_eq!(report.compounds, 3);
    assert!(report.triples < summary.triple_count());

    let store = GraphStore::open(&graph_dir).unwrap();
    let rows = store
        .query_select(&format!(
            "SELECT ?x WHERE {{ <http://purl.obolibrary.org/obo/CHEBI_27732> <{REL_NS}has_xref> ?x }}"
        ))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0]["x"].as_iri().is_some_and(|iri| iri.ends_with("CHEMBL113")));
}

#[test]
fn import_files_reports_missing_file() {
    let root = tempfile::TempDir::new().unwrap();
    let err = pipeline::import_files(
        &[root.path().join("nope.ttl")],
        &root.path().join("graph"),
        true,
    )
    .unwrap_err();
    assert!(matches!(err, ChebiError::Store(_)));
}

#[test]
fn rejected_conversion_writes_nothing() {
    let root = tempfile::TempDir::new().unwrap();
    let paths = ChebiPaths::rooted(root.path());
    seed_flat_files(
        &paths.flat_files_dir(),
        "ID\tTYPE\tINIT_ID\tFINAL_ID\tSTATUS\n1\tmade_up_type\t27732\t27134\tC\n2\tis_a\t27732\t999\tC\n",
    );
    let pipeline = Pipeline::new(PipelineConfig::default(), &paths);

    let err = pipeline.create_ttls().unwrap_err();
    match err {
        ChebiError::Conversion(e) => {
            assert_eq!(e.count("unknown_relationship_type"), 1);
            assert_eq!(e.count("unresolved_reference"), 1);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!pipeline.layout().export_dir.exists());
    assert!(!pipeline.layout().archive.exists());
}

#[test]
fn run_skips_present_files_and_reports() {
    let root = tempfile::TempDir::new().unwrap();
    let paths = ChebiPaths::rooted(root.path());
    seed_flat_files(&paths.flat_files_dir(), RELATIONS);
    // Unroutable base URL: run must not need the network.
    let config = PipelineConfig {
        base_url: "http://127.0.0.1:9".into(),
        ..Default::default()
    };
    let report = Pipeline::new(config, &paths).run(true).unwrap();
    assert_eq!(report.download.skipped.len(), 5);
    assert!(report.download.fetched.is_empty());
    assert_eq!(report.import.compounds, 3);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["import"]["compounds"], 3);
}
