//! End-to-end pipeline: download, read, convert, export, import.
//!
//! Each stage is exposed on its own so the CLI can run them separately.
//! All stages share one [`PipelineConfig`] and the [`Layout`] it resolves to.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{Layout, PipelineConfig};
use crate::error::{ChebiResult, StoreResult};
use crate::graph::store::GraphStore;
use crate::graph::turtle::{self, ExportSummary};
use crate::graph::TripleSet;
use crate::mapping::chebi::{self, ChebiTables, EXPORT_FILES};
use crate::paths::ChebiPaths;
use crate::source::{self, download::DownloadReport, download::Downloader};

/// Result of loading turtle into the graph store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub files_loaded: usize,
    pub triples: usize,
    pub compounds: usize,
}

/// Summary of a full `run`, printed as JSON by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub download: DownloadReport,
    pub rows: usize,
    pub export: ExportSummary,
    pub import: ImportReport,
}

#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    layout: Layout,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, paths: &ChebiPaths) -> Self {
        let layout = config.layout(paths);
        Self { config, layout }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Fetch missing flat files into the data directory.
    pub fn download(&self) -> ChebiResult<DownloadReport> {
        let report = Downloader::new(&self.config).fetch_all(&self.layout.data_dir)?;
        tracing::info!(
            fetched = report.fetched.len(),
            skipped = report.skipped.len(),
            "download finished"
        );
        Ok(report)
    }

    pub fn load_tables(&self) -> ChebiResult<ChebiTables> {
        Ok(source::load_tables(&self.layout.data_dir)?)
    }

    /// Read the flat files and convert them to one triple set.
    pub fn convert(&self) -> ChebiResult<TripleSet> {
        let tables = self.load_tables()?;
        convert_tables(&tables)
    }

    /// Convert and write the per-table turtle files plus the archive.
    pub fn create_ttls(&self) -> ChebiResult<ExportSummary> {
        let triples = self.convert()?;
        self.export(&triples)
    }

    fn export(&self, triples: &TripleSet) -> ChebiResult<ExportSummary> {
        let summary = turtle::export(
            triples,
            &EXPORT_FILES,
            chebi::export_file,
            &self.layout.export_dir,
            Some(&self.layout.archive),
        )?;
        tracing::info!(
            triples = summary.triple_count(),
            archive = %self.layout.archive.display(),
            "turtle export finished"
        );
        Ok(summary)
    }

    /// Load the archive into the persistent graph store, optionally
    /// clearing previous contents first.
    pub fn import_graph(&self, clear: bool) -> ChebiResult<ImportReport> {
        import_archive(&self.layout.archive, &self.layout.graph_dir, clear)
    }

    /// All stages in order.
    pub fn run(&self, clear: bool) -> ChebiResult<RunReport> {
        let download = self.download()?;
        let tables = self.load_tables()?;
        let rows = tables.row_count();
        let triples = convert_tables(&tables)?;
        let export = self.export(&triples)?;
        let import = self.import_graph(clear)?;
        Ok(RunReport {
            download,
            rows,
            export,
            import,
        })
    }
}

fn convert_tables(tables: &ChebiTables) -> ChebiResult<TripleSet> {
    let triples = tables.convert()?;
    tracing::info!(
        rows = tables.row_count(),
        triples = triples.len(),
        "converted ChEBI tables"
    );
    Ok(triples)
}

/// Load a turtle archive into the store at `graph_dir`.
pub fn import_archive(archive: &Path, graph_dir: &Path, clear: bool) -> ChebiResult<ImportReport> {
    import_with(graph_dir, clear, |store| store.load_archive(archive))
}

/// Load individual turtle files into the store at `graph_dir`.
pub fn import_files(files: &[PathBuf], graph_dir: &Path, clear: bool) -> ChebiResult<ImportReport> {
    import_with(graph_dir, clear, |store| {
        for file in files {
            store.load_file(file)?;
            tracing::info!(file = %file.display(), "loaded turtle file into graph store");
        }
        Ok(files.len())
    })
}

fn import_with(
    graph_dir: &Path,
    clear: bool,
    load: impl FnOnce(&GraphStore) -> StoreResult<usize>,
) -> ChebiResult<ImportReport> {
    let store = GraphStore::open(graph_dir)?;
    if clear {
        tracing::info!(store = %graph_dir.display(), "clearing graph store");
        store.clear()?;
    }
    let files_loaded = load(&store)?;
    let report = ImportReport {
        files_loaded,
        triples: store.len()?,
        compounds: store.compound_count()?,
    };
    tracing::info!(
        files = report.files_loaded,
        triples = report.triples,
        compounds = report.compounds,
        "graph import finished"
    );
    Ok(report)
}
