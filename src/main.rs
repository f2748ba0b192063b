//! chebi-rdf CLI: ChEBI flat files to RDF.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use chebi_rdf::config::{ConfigError, PipelineConfig};
use chebi_rdf::graph::turtle;
use chebi_rdf::paths::ChebiPaths;
use chebi_rdf::pipeline::{self, Pipeline};

#[derive(Parser)]
#[command(name = "chebi-rdf", version, about = "Convert the ChEBI database into RDF turtle")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/chebi-rdf/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep config and data under this directory instead of the XDG locations.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Directory holding the ChEBI flat files.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Directory for turtle files and the archive.
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    /// Graph store directory.
    #[arg(long, global = true)]
    graph_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the ChEBI flat files.
    Download {
        /// Fetch files even when already present.
        #[arg(long)]
        redownload: bool,

        /// Override the download base URL.
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Convert the flat files into per-table turtle files and an archive.
    CreateTtls,

    /// Load the turtle archive into the graph store.
    ImportGraph {
        /// Remove existing triples first.
        #[arg(long)]
        clear: bool,

        /// Archive to load (default: the one written by create-ttls).
        #[arg(long, conflicts_with = "file")]
        archive: Option<PathBuf>,

        /// Load these turtle files instead of an archive. Repeatable.
        #[arg(long)]
        file: Vec<PathBuf>,
    },

    /// Download, convert, export and import in one go.
    Run {
        #[arg(long)]
        redownload: bool,

        /// Clear the graph store before importing.
        #[arg(long)]
        clear: bool,
    },

    /// Convert the flat files into a single turtle document.
    Convert {
        /// Output file (default: stdout).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Manage the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config file with default settings.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration.
    Show,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    // Logs go to stderr; stdout carries turtle and JSON reports.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let paths = match &cli.root {
        Some(root) => ChebiPaths::rooted(root),
        None => ChebiPaths::resolve()?,
    };
    let config_file = cli.config.clone().unwrap_or_else(|| paths.config_file());
    let mut config = PipelineConfig::load_or_default(&config_file)?;
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir.clone();
    }
    if cli.export_dir.is_some() {
        config.export_dir = cli.export_dir.clone();
    }
    if cli.graph_dir.is_some() {
        config.graph_dir = cli.graph_dir.clone();
    }

    match cli.command {
        Commands::Download {
            redownload,
            base_url,
        } => {
            config.redownload |= redownload;
            if let Some(url) = base_url {
                config.base_url = url;
            }
            let report = Pipeline::new(config, &paths).download()?;
            print_json(&report)?;
        }

        Commands::CreateTtls => {
            let summary = Pipeline::new(config, &paths).create_ttls()?;
            print_json(&summary)?;
        }

        Commands::ImportGraph {
            clear,
            archive,
            file,
        } => {
            let pipeline = Pipeline::new(config, &paths);
            let graph_dir = &pipeline.layout().graph_dir;
            let report = match archive {
                _ if !file.is_empty() => pipeline::import_files(&file, graph_dir, clear)?,
                Some(archive) => pipeline::import_archive(&archive, graph_dir, clear)?,
                None => pipeline.import_graph(clear)?,
            };
            print_json(&report)?;
        }

        Commands::Run { redownload, clear } => {
            config.redownload |= redownload;
            let report = Pipeline::new(config, &paths).run(clear)?;
            print_json(&report)?;
        }

        Commands::Convert { output } => {
            let triples = Pipeline::new(config, &paths).convert()?;
            match output {
                Some(path) => {
                    turtle::write_file(&triples, &path)?;
                    eprintln!("Wrote {} triples to {}", triples.len(), path.display());
                }
                None => {
                    let stdout = std::io::stdout().lock();
                    let mut stdout = turtle::write_turtle(&triples, stdout, "<stdout>")?;
                    stdout.flush().into_diagnostic()?;
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Init { force } => {
                if config_file.exists() && !force {
                    return Err(ConfigError::AlreadyExists {
                        path: config_file.display().to_string(),
                    }
                    .into());
                }
                PipelineConfig::default().save(&config_file)?;
                println!("Wrote {}", config_file.display());
            }
            ConfigAction::Show => {
                println!("# {}", config_file.display());
                print!("{}", config.to_toml(&config_file)?);
                println!();
                println!("# resolved directories");
                print_json(&config.layout(&paths))?;
            }
        },
    }

    Ok(())
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{json}");
    Ok(())
}
