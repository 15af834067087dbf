//! `pathmap` — find the shortest path between two places on an OSM street map.
//!
//! Run with:
//!   cargo run -p pm-cli --release -- beograd.osm

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use pm_cli::{Session, init_tracing};
use pm_spatial::{IngestConfig, ResolverConfig, RoadGraph, SpatialResult, load_from_osm_xml};

#[derive(Parser, Debug)]
#[command(author, version, about = "Shortest paths between named places on an OSM street map")]
struct Cli {
    /// OSM XML map file (or `.pbf` when built with the `pbf` feature).
    map: PathBuf,

    /// Largest edit distance accepted when no name contains the query.
    #[arg(long, default_value_t = 4)]
    max_edit_distance: usize,

    /// Most candidates listed in one selection menu.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    menu_limit: u32,

    /// Expected node count, used to pre-size the graph.
    #[arg(long, default_value_t = 100_000)]
    capacity: usize,

    /// Log loader and routing detail to stderr (`RUST_LOG` takes precedence).
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors exit 1; --help and --version exit 0.
            let code = if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
            let _ = e.print();
            return code;
        }
    };
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ingest = IngestConfig { capacity_hint: cli.capacity, ..IngestConfig::default() };
    let graph = load_map(&cli.map, &ingest)
        .with_context(|| format!("failed to load map {}", cli.map.display()))?;
    println!("Graph loaded. Nodes: {}", graph.node_count());

    let config = ResolverConfig {
        fuzzy_max_distance: cli.max_edit_distance,
        menu_limit: cli.menu_limit as usize,
        ..ResolverConfig::default()
    };
    Session::new(&graph, config, io::stdin().lock(), io::stdout().lock())
        .run()
        .context("terminal I/O failed")
}

fn load_map(path: &Path, config: &IngestConfig) -> SpatialResult<RoadGraph> {
    #[cfg(feature = "pbf")]
    {
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pbf")) {
            return pm_spatial::pbf::load_from_pbf(path, config).map(|(graph, _stats)| graph);
        }
    }
    load_from_osm_xml(path, config).map(|(graph, _stats)| graph)
}
