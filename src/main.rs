use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, ensure};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use graph_lens::graph::GroupTag;
use graph_lens::source::{GraphSource, JsonGraphSource, SampleGraphSource};
use graph_lens::{GraphLensApp, SimulationConfig, ViewConfig};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file with `nodes` and `edges`; a generated sample graph is shown when omitted
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Size of the generated sample graph
    #[arg(long, default_value_t = 60)]
    sample_nodes: usize,

    /// Fixed seed for reproducible layouts (and the sample graph)
    #[arg(long)]
    seed: Option<u64>,

    /// Layout iterations per pass (at least 1)
    #[arg(long, default_value_t = 100, value_parser = parse_iterations)]
    iterations: usize,

    /// Only show these groups (repeatable)
    #[arg(long = "group", value_parser = parse_group)]
    groups: Vec<GroupTag>,

    /// Hops followed when expanding a selected node
    #[arg(long, default_value_t = 2)]
    related_depth: usize,

    /// Maximum related entities listed for a selection
    #[arg(long, default_value_t = 25)]
    related_limit: usize,
}

fn parse_group(raw: &str) -> Result<GroupTag, String> {
    GroupTag::parse(raw).ok_or_else(|| {
        let known = GroupTag::ALL.map(GroupTag::label).join(", ");
        format!("unknown group {raw:?}, expected one of: {known}")
    })
}

fn parse_iterations(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(0) => Err("a layout needs at least one iteration".to_owned()),
        Ok(iterations) => Ok(iterations),
        Err(error) => Err(format!("invalid iteration count {raw:?}: {error}")),
    }
}

fn build_source(args: &Args) -> Result<Arc<dyn GraphSource>> {
    match &args.graph {
        Some(path) => {
            ensure!(path.is_file(), "graph file {} does not exist", path.display());
            let path = path
                .canonicalize()
                .with_context(|| format!("failed to resolve {}", path.display()))?;
            tracing::info!(path = %path.display(), "reading graph from file");
            Ok(Arc::new(JsonGraphSource::new(path)))
        }
        None => {
            let seed = args.seed.unwrap_or(0x5eed);
            tracing::info!(nodes = args.sample_nodes, seed, "using generated sample graph");
            Ok(Arc::new(SampleGraphSource::new(args.sample_nodes, seed)))
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let source = build_source(&args)?;
    let config = ViewConfig {
        simulation: SimulationConfig {
            iterations: args.iterations,
            seed: args.seed,
            ..SimulationConfig::default()
        },
        related_depth: args.related_depth,
        related_limit: args.related_limit,
        groups: args.groups.iter().copied().collect::<BTreeSet<_>>(),
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "graph-lens",
        options,
        Box::new(move |cc| Ok(Box::new(GraphLensApp::new(cc, source, config)))),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
