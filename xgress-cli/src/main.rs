// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  xgress: NetworkPolicy → service topology graph
//
//  Pipeline: YAML files → ServiceGraphBuilder → GraphProjector → graph.json
//  Config:   optional YAML file + XGRESS_* env overrides
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

mod input;
mod output;

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use xgress_core::{GraphProjector, ServiceGraphBuilder, XgressConfig};

#[derive(Parser, Debug)]
#[command(name = "xgress", version, about = "xgress: Kubernetes NetworkPolicy topology graph")]
struct Cli {
    /// NetworkPolicy YAML file, or a directory searched recursively for *.yaml / *.yml
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long, default_value = "xgress.yaml")]
    config: PathBuf,

    /// Where to write the graph JSON (overrides `output.path`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the graph JSON
    #[arg(long)]
    pretty: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Tracing ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "xgress starting");

    // ── Config ──
    if cli.config.exists() {
        info!(path = %cli.config.display(), "Loading config file");
    } else {
        info!("No config file found, using defaults");
    }
    let mut config = XgressConfig::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(output) = cli.output {
        config.output.path = output;
    }
    if cli.pretty {
        config.output.pretty = true;
    }

    run(&cli.path, &config)
}

fn run(path: &Path, config: &XgressConfig) -> anyhow::Result<()> {
    let sources = input::discover(path)
        .inspect_err(|e| error!(error = %e, "Cannot list policy files"))?;
    if sources.is_empty() {
        warn!(path = %path.display(), "No policy files found");
    }

    // ── Build ──
    let mut builder = ServiceGraphBuilder::from_config(&config.build);
    for source in &sources {
        let _span = tracing::info_span!("source", path = %source.display()).entered();

        let text = input::read(source)
            .inspect_err(|e| error!(error = %e, "Cannot read policies, no graph written"))?;

        match builder.ingest_yaml(&text) {
            Ok(stats) => info!(
                documents = stats.documents,
                ingested = stats.ingested,
                skipped = stats.skipped,
                ip_block_peers = stats.ip_block_peers,
                "Policies ingested"
            ),
            Err(e) => error!(error = %e, "Malformed document stream, remaining documents ignored"),
        }
    }

    let totals = builder.stats();
    let registry = builder.finish();

    // ── Project & write ──
    let graph = GraphProjector::new(config.projection.clone()).project(&registry);
    output::write_graph(&config.output.path, &graph, config.output.pretty)
        .inspect_err(|e| error!(error = %e, "Cannot write graph"))?;

    info!(
        path = %config.output.path.display(),
        policies = totals.ingested,
        skipped = totals.skipped,
        services = registry.len(),
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        "Graph written"
    );
    Ok(())
}
