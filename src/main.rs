//! layoutfit CLI - layout parameter tuning against Cytoscape
//!
//! Orchestrates the full pipeline:
//!
//! 1. Load: read the node-link graph and resolve configuration
//! 2. Session: clear Cytoscape, upload the graph, apply default styling
//! 3. Study: per trial, push layout knobs, run the layout, read positions
//! 4. Score: Delaunay-triangulate the positions, Jaccard against the graph
//! 5. Report: print values and best trial, write the trial log and chart
//!
//! `--positions` skips the engine entirely and scores one coordinate file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, bail};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use layoutfit::training::{
    LiveProgress, SearchStrategy, Study, TrialLog, distribution_plot_name, plot_score_distribution,
};
use layoutfit::tuner::{load_positions, score_positions};
use layoutfit::{
    Config, CyRestClient, Graph, LayoutEngine, LayoutFamily, LayoutSession, Tuner, load_node_link,
};

/// Tune graph layout parameters so the layout preserves graph structure
///
/// layoutfit drives a Cytoscape layout algorithm through CyREST, scores
/// every layout by how well its Delaunay triangulation recovers the
/// graph's edges, and searches for the best-scoring parameters.
///
/// Examples:
///   layoutfit graph.json                          # 100 guided trials, FR layout
///   layoutfit graph.json -l kamada-kawai -n 50    # Kamada-Kawai, 50 trials
///   layoutfit graph.json --strategy grid:3        # Exhaustive 3-point grid
///   layoutfit graph.json --positions pos.json     # Score fixed coordinates
#[derive(Parser, Debug)]
#[command(name = "layoutfit")]
#[command(version)]
#[command(about, long_about = None)]
pub struct Cli {
    /// Graph file in node-link JSON
    ///
    /// Expects {"nodes": [{"id": ..}], "links": [{"source": .., "target": ..}]},
    /// the format networkx writes with node_link_data.
    #[arg(value_name = "GRAPH")]
    pub graph: PathBuf,

    /// Layout algorithm to tune
    #[arg(short, long, value_enum)]
    pub layout: Option<LayoutFamily>,

    /// Number of trials (layout runs)
    #[arg(short = 'n', long)]
    pub trials: Option<usize>,

    /// Search strategy
    ///
    /// One of:
    ///   bayesian   Space-filling warm-up, then guided (default)
    ///   lhs        Latin hypercube
    ///   random     Uniform random
    ///   grid[:N]   Full grid with N points per knob (default 3)
    #[arg(short, long)]
    pub strategy: Option<SearchStrategy>,

    /// Random seed for the search
    #[arg(long)]
    pub seed: Option<u64>,

    /// CyREST root URL
    #[arg(long, value_name = "URL")]
    pub engine_url: Option<String>,

    /// Per-request engine timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Network title in Cytoscape (defaults to the graph file name)
    #[arg(long)]
    pub title: Option<String>,

    /// Config file (defaults to layoutfit.toml in the working directory or a parent)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for the distribution chart
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Trial log path (JSON)
    #[arg(long, value_name = "FILE")]
    pub results: Option<PathBuf>,

    /// Score a coordinate file instead of running a study
    ///
    /// Accepts [[x, y], ...] in graph node order or {"node": [x, y], ...}.
    /// Cytoscape is not contacted.
    #[arg(long, value_name = "FILE")]
    pub positions: Option<PathBuf>,

    /// Skip the distribution chart
    #[arg(long)]
    pub no_plot: bool,

    /// Verbose output
    ///
    /// Prints the resolved configuration and per-trial debug logs instead
    /// of the live progress line. RUST_LOG overrides the log filter.
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = run(&cli)?;

    // Print to stdout (can be piped or redirected)
    println!("{}", output);

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "layoutfit=debug" } else { "layoutfit=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run the pipeline; returns the JSON printed to stdout.
fn run(cli: &Cli) -> Result<String> {
    let config = resolve_config(cli)?;
    let graph = load_node_link(&cli.graph)?;

    if cli.verbose {
        eprintln!("🕸️  layoutfit");
        eprintln!("📄 Graph: {}", cli.graph.display());
        eprintln!(
            "   {} nodes, {} edges, average degree {}",
            graph.node_count(),
            graph.edge_count(),
            graph.average_degree()
        );
        eprintln!("{}", config.display_summary());
    }

    if let Some(ref positions) = cli.positions {
        let points = load_positions(positions, &graph)?;
        let score = score_positions(&graph, &points)?;
        return Ok(serde_json::to_string_pretty(&json!({ "score": score }))?);
    }

    let mut client = CyRestClient::new(config.engine_url.clone(), config.timeout);
    if !client.is_available() {
        bail!(
            "Cytoscape is not reachable at {}. Start Cytoscape (with CyREST enabled) or pass --engine-url.",
            client.base_url()
        );
    }

    let title = network_title(&config, &cli.graph);
    let log = run_study(&config, &graph, &title, &mut client, !cli.verbose)?;
    write_outputs(&config, &graph, &log)?;

    let report = log.report();
    Ok(serde_json::to_string_pretty(&json!({
        "values": report.values,
        "best_id": report.best_id,
    }))?)
}

/// File config (explicit or discovered) with command-line overrides applied.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => Config::load_file(path)?,
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Config::load(&cwd)
        }
    };

    if let Some(layout) = cli.layout {
        config.layout = layout;
    }
    if let Some(trials) = cli.trials {
        config.trials = trials;
    }
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(ref url) = cli.engine_url {
        config.engine_url = url.clone();
    }
    if let Some(secs) = cli.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(ref title) = cli.title {
        config.title = Some(title.clone());
    }
    if let Some(ref dir) = cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(ref results) = cli.results {
        config.results = Some(results.clone());
    }
    if cli.no_plot {
        config.plot = false;
    }

    if config.trials == 0 {
        bail!("Trial budget must be at least 1");
    }
    Ok(config)
}

fn network_title(config: &Config, graph_path: &Path) -> String {
    config
        .title
        .clone()
        .or_else(|| {
            graph_path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "layoutfit".to_string())
}

/// Open a session on `engine` and spend the configured trial budget.
fn run_study<E: LayoutEngine>(
    config: &Config,
    graph: &Graph,
    title: &str,
    engine: &mut E,
    show_progress: bool,
) -> Result<TrialLog> {
    let session = LayoutSession::open(engine, graph, title, &config.style)?;
    let mut tuner = Tuner::new(graph, config.layout, session);
    let mut study = Study::new(config.layout.search_space(), config.strategy, config.seed);

    let mut progress = LiveProgress::new();
    tuner.run(
        &mut study,
        config.trials,
        show_progress.then_some(&mut progress),
    )?;

    let log = tuner.into_log();
    if show_progress {
        progress.final_summary(&log);
    }
    if let Some(best) = log.best() {
        tracing::info!(best_id = best.number, score = best.score, "best trial");
    }
    Ok(log)
}

/// Write the trial log and, if enabled, the distribution chart.
///
/// A chart that fails to render is logged and skipped so a finished study
/// still reports its results.
fn write_outputs(config: &Config, graph: &Graph, log: &TrialLog) -> Result<()> {
    let results = config.results_path();
    log.write_json(&results)?;
    tracing::info!(path = %results.display(), "wrote trial log");

    if config.plot {
        let name = distribution_plot_name(config.layout.engine_name(), graph.average_degree());
        let path = config.output_dir.join(name);
        let caption = format!(
            "{} (average degree {})",
            config.layout,
            graph.average_degree()
        );
        if let Err(err) = plot_score_distribution(log, &caption, &path) {
            tracing::warn!(path = %path.display(), "failed to plot score distribution: {}", err);
        }
    }
    Ok(())
}
