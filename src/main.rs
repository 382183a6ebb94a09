use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rollcall_graph::{
    export_to_graphviz, run_plan, threshold_graph, ArtifactKey, ArtifactStore, GraphSummary,
    PolicySet, RunPlan,
};

#[derive(Parser)]
#[command(name = "rollcall-graph", version, about = "Co-voting graphs from roll-call votes")]
struct Cli {
    /// Directory holding `tables/` and `graphs/`
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build adjacency matrices for a set of legislatures and policies
    Build {
        /// JSON run plan; defaults to legislatures 52-56 and the two published policy sets
        #[arg(long)]
        plan: Option<PathBuf>,
        /// Restrict to these legislatures
        #[arg(long = "legislature")]
        legislatures: Vec<u32>,
        /// Use the single-year incidence matrices of this year
        #[arg(long)]
        year: Option<u32>,
        /// Build a single policy set instead of the plan's parameters
        #[arg(long, requires = "obstruction")]
        abstention: Option<String>,
        #[arg(long, requires = "abstention")]
        obstruction: Option<String>,
        /// Agreement-weighted scoring (only with `--abstention same`)
        #[arg(long)]
        agreement: bool,
        /// Keep artifacts that already exist
        #[arg(long)]
        skip_existing: bool,
    },
    /// Threshold a stored adjacency matrix into a graph
    Graph {
        #[arg(long)]
        legislature: u32,
        /// Load the artifact built from this year only
        #[arg(long)]
        year: Option<u32>,
        #[arg(long)]
        abstention: String,
        #[arg(long)]
        obstruction: String,
        /// Edges need a score strictly above this value
        #[arg(long)]
        threshold: f64,
        /// Attach party, state, region and name from `tables/deputies.csv`
        #[arg(long)]
        annotate: bool,
        /// Write the graph as Graphviz DOT
        #[arg(long)]
        dot: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let store = ArtifactStore::new(&cli.data_dir);

    match cli.command {
        Commands::Build {
            plan,
            legislatures,
            year,
            abstention,
            obstruction,
            agreement,
            skip_existing,
        } => {
            let mut run = match plan {
                Some(path) => RunPlan::from_path(&path)
                    .with_context(|| format!("reading run plan {}", path.display()))?,
                None => RunPlan::default(),
            };
            if !legislatures.is_empty() {
                run.legislatures = legislatures;
            }
            if year.is_some() {
                run.year = year;
            }
            if let (Some(abstention), Some(obstruction)) = (abstention, obstruction) {
                run.parameters = vec![PolicySet::parse(&abstention, &obstruction, agreement)?];
            }
            run.skip_existing |= skip_existing;

            let report = run_plan(&store, &run)?;
            println!(
                "Built {} adjacency matrices, skipped {}",
                report.built.len(),
                report.skipped.len()
            );
        }
        Commands::Graph {
            legislature,
            year,
            abstention,
            obstruction,
            threshold,
            annotate,
            dot,
        } => {
            let policies = PolicySet::parse(&abstention, &obstruction, false)?;
            let key = ArtifactKey::for_policies(legislature, &policies).with_year(year);
            let adjacency = store
                .load_adjacency(&key)
                .with_context(|| format!("loading {key}"))?;

            let mut graph = threshold_graph(&adjacency, threshold);
            if annotate {
                let directory = store
                    .load_directory()
                    .context("loading legislator metadata")?;
                graph = graph.annotate(&directory, legislature);
            }

            let summary = GraphSummary::of(&graph);
            println!("Number of nodes in graph: {}", summary.nodes);
            println!("Number of edges in graph: {}", summary.edges);
            println!("Density: {:.4}", summary.density);
            println!("Number of connected components: {}", summary.components);
            println!("Average clustering coefficient: {:.4}", summary.average_clustering);

            if let Some(path) = dot {
                export_to_graphviz(&graph, &path)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
        }
    }

    Ok(())
}
