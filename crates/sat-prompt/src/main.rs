mod config;
mod pipeline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::InstanceOverrides;
use pipeline::{QueryArgs, RenderArgs};

/// sat-prompt: render a 3-SAT instance as an LLM prompt and ask a local model to solve it.
///
/// With no subcommand, renders the built-in example and queries the default endpoint.
#[derive(Parser)]
#[command(name = "sat-prompt", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

/// CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Print the rendered prompt only.
    Render {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Load the instance from a DIMACS CNF file (3 literals per clause).
        #[arg(long, conflicts_with_all = ["random_variables", "random_clauses"])]
        dimacs: Option<PathBuf>,
        /// Generate a random instance over this many variables.
        #[arg(long, requires = "random_clauses")]
        random_variables: Option<u32>,
        /// Number of clauses in the random instance.
        #[arg(long, requires = "random_variables")]
        random_clauses: Option<usize>,
        /// Seed for random generation.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the rendered prompt, then the model's streamed answer.
    Query {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Full URL of the generate endpoint (e.g., http://localhost:11434/api/generate).
        #[arg(long)]
        server_url: Option<String>,
        /// Model name to request.
        #[arg(long)]
        model: Option<String>,
        /// Whole-request timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Load the instance from a DIMACS CNF file (3 literals per clause).
        #[arg(long, conflicts_with_all = ["random_variables", "random_clauses"])]
        dimacs: Option<PathBuf>,
        /// Generate a random instance over this many variables.
        #[arg(long, requires = "random_clauses")]
        random_variables: Option<u32>,
        /// Number of clauses in the random instance.
        #[arg(long, requires = "random_variables")]
        random_clauses: Option<usize>,
        /// Seed for random generation.
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Render {
            config,
            dimacs,
            random_variables,
            random_clauses,
            seed,
        }) => pipeline::run_render(RenderArgs {
            config,
            instance: InstanceOverrides {
                dimacs,
                random_variables,
                random_clauses,
                seed,
            },
        }),
        Some(Command::Query {
            config,
            server_url,
            model,
            timeout_secs,
            dimacs,
            random_variables,
            random_clauses,
            seed,
        }) => {
            pipeline::run_query(QueryArgs {
                config,
                instance: InstanceOverrides {
                    dimacs,
                    random_variables,
                    random_clauses,
                    seed,
                },
                server_url,
                model,
                timeout_secs,
            })
            .await
        }
        None => pipeline::run_query(QueryArgs::default()).await,
    }
}
