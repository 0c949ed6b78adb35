//! Render and query pipelines for the sat-prompt CLI.

use std::path::PathBuf;

use inference::{OllamaClient, StreamEnd};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sat_instance::{load_dimacs, random_instance, render_prompt, Instance};

use crate::config::{
    build_inference_config, load_prompt_toml, resolve_instance_source, InstanceOverrides,
    InstanceSource, PromptToml,
};

/// Arguments for the `render` subcommand.
#[derive(Debug)]
pub struct RenderArgs {
    pub config: Option<PathBuf>,
    pub instance: InstanceOverrides,
}

/// Arguments for the `query` subcommand.
#[derive(Debug, Default)]
pub struct QueryArgs {
    pub config: Option<PathBuf>,
    pub instance: InstanceOverrides,
    pub server_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

fn load_toml(path: Option<&PathBuf>) -> anyhow::Result<PromptToml> {
    match path {
        Some(p) => load_prompt_toml(p),
        None => Ok(PromptToml::default()),
    }
}

/// Materialize the instance described by `source`.
pub fn build_instance(source: &InstanceSource) -> anyhow::Result<Instance> {
    let instance = match source {
        InstanceSource::Example => Instance::example(),
        InstanceSource::Dimacs { path } => load_dimacs(path)
            .map_err(|e| anyhow::anyhow!("Failed to load {}: {e}", path.display()))?,
        InstanceSource::Random {
            variables,
            clauses,
            seed,
        } => {
            let mut rng = match seed {
                Some(s) => StdRng::seed_from_u64(*s),
                None => StdRng::from_entropy(),
            };
            random_instance(*variables, *clauses, &mut rng)?
        }
    };
    tracing::info!(
        variables = instance.num_variables(),
        clauses = instance.num_clauses(),
        "Built 3-SAT instance"
    );
    Ok(instance)
}

/// Print the rendered prompt without contacting the server.
pub fn run_render(args: RenderArgs) -> anyhow::Result<()> {
    let toml = load_toml(args.config.as_ref())?;
    let source = resolve_instance_source(toml.instance, &args.instance)?;
    let instance = build_instance(&source)?;
    println!("{}", render_prompt(&instance));
    Ok(())
}

/// Print the rendered prompt, send it to the model, and print the answer.
///
/// Ctrl-C abandons the stream and prints whatever arrived.
pub async fn run_query(args: QueryArgs) -> anyhow::Result<()> {
    let toml = load_toml(args.config.as_ref())?;
    let source = resolve_instance_source(toml.instance, &args.instance)?;
    let instance = build_instance(&source)?;
    let config =
        build_inference_config(toml.inference, args.server_url, args.model, args.timeout_secs);

    let prompt = render_prompt(&instance);
    println!("{prompt}");

    let client = OllamaClient::new(config)?;
    tracing::info!(
        url = %client.config().server_url,
        model = %client.config().model,
        "Querying model"
    );

    let answer = client.query_until(&prompt, ctrl_c()).await?;
    println!("{}", answer.text);

    if answer.skipped_fragments > 0 {
        tracing::warn!(
            skipped = answer.skipped_fragments,
            "Some response fragments could not be decoded; the answer may be incomplete"
        );
    }
    match &answer.end {
        StreamEnd::Completed => {}
        StreamEnd::Severed(reason) => {
            tracing::warn!(reason = %reason, "Response stream was cut off; the answer is truncated")
        }
        StreamEnd::Cancelled => tracing::warn!("Query interrupted; the answer is truncated"),
    }
    Ok(())
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::debug!(error = %e, "Ctrl-C handler unavailable");
        std::future::pending::<()>().await;
    }
}
