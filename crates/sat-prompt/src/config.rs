//! TOML config loading for the sat-prompt CLI.
//!
//! Deserializes an optional config file with `[inference]` and `[instance]`
//! sections, then merges with CLI overrides.

use std::path::{Path, PathBuf};

use inference::OllamaConfig;
use serde::Deserialize;

/// Top-level structure of the config file.
#[derive(Debug, Default, Deserialize)]
pub struct PromptToml {
    /// Endpoint, model and timeouts.
    #[serde(default)]
    pub inference: OllamaConfig,
    /// Where the 3-SAT instance comes from.
    #[serde(default)]
    pub instance: InstanceSource,
}

/// Where to get the 3-SAT instance.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum InstanceSource {
    /// The built-in four-clause example.
    #[default]
    Example,
    /// A DIMACS CNF file.
    Dimacs { path: PathBuf },
    /// A random instance; unseeded draws from entropy.
    Random {
        variables: u32,
        clauses: usize,
        #[serde(default)]
        seed: Option<u64>,
    },
}

/// Load and deserialize a `PromptToml` from a TOML file.
pub fn load_prompt_toml(path: &Path) -> anyhow::Result<PromptToml> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {e}", path.display()))?;
    let config: PromptToml = toml::from_str(&contents)?;
    tracing::info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Instance-selection flags from the command line.
#[derive(Debug, Default, Clone)]
pub struct InstanceOverrides {
    pub dimacs: Option<PathBuf>,
    pub random_variables: Option<u32>,
    pub random_clauses: Option<usize>,
    pub seed: Option<u64>,
}

/// Pick the instance source: CLI flags win over the config file.
///
/// `--dimacs` and the `--random-*` pair are mutually exclusive at the CLI
/// level. A lone `--seed` reseeds a random source from the config file.
pub fn resolve_instance_source(
    from_toml: InstanceSource,
    cli: &InstanceOverrides,
) -> anyhow::Result<InstanceSource> {
    if let Some(path) = &cli.dimacs {
        return Ok(InstanceSource::Dimacs { path: path.clone() });
    }
    match (cli.random_variables, cli.random_clauses) {
        (Some(variables), Some(clauses)) => {
            return Ok(InstanceSource::Random {
                variables,
                clauses,
                seed: cli.seed,
            })
        }
        (None, None) => {}
        _ => anyhow::bail!("--random-variables and --random-clauses must be given together"),
    }
    Ok(match (from_toml, cli.seed) {
        (InstanceSource::Random { variables, clauses, .. }, Some(seed)) => InstanceSource::Random {
            variables,
            clauses,
            seed: Some(seed),
        },
        (source, _) => source,
    })
}

/// Build the client config from the config file and CLI flags.
///
/// Priority chain: built-in defaults < TOML values < CLI flags.
pub fn build_inference_config(
    mut config: OllamaConfig,
    server_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
) -> OllamaConfig {
    if let Some(url) = server_url {
        config.server_url = url;
    }
    if let Some(model) = model {
        config.model = model;
    }
    if let Some(secs) = timeout_secs {
        config.timeout_secs = secs;
    }
    config
}
