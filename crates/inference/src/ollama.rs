//! HTTP client for an Ollama-style streaming generation endpoint.
//!
//! Provides [`OllamaClient`] for submitting a single prompt to
//! `POST /api/generate` and reassembling the NDJSON reply.
//!
//! # Server Setup
//!
//! ```bash
//! ollama pull gpt-oss
//! ollama serve    # listens on :11434
//! ```

use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::protocol::GenerateRequest;
use crate::stream::FragmentReader;
use crate::types::{Answer, InferenceError, StreamEnd};

/// Configuration for connecting to a generation endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OllamaConfig {
    /// Full URL of the generate endpoint (e.g., "http://localhost:11434/api/generate").
    #[serde(default = "default_server_url")]
    pub server_url: String,
    /// Model name sent with every request. Defaults to "gpt-oss".
    #[serde(default = "default_model")]
    pub model: String,
    /// Whole-request timeout in seconds, including reading the stream. Defaults to 300.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Connection timeout in seconds. Defaults to 5.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Longest accepted response line in bytes. Longer lines are skipped. Defaults to 1 MiB.
    #[serde(default = "default_max_fragment_bytes")]
    pub max_fragment_bytes: usize,
}

fn default_server_url() -> String {
    "http://localhost:11434/api/generate".to_string()
}
fn default_model() -> String {
    "gpt-oss".to_string()
}
fn default_timeout_secs() -> u64 {
    300
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_max_fragment_bytes() -> usize {
    1 << 20
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_fragment_bytes: default_max_fragment_bytes(),
        }
    }
}

impl OllamaConfig {
    /// Config for the given endpoint and model, other fields at defaults.
    pub fn new(server_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            model: model.into(),
            ..Self::default()
        }
    }
}

/// HTTP client for a streaming generation endpoint.
///
/// Each query is one POST. There is no retry: transport failures and
/// non-success statuses are returned to the caller as [`InferenceError`].
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    endpoint: Url,
    config: OllamaConfig,
}

impl OllamaClient {
    /// Create a client. Does not contact the server.
    pub fn new(config: OllamaConfig) -> Result<Self, InferenceError> {
        let endpoint = Url::parse(&config.server_url).map_err(|source| InferenceError::InvalidUrl {
            url: config.server_url.clone(),
            source,
        })?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(InferenceError::Client)?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Submit `prompt` and accumulate the streamed reply.
    pub async fn query(&self, prompt: &str) -> Result<Answer, InferenceError> {
        self.query_until(prompt, std::future::pending()).await
    }

    /// Like [`query`](Self::query), but gives up when `cancel` resolves.
    ///
    /// Cancelling before the response headers arrive yields an empty answer;
    /// cancelling mid-stream keeps the text received so far. In both cases
    /// `Answer::end` is [`StreamEnd::Cancelled`] and the connection is dropped.
    pub async fn query_until<F>(&self, prompt: &str, cancel: F) -> Result<Answer, InferenceError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);

        let response = tokio::select! {
            resp = self.send(prompt) => resp?,
            _ = &mut cancel => {
                tracing::info!("Query cancelled before response");
                return Ok(Answer {
                    end: StreamEnd::Cancelled,
                    ..Answer::default()
                });
            }
        };

        let mut reader = FragmentReader::new(response, self.config.max_fragment_bytes);
        let mut answer = Answer::default();
        let end = tokio::select! {
            end = reader.drain_into(&mut answer) => end,
            _ = &mut cancel => StreamEnd::Cancelled,
        };
        answer.end = end;
        drop(reader);

        match &answer.end {
            StreamEnd::Completed => tracing::info!(
                fragments = answer.fragments,
                skipped = answer.skipped_fragments,
                chars = answer.text.chars().count(),
                done = answer.done,
                "Generation stream complete"
            ),
            end => tracing::warn!(
                fragments = answer.fragments,
                skipped = answer.skipped_fragments,
                end = %end,
                "Generation stream ended early"
            ),
        }
        Ok(answer)
    }

    /// POST the request and check the status. The body is left unread.
    async fn send(&self, prompt: &str) -> Result<reqwest::Response, InferenceError> {
        let body = GenerateRequest {
            model: &self.config.model,
            prompt,
        }
        .to_json()?;

        tracing::debug!(
            url = %self.endpoint,
            model = %self.config.model,
            prompt_bytes = prompt.len(),
            "Sending generate request"
        );

        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, url = %self.endpoint, "Transport error");
                InferenceError::Transport(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

/// Submit `prompt` to `endpoint` using `model` and return the accumulated text.
///
/// Convenience wrapper over [`OllamaClient`] with default timeouts. Skipped
/// fragments and early stream ends are logged but not reported; use
/// [`OllamaClient::query`] to inspect them.
pub async fn query(endpoint: &str, model: &str, prompt: &str) -> Result<String, InferenceError> {
    let client = OllamaClient::new(OllamaConfig::new(endpoint, model))?;
    Ok(client.query(prompt).await?.text)
}
