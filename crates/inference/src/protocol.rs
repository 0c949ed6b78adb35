//! Wire types for the `/api/generate` endpoint.
//!
//! The request is a single JSON object. The response body is NDJSON: one
//! object per line, each carrying an incremental `response` chunk.

use serde::{Deserialize, Serialize};

/// Request body: `{"model": "...", "prompt": "..."}`.
#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
}

impl GenerateRequest<'_> {
    /// Serialize to the JSON bytes sent as the POST body.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// One decoded line of the response stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamFragment {
    /// Incremental generated text; may be empty.
    pub response: String,
    /// Set on the server's final fragment. Informational only: the stream
    /// still ends at end of body.
    pub done: bool,
}

/// Why a single response line could not be used.
#[derive(Debug, thiserror::Error)]
pub enum FragmentError {
    /// The line is not valid JSON of the expected shape.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Valid JSON, but no string `response` field.
    #[error("Fragment has no 'response' field")]
    MissingResponse,

    /// The server reported an error inline (`{"error": "..."}`).
    #[error("Server error: {0}")]
    Server(String),

    /// The line exceeded the configured buffer limit and was discarded.
    #[error("Fragment exceeds {limit} bytes")]
    Oversized { limit: usize },
}

/// Loose wire shape; the typed checks happen in [`decode_fragment`].
#[derive(Deserialize)]
struct FragmentWire {
    response: Option<String>,
    #[serde(default)]
    done: bool,
    error: Option<String>,
}

/// Decode one response line into a [`StreamFragment`].
///
/// Surrounding whitespace (including a trailing `\r`) is ignored. Extra
/// fields such as `model`, `created_at` or `context` are accepted and dropped.
pub fn decode_fragment(line: &[u8]) -> Result<StreamFragment, FragmentError> {
    let wire: FragmentWire = serde_json::from_slice(line.trim_ascii())?;
    if let Some(message) = wire.error {
        return Err(FragmentError::Server(message));
    }
    let response = wire.response.ok_or(FragmentError::MissingResponse)?;
    Ok(StreamFragment {
        response,
        done: wire.done,
    })
}
