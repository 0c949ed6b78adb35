//! Error and result types for the inference crate.

use std::fmt;

/// Errors that abort a query before any answer is produced.
///
/// Problems with individual response lines are not errors at this level;
/// they are skipped and counted in [`Answer::skipped_fragments`].
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The configured endpoint is not a valid URL.
    #[error("Invalid endpoint URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request payload could not be serialized.
    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    /// Connection refused, DNS failure, timeout before a response, etc.
    #[error("Request to inference server failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Inference server returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// How the response stream ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StreamEnd {
    /// The body ended normally.
    #[default]
    Completed,
    /// Reading the body failed partway through.
    Severed(String),
    /// The caller abandoned the query.
    Cancelled,
}

impl fmt::Display for StreamEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamEnd::Completed => f.write_str("completed"),
            StreamEnd::Severed(reason) => write!(f, "severed ({reason})"),
            StreamEnd::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// The accumulated reply to one query.
///
/// A truncated stream is still a successful query: `text` holds whatever
/// arrived, and `end` / `skipped_fragments` say whether anything was lost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
    /// Concatenated `response` text in arrival order.
    pub text: String,
    /// Number of fragments whose text was appended.
    pub fragments: usize,
    /// Number of lines skipped because they could not be decoded.
    pub skipped_fragments: usize,
    /// Whether a fragment flagged `done` was seen.
    pub done: bool,
    /// How the stream ended.
    pub end: StreamEnd,
}

impl Answer {
    /// True when the stream ended cleanly and no fragment was skipped.
    pub fn is_complete(&self) -> bool {
        self.end == StreamEnd::Completed && self.skipped_fragments == 0
    }
}
