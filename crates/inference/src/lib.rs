//! Streaming client for a locally hosted text-generation endpoint.
//!
//! Sends one prompt to an Ollama-style `/api/generate` endpoint and
//! reassembles the newline-delimited JSON reply into a single answer.
//!
//! # Key types
//!
//! - [`OllamaClient`] — HTTP client for the generate endpoint
//! - [`OllamaConfig`] — endpoint, model, timeouts and buffer limits
//! - [`FragmentReader`] — incremental NDJSON decoder over any [`ChunkSource`]
//! - [`Answer`] — accumulated text plus how the stream ended

pub mod mocks;
pub mod ollama;
pub mod protocol;
pub mod stream;
pub mod types;

pub use ollama::{query, OllamaClient, OllamaConfig};
pub use protocol::{decode_fragment, FragmentError, GenerateRequest, StreamFragment};
pub use stream::{ChunkError, ChunkSource, FragmentReader, StreamEvent};
pub use types::{Answer, InferenceError, StreamEnd};
