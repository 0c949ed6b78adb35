//! Scripted chunk source for testing stream decoding without a server.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::stream::{ChunkError, ChunkSource};

/// Replays a fixed sequence of chunks, optionally ending in a read error.
pub struct ScriptedChunks {
    chunks: VecDeque<Result<Vec<u8>, String>>,
}

impl ScriptedChunks {
    /// Each item is either a body chunk or an error message to fail with.
    pub fn new(chunks: Vec<Result<Vec<u8>, String>>) -> Self {
        Self {
            chunks: chunks.into(),
        }
    }

    /// Chunks from string slices, no errors.
    pub fn from_strs(chunks: &[&str]) -> Self {
        Self::new(chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect())
    }
}

#[async_trait]
impl ChunkSource for ScriptedChunks {
    async fn next_chunk(&mut self, buf: &mut Vec<u8>) -> Result<bool, ChunkError> {
        match self.chunks.pop_front() {
            Some(Ok(bytes)) => {
                buf.extend_from_slice(&bytes);
                Ok(true)
            }
            Some(Err(message)) => Err(message.into()),
            None => Ok(false),
        }
    }
}
