//! Incremental NDJSON decoding of a streamed response body.
//!
//! [`FragmentReader`] pulls raw chunks from a [`ChunkSource`], splits them on
//! `\n`, and decodes each line into a [`StreamFragment`]. Chunk boundaries do
//! not need to line up with line boundaries. The line buffer is reused across
//! fragments and bounded by `max_line_bytes`.

use async_trait::async_trait;

use crate::protocol::{decode_fragment, FragmentError, StreamFragment};
use crate::types::{Answer, StreamEnd};

/// Error type for chunk sources.
pub type ChunkError = Box<dyn std::error::Error + Send + Sync>;

/// A source of raw body bytes.
#[async_trait]
pub trait ChunkSource: Send {
    /// Append the next chunk to `buf`. Returns `Ok(false)` at end of body.
    async fn next_chunk(&mut self, buf: &mut Vec<u8>) -> Result<bool, ChunkError>;
}

#[async_trait]
impl ChunkSource for reqwest::Response {
    async fn next_chunk(&mut self, buf: &mut Vec<u8>) -> Result<bool, ChunkError> {
        match self.chunk().await? {
            Some(bytes) => {
                buf.extend_from_slice(&bytes);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// One step of the decoded stream.
#[derive(Debug)]
pub enum StreamEvent {
    /// A well-formed fragment.
    Fragment(StreamFragment),
    /// A line that could not be used; reading continues after it.
    Skipped { line: usize, error: FragmentError },
    /// Terminal. Every later call returns the same end.
    End(StreamEnd),
}

/// Line-splitting fragment decoder over a [`ChunkSource`].
///
/// Owns the source, so dropping the reader releases the underlying
/// connection on every exit path.
pub struct FragmentReader<S> {
    source: S,
    buf: Vec<u8>,
    /// Bytes of `buf` already known to contain no newline.
    scanned: usize,
    max_line_bytes: usize,
    /// Inside an oversized line; drop bytes until the next newline.
    discarding: bool,
    eof: bool,
    line_no: usize,
    finished: Option<StreamEnd>,
}

impl<S: ChunkSource> FragmentReader<S> {
    pub fn new(source: S, max_line_bytes: usize) -> Self {
        Self {
            source,
            buf: Vec::with_capacity(max_line_bytes.min(8 * 1024)),
            scanned: 0,
            max_line_bytes,
            discarding: false,
            eof: false,
            line_no: 0,
            finished: None,
        }
    }

    /// Produce the next event from the stream.
    pub async fn next_event(&mut self) -> StreamEvent {
        loop {
            if let Some(end) = &self.finished {
                return StreamEvent::End(end.clone());
            }

            if let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
                let nl = self.scanned + offset;
                self.line_no += 1;
                let event = self.take_line(nl);
                self.buf.drain(..=nl);
                self.scanned = 0;
                match event {
                    Some(event) => return event,
                    None => continue,
                }
            }
            self.scanned = self.buf.len();

            if self.buf.len() > self.max_line_bytes {
                self.discarding = true;
                self.buf.clear();
                self.scanned = 0;
            }

            if self.eof {
                // Final line without a trailing newline.
                let has_tail = self.discarding || !self.buf.iter().all(u8::is_ascii_whitespace);
                self.finished = Some(StreamEnd::Completed);
                if has_tail {
                    self.line_no += 1;
                    let event = self.take_line(self.buf.len());
                    self.buf.clear();
                    self.scanned = 0;
                    if let Some(event) = event {
                        return event;
                    }
                }
                continue;
            }

            match self.source.next_chunk(&mut self.buf).await {
                Ok(true) => {}
                Ok(false) => self.eof = true,
                Err(e) => {
                    // A partial line before the failure is incomplete; drop it.
                    self.buf.clear();
                    self.scanned = 0;
                    self.finished = Some(StreamEnd::Severed(e.to_string()));
                    if self.discarding {
                        // The oversized line was already lost; count it.
                        self.line_no += 1;
                        return self.oversized();
                    }
                }
            }
        }
    }

    /// Decode `buf[..end]` as one line. `None` for blank lines.
    fn take_line(&mut self, end: usize) -> Option<StreamEvent> {
        if self.discarding || end > self.max_line_bytes {
            return Some(self.oversized());
        }
        let line = &self.buf[..end];
        if line.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        Some(match decode_fragment(line) {
            Ok(fragment) => StreamEvent::Fragment(fragment),
            Err(error) => StreamEvent::Skipped {
                line: self.line_no,
                error,
            },
        })
    }

    fn oversized(&mut self) -> StreamEvent {
        self.discarding = false;
        StreamEvent::Skipped {
            line: self.line_no,
            error: FragmentError::Oversized {
                limit: self.max_line_bytes,
            },
        }
    }

    /// Drain the stream into `answer`, returning how it ended.
    ///
    /// Text is appended as each fragment arrives, so if this future is
    /// dropped midway `answer` still holds everything received so far.
    pub async fn drain_into(&mut self, answer: &mut Answer) -> StreamEnd {
        loop {
            match self.next_event().await {
                StreamEvent::Fragment(fragment) => {
                    answer.text.push_str(&fragment.response);
                    answer.fragments += 1;
                    answer.done |= fragment.done;
                }
                StreamEvent::Skipped { line, error } => {
                    answer.skipped_fragments += 1;
                    tracing::warn!(line, error = %error, "Skipping undecodable response fragment");
                }
                StreamEvent::End(end) => return end,
            }
        }
    }

    /// Drain the whole stream into a fresh [`Answer`].
    pub async fn collect(mut self) -> Answer {
        let mut answer = Answer::default();
        let end = self.drain_into(&mut answer).await;
        answer.end = end;
        answer
    }
}
