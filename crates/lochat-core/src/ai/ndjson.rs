//! NDJSON stream decoding
//!
//! The model server streams one JSON record per line:
//! `{"message":{"content":"..."},"done":false}`, ending with `"done":true`.
//! Chunks from the transport do not respect line boundaries, so complete
//! lines are split off a byte buffer and the trailing partial line is kept
//! for the next chunk. Decoding to UTF-8 happens per line, which keeps
//! multi-byte characters split across chunks intact.

use std::collections::VecDeque;
use std::time::Instant;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use super::types::ChatRecord;

/// Incremental decoder for one streaming response
///
/// Not restartable: every request gets a fresh decoder.
#[derive(Debug)]
pub struct NdjsonDecoder {
    /// Bytes after the last newline seen so far
    pending: Vec<u8>,
    /// A `done: true` record was seen
    done: bool,
    /// Complete lines parsed (including malformed ones)
    records: usize,
    /// Lines dropped because they were not valid records
    malformed: usize,
    /// Total bytes pushed
    bytes_received: usize,
    /// When decoding started
    stream_start: Instant,
}

impl Default for NdjsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self {
            // Pre-allocate to reduce reallocations during streaming
            pending: Vec::with_capacity(256),
            done: false,
            records: 0,
            malformed: 0,
            bytes_received: 0,
            stream_start: Instant::now(),
        }
    }

    /// Feed one transport chunk, returning the fragments it completed
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.bytes_received += chunk.len();
        if self.done {
            debug!("Ignoring {} bytes received after done marker", chunk.len());
            return Vec::new();
        }

        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') else {
            debug!(
                "NDJSON chunk without record boundary: {} bytes pending",
                self.pending.len()
            );
            return Vec::new();
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        let mut fragments = Vec::new();
        for line in complete.split(|b| *b == b'\n') {
            if let Some(fragment) = self.process_line(line) {
                fragments.push(fragment);
            }
        }

        debug!(
            "NDJSON chunk: {} bytes, {} fragments, {} bytes carried over",
            chunk.len(),
            fragments.len(),
            self.pending.len()
        );
        fragments
    }

    /// Transport ended: decode an unterminated final line, if any
    pub fn finish(&mut self) -> Vec<String> {
        let rest = std::mem::take(&mut self.pending);
        let fragments: Vec<String> = self.process_line(&rest).into_iter().collect();

        info!(
            "NDJSON stream finished: {:?} elapsed, {} records ({} malformed), {} bytes",
            self.stream_start.elapsed(),
            self.records,
            self.malformed,
            self.bytes_received
        );
        fragments
    }

    /// Whether the final `done` record has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of lines dropped as malformed
    pub fn malformed_count(&self) -> usize {
        self.malformed
    }

    /// Number of complete lines seen
    pub fn record_count(&self) -> usize {
        self.records
    }

    fn process_line(&mut self, line: &[u8]) -> Option<String> {
        if self.done {
            return None;
        }

        let text = String::from_utf8_lossy(line);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.records += 1;

        let record = match serde_json::from_str::<ChatRecord>(trimmed) {
            Ok(record) => record,
            Err(e) => {
                self.malformed += 1;
                warn!(
                    "Dropping malformed NDJSON record #{}: {} ({} bytes)",
                    self.records,
                    e,
                    trimmed.len()
                );
                return None;
            }
        };

        if let Some(error) = &record.error {
            warn!("Model server reported error in stream: {}", error);
        }

        if record.done {
            info!(
                "NDJSON done marker after {:?}, {} records",
                self.stream_start.elapsed(),
                self.records
            );
            self.done = true;
        }

        record
            .content()
            .filter(|content| !content.is_empty())
            .map(str::to_string)
    }
}

/// Turn a transport byte stream into a stream of text fragments
///
/// Ends after the `done` record or when the transport ends. A transport
/// error is yielded once and ends the stream.
pub fn decode_stream<S, E>(body: S) -> impl Stream<Item = Result<String, E>>
where
    S: Stream<Item = Result<Bytes, E>>,
{
    let state = DecodeState {
        body: Box::pin(body),
        decoder: NdjsonDecoder::new(),
        queue: VecDeque::new(),
        ended: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(fragment) = state.queue.pop_front() {
                return Some((Ok(fragment), state));
            }
            if state.ended || state.decoder.is_done() {
                return None;
            }

            match state.body.next().await {
                Some(Ok(bytes)) => {
                    let fragments = state.decoder.push(&bytes);
                    state.queue.extend(fragments);
                }
                Some(Err(e)) => {
                    state.ended = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.ended = true;
                    let fragments = state.decoder.finish();
                    state.queue.extend(fragments);
                }
            }
        }
    })
}

struct DecodeState<S> {
    body: std::pin::Pin<Box<S>>,
    decoder: NdjsonDecoder,
    queue: VecDeque<String>,
    ended: bool,
}
