//! Decoding of generation responses
//!
//! Providers answer either with one JSON object or with newline-delimited
//! JSON chunks, each carrying a fragment and an optional `done` flag.

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use std::fmt::Display;

use crate::error::{Error, Result};

/// One generation object, whole answer or streamed fragment
#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    completion: Option<String>,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

impl GenerateChunk {
    fn decode(raw: &[u8]) -> std::result::Result<(String, bool), String> {
        let chunk: GenerateChunk = serde_json::from_slice(raw).map_err(|e| e.to_string())?;
        let done = chunk.done.unwrap_or(false);
        match (chunk.response, chunk.completion) {
            (Some(text), _) | (None, Some(text)) => Ok((text, done)),
            (None, None) => Err(chunk
                .error
                .unwrap_or_else(|| "missing 'response' or 'completion' field".to_string())),
        }
    }
}

/// How the provider framed its answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// One JSON object holding the full answer
    Single,
    /// Newline-delimited JSON chunks
    Stream,
}

impl ResponseMode {
    /// Pick the decoding mode from the response `Content-Type`
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let mime = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());
        match mime.as_deref() {
            Some("application/json") => Self::Single,
            _ => Self::Stream,
        }
    }
}

/// Whether more input is wanted after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Keep reading
    Continue,
    /// Answer complete; stop reading
    Done,
}

/// Accumulates streamed answer fragments in arrival order.
///
/// A bad first chunk fails the whole generation. A bad chunk after at
/// least one good one ends the answer with what was collected so far.
#[derive(Debug, Default)]
pub struct AnswerAccumulator {
    answer: String,
    chunks: usize,
    truncated: bool,
}

impl AnswerAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// True if decoding stopped early on a bad chunk
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Feed one line of NDJSON
    pub fn push_line(&mut self, line: &[u8]) -> Result<Progress> {
        let line = trim_ascii_whitespace(line);
        if line.is_empty() {
            return Ok(Progress::Continue);
        }

        match GenerateChunk::decode(line) {
            Ok((fragment, done)) => {
                self.chunks += 1;
                self.answer.push_str(&fragment);
                Ok(if done { Progress::Done } else { Progress::Continue })
            }
            Err(reason) if self.chunks == 0 => Err(Error::generation(format!(
                "undecodable first chunk: {}",
                reason
            ))),
            Err(reason) => {
                tracing::warn!(
                    chunks = self.chunks,
                    "Truncating answer at undecodable chunk: {}",
                    reason
                );
                self.truncated = true;
                Ok(Progress::Done)
            }
        }
    }

    /// Record a transport failure part-way through the stream
    pub fn interrupt(&mut self, reason: impl Display) -> Result<()> {
        if self.chunks == 0 {
            return Err(Error::generation(format!("stream failed: {}", reason)));
        }
        tracing::warn!(chunks = self.chunks, "Truncating answer at stream error: {}", reason);
        self.truncated = true;
        Ok(())
    }

    /// Final answer. An input with no chunks at all is an error.
    pub fn finish(self) -> Result<String> {
        if self.chunks == 0 {
            return Err(Error::generation("empty generation response"));
        }
        tracing::debug!(chunks = self.chunks, truncated = self.truncated, "Answer collected");
        Ok(self.answer)
    }
}

fn trim_ascii_whitespace(mut raw: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = raw {
        if !first.is_ascii_whitespace() {
            break;
        }
        raw = rest;
    }
    while let [rest @ .., last] = raw {
        if !last.is_ascii_whitespace() {
            break;
        }
        raw = rest;
    }
    raw
}

/// Decode a body holding a single generation object
pub fn decode_single(body: &[u8]) -> Result<String> {
    GenerateChunk::decode(body)
        .map(|(text, _)| text)
        .map_err(|reason| Error::generation(format!("undecodable response: {}", reason)))
}

/// Decode a fully buffered NDJSON body
pub fn decode_lines(body: &[u8]) -> Result<String> {
    let mut acc = AnswerAccumulator::new();
    for line in body.split(|b| *b == b'\n') {
        if acc.push_line(line)? == Progress::Done {
            break;
        }
    }
    acc.finish()
}

/// Collect an answer from a byte stream of NDJSON.
///
/// Stops polling the stream as soon as a chunk reports `done`, so anything
/// the provider sends afterwards is never read. A body whose first line
/// does not decode is read to the end and tried as one JSON object, which
/// covers pretty-printed single answers sent without a JSON content type.
pub async fn collect_answer<S, E>(stream: S) -> Result<String>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Display,
{
    futures_util::pin_mut!(stream);

    let mut acc = AnswerAccumulator::new();
    let mut pending: Vec<u8> = Vec::new();
    // Everything received before the first chunk decodes
    let mut head: Vec<u8> = Vec::new();

    while let Some(next) = stream.next().await {
        let bytes = match next {
            Ok(bytes) => bytes,
            Err(e) => {
                acc.interrupt(e)?;
                return acc.finish();
            }
        };

        if acc.chunks == 0 {
            head.extend_from_slice(&bytes);
        }
        pending.extend_from_slice(&bytes);
        while let Some(pos) = pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = pending.drain(..=pos).collect();
            match acc.push_line(&line) {
                Ok(Progress::Continue) => {}
                Ok(Progress::Done) => return acc.finish(),
                Err(err) => return decode_rest_as_single(stream, head, err).await,
            }
        }
        if acc.chunks > 0 && !head.is_empty() {
            head = Vec::new();
        }
    }

    if !pending.is_empty() {
        if let Err(err) = acc.push_line(&pending) {
            return decode_single(&head).map_err(|_| err);
        }
    }
    acc.finish()
}

/// Drain the stream after `head` and decode the whole body as one object.
/// Returns `line_err` if that fails too.
async fn decode_rest_as_single<S, E>(
    mut stream: std::pin::Pin<&mut S>,
    mut head: Vec<u8>,
    line_err: Error,
) -> Result<String>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
{
    while let Some(next) = stream.next().await {
        match next {
            Ok(bytes) => head.extend_from_slice(&bytes),
            Err(_) => return Err(line_err),
        }
    }
    decode_single(&head).map_err(|_| line_err)
}
