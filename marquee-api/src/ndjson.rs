//! Newline-delimited JSON framing for live feeds.
//!
//! Responses carry one JSON document per line with content type
//! `application/x-ndjson`; the decoder reassembles lines from arbitrary chunk
//! boundaries on the client side.

use std::convert::Infallible;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use tokio_stream::{Stream, StreamExt};

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Chunked response writing each item of `items` as its own line.
pub fn ndjson_response<S, T>(items: S) -> Response
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize,
{
    let frames = items.filter_map(|item| match serde_json::to_string(&item) {
        Ok(mut line) => {
            line.push('\n');
            Some(Ok::<_, Infallible>(line))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Dropping feed item that failed to serialize");
            None
        }
    });

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, NDJSON_CONTENT_TYPE)],
        Body::from_stream(frames),
    )
        .into_response()
}

/// Incremental line decoder.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and decode every line it completes. Blank lines are
    /// skipped.
    pub fn push<T: DeserializeOwned>(&mut self, chunk: &[u8]) -> Vec<Result<T, serde_json::Error>> {
        self.buffer.extend_from_slice(chunk);
        let mut items = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            if let Some(item) = decode_line(&line) {
                items.push(item);
            }
        }
        items
    }

    /// Decode a final line left without a trailing newline.
    pub fn finish<T: DeserializeOwned>(&mut self) -> Option<Result<T, serde_json::Error>> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest)
    }
}

fn decode_line<T: DeserializeOwned>(line: &[u8]) -> Option<Result<T, serde_json::Error>> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    Some(serde_json::from_slice(line))
}
