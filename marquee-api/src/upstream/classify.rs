//! Classification of upstream responses into typed failures.
//!
//! - 2xx: success, body decoded by the caller
//! - 404 on a keyed lookup: not-found with a fixed message naming the key
//! - any other 4xx: client error carrying the raw body and status
//! - anything else: server error carrying the raw body verbatim
//!
//! Transport failures and undecodable success bodies are server errors with
//! status 502, so they take the retry path.

use futures_util::StreamExt;
use marquee_core::UpstreamError;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio_stream::Stream;
use tracing::warn;

use crate::ndjson::NdjsonDecoder;

pub(crate) const BAD_GATEWAY: u16 = 502;

/// Pass a successful response through, or turn it into an [`UpstreamError`].
///
/// `not_found_message` is set only for lookups by key.
pub async fn check_status(
    response: Response,
    not_found_message: Option<String>,
) -> Result<Response, UpstreamError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(%url, status = status.as_u16(), error = %e, "Unreadable upstream error body");
            String::new()
        }
    };
    if status.is_client_error() {
        if status == StatusCode::NOT_FOUND {
            if let Some(message) = not_found_message {
                return Err(UpstreamError::not_found(message));
            }
        }
        return Err(UpstreamError::client(status.as_u16(), body));
    }
    Err(UpstreamError::server(status.as_u16(), body))
}

/// Decode a successful JSON body.
pub async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, UpstreamError> {
    let url = response.url().clone();
    response.json::<T>().await.map_err(|e| {
        warn!(%url, error = %e, "Undecodable upstream body");
        UpstreamError::server(BAD_GATEWAY, format!("Invalid response from {}: {}", url, e))
    })
}

/// Map a connection-level failure.
pub fn transport_error(err: reqwest::Error) -> UpstreamError {
    let target = err
        .url()
        .map(|url| url.to_string())
        .unwrap_or_else(|| "upstream".to_string());
    if err.is_timeout() {
        return UpstreamError::server(BAD_GATEWAY, format!("Request to {} timed out", target));
    }
    UpstreamError::server(BAD_GATEWAY, format!("Request to {} failed: {}", target, err))
}

/// Wait for the first item of an NDJSON response body, then yield the rest.
///
/// A body failure before the first item is a server error, so a caller inside
/// [`with_retry`](super::with_retry) attaches again. Once the first item has
/// arrived, an interrupted body just ends the stream. Malformed lines are
/// logged and skipped either way.
pub(crate) async fn ndjson_feed<T>(
    response: Response,
    feed: &'static str,
) -> Result<impl Stream<Item = T> + Send + 'static, UpstreamError>
where
    T: DeserializeOwned + Send + 'static,
{
    let url = response.url().clone();
    let mut body = Box::pin(response.bytes_stream());
    let mut decoder = NdjsonDecoder::new();
    let mut ready: Vec<T> = Vec::new();
    let mut ended = false;

    while ready.is_empty() && !ended {
        match body.next().await {
            Some(Ok(chunk)) => ready.extend(decode_chunk::<T>(&mut decoder, &chunk, feed)),
            Some(Err(e)) => {
                warn!(feed, %url, error = %e, "Upstream feed failed before its first item");
                return Err(UpstreamError::server(
                    BAD_GATEWAY,
                    format!("Feed from {} interrupted: {}", url, e),
                ));
            }
            None => ended = true,
        }
    }

    Ok(async_stream::stream! {
        for item in ready {
            yield item;
        }
        if !ended {
            while let Some(chunk) = body.next().await {
                match chunk {
                    Ok(chunk) => {
                        for item in decode_chunk::<T>(&mut decoder, &chunk, feed) {
                            yield item;
                        }
                    }
                    Err(e) => {
                        warn!(feed, error = %e, "Upstream feed interrupted");
                        break;
                    }
                }
            }
        }
        match decoder.finish::<T>() {
            Some(Ok(item)) => yield item,
            Some(Err(e)) => warn!(feed, error = %e, "Skipping malformed feed line"),
            None => {}
        }
    })
}

fn decode_chunk<T: DeserializeOwned>(decoder: &mut NdjsonDecoder, chunk: &[u8], feed: &'static str) -> Vec<T> {
    decoder
        .push::<T>(chunk)
        .into_iter()
        .filter_map(|item| match item {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(feed, error = %e, "Skipping malformed feed line");
                None
            }
        })
        .collect()
}
