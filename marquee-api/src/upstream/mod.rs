//! Upstream HTTP clients used by the movies service.
//!
//! Every client funnels responses through [`classify`] and wraps the whole
//! call in [`retry::with_retry`], so failure handling is identical across
//! upstreams.

pub mod classify;
pub mod movie_info_client;
pub mod retry;
pub mod reviews_client;

use std::time::Duration;

use reqwest::Url;

use crate::error::{ApiError, ApiResult};

pub use classify::{check_status, decode_json, transport_error};
pub use movie_info_client::MovieInfoRestClient;
pub use retry::with_retry;
pub use reviews_client::ReviewsRestClient;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Shared HTTP client for upstream calls.
///
/// No overall request timeout is set here; by-id calls set their own and the
/// live feed must stay open indefinitely.
pub fn build_http_client() -> ApiResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(|e| ApiError::internal_error(format!("Failed to build HTTP client: {}", e)))
}

/// Parse an upstream collection URL such as `http://host:8080/v1/movieInfos`.
pub(crate) fn parse_base_url(base_url: &str) -> ApiResult<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| ApiError::invalid_input(format!("Invalid upstream URL {}: {}", base_url, e)))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::invalid_input(format!(
            "Upstream URL {} cannot carry a path",
            base_url
        )));
    }
    Ok(url)
}

/// `base` with one more path segment, percent-encoded.
pub(crate) fn join_segment(base: &Url, segment: &str) -> Url {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
    url
}
