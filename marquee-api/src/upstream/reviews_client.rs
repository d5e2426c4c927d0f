//! Client for the review service.

use std::time::Duration;

use async_trait::async_trait;
use marquee_core::{Review, ReviewSource, RetryPolicy, UpstreamError};
use reqwest::Url;

use super::classify::{check_status, decode_json, transport_error};
use super::parse_base_url;
use super::retry::with_retry;
use crate::error::ApiResult;

/// Fetches reviews from `{base_url}?movieInfoId={id}`.
#[derive(Debug, Clone)]
pub struct ReviewsRestClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
    timeout: Duration,
}

impl ReviewsRestClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> ApiResult<Self> {
        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
            retry,
            timeout,
        })
    }

    /// Reviews for `movie_info_id`. A filter, not a keyed lookup, so a 404
    /// is an ordinary client error.
    pub async fn retrieve_reviews(&self, movie_info_id: &str) -> Result<Vec<Review>, UpstreamError> {
        let http = &self.http;
        let url = &self.base_url;
        let timeout = self.timeout;
        with_retry(&self.retry, "reviews.retrieve", move || async move {
            let response = http
                .get(url.clone())
                .query(&[("movieInfoId", movie_info_id)])
                .timeout(timeout)
                .send()
                .await
                .map_err(transport_error)?;
            let response = check_status(response, None).await?;
            decode_json::<Vec<Review>>(response).await
        })
        .await
    }
}

#[async_trait]
impl ReviewSource for ReviewsRestClient {
    async fn retrieve_reviews(&self, movie_info_id: &str) -> Result<Vec<Review>, UpstreamError> {
        ReviewsRestClient::retrieve_reviews(self, movie_info_id).await
    }
}
