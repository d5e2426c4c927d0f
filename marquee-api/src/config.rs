//! Service Configuration Module
//!
//! Bind address, upstream locations, retry values and stream buffering for the
//! three Marquee services. Configuration is loaded from environment variables
//! with sensible defaults for development.

use std::net::SocketAddr;
use std::time::Duration;

use marquee_core::RetryPolicy;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// SERVICE KIND
// ============================================================================

/// Which of the three services a process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    MoviesInfo,
    MoviesReview,
    Movies,
}

impl ServiceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ServiceKind::MoviesInfo => "movies-info-service",
            ServiceKind::MoviesReview => "movies-review-service",
            ServiceKind::Movies => "movies-service",
        }
    }

    /// Default port, so all three can run side by side locally.
    pub fn default_port(&self) -> u16 {
        match self {
            ServiceKind::MoviesInfo => 8080,
            ServiceKind::MoviesReview => 8081,
            ServiceKind::Movies => 8082,
        }
    }
}

// ============================================================================
// SERVICE CONFIGURATION
// ============================================================================

/// Runtime configuration shared by the Marquee services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub service: ServiceKind,

    /// Interface to bind.
    pub bind_host: String,

    pub port: u16,

    /// Base URL of the movie-info collection, e.g. `http://localhost:8080/v1/movieInfos`.
    pub movies_info_url: String,

    /// Base URL of the review collection, e.g. `http://localhost:8081/v1/reviews`.
    pub reviews_url: String,

    /// Retries after the first attempt for upstream server failures.
    pub retry_max_retries: u32,

    /// Fixed pause between upstream attempts.
    pub retry_delay: Duration,

    /// Per-request timeout for upstream calls (not applied to live streams).
    pub upstream_timeout: Duration,

    /// How many published items a slow live-feed subscriber may fall behind
    /// before the oldest are dropped for it.
    pub stream_capacity: usize,
}

impl ServiceConfig {
    /// Defaults for `service` without consulting the environment.
    pub fn defaults(service: ServiceKind) -> Self {
        Self {
            service,
            bind_host: "0.0.0.0".to_string(),
            port: service.default_port(),
            movies_info_url: "http://localhost:8080/v1/movieInfos".to_string(),
            reviews_url: "http://localhost:8081/v1/reviews".to_string(),
            retry_max_retries: 3,
            retry_delay: Duration::from_secs(1),
            upstream_timeout: Duration::from_secs(5),
            stream_capacity: 256,
        }
    }

    /// Create ServiceConfig from environment variables.
    ///
    /// Environment variables:
    /// - `MARQUEE_BIND`: Interface to bind (default: 0.0.0.0)
    /// - `PORT` or `MARQUEE_PORT`: Listen port (default: 8080 / 8081 / 8082)
    /// - `MARQUEE_MOVIES_INFO_URL`: Movie-info upstream base URL
    /// - `MARQUEE_REVIEWS_URL`: Review upstream base URL
    /// - `MARQUEE_RETRY_MAX_RETRIES`: Retries after the first attempt (default: 3)
    /// - `MARQUEE_RETRY_DELAY_MS`: Delay between attempts (default: 1000)
    /// - `MARQUEE_UPSTREAM_TIMEOUT_MS`: Upstream request timeout (default: 5000)
    /// - `MARQUEE_STREAM_CAPACITY`: Live-feed buffer per subscriber (default: 256)
    pub fn from_env(service: ServiceKind) -> ApiResult<Self> {
        let defaults = Self::defaults(service);

        let bind_host = std::env::var("MARQUEE_BIND").unwrap_or(defaults.bind_host);

        let port = match std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("MARQUEE_PORT").ok())
        {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", value)))?,
            None => defaults.port,
        };

        let movies_info_url =
            std::env::var("MARQUEE_MOVIES_INFO_URL").unwrap_or(defaults.movies_info_url);
        let reviews_url = std::env::var("MARQUEE_REVIEWS_URL").unwrap_or(defaults.reviews_url);

        let retry_max_retries = std::env::var("MARQUEE_RETRY_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.retry_max_retries);

        let retry_delay = std::env::var("MARQUEE_RETRY_DELAY_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_delay);

        let upstream_timeout = std::env::var("MARQUEE_UPSTREAM_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.upstream_timeout);

        let stream_capacity = std::env::var("MARQUEE_STREAM_CAPACITY")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|capacity| *capacity > 0)
            .unwrap_or(defaults.stream_capacity);

        Ok(Self {
            service,
            bind_host,
            port,
            movies_info_url: trim_base_url(movies_info_url),
            reviews_url: trim_base_url(reviews_url),
            retry_max_retries,
            retry_delay,
            upstream_timeout,
            stream_capacity,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_max_retries, self.retry_delay)
    }

    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>().map_err(|e| {
            ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e))
        })
    }
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
