//! Service bootstrap: wiring, bind, serve.

use std::sync::Arc;

use axum::Router;
use marquee_storage::{InMemoryMovieInfoRepository, InMemoryReviewRepository};

use crate::aggregator::MovieAggregator;
use crate::broadcast::BroadcastChannel;
use crate::config::{ServiceConfig, ServiceKind};
use crate::error::{ApiError, ApiResult};
use crate::routes::{movies_info_service_router, movies_review_service_router, movies_service_router};
use crate::telemetry::{init_tracing, TelemetryConfig};
use crate::upstream::{build_http_client, MovieInfoRestClient, ReviewsRestClient};

/// Assemble the router for `config.service`.
///
/// The movie-info and review services persist to in-memory stores; the
/// movies service talks to the other two over HTTP.
pub fn build_app(config: &ServiceConfig) -> ApiResult<Router> {
    let router = match config.service {
        ServiceKind::MoviesInfo => movies_info_service_router(
            Arc::new(InMemoryMovieInfoRepository::new()),
            Arc::new(BroadcastChannel::new("movie_info", config.stream_capacity)),
        ),
        ServiceKind::MoviesReview => movies_review_service_router(
            Arc::new(InMemoryReviewRepository::new()),
            Arc::new(BroadcastChannel::new("review", config.stream_capacity)),
        ),
        ServiceKind::Movies => {
            let http = build_http_client()?;
            let movie_info_client = MovieInfoRestClient::new(
                http.clone(),
                &config.movies_info_url,
                config.retry_policy(),
                config.upstream_timeout,
            )?;
            let reviews_client = ReviewsRestClient::new(
                http,
                &config.reviews_url,
                config.retry_policy(),
                config.upstream_timeout,
            )?;
            tracing::info!(
                movies_info_url = %config.movies_info_url,
                reviews_url = %config.reviews_url,
                max_retries = config.retry_max_retries,
                retry_delay_ms = config.retry_delay.as_millis() as u64,
                "Upstream clients configured"
            );
            let aggregator =
                MovieAggregator::new(Arc::new(movie_info_client.clone()), Arc::new(reviews_client));
            movies_service_router(aggregator, movie_info_client)
        }
    };
    Ok(router)
}

/// Run `service` until ctrl-c.
pub async fn run(service: ServiceKind) -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::for_service(service.name());
    init_tracing(&telemetry_config)?;

    let config = ServiceConfig::from_env(service)?;
    let app = build_app(&config)?;

    let addr = config.bind_addr()?;
    tracing::info!(%addr, service = service.name(), "Starting Marquee service");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_every_service() -> ApiResult<()> {
        for service in [ServiceKind::MoviesInfo, ServiceKind::MoviesReview, ServiceKind::Movies] {
            build_app(&ServiceConfig::defaults(service))?;
        }
        Ok(())
    }

    #[test]
    fn test_bad_upstream_url_is_rejected() {
        let mut config = ServiceConfig::defaults(ServiceKind::Movies);
        config.movies_info_url = "not a url".to_string();
        assert!(build_app(&config).is_err());
    }
}
