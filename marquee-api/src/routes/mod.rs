//! REST API Routes Module
//!
//! Route handlers for the three Marquee services, organized by resource, and
//! the per-service router builders that mount them next to health checks and
//! the OpenAPI document.

pub mod health;
pub mod movie_info;
pub mod movies;
pub mod review;

use std::sync::Arc;

use axum::{http::Method, routing::get, Router};
use marquee_core::{MovieInfo, Review};
use marquee_storage::{MovieInfoRepository, ReviewRepository};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::aggregator::MovieAggregator;
use crate::broadcast::BroadcastChannel;
use crate::config::ServiceKind;
use crate::upstream::MovieInfoRestClient;

// Re-export route creation functions for convenience
pub use health::create_router as health_router;
pub use movie_info::create_router as movie_info_router;
pub use movies::create_router as movies_router;
pub use review::create_router as review_router;

// ============================================================================
// OPENAPI ENDPOINT
// ============================================================================

/// Handler for /openapi.json endpoint.
#[cfg(feature = "openapi")]
async fn openapi_json() -> impl axum::response::IntoResponse {
    use utoipa::OpenApi;
    axum::Json(crate::openapi::ApiDoc::openapi())
}

// ============================================================================
// SERVICE ROUTERS
// ============================================================================

/// Router of the movie-info service.
pub fn movies_info_service_router(
    repository: Arc<dyn MovieInfoRepository>,
    feed: Arc<BroadcastChannel<MovieInfo>>,
) -> Router {
    let api = Router::new().nest("/v1/movieInfos", movie_info::create_router(repository, feed));
    finish(api, ServiceKind::MoviesInfo)
}

/// Router of the review service.
pub fn movies_review_service_router(
    repository: Arc<dyn ReviewRepository>,
    feed: Arc<BroadcastChannel<Review>>,
) -> Router {
    let api = Router::new()
        .nest("/v1/reviews", review::create_router(repository, feed))
        .route("/v1/helloWorld", get(review::hello_world));
    finish(api, ServiceKind::MoviesReview)
}

/// Router of the aggregating movies service.
pub fn movies_service_router(
    aggregator: MovieAggregator,
    movie_info_client: MovieInfoRestClient,
) -> Router {
    let api = Router::new().nest(
        "/v1/movies",
        movies::create_router(aggregator, movie_info_client),
    );
    finish(api, ServiceKind::Movies)
}

/// Mount health checks and the OpenAPI document, then apply tracing and CORS.
///
/// Execution order: Trace -> CORS -> Handler
fn finish(api: Router, service: ServiceKind) -> Router {
    #[allow(unused_mut)]
    let mut router = api.nest("/health", health::create_router(service.name()));

    #[cfg(feature = "openapi")]
    {
        router = router.route("/openapi.json", get(openapi_json));
    }

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(build_cors_layer()),
    )
}

// ============================================================================
// CORS LAYER
// ============================================================================

fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_origin(Any)
        .allow_headers(Any)
}
