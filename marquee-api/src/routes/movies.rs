//! Movies REST Routes
//!
//! Composed movie views built from the movie-info and review services, and a
//! pass-through of the movie-info live feed.

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use marquee_core::Movie;
use std::sync::Arc;

use crate::aggregator::MovieAggregator;
use crate::error::ApiResult;
use crate::ndjson::ndjson_response;
use crate::upstream::MovieInfoRestClient;

// ============================================================================
// STATE
// ============================================================================

#[derive(Clone)]
pub struct MoviesState {
    pub aggregator: MovieAggregator,
    pub movie_info_client: MovieInfoRestClient,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /v1/movies/{id} - Movie info with its reviews
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/v1/movies/{id}",
    tag = "Movies",
    params(
        ("id" = String, Path, description = "Movie info ID")
    ),
    responses(
        (status = 200, description = "Composed movie", body = Movie),
        (status = 404, description = "No movie info for the id", body = String, content_type = "text/plain"),
        (status = 500, description = "Upstream failure body, verbatim", body = String, content_type = "text/plain"),
    ),
))]
pub async fn retrieve_movie_by_id(
    State(state): State<Arc<MoviesState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Movie>> {
    let movie = state.aggregator.retrieve_movie(&id).await?;
    Ok(Json(movie))
}

/// GET /v1/movies/stream - Live feed of movie infos from the upstream
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/v1/movies/stream",
    tag = "Movies",
    responses(
        (status = 200, description = "NDJSON feed relayed from the movie-info service", body = marquee_core::MovieInfo, content_type = "application/x-ndjson"),
        (status = 500, description = "Upstream feed unavailable", body = String, content_type = "text/plain"),
    ),
))]
pub async fn retrieve_movie_info_stream(State(state): State<Arc<MoviesState>>) -> ApiResult<Response> {
    let feed = state.movie_info_client.retrieve_movie_info_stream().await?;
    Ok(ndjson_response(feed))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(aggregator: MovieAggregator, movie_info_client: MovieInfoRestClient) -> axum::Router {
    let state = Arc::new(MoviesState {
        aggregator,
        movie_info_client,
    });

    axum::Router::new()
        .route("/stream", axum::routing::get(retrieve_movie_info_stream))
        .route("/:id", axum::routing::get(retrieve_movie_by_id))
        .with_state(state)
}
