//! Movie Info REST Routes
//!
//! CRUD over movie metadata plus a live NDJSON feed of newly created entries.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marquee_core::{MovieInfo, Validate};
use marquee_storage::MovieInfoRepository;
use serde::Deserialize;
use std::sync::Arc;

use crate::broadcast::BroadcastChannel;
use crate::error::{ApiError, ApiResult};
use crate::extractors::JsonBody;
use crate::ndjson::ndjson_response;

// ============================================================================
// STATE
// ============================================================================

#[derive(Clone)]
pub struct MovieInfoState {
    pub repository: Arc<dyn MovieInfoRepository>,
    pub feed: Arc<BroadcastChannel<MovieInfo>>,
}

impl MovieInfoState {
    pub fn new(
        repository: Arc<dyn MovieInfoRepository>,
        feed: Arc<BroadcastChannel<MovieInfo>>,
    ) -> Self {
        Self { repository, feed }
    }
}

/// Query filters for listing movie infos. `year` wins over `name`.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct MovieInfoQuery {
    pub year: Option<i32>,
    pub name: Option<String>,
}

fn not_found(id: &str) -> ApiError {
    ApiError::not_found(format!("MovieInfo not found for the given id {}", id))
}

// ============================================================================
// HANDLERS
// ============================================================================

/// POST /v1/movieInfos - Create a movie info
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/v1/movieInfos",
    tag = "MovieInfos",
    request_body = MovieInfo,
    responses(
        (status = 201, description = "Movie info created", body = MovieInfo),
        (status = 400, description = "Validation failed", body = String, content_type = "text/plain"),
    ),
))]
pub async fn add_movie_info(
    State(state): State<Arc<MovieInfoState>>,
    JsonBody(movie_info): JsonBody<MovieInfo>,
) -> ApiResult<impl IntoResponse> {
    movie_info.validate()?;

    let saved = state.repository.save(movie_info).await?;
    tracing::info!(movie_info_id = ?saved.movie_info_id, name = %saved.name, "Movie info created");
    state.feed.publish(saved.clone());

    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /v1/movieInfos - List movie infos
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/v1/movieInfos",
    tag = "MovieInfos",
    params(MovieInfoQuery),
    responses(
        (status = 200, description = "Matching movie infos", body = Vec<MovieInfo>),
    ),
))]
pub async fn get_all_movie_infos(
    State(state): State<Arc<MovieInfoState>>,
    Query(params): Query<MovieInfoQuery>,
) -> ApiResult<Json<Vec<MovieInfo>>> {
    let movie_infos = match (params.year, params.name.as_deref()) {
        (Some(year), _) => state.repository.find_by_year(year).await?,
        (None, Some(name)) => state.repository.find_by_name(name).await?,
        (None, None) => state.repository.find_all().await?,
    };
    Ok(Json(movie_infos))
}

/// GET /v1/movieInfos/{id} - Get one movie info
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/v1/movieInfos/{id}",
    tag = "MovieInfos",
    params(
        ("id" = String, Path, description = "Movie info ID")
    ),
    responses(
        (status = 200, description = "Movie info", body = MovieInfo),
        (status = 404, description = "Movie info not found", body = String, content_type = "text/plain"),
    ),
))]
pub async fn get_movie_info_by_id(
    State(state): State<Arc<MovieInfoState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MovieInfo>> {
    let movie_info = state
        .repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(movie_info))
}

/// PUT /v1/movieInfos/{id} - Replace the fields of an existing movie info
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/v1/movieInfos/{id}",
    tag = "MovieInfos",
    params(
        ("id" = String, Path, description = "Movie info ID")
    ),
    request_body = MovieInfo,
    responses(
        (status = 200, description = "Movie info updated", body = MovieInfo),
        (status = 400, description = "Validation failed", body = String, content_type = "text/plain"),
        (status = 404, description = "Movie info not found", body = String, content_type = "text/plain"),
    ),
))]
pub async fn update_movie_info(
    State(state): State<Arc<MovieInfoState>>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<MovieInfo>,
) -> ApiResult<Json<MovieInfo>> {
    update.validate()?;

    let mut existing = state
        .repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    existing.apply_update(update);

    let saved = state.repository.save(existing).await?;
    tracing::info!(movie_info_id = %id, "Movie info updated");
    Ok(Json(saved))
}

/// DELETE /v1/movieInfos/{id} - Delete a movie info
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/v1/movieInfos/{id}",
    tag = "MovieInfos",
    params(
        ("id" = String, Path, description = "Movie info ID")
    ),
    responses(
        (status = 204, description = "Movie info deleted"),
    ),
))]
pub async fn delete_movie_info(
    State(state): State<Arc<MovieInfoState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.repository.delete_by_id(&id).await?;
    tracing::info!(movie_info_id = %id, "Movie info deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/movieInfos/stream - Live feed of created movie infos
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/v1/movieInfos/stream",
    tag = "MovieInfos",
    responses(
        (status = 200, description = "NDJSON feed, latest entry first", body = MovieInfo, content_type = "application/x-ndjson"),
    ),
))]
pub async fn get_movie_info_stream(State(state): State<Arc<MovieInfoState>>) -> Response {
    ndjson_response(state.feed.subscribe().into_stream())
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(
    repository: Arc<dyn MovieInfoRepository>,
    feed: Arc<BroadcastChannel<MovieInfo>>,
) -> axum::Router {
    let state = Arc::new(MovieInfoState::new(repository, feed));

    axum::Router::new()
        .route("/", axum::routing::post(add_movie_info))
        .route("/", axum::routing::get(get_all_movie_infos))
        .route("/stream", axum::routing::get(get_movie_info_stream))
        .route("/:id", axum::routing::get(get_movie_info_by_id))
        .route("/:id", axum::routing::put(update_movie_info))
        .route("/:id", axum::routing::delete(delete_movie_info))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_to_no_filter() -> Result<(), serde_json::Error> {
        let query: MovieInfoQuery = serde_json::from_str("{}")?;
        assert!(query.year.is_none());
        assert!(query.name.is_none());
        Ok(())
    }

    #[test]
    fn test_not_found_message() {
        let err = not_found("def");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.message.contains("def"));
    }
}
