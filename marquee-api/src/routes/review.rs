//! Review REST Routes
//!
//! CRUD over reviews plus a live NDJSON feed of newly created reviews.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use marquee_core::{Review, Validate};
use marquee_storage::ReviewRepository;
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
pub struct ReviewState {
    pub repository: Arc<dyn ReviewRepository>,
    pub feed: Arc<BroadcastChannel<Review>>,
}

impl ReviewState {
    pub fn new(repository: Arc<dyn ReviewRepository>, feed: Arc<BroadcastChannel<Review>>) -> Self {
        Self { repository, feed }
    }

    async fn existing(&self, review_id: &str) -> ApiResult<Review> {
        self.repository
            .find_by_id(review_id)
            .await?
            .ok_or_else(|| review_not_found(review_id))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuery {
    /// Only reviews of this movie.
    pub movie_info_id: Option<String>,
}

fn review_not_found(review_id: &str) -> ApiError {
    ApiError::not_found(format!(
        "Review not found for the given Review id {}",
        review_id
    ))
}

// ============================================================================
// HANDLERS
// ============================================================================

/// POST /v1/reviews - Create a review
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/v1/reviews",
    tag = "Reviews",
    request_body = Review,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Validation failed", body = String, content_type = "text/plain"),
    ),
))]
pub async fn add_review(
    State(state): State<Arc<ReviewState>>,
    JsonBody(review): JsonBody<Review>,
) -> ApiResult<impl IntoResponse> {
    review.validate()?;

    let saved = state.repository.save(review).await?;
    tracing::info!(review_id = ?saved.review_id, movie_info_id = ?saved.movie_info_id, "Review created");
    state.feed.publish(saved.clone());

    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /v1/reviews - List reviews
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/v1/reviews",
    tag = "Reviews",
    params(ReviewQuery),
    responses(
        (status = 200, description = "Matching reviews", body = Vec<Review>),
    ),
))]
pub async fn get_reviews(
    State(state): State<Arc<ReviewState>>,
    Query(params): Query<ReviewQuery>,
) -> ApiResult<Json<Vec<Review>>> {
    let reviews = match params.movie_info_id.as_deref() {
        Some(movie_info_id) => state.repository.find_by_movie_info_id(movie_info_id).await?,
        None => state.repository.find_all().await?,
    };
    Ok(Json(reviews))
}

/// PUT /v1/reviews/{id} - Update comment and rating
#[cfg_attr(feature = "openapi", utoipa::path(
    put,
    path = "/v1/reviews/{id}",
    tag = "Reviews",
    params(
        ("id" = String, Path, description = "Review ID")
    ),
    request_body = Review,
    responses(
        (status = 200, description = "Review updated", body = Review),
        (status = 404, description = "Review not found", body = String, content_type = "text/plain"),
    ),
))]
pub async fn update_review(
    State(state): State<Arc<ReviewState>>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<Review>,
) -> ApiResult<Json<Review>> {
    let mut existing = state.existing(&id).await?;
    existing.apply_update(update);
    existing.validate()?;

    let saved = state.repository.save(existing).await?;
    tracing::info!(review_id = %id, "Review updated");
    Ok(Json(saved))
}

/// DELETE /v1/reviews/{id} - Delete a review
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/v1/reviews/{id}",
    tag = "Reviews",
    params(
        ("id" = String, Path, description = "Review ID")
    ),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 404, description = "Review not found", body = String, content_type = "text/plain"),
    ),
))]
pub async fn delete_review(
    State(state): State<Arc<ReviewState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.existing(&id).await?;
    state.repository.delete_by_id(&id).await?;
    tracing::info!(review_id = %id, "Review deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/reviews/stream - Live feed of created reviews
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/v1/reviews/stream",
    tag = "Reviews",
    responses(
        (status = 200, description = "NDJSON feed, latest review first", body = Review, content_type = "application/x-ndjson"),
    ),
))]
pub async fn get_review_stream(State(state): State<Arc<ReviewState>>) -> Response {
    ndjson_response(state.feed.subscribe().into_stream())
}

/// GET /v1/helloWorld
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/v1/helloWorld",
    tag = "Reviews",
    responses(
        (status = 200, description = "Greeting", body = String),
    ),
))]
pub async fn hello_world() -> &'static str {
    "hello world"
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(
    repository: Arc<dyn ReviewRepository>,
    feed: Arc<BroadcastChannel<Review>>,
) -> axum::Router {
    let state = Arc::new(ReviewState::new(repository, feed));

    axum::Router::new()
        .route("/", axum::routing::post(add_review))
        .route("/", axum::routing::get(get_reviews))
        .route("/stream", axum::routing::get(get_review_stream))
        .route("/:id", axum::routing::put(update_review))
        .route("/:id", axum::routing::delete(delete_review))
        .with_state(state)
}
