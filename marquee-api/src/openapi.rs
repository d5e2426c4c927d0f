//! OpenAPI Specification for the Marquee services
//!
//! One document covers all three services; each serves it at `/openapi.json`.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{HealthResponse, HealthStatus};
use crate::routes::{health, movie_info, movies, review};

use marquee_core::{Movie, MovieInfo, Review};

/// OpenAPI document for the Marquee services.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Marquee API",
        description = "Movie metadata, reviews, and the composed movie view with live feeds",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "movies-info-service"),
        (url = "http://localhost:8081", description = "movies-review-service"),
        (url = "http://localhost:8082", description = "movies-service")
    ),
    tags(
        (name = "MovieInfos", description = "Movie metadata"),
        (name = "Reviews", description = "Movie reviews"),
        (name = "Movies", description = "Movie metadata joined with its reviews"),
        (name = "Health", description = "Liveness checks")
    ),
    paths(
        // === Movie Info Routes ===
        movie_info::add_movie_info,
        movie_info::get_all_movie_infos,
        movie_info::get_movie_info_by_id,
        movie_info::update_movie_info,
        movie_info::delete_movie_info,
        movie_info::get_movie_info_stream,

        // === Review Routes ===
        review::add_review,
        review::get_reviews,
        review::update_review,
        review::delete_review,
        review::get_review_stream,
        review::hello_world,

        // === Movies Routes ===
        movies::retrieve_movie_by_id,
        movies::retrieve_movie_info_stream,

        // === Health Routes ===
        health::ping,
        health::liveness,
    ),
    components(
        schemas(
            MovieInfo,
            Review,
            Movie,
            ApiError,
            ErrorCode,
            HealthResponse,
            HealthStatus,
        )
    )
)]
pub struct ApiDoc;
