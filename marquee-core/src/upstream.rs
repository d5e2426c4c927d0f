//! Upstream source traits.
//!
//! The aggregator depends on these seams rather than on the HTTP clients, so
//! it can be driven by stub sources in tests.

use async_trait::async_trait;

use crate::{MovieInfo, Review, UpstreamError};

/// Message reported when the movie-info upstream has no entry for an id.
pub fn movie_info_not_found_message(movie_info_id: &str) -> String {
    format!(
        "There is no MovieInfo available for the passed in Id : {}",
        movie_info_id
    )
}

/// Source of movie metadata.
#[async_trait]
pub trait MovieInfoSource: Send + Sync {
    async fn retrieve_movie_info(&self, movie_info_id: &str) -> Result<MovieInfo, UpstreamError>;
}

/// Source of reviews indexed by movie key.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    async fn retrieve_reviews(&self, movie_info_id: &str) -> Result<Vec<Review>, UpstreamError>;
}
