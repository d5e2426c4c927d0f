//! Movie aggregation.
//!
//! Joins a required metadata lookup with an optional reviews lookup. The two
//! legs fail differently: any metadata failure is fatal, while a review
//! client error (including not-found) just means "no reviews". Review server
//! errors stay fatal.

use std::sync::Arc;

use marquee_core::{Movie, MovieInfoSource, ReviewSource, UpstreamError};
use tracing::{debug, instrument};

/// Composes [`Movie`] views from two upstream sources.
#[derive(Clone)]
pub struct MovieAggregator {
    movie_infos: Arc<dyn MovieInfoSource>,
    reviews: Arc<dyn ReviewSource>,
}

impl MovieAggregator {
    pub fn new(movie_infos: Arc<dyn MovieInfoSource>, reviews: Arc<dyn ReviewSource>) -> Self {
        Self {
            movie_infos,
            reviews,
        }
    }

    /// Metadata first, then reviews for the same id.
    #[instrument(skip(self))]
    pub async fn retrieve_movie(&self, movie_id: &str) -> Result<Movie, UpstreamError> {
        let movie_info = self.movie_infos.retrieve_movie_info(movie_id).await?;

        let review_list = match self.reviews.retrieve_reviews(movie_id).await {
            Ok(reviews) => reviews,
            Err(err) if err.is_client() => {
                debug!(status = err.status(), "No reviews available, continuing without");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        debug!(reviews = review_list.len(), "Movie composed");
        Ok(Movie::new(movie_info, review_list))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_test_utils::fixtures;
    use marquee_test_utils::generators::arb_upstream_error;
    use marquee_test_utils::stubs::{StubMovieInfoSource, StubReviewSource};
    use proptest::prelude::*;

    fn aggregator(
        movie_infos: &Arc<StubMovieInfoSource>,
        reviews: &Arc<StubReviewSource>,
    ) -> MovieAggregator {
        MovieAggregator::new(movie_infos.clone(), reviews.clone())
    }

    #[tokio::test]
    async fn test_composes_metadata_and_reviews() {
        let infos = Arc::new(StubMovieInfoSource::returning(Ok(fixtures::dark_knight_rises())));
        let reviews = Arc::new(StubReviewSource::returning(Ok(fixtures::reviews_for("abc"))));

        let movie = aggregator(&infos, &reviews).retrieve_movie("abc").await;

        let movie = movie.expect("movie composed");
        assert_eq!(movie.movie_info.name, "Dark Knight Rises");
        assert_eq!(movie.review_list.len(), 2);
        assert_eq!(infos.calls(), 1);
        assert_eq!(reviews.calls(), 1);
    }

    #[tokio::test]
    async fn test_review_client_error_yields_empty_list() {
        let infos = Arc::new(StubMovieInfoSource::returning(Ok(fixtures::batman_begins())));
        let reviews = Arc::new(StubReviewSource::returning(Err(UpstreamError::client(
            404, "",
        ))));

        let movie = aggregator(&infos, &reviews)
            .retrieve_movie("abc")
            .await
            .expect("reviews are optional");
        assert!(movie.review_list.is_empty());
    }

    #[tokio::test]
    async fn test_review_server_error_propagates() {
        let infos = Arc::new(StubMovieInfoSource::returning(Ok(fixtures::batman_begins())));
        let reviews = Arc::new(StubReviewSource::returning(Err(UpstreamError::server(
            500,
            "Review Service Unavailable",
        ))));

        let err = aggregator(&infos, &reviews)
            .retrieve_movie("abc")
            .await
            .expect_err("review server errors are fatal");
        assert_eq!(err, UpstreamError::server(500, "Review Service Unavailable"));
    }

    #[tokio::test]
    async fn test_metadata_failure_skips_reviews() {
        let infos = Arc::new(StubMovieInfoSource::returning(Err(UpstreamError::not_found(
            marquee_core::movie_info_not_found_message("xyz"),
        ))));
        let reviews = Arc::new(StubReviewSource::returning(Ok(Vec::new())));

        let err = aggregator(&infos, &reviews)
            .retrieve_movie("xyz")
            .await
            .expect_err("metadata is required");
        assert!(err.is_not_found());
        assert_eq!(
            err.message(),
            "There is no MovieInfo available for the passed in Id : xyz"
        );
        assert_eq!(reviews.calls(), 0);
    }

    proptest! {
        #[test]
        fn prop_review_failures_split_by_class(error in arb_upstream_error()) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("runtime");
            let infos = Arc::new(StubMovieInfoSource::returning(Ok(fixtures::batman_begins())));
            let reviews = Arc::new(StubReviewSource::returning(Err(error.clone())));

            let result = runtime.block_on(aggregator(&infos, &reviews).retrieve_movie("abc"));

            if error.is_client() {
                let movie = result.expect("client errors mean no reviews");
                prop_assert!(movie.review_list.is_empty());
            } else {
                prop_assert_eq!(result, Err(error));
            }
        }

        #[test]
        fn prop_metadata_failures_always_propagate(error in arb_upstream_error()) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("runtime");
            let infos = Arc::new(StubMovieInfoSource::returning(Err(error.clone())));
            let reviews = Arc::new(StubReviewSource::returning(Ok(fixtures::reviews_for("abc"))));

            let result = runtime.block_on(aggregator(&infos, &reviews).retrieve_movie("abc"));

            prop_assert_eq!(result, Err(error));
            prop_assert_eq!(reviews.calls(), 0);
        }
    }
}
