//! Marquee Test Utilities
//!
//! Centralized test infrastructure for the Marquee workspace:
//! - Proptest generators for movie infos and reviews
//! - Stub upstream sources with call counting
//! - Test fixtures for common scenarios
//! - Custom assertions for upstream error classification

// Re-export storage for convenience
pub use marquee_storage::{InMemoryMovieInfoRepository, InMemoryReviewRepository};

// Re-export core types for convenience
pub use marquee_core::{
    movie_info_not_found_message, ClientErrorKind, Movie, MovieInfo, MovieInfoSource, Review,
    ReviewSource, UpstreamError, Validate, ValidationError,
};

// ============================================================================
// STUB UPSTREAM SOURCES
// ============================================================================

pub mod stubs {
    //! Canned upstream sources that record how often they were called.

    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Movie-info source answering every lookup with the same result.
    #[derive(Debug)]
    pub struct StubMovieInfoSource {
        result: Result<MovieInfo, UpstreamError>,
        calls: AtomicU32,
    }

    impl StubMovieInfoSource {
        pub fn returning(result: Result<MovieInfo, UpstreamError>) -> Self {
            Self {
                result,
                calls: AtomicU32::new(0),
            }
        }

        pub fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MovieInfoSource for StubMovieInfoSource {
        async fn retrieve_movie_info(&self, _movie_info_id: &str) -> Result<MovieInfo, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    /// Review source answering every lookup with the same result.
    #[derive(Debug)]
    pub struct StubReviewSource {
        result: Result<Vec<Review>, UpstreamError>,
        calls: AtomicU32,
    }

    impl StubReviewSource {
        pub fn returning(result: Result<Vec<Review>, UpstreamError>) -> Self {
            Self {
                result,
                calls: AtomicU32::new(0),
            }
        }

        pub fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReviewSource for StubReviewSource {
        async fn retrieve_reviews(&self, _movie_info_id: &str) -> Result<Vec<Review>, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating valid and invalid documents.

    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    /// Generate a non-blank name.
    pub fn arb_name() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{1,12}( [A-Z][a-z]{1,12}){0,3}"
    }

    pub fn arb_release_date() -> impl Strategy<Value = Option<NaiveDate>> {
        proptest::option::of((1900i32..2030, 1u32..=12, 1u32..=28))
            .prop_map(|date| date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)))
    }

    /// Generate a movie info that passes validation, without an id.
    pub fn arb_movie_info() -> impl Strategy<Value = MovieInfo> {
        (
            arb_name(),
            1900i32..2030,
            proptest::collection::vec(arb_name(), 0..5),
            arb_release_date(),
        )
            .prop_map(|(name, year, cast, release_date)| {
                MovieInfo::new(None, name, year, cast, release_date)
            })
    }

    /// Generate a review that passes validation for `movie_info_id`.
    pub fn arb_review(movie_info_id: String) -> impl Strategy<Value = Review> {
        ("[a-zA-Z ]{0,40}", 0.0f64..10.0).prop_map(move |(comment, rating)| {
            Review::new(None, movie_info_id.clone(), comment, rating)
        })
    }

    /// Generate a review violating at least one constraint.
    pub fn arb_invalid_review() -> impl Strategy<Value = Review> {
        (any::<bool>(), -100.0f64..10.0)
            .prop_filter("must violate a constraint", |(has_key, rating)| {
                !*has_key || *rating < 0.0
            })
            .prop_map(|(has_key, rating)| Review {
                review_id: None,
                movie_info_id: has_key.then(|| "1".to_string()),
                comment: "generated".to_string(),
                rating: Some(rating),
            })
    }

    /// Generate an upstream failure of either class.
    pub fn arb_upstream_error() -> impl Strategy<Value = UpstreamError> {
        prop_oneof![
            "[a-z ]{0,20}".prop_map(UpstreamError::not_found),
            (400u16..500, "[a-z ]{0,20}").prop_map(|(status, body)| UpstreamError::client(status, body)),
            (500u16..600, "[a-z ]{0,20}").prop_map(|(status, body)| UpstreamError::server(status, body)),
        ]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;
    use chrono::NaiveDate;

    fn cast(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    /// "Batman Begins" (2005), without an id.
    pub fn batman_begins() -> MovieInfo {
        MovieInfo::new(
            None,
            "Batman Begins",
            2005,
            cast(&["Christian Bale", "Michael Cane"]),
            NaiveDate::from_ymd_opt(2005, 6, 15),
        )
    }

    /// "The Dark Knight" (2008), without an id.
    pub fn dark_knight() -> MovieInfo {
        MovieInfo::new(
            None,
            "The Dark Knight",
            2008,
            cast(&["Christian Bale", "HeathLedger"]),
            NaiveDate::from_ymd_opt(2008, 7, 18),
        )
    }

    /// "Dark Knight Rises" (2012) under the fixed id `abc`.
    pub fn dark_knight_rises() -> MovieInfo {
        MovieInfo::new(
            Some("abc".to_string()),
            "Dark Knight Rises",
            2012,
            cast(&["Christian Bale", "Tom Hardy"]),
            NaiveDate::from_ymd_opt(2012, 7, 20),
        )
    }

    /// The three seeded movie infos used across service tests.
    pub fn movie_infos() -> Vec<MovieInfo> {
        vec![batman_begins(), dark_knight(), dark_knight_rises()]
    }

    /// Two reviews of `movie_info_id`.
    pub fn reviews_for(movie_info_id: &str) -> Vec<Review> {
        vec![
            Review::new(None, movie_info_id, "Awesome Movie", 9.0),
            Review::new(None, movie_info_id, "Excellent Movie", 8.0),
        ]
    }

    /// Reviews spread over movie keys `1` and `2`.
    pub fn reviews() -> Vec<Review> {
        vec![
            Review::new(None, "1", "Awesome Movie", 9.0),
            Review::new(None, "1", "Awesome Movie1", 9.0),
            Review::new(None, "2", "Excellent Movie", 8.0),
        ]
    }

    /// Movie-info store seeded with [`movie_infos`].
    pub async fn seeded_movie_info_repository() -> InMemoryMovieInfoRepository {
        let repository = InMemoryMovieInfoRepository::new();
        repository.save_all(movie_infos()).await;
        repository
    }

    /// Review store seeded with [`reviews`].
    pub async fn seeded_review_repository() -> InMemoryReviewRepository {
        let repository = InMemoryReviewRepository::new();
        repository.save_all(reviews()).await;
        repository
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for upstream error classification.

    use super::*;

    /// Assert that the result is a not-found client error naming `movie_info_id`.
    #[track_caller]
    pub fn assert_movie_info_not_found<T: std::fmt::Debug>(
        result: &Result<T, UpstreamError>,
        movie_info_id: &str,
    ) {
        match result {
            Err(err) if err.is_not_found() => {
                assert_eq!(err.message(), movie_info_not_found_message(movie_info_id));
            }
            other => panic!("Expected not-found for {}, got: {:?}", movie_info_id, other),
        }
    }

    /// Assert that the result is a server error with exactly `body` as message.
    #[track_caller]
    pub fn assert_server_error<T: std::fmt::Debug>(result: &Result<T, UpstreamError>, body: &str) {
        match result {
            Err(UpstreamError::Server { message, .. }) => assert_eq!(message, body),
            other => panic!("Expected server error {:?}, got: {:?}", body, other),
        }
    }

    /// Assert that the validation error lists exactly `messages`, in sorted order.
    #[track_caller]
    pub fn assert_violations(result: &Result<(), ValidationError>, messages: &[&str]) {
        let mut expected: Vec<&str> = messages.to_vec();
        expected.sort_unstable();
        match result {
            Err(err) => assert_eq!(err.to_string(), expected.join(",")),
            Ok(()) => panic!("Expected violations {:?}, got Ok", messages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_generated_movie_infos_are_valid(info in generators::arb_movie_info()) {
            prop_assert!(info.validate().is_ok());
        }

        #[test]
        fn prop_generated_reviews_are_valid(review in generators::arb_review("1".to_string())) {
            prop_assert!(review.validate().is_ok());
        }

        #[test]
        fn prop_invalid_reviews_fail(review in generators::arb_invalid_review()) {
            prop_assert!(review.validate().is_err());
        }
    }

    #[test]
    fn test_fixtures_are_valid() {
        for info in fixtures::movie_infos() {
            assert!(info.validate().is_ok());
        }
        for review in fixtures::reviews() {
            assert!(review.validate().is_ok());
        }
    }

    #[test]
    fn test_assertions() {
        let not_found: Result<(), _> = Err(UpstreamError::not_found(movie_info_not_found_message("xyz")));
        assertions::assert_movie_info_not_found(&not_found, "xyz");

        let server: Result<(), _> = Err(UpstreamError::server(500, "down"));
        assertions::assert_server_error(&server, "down");

        let review = Review {
            review_id: None,
            movie_info_id: None,
            comment: String::new(),
            rating: Some(-1.0),
        };
        assertions::assert_violations(
            &review.validate(),
            &[
                "rating.negative : please pass a non-negative value",
                "rating.movieInfoId : must not be null",
            ],
        );
    }
}
