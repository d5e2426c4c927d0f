//! Field validation for incoming documents.
//!
//! Every violated constraint is collected; the resulting error reports them
//! sorted lexicographically and joined with a comma.

use crate::{MovieInfo, Review, ValidationError};

pub const MOVIE_INFO_NAME_REQUIRED: &str = "movieInfo.name must be present";
pub const MOVIE_INFO_YEAR_POSITIVE: &str = "movieInfo.year must be a Positive Value";
pub const MOVIE_INFO_CAST_REQUIRED: &str = "movieInfo.cast must be present";
pub const REVIEW_MOVIE_INFO_ID_REQUIRED: &str = "rating.movieInfoId : must not be null";
pub const REVIEW_RATING_NON_NEGATIVE: &str = "rating.negative : please pass a non-negative value";

/// Trait for documents with field-level constraints.
pub trait Validate {
    /// Messages of every violated constraint, in no particular order.
    fn violations(&self) -> Vec<String>;

    /// Fail with all violations at once.
    fn validate(&self) -> Result<(), ValidationError> {
        let violations = self.violations();
        if violations.is_empty() {
            return Ok(());
        }
        Err(ValidationError::from_violations(violations))
    }
}

impl Validate for MovieInfo {
    fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if self.name.trim().is_empty() {
            violations.push(MOVIE_INFO_NAME_REQUIRED.to_string());
        }
        if !matches!(self.year, Some(year) if year > 0) {
            violations.push(MOVIE_INFO_YEAR_POSITIVE.to_string());
        }
        if self.cast.iter().any(|member| member.trim().is_empty()) {
            violations.push(MOVIE_INFO_CAST_REQUIRED.to_string());
        }
        violations
    }
}

impl Validate for Review {
    fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        if self.movie_info_id.is_none() {
            violations.push(REVIEW_MOVIE_INFO_ID_REQUIRED.to_string());
        }
        if matches!(self.rating, Some(rating) if rating < 0.0) {
            violations.push(REVIEW_RATING_NON_NEGATIVE.to_string());
        }
        violations
    }
}
