//! Movie documents and the composed movie view.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::DocumentId;

/// A document persisted by a repository.
///
/// The store assigns an id on first save when the document carries none.
pub trait Document: Clone + Send + Sync + 'static {
    /// Current id, if the document has been saved (or was given one).
    fn document_id(&self) -> Option<&str>;

    /// Assign the id generated by the store.
    fn set_document_id(&mut self, id: DocumentId);
}

/// Movie metadata owned by the movie-info service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MovieInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movie_info_id: Option<DocumentId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(rename = "release_date", default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
}

impl MovieInfo {
    pub fn new(
        movie_info_id: Option<DocumentId>,
        name: impl Into<String>,
        year: i32,
        cast: Vec<String>,
        release_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            movie_info_id,
            name: name.into(),
            year: Some(year),
            cast,
            release_date,
        }
    }

    /// Copy the mutable fields of `update` onto this document, keeping the id.
    pub fn apply_update(&mut self, update: MovieInfo) {
        self.name = update.name;
        self.year = update.year;
        self.cast = update.cast;
        self.release_date = update.release_date;
    }
}

impl Document for MovieInfo {
    fn document_id(&self) -> Option<&str> {
        self.movie_info_id.as_deref()
    }

    fn set_document_id(&mut self, id: DocumentId) {
        self.movie_info_id = Some(id);
    }
}

/// A single review owned by the review service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_id: Option<DocumentId>,
    /// Key of the movie this review belongs to. Numeric keys are accepted
    /// and kept in their decimal form.
    #[serde(default, deserialize_with = "deserialize_key")]
    pub movie_info_id: Option<DocumentId>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl Review {
    pub fn new(
        review_id: Option<DocumentId>,
        movie_info_id: impl Into<DocumentId>,
        comment: impl Into<String>,
        rating: f64,
    ) -> Self {
        Self {
            review_id,
            movie_info_id: Some(movie_info_id.into()),
            comment: comment.into(),
            rating: Some(rating),
        }
    }

    /// Only comment and rating are editable once a review exists.
    pub fn apply_update(&mut self, update: Review) {
        self.comment = update.comment;
        self.rating = update.rating;
    }
}

impl Document for Review {
    fn document_id(&self) -> Option<&str> {
        self.review_id.as_deref()
    }

    fn set_document_id(&mut self, id: DocumentId) {
        self.review_id = Some(id);
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

fn deserialize_key<'de, D>(deserializer: D) -> Result<Option<DocumentId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawKey>::deserialize(deserializer)?.map(|key| match key {
        RawKey::Text(text) => text,
        RawKey::Signed(n) => n.to_string(),
        RawKey::Unsigned(n) => n.to_string(),
    }))
}

/// Movie metadata joined with every review indexed under the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub movie_info: MovieInfo,
    pub review_list: Vec<Review>,
}

impl Movie {
    pub fn new(movie_info: MovieInfo, review_list: Vec<Review>) -> Self {
        Self {
            movie_info,
            review_list,
        }
    }
}
