//! Marquee Core - Entity Types
//!
//! Pure data structures shared by every Marquee service: the movie-info and
//! review documents, the composed `Movie` view, the error taxonomy, field
//! validation and the upstream retry policy. All other crates depend on this.

pub mod entities;
pub mod error;
pub mod retry;
pub mod upstream;
pub mod validation;

pub use entities::{Document, Movie, MovieInfo, Review};
pub use error::{
    ClientErrorKind, MarqueeError, MarqueeResult, StorageError, UpstreamError, ValidationError,
};
pub use retry::RetryPolicy;
pub use upstream::{movie_info_not_found_message, MovieInfoSource, ReviewSource};
pub use validation::Validate;

use chrono::{DateTime, Utc};
use uuid::Uuid;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Opaque document identifier as handed out by the document store.
///
/// Generated ids are UUIDv7 strings, but callers may also supply their own
/// (e.g. `"abc"` in fixtures), so the type stays a plain string.
pub type DocumentId = String;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new timestamp-sortable document id.
pub fn new_document_id() -> DocumentId {
    Uuid::now_v7().to_string()
}
