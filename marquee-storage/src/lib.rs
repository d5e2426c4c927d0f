//! Marquee Storage - Repository Traits and In-Memory Store
//!
//! Defines the document-store contract each service persists through. The
//! store itself is an external collaborator (a remote, eventually consistent
//! document database with generated ids); this crate ships an in-memory
//! implementation used by the services in development and by the tests.

use async_trait::async_trait;
use marquee_core::{new_document_id, Document, MovieInfo, Review, StorageError};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Result type alias for repository operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ============================================================================
// REPOSITORY TRAITS
// ============================================================================

/// Persistence for movie metadata.
///
/// Unknown ids yield `None` rather than an error.
#[async_trait]
pub trait MovieInfoRepository: Send + Sync {
    /// Insert or replace; assigns a generated id when the document has none.
    async fn save(&self, movie_info: MovieInfo) -> StorageResult<MovieInfo>;

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<MovieInfo>>;

    async fn find_all(&self) -> StorageResult<Vec<MovieInfo>>;

    async fn find_by_year(&self, year: i32) -> StorageResult<Vec<MovieInfo>>;

    async fn find_by_name(&self, name: &str) -> StorageResult<Vec<MovieInfo>>;

    /// Deleting an unknown id is a no-op.
    async fn delete_by_id(&self, id: &str) -> StorageResult<()>;
}

/// Persistence for reviews.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Insert or replace; assigns a generated id when the document has none.
    async fn save(&self, review: Review) -> StorageResult<Review>;

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Review>>;

    async fn find_all(&self) -> StorageResult<Vec<Review>>;

    async fn find_by_movie_info_id(&self, movie_info_id: &str) -> StorageResult<Vec<Review>>;

    /// Deleting an unknown id is a no-op.
    async fn delete_by_id(&self, id: &str) -> StorageResult<()>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// In-memory document collection preserving insertion order.
#[derive(Debug)]
pub struct InMemoryRepository<D: Document> {
    documents: Arc<RwLock<Vec<D>>>,
}

impl<D: Document> Default for InMemoryRepository<D> {
    fn default() -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl<D: Document> Clone for InMemoryRepository<D> {
    fn clone(&self) -> Self {
        Self {
            documents: Arc::clone(&self.documents),
        }
    }
}

/// In-memory movie-info collection.
pub type InMemoryMovieInfoRepository = InMemoryRepository<MovieInfo>;

/// In-memory review collection.
pub type InMemoryReviewRepository = InMemoryRepository<Review>;

impl<D: Document> InMemoryRepository<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save every document in order, returning the stored copies.
    pub async fn save_all(&self, documents: impl IntoIterator<Item = D>) -> Vec<D> {
        let mut saved = Vec::new();
        for document in documents {
            saved.push(self.upsert(document).await);
        }
        saved
    }

    /// Remove every document.
    pub async fn clear(&self) {
        self.documents.write().await.clear();
    }

    pub async fn count(&self) -> usize {
        self.documents.read().await.len()
    }

    async fn upsert(&self, mut document: D) -> D {
        if document.document_id().is_none() {
            document.set_document_id(new_document_id());
        }
        let mut documents = self.documents.write().await;
        match documents
            .iter_mut()
            .find(|existing| existing.document_id() == document.document_id())
        {
            Some(existing) => *existing = document.clone(),
            None => documents.push(document.clone()),
        }
        document
    }

    async fn get(&self, id: &str) -> Option<D> {
        self.documents
            .read()
            .await
            .iter()
            .find(|document| document.document_id() == Some(id))
            .cloned()
    }

    async fn filter(&self, predicate: impl Fn(&D) -> bool) -> Vec<D> {
        self.documents
            .read()
            .await
            .iter()
            .filter(|document| predicate(document))
            .cloned()
            .collect()
    }

    async fn remove(&self, id: &str) {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|document| document.document_id() != Some(id));
        if documents.len() == before {
            tracing::debug!(id, "Delete of unknown document id ignored");
        }
    }
}

#[async_trait]
impl MovieInfoRepository for InMemoryRepository<MovieInfo> {
    async fn save(&self, movie_info: MovieInfo) -> StorageResult<MovieInfo> {
        Ok(self.upsert(movie_info).await)
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<MovieInfo>> {
        Ok(self.get(id).await)
    }

    async fn find_all(&self) -> StorageResult<Vec<MovieInfo>> {
        Ok(self.filter(|_| true).await)
    }

    async fn find_by_year(&self, year: i32) -> StorageResult<Vec<MovieInfo>> {
        Ok(self.filter(|info| info.year == Some(year)).await)
    }

    async fn find_by_name(&self, name: &str) -> StorageResult<Vec<MovieInfo>> {
        Ok(self.filter(|info| info.name == name).await)
    }

    async fn delete_by_id(&self, id: &str) -> StorageResult<()> {
        self.remove(id).await;
        Ok(())
    }
}

#[async_trait]
impl ReviewRepository for InMemoryRepository<Review> {
    async fn save(&self, review: Review) -> StorageResult<Review> {
        Ok(self.upsert(review).await)
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Review>> {
        Ok(self.get(id).await)
    }

    async fn find_all(&self) -> StorageResult<Vec<Review>> {
        Ok(self.filter(|_| true).await)
    }

    async fn find_by_movie_info_id(&self, movie_info_id: &str) -> StorageResult<Vec<Review>> {
        Ok(self
            .filter(|review| review.movie_info_id.as_deref() == Some(movie_info_id))
            .await)
    }

    async fn delete_by_id(&self, id: &str) -> StorageResult<()> {
        self.remove(id).await;
        Ok(())
    }
}
