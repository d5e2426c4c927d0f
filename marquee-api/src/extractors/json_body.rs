//! JSON body extractor with plain-text rejections.
//!
//! Axum's `Json` rejects malformed bodies with its own response format;
//! `JsonBody<T>` routes those failures through [`ApiError`] so every error
//! the services emit has the same shape.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Request body decoded as JSON.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::invalid_input(rejection.body_text()))?;
        Ok(JsonBody(value))
    }
}
