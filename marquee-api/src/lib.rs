//! Marquee API - HTTP services
//!
//! Three Axum services share this crate:
//! - movies-info-service: movie metadata CRUD and a live feed of new entries
//! - movies-review-service: review CRUD and a live feed of new reviews
//! - movies-service: composes metadata and reviews fetched from the other two,
//!   retrying transient upstream failures
//!
//! Live feeds are newline-delimited JSON; a new subscriber first receives the
//! most recently published item.

pub mod aggregator;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod extractors;
pub mod ndjson;
#[cfg(feature = "openapi")]
pub mod openapi;
pub mod routes;
pub mod server;
pub mod telemetry;
pub mod upstream;

// Re-export commonly used types
pub use aggregator::MovieAggregator;
pub use broadcast::{BroadcastChannel, Subscription};
pub use config::{ServiceConfig, ServiceKind};
pub use error::{ApiError, ApiResult, ErrorCode};
#[cfg(feature = "openapi")]
pub use openapi::ApiDoc;
pub use routes::{movies_info_service_router, movies_review_service_router, movies_service_router};
pub use server::build_app;
pub use upstream::{MovieInfoRestClient, ReviewsRestClient};
