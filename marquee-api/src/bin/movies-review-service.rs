//! Marquee review service entry point.

use marquee_api::{server, ApiResult, ServiceKind};

#[tokio::main]
async fn main() -> ApiResult<()> {
    server::run(ServiceKind::MoviesReview).await
}
