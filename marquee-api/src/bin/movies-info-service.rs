//! Marquee movie-info service entry point.

use marquee_api::{server, ApiResult, ServiceKind};

#[tokio::main]
async fn main() -> ApiResult<()> {
    server::run(ServiceKind::MoviesInfo).await
}
