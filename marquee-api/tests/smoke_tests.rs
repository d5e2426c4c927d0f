//! All three services wired together over real sockets.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use axum::Router;
use marquee_api::{build_app, ServiceConfig, ServiceKind};
use marquee_core::{Movie, MovieInfo, Review};
use marquee_test_utils::fixtures;
use tokio::net::TcpListener;

#[path = "support/http.rs"]
mod http_support;
use http_support::{call, empty_request, json_request, read_ndjson, send, send_json};

async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

struct Cluster {
    movie_infos: Router,
    reviews: Router,
    movies: Router,
}

async fn cluster() -> Cluster {
    let movie_infos = build_app(&ServiceConfig::defaults(ServiceKind::MoviesInfo)).expect("info app");
    let reviews = build_app(&ServiceConfig::defaults(ServiceKind::MoviesReview)).expect("review app");
    let info_addr = spawn(movie_infos.clone()).await;
    let review_addr = spawn(reviews.clone()).await;

    let mut config = ServiceConfig::defaults(ServiceKind::Movies);
    config.movies_info_url = format!("http://{}/v1/movieInfos", info_addr);
    config.reviews_url = format!("http://{}/v1/reviews", review_addr);
    config.retry_delay = Duration::from_millis(5);
    let movies = build_app(&config).expect("movies app");

    Cluster {
        movie_infos,
        reviews,
        movies,
    }
}

#[tokio::test]
async fn movie_is_composed_from_both_services() {
    let cluster = cluster().await;

    let (status, _) = send(
        &cluster.movie_infos,
        json_request(Method::POST, "/v1/movieInfos", &fixtures::dark_knight_rises()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    for review in fixtures::reviews_for("abc") {
        let (status, _) = send(&cluster.reviews, json_request(Method::POST, "/v1/reviews", &review)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, movie): (_, Movie) =
        send_json(&cluster.movies, empty_request(Method::GET, "/v1/movies/abc")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(movie.movie_info.name, "Dark Knight Rises");
    let ratings: Vec<Option<f64>> = movie.review_list.iter().map(|r: &Review| r.rating).collect();
    assert_eq!(ratings, vec![Some(9.0), Some(8.0)]);
}

#[tokio::test]
async fn unknown_movie_is_not_found() {
    let cluster = cluster().await;
    let (status, _) = send(&cluster.movies, empty_request(Method::GET, "/v1/movies/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn movie_without_reviews_has_empty_list() {
    let cluster = cluster().await;
    let (status, _) = send(
        &cluster.movie_infos,
        json_request(Method::POST, "/v1/movieInfos", &fixtures::dark_knight_rises()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, movie): (_, Movie) =
        send_json(&cluster.movies, empty_request(Method::GET, "/v1/movies/abc")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(movie.review_list.is_empty());
}

#[tokio::test]
async fn movies_stream_relays_latest_then_new_movie_infos() {
    let cluster = cluster().await;

    let (status, _) = send(
        &cluster.movie_infos,
        json_request(Method::POST, "/v1/movieInfos", &fixtures::batman_begins()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let response = call(&cluster.movies, empty_request(Method::GET, "/v1/movies/stream")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = send(
        &cluster.movie_infos,
        json_request(Method::POST, "/v1/movieInfos", &fixtures::dark_knight()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let received: Vec<MovieInfo> = read_ndjson(response, 2).await;
    let names: Vec<&str> = received.iter().map(|info| info.name.as_str()).collect();
    assert_eq!(names, vec!["Batman Begins", "The Dark Knight"]);
    assert!(received.iter().all(|info| info.movie_info_id.is_some()));
}
