//! Request helpers shared by the router tests.

#![allow(dead_code)]

use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use futures_util::StreamExt;
use marquee_api::ndjson::NdjsonDecoder;
use serde::{de::DeserializeOwned, Serialize};
use tower::ServiceExt;

pub fn json_request<T: Serialize>(method: Method, uri: &str, body: &T) -> Request<Body> {
    let bytes = serde_json::to_vec(body).expect("serialize request body");
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(bytes))
        .expect("build request")
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

/// Drive one request and return its headers-only response.
pub async fn call(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.expect("router is infallible")
}

/// Drive one request and collect the whole body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = call(app, request).await;
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, body)
}

/// Drive one request and decode a JSON body.
pub async fn send_json<T: DeserializeOwned>(app: &Router, request: Request<Body>) -> (StatusCode, T) {
    let (status, body) = send(app, request).await;
    let value = serde_json::from_slice(&body).unwrap_or_else(|e| {
        panic!(
            "expected JSON body ({}): {}",
            e,
            String::from_utf8_lossy(&body)
        )
    });
    (status, value)
}

pub fn text(body: &Bytes) -> String {
    String::from_utf8_lossy(body).into_owned()
}

/// Read exactly `count` items from a live NDJSON response.
pub async fn read_ndjson<T: DeserializeOwned>(response: Response, count: usize) -> Vec<T> {
    let mut body = response.into_body().into_data_stream();
    let mut decoder = NdjsonDecoder::new();
    let mut items = Vec::new();
    while items.len() < count {
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("feed item within timeout")
            .expect("feed still open")
            .expect("readable chunk");
        for item in decoder.push::<T>(&chunk) {
            items.push(item.expect("valid NDJSON line"));
        }
    }
    items
}
