//! Client for the movie-info service.

use std::time::Duration;

use async_trait::async_trait;
use marquee_core::{movie_info_not_found_message, MovieInfo, MovieInfoSource, RetryPolicy, UpstreamError};
use reqwest::Url;
use tokio_stream::Stream;

use super::classify::{check_status, decode_json, ndjson_feed, transport_error, BAD_GATEWAY};
use super::retry::with_retry;
use super::{join_segment, parse_base_url};
use crate::error::ApiResult;

/// Fetches movie metadata from `{base_url}/{id}` and tails `{base_url}/stream`.
#[derive(Debug, Clone)]
pub struct MovieInfoRestClient {
    http: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
    timeout: Duration,
}

impl MovieInfoRestClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> ApiResult<Self> {
        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
            retry,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Metadata for `movie_info_id`, retried on upstream server errors.
    pub async fn retrieve_movie_info(&self, movie_info_id: &str) -> Result<MovieInfo, UpstreamError> {
        let url = join_segment(&self.base_url, movie_info_id);
        let http = &self.http;
        let timeout = self.timeout;
        let url = &url;
        with_retry(&self.retry, "movie_info.retrieve", move || async move {
            let response = http
                .get(url.clone())
                .timeout(timeout)
                .send()
                .await
                .map_err(transport_error)?;
            let response =
                check_status(response, Some(movie_info_not_found_message(movie_info_id))).await?;
            decode_json::<MovieInfo>(response).await
        })
        .await
    }

    /// Live feed of newly created movie infos.
    ///
    /// Attaching is retried like any other call until the first item has
    /// arrived; waiting for response headers is bounded by the client timeout.
    /// Once items flow, a dropped connection simply ends the stream.
    pub async fn retrieve_movie_info_stream(
        &self,
    ) -> Result<impl Stream<Item = MovieInfo> + Send + 'static, UpstreamError> {
        let url = join_segment(&self.base_url, "stream");
        let http = &self.http;
        let timeout = self.timeout;
        let url = &url;
        let feed = with_retry(&self.retry, "movie_info.stream", move || async move {
            let response = tokio::time::timeout(timeout, http.get(url.clone()).send())
                .await
                .map_err(|_| {
                    UpstreamError::server(
                        BAD_GATEWAY,
                        format!("No response from {} within {:?}", url, timeout),
                    )
                })?
                .map_err(transport_error)?;
            let response = check_status(response, None).await?;
            ndjson_feed::<MovieInfo>(response, "movie_info").await
        })
        .await?;
        tracing::info!(url = %url, "Attached to movie-info feed");
        Ok(feed)
    }
}

#[async_trait]
impl MovieInfoSource for MovieInfoRestClient {
    async fn retrieve_movie_info(&self, movie_info_id: &str) -> Result<MovieInfo, UpstreamError> {
        MovieInfoRestClient::retrieve_movie_info(self, movie_info_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;
    use marquee_test_utils::fixtures;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    async fn read_request_head(socket: &mut TcpStream) {
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => head.extend_from_slice(&buf[..n]),
            }
        }
    }

    /// Feed upstream whose first connection breaks off inside the first line;
    /// later connections serve one complete item.
    async fn flaky_feed_upstream(line: String) -> (SocketAddr, Arc<AtomicU32>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let connections = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&connections);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                read_request_head(&mut socket).await;
                let response = if attempt == 0 {
                    "HTTP/1.1 200 OK\r\ncontent-type: application/x-ndjson\r\n\
                     transfer-encoding: chunked\r\n\r\n5\r\n{\"na"
                        .to_string()
                } else {
                    format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/x-ndjson\r\n\
                         content-length: {}\r\nconnection: close\r\n\r\n{}",
                        line.len(),
                        line
                    )
                };
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        (addr, connections)
    }

    /// Upstream answering 500 with a body cut short of its declared length.
    async fn truncated_error_upstream() -> (SocketAddr, Arc<AtomicU32>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let connections = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&connections);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                read_request_head(&mut socket).await;
                let _ = socket
                    .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 64\r\n\r\nMovieInfo")
                    .await;
                let _ = socket.shutdown().await;
            }
        });
        (addr, connections)
    }

    /// Upstream that accepts connections and never answers.
    async fn silent_upstream() -> (SocketAddr, Arc<AtomicU32>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let connections = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&connections);
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                held.push(socket);
            }
        });
        (addr, connections)
    }

    fn client(addr: SocketAddr, retry: RetryPolicy, timeout: Duration) -> MovieInfoRestClient {
        MovieInfoRestClient::new(
            reqwest::Client::new(),
            &format!("http://{}/v1/movieInfos", addr),
            retry,
            timeout,
        )
        .expect("client")
    }

    #[tokio::test]
    async fn test_stream_failure_before_first_item_is_retried() {
        let mut expected = fixtures::batman_begins();
        expected.movie_info_id = Some("1".to_string());
        let line = format!("{}\n", serde_json::to_string(&expected).expect("serialize"));
        let (addr, connections) = flaky_feed_upstream(line).await;

        let client = client(addr, RetryPolicy::new(3, Duration::from_millis(5)), Duration::from_secs(2));
        let feed = client
            .retrieve_movie_info_stream()
            .await
            .expect("feed attaches on retry");
        let items: Vec<MovieInfo> = feed.collect().await;

        assert_eq!(items, vec![expected]);
        assert_eq!(connections.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stream_headers_wait_is_bounded() {
        let (addr, connections) = silent_upstream().await;

        let client = client(addr, RetryPolicy::new(1, Duration::from_millis(5)), Duration::from_millis(100));
        let result = tokio::time::timeout(Duration::from_secs(5), client.retrieve_movie_info_stream())
            .await
            .expect("gives up instead of hanging");

        match result {
            Err(err) => {
                assert!(err.is_server());
                assert_eq!(err.status(), 502);
            }
            Ok(_) => panic!("silent upstream produced a feed"),
        }
        assert_eq!(connections.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unreadable_error_body_is_still_a_server_error() {
        let (addr, connections) = truncated_error_upstream().await;

        let client = client(addr, RetryPolicy::new(3, Duration::from_millis(5)), Duration::from_secs(2));
        let err = client
            .retrieve_movie_info("abc")
            .await
            .expect_err("500 is a failure");

        assert_eq!(err, UpstreamError::server(500, ""));
        assert_eq!(connections.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_rejects_unusable_base_url() {
        let result = MovieInfoRestClient::new(
            reqwest::Client::new(),
            "mailto:movies@example.com",
            RetryPolicy::default(),
            Duration::from_secs(1),
        );
        assert!(result.is_err());
    }
}
