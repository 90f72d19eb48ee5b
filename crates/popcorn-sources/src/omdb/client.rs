use async_trait::async_trait;
use popcorn_models::{MovieDetails, MovieSummary};
use reqwest::Client;
use std::sync::Arc;

use crate::error::SourceError;
use crate::omdb::api;
use crate::traits::MovieSource;

/// HTTP client with a product user agent
pub fn create_omdb_client() -> Client {
    Client::builder()
        .user_agent(concat!("popcorn/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// OMDb catalogue. The key and base URL are injected so tests can point it
/// at a local server.
#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_client(create_omdb_client(), api_key, base_url)
    }

    pub fn with_client(client: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Arc::new(client),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

impl std::fmt::Debug for OmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OmdbClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MovieSource for OmdbClient {
    fn source_name(&self) -> &str {
        "omdb"
    }

    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>, SourceError> {
        api::search(&self.client, &self.base_url, &self.api_key, query).await
    }

    async fn movie_details(&self, imdb_id: &str) -> Result<MovieDetails, SourceError> {
        api::get_details(&self.client, &self.base_url, &self.api_key, imdb_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves one canned response and reports the request line it received
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let request = String::from_utf8_lossy(&request).to_string();
            let request_line = request.lines().next().unwrap_or_default().to_string();

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send(request_line);
        });

        (format!("http://{}/", addr), rx)
    }

    #[tokio::test]
    async fn test_search_success_over_http() {
        let (base_url, request) = serve_once(
            "200 OK",
            r#"{"Search":[{"Title":"Batman Begins","Year":"2005","imdbID":"tt0372784","Poster":"x"}],"totalResults":"1","Response":"True"}"#,
        )
        .await;

        let client = OmdbClient::new("secret", base_url);
        let movies = client.search_movies("batma").await.unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Batman Begins");

        let request_line = request.await.unwrap();
        assert!(request_line.starts_with("GET /?apikey=secret&s=batma "), "{}", request_line);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let (base_url, _request) = serve_once("503 Service Unavailable", r#"{"Error":"down"}"#).await;

        let client = OmdbClient::new("secret", base_url);
        let err = client.search_movies("batman").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_not_found_payload() {
        let (base_url, _request) = serve_once("200 OK", r#"{"Response":"False","Error":"Movie not found!"}"#).await;

        let client = OmdbClient::new("secret", base_url);
        let err = client.search_movies("qwertyuiop").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_details_over_http() {
        let (base_url, request) = serve_once(
            "200 OK",
            r#"{"Title":"Inception","Year":"2010","Runtime":"148 min","imdbRating":"8.8","imdbID":"tt1375666","Response":"True"}"#,
        )
        .await;

        let client = OmdbClient::new("secret", base_url);
        let details = client.movie_details("tt1375666").await.unwrap();
        assert_eq!(details.title, "Inception");
        assert_eq!(details.runtime_minutes(), Some(148));
        assert!(request.await.unwrap().contains("i=tt1375666"));
    }
}
