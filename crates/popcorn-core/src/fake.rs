//! Scripted [`MovieSource`] for exercising the fetchers without a network.

use async_trait::async_trait;
use parking_lot::Mutex;
use popcorn_models::{MovieDetails, MovieSummary};
use popcorn_sources::{MovieSource, SourceError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Movies(Vec<MovieSummary>),
    Details(MovieDetails),
    Status(u16),
    NotFound,
}

impl Reply {
    fn into_movies(self, lookup: &str) -> Result<Vec<MovieSummary>, SourceError> {
        match self {
            Reply::Movies(movies) => Ok(movies),
            other => Err(other.into_error(lookup)),
        }
    }

    fn into_details(self, lookup: &str) -> Result<MovieDetails, SourceError> {
        match self {
            Reply::Details(details) => Ok(details),
            other => Err(other.into_error(lookup)),
        }
    }

    fn into_error(self, lookup: &str) -> SourceError {
        match self {
            Reply::Status(status) => SourceError::Status { status, body: String::new() },
            Reply::NotFound => SourceError::NotFound {
                lookup: lookup.to_string(),
                reason: "Movie not found!".to_string(),
            },
            _ => SourceError::Decode { reason: "reply does not fit this call".to_string() },
        }
    }
}

/// Records the lookup if the request future is dropped before answering
struct InFlight {
    key: String,
    dropped: Arc<Mutex<Vec<String>>>,
    answered: bool,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.answered {
            self.dropped.lock().push(self.key.clone());
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeSource {
    replies: Mutex<HashMap<String, Reply>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    calls: Mutex<Vec<String>>,
    dropped: Arc<Mutex<Vec<String>>>,
}

impl FakeSource {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn reply_search(&self, query: &str, reply: Reply) {
        self.replies.lock().insert(format!("s:{}", query), reply);
    }

    pub(crate) fn reply_details(&self, imdb_id: &str, reply: Reply) {
        self.replies.lock().insert(format!("i:{}", imdb_id), reply);
    }

    /// The search for `query` hangs until the returned sender fires
    pub(crate) fn gate_search(&self, query: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(format!("s:{}", query), rx);
        tx
    }

    pub(crate) fn gate_details(&self, imdb_id: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(format!("i:{}", imdb_id), rx);
        tx
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub(crate) fn dropped(&self) -> Vec<String> {
        self.dropped.lock().clone()
    }

    /// Polls until `key` shows up as dropped, failing after a few seconds
    pub(crate) async fn wait_dropped(&self, key: &str) {
        let wait = async {
            while !self.dropped().iter().any(|k| k == key) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };
        tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .unwrap_or_else(|_| panic!("request {} was never dropped", key));
    }

    async fn answer(&self, key: String) -> Reply {
        self.calls.lock().push(key.clone());
        let mut in_flight = InFlight {
            key: key.clone(),
            dropped: Arc::clone(&self.dropped),
            answered: false,
        };

        let gate = self.gates.lock().remove(&key);
        let reply = match gate {
            Some(gate) => gate.await.ok(),
            None => Some(self.canned(&key)),
        };
        // A gate whose sender was dropped never answers
        let reply = match reply {
            Some(reply) => reply,
            None => futures::future::pending().await,
        };
        in_flight.answered = true;
        reply
    }

    fn canned(&self, key: &str) -> Reply {
        self.replies.lock().get(key).cloned().unwrap_or(Reply::NotFound)
    }
}

#[async_trait]
impl MovieSource for FakeSource {
    fn source_name(&self) -> &str {
        "fake"
    }

    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>, SourceError> {
        self.answer(format!("s:{}", query)).await.into_movies(query)
    }

    async fn movie_details(&self, imdb_id: &str) -> Result<MovieDetails, SourceError> {
        self.answer(format!("i:{}", imdb_id)).await.into_details(imdb_id)
    }
}

pub(crate) fn summary(imdb_id: &str, title: &str, year: &str) -> MovieSummary {
    MovieSummary {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: year.to_string(),
        poster: "x".to_string(),
    }
}

pub(crate) fn details(imdb_id: &str, title: &str, runtime: &str, rating: &str) -> MovieDetails {
    MovieDetails {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: Some("2010".to_string()),
        poster: Some("p".to_string()),
        runtime: Some(runtime.to_string()),
        imdb_rating: Some(rating.to_string()),
        ..MovieDetails::default()
    }
}
