use popcorn_models::MovieSummary;
use popcorn_sources::MovieSource;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::latest::LatestCell;

/// Lifecycle of the search for the current query.
///
/// `Idle -> Loading -> Success | Error`; any query change re-enters `Loading`
/// (or `Idle` for short queries) and cancels the previous request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading {
        query: String,
    },
    Success {
        query: String,
        movies: Vec<MovieSummary>,
    },
    Error {
        query: String,
        error: FetchError,
    },
}

impl FetchState {
    /// Results to render; empty unless the last search succeeded
    pub fn movies(&self) -> &[MovieSummary] {
        match self {
            FetchState::Success { movies, .. } => movies,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading { .. })
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchState::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            FetchState::Idle => None,
            FetchState::Loading { query }
            | FetchState::Success { query, .. }
            | FetchState::Error { query, .. } => Some(query),
        }
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot {
            movies: self.movies().to_vec(),
            is_loading: self.is_loading(),
            error: self.error().map(FetchError::message),
        }
    }
}

/// The `{movies, isLoading, error}` triple a render layer consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnapshot {
    pub movies: Vec<MovieSummary>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Runs one search per query change, newest query wins.
///
/// Dropping the fetcher aborts any request still in flight.
pub struct SearchFetcher {
    source: Arc<dyn MovieSource>,
    min_query_length: usize,
    cell: Arc<LatestCell<FetchState>>,
}

impl SearchFetcher {
    pub fn new(source: Arc<dyn MovieSource>, min_query_length: usize) -> Self {
        Self {
            source,
            min_query_length,
            cell: LatestCell::new("search", FetchState::Idle),
        }
    }

    pub fn min_query_length(&self) -> usize {
        self.min_query_length
    }

    /// Reacts to a new query. Short queries clear the results without any
    /// network access; others start a request on the current tokio runtime.
    pub fn set_query(&self, query: &str) {
        let query = query.trim();
        if query.chars().count() < self.min_query_length {
            debug!(query = query, min = self.min_query_length, "Query below threshold, clearing results");
            self.cell.replace(FetchState::Idle);
            return;
        }

        let source = Arc::clone(&self.source);
        let query = query.to_string();
        let pending = FetchState::Loading { query: query.clone() };

        let generation = self.cell.run(pending, async move {
            match source.search_movies(&query).await {
                Ok(movies) => {
                    debug!(query = %query, results = movies.len(), "Search succeeded");
                    FetchState::Success { query, movies }
                }
                Err(err) => {
                    let error = FetchError::from(&err);
                    warn!(query = %query, kind = error.kind(), error = %err, "Search failed");
                    FetchState::Error { query, error }
                }
            }
        });
        debug!(generation, source = self.source.source_name(), "Search started");
    }

    pub fn state(&self) -> FetchState {
        self.cell.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.cell.subscribe()
    }

    /// Waits until the current search is no longer loading.
    ///
    /// A search cancelled through [`SearchFetcher::cancel`] never settles, so
    /// do not await this after cancelling.
    pub async fn settled(&self) -> FetchState {
        let mut rx = self.cell.subscribe();
        let state = match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => self.cell.current(),
        };
        state
    }

    /// Aborts the in-flight request without touching the published state
    pub fn cancel(&self) {
        self.cell.cancel();
    }
}

impl Drop for SearchFetcher {
    fn drop(&mut self) {
        self.cell.cancel();
    }
}
