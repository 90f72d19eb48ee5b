use popcorn_models::MovieDetails;
use popcorn_sources::MovieSource;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::latest::LatestCell;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DetailState {
    #[default]
    Idle,
    Loading {
        imdb_id: String,
    },
    Loaded(MovieDetails),
    Failed {
        imdb_id: String,
        error: FetchError,
    },
}

impl DetailState {
    pub fn is_loading(&self) -> bool {
        matches!(self, DetailState::Loading { .. })
    }

    pub fn details(&self) -> Option<&MovieDetails> {
        match self {
            DetailState::Loaded(details) => Some(details),
            _ => None,
        }
    }

    pub fn imdb_id(&self) -> Option<&str> {
        match self {
            DetailState::Idle => None,
            DetailState::Loading { imdb_id } | DetailState::Failed { imdb_id, .. } => Some(imdb_id),
            DetailState::Loaded(details) => Some(&details.imdb_id),
        }
    }
}

/// Loads the full record for the selected movie. A newer selection aborts
/// the older fetch.
pub struct DetailFetcher {
    source: Arc<dyn MovieSource>,
    cell: Arc<LatestCell<DetailState>>,
}

impl DetailFetcher {
    pub fn new(source: Arc<dyn MovieSource>) -> Self {
        Self {
            source,
            cell: LatestCell::new("details", DetailState::Idle),
        }
    }

    pub fn load(&self, imdb_id: &str) {
        let source = Arc::clone(&self.source);
        let imdb_id = imdb_id.to_string();
        let pending = DetailState::Loading { imdb_id: imdb_id.clone() };

        self.cell.run(pending, async move {
            match source.movie_details(&imdb_id).await {
                Ok(details) => {
                    debug!(imdb_id = %imdb_id, title = %details.title, "Details loaded");
                    DetailState::Loaded(details)
                }
                Err(err) => {
                    let error = FetchError::from(&err);
                    warn!(imdb_id = %imdb_id, error = %err, "Detail fetch failed");
                    DetailState::Failed { imdb_id, error }
                }
            }
        });
    }

    /// Closes the detail view, abandoning any fetch in flight
    pub fn clear(&self) {
        self.cell.replace(DetailState::Idle);
    }

    pub fn state(&self) -> DetailState {
        self.cell.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.cell.subscribe()
    }

    pub async fn settled(&self) -> DetailState {
        let mut rx = self.cell.subscribe();
        let state = match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => self.cell.current(),
        };
        state
    }
}

impl Drop for DetailFetcher {
    fn drop(&mut self) {
        self.cell.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{details, FakeSource, Reply};

    #[tokio::test]
    async fn test_load_details() {
        let source = FakeSource::new();
        source.reply_details("tt1375666", Reply::Details(details("tt1375666", "Inception", "148 min", "8.8")));
        let fetcher = DetailFetcher::new(source.clone());

        fetcher.load("tt1375666");
        assert!(fetcher.state().is_loading());
        assert_eq!(fetcher.state().imdb_id(), Some("tt1375666"));

        let state = fetcher.settled().await;
        let loaded = state.details().unwrap();
        assert_eq!(loaded.title, "Inception");
        assert_eq!(loaded.runtime_minutes(), Some(148));
    }

    #[tokio::test]
    async fn test_failed_details_are_reported() {
        let source = FakeSource::new();
        source.reply_details("tt0000000", Reply::Status(502));
        let fetcher = DetailFetcher::new(source.clone());

        fetcher.load("tt0000000");
        match fetcher.settled().await {
            DetailState::Failed { imdb_id, error } => {
                assert_eq!(imdb_id, "tt0000000");
                assert_eq!(error, FetchError::Transport);
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_newer_selection_wins() {
        let source = FakeSource::new();
        let _slow = source.gate_details("tt1375666");
        source.reply_details("tt0133093", Reply::Details(details("tt0133093", "The Matrix", "136 min", "8.7")));
        let fetcher = DetailFetcher::new(source.clone());

        fetcher.load("tt1375666");
        tokio::task::yield_now().await;
        fetcher.load("tt0133093");

        let state = fetcher.settled().await;
        assert_eq!(state.imdb_id(), Some("tt0133093"));
        source.wait_dropped("i:tt1375666").await;
    }

    #[tokio::test]
    async fn test_clear_returns_to_idle() {
        let source = FakeSource::new();
        let _slow = source.gate_details("tt1375666");
        let fetcher = DetailFetcher::new(source.clone());

        fetcher.load("tt1375666");
        tokio::task::yield_now().await;
        fetcher.clear();

        assert_eq!(fetcher.state(), DetailState::Idle);
        source.wait_dropped("i:tt1375666").await;
    }
}
