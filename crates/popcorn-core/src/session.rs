use popcorn_config::SearchOptions;
use popcorn_models::WatchedMovie;
use popcorn_sources::MovieSource;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::detail::{DetailFetcher, DetailState};
use crate::search::{FetchState, SearchFetcher};
use crate::store::{StoreError, WatchedRepository};
use crate::watched::{WatchedList, WatchedListError, WatchedSummary};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No movie is selected")]
    NothingSelected,
    #[error("Details for {0} are not loaded yet")]
    DetailsNotReady(String),
    #[error(transparent)]
    Watched(#[from] WatchedListError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The watched list and the storage behind it. Every mutation is written
/// first; the in-memory list only changes once the write succeeded.
pub struct WatchedStore {
    list: WatchedList,
    repository: WatchedRepository,
}

impl WatchedStore {
    /// Reads the stored list once
    pub fn open(repository: WatchedRepository) -> Result<Self, StoreError> {
        let list = repository.load()?;
        Ok(Self { list, repository })
    }

    pub fn list(&self) -> &WatchedList {
        &self.list
    }

    pub fn add(&mut self, movie: WatchedMovie) -> Result<(), SessionError> {
        let mut next = self.list.clone();
        let title = movie.title.clone();
        next.add(movie)?;
        self.repository.save(&next)?;
        self.list = next;
        info!("Added '{}' to the watched list ({} movies)", title, self.list.len());
        Ok(())
    }

    /// Returns how many entries went; an absent id writes nothing
    pub fn remove(&mut self, imdb_id: &str) -> Result<usize, SessionError> {
        let mut next = self.list.clone();
        let removed = next.remove(imdb_id);
        if removed == 0 {
            return Ok(0);
        }
        self.repository.save(&next)?;
        self.list = next;
        info!("Removed {} from the watched list ({} movies)", imdb_id, self.list.len());
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<usize, SessionError> {
        let count = self.list.len();
        self.repository.clear()?;
        self.list = WatchedList::new();
        info!("Cleared the watched list ({} movies)", count);
        Ok(count)
    }
}

/// Application state behind one user: the query and its search, the open
/// detail view, and the persisted watched list.
pub struct MovieSession {
    query: String,
    search: SearchFetcher,
    selected: Option<String>,
    details: DetailFetcher,
    watched: WatchedStore,
}

impl MovieSession {
    /// Reads the watched list from `repository` once
    pub fn new(
        source: Arc<dyn MovieSource>,
        options: &SearchOptions,
        repository: WatchedRepository,
    ) -> Result<Self, SessionError> {
        let watched = WatchedStore::open(repository)?;
        Ok(Self {
            query: String::new(),
            search: SearchFetcher::new(Arc::clone(&source), options.min_query_length),
            selected: None,
            details: DetailFetcher::new(source),
            watched,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Starting a real search also closes the detail view.
    pub fn set_query(&mut self, query: &str) {
        if query == self.query {
            return;
        }
        self.query = query.to_string();
        if query.trim().chars().count() >= self.search.min_query_length() {
            self.close_movie();
        }
        self.search.set_query(query);
    }

    pub fn search(&self) -> &SearchFetcher {
        &self.search
    }

    pub fn search_state(&self) -> FetchState {
        self.search.state()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Selecting the open movie again closes it
    pub fn select_movie(&mut self, imdb_id: &str) {
        if self.selected.as_deref() == Some(imdb_id) {
            self.close_movie();
            return;
        }
        debug!(imdb_id = imdb_id, "Opening movie");
        self.selected = Some(imdb_id.to_string());
        self.details.load(imdb_id);
    }

    pub fn close_movie(&mut self) {
        if self.selected.take().is_some() {
            self.details.clear();
        }
    }

    pub fn details(&self) -> &DetailFetcher {
        &self.details
    }

    pub fn watched(&self) -> &WatchedList {
        self.watched.list()
    }

    pub fn summary(&self) -> WatchedSummary {
        self.watched.list().summary()
    }

    /// The rating already given to the open movie, if it was watched before
    pub fn selected_user_rating(&self) -> Option<u8> {
        self.selected
            .as_deref()
            .and_then(|id| self.watched.list().user_rating_for(id))
    }

    /// Rates the open movie, adds it to the watched list and closes it
    pub fn add_selected_to_watched(&mut self, user_rating: u8) -> Result<WatchedMovie, SessionError> {
        let imdb_id = self.selected.clone().ok_or(SessionError::NothingSelected)?;
        let movie = match self.details.state() {
            DetailState::Loaded(details) if details.imdb_id == imdb_id => {
                WatchedMovie::from_details(&details, user_rating)
            }
            _ => return Err(SessionError::DetailsNotReady(imdb_id)),
        };

        self.add_watched(movie.clone())?;
        self.close_movie();
        Ok(movie)
    }

    pub fn add_watched(&mut self, movie: WatchedMovie) -> Result<(), SessionError> {
        self.watched.add(movie)
    }

    pub fn remove_watched(&mut self, imdb_id: &str) -> Result<usize, SessionError> {
        self.watched.remove(imdb_id)
    }

    pub fn clear_watched(&mut self) -> Result<usize, SessionError> {
        self.watched.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{details, summary, FakeSource, Reply};
    use crate::store::{KeyValueStore, MemoryStore, WATCHED_KEY};

    fn session(source: &Arc<FakeSource>, store: &Arc<MemoryStore>) -> MovieSession {
        let repository = WatchedRepository::new(Box::new(Arc::clone(store)));
        MovieSession::new(source.clone(), &SearchOptions::default(), repository).unwrap()
    }

    #[tokio::test]
    async fn test_search_through_session() {
        let source = FakeSource::new();
        source.reply_search("batma", Reply::Movies(vec![summary("tt0372784", "Batman Begins", "2005")]));
        let store = Arc::new(MemoryStore::new());
        let mut session = session(&source, &store);

        session.set_query("bat");
        assert_eq!(session.search_state(), FetchState::Idle);
        session.set_query("batma");
        let state = session.search().settled().await;
        assert_eq!(state.movies().len(), 1);
        assert_eq!(session.query(), "batma");
    }

    #[tokio::test]
    async fn test_select_toggles() {
        let source = FakeSource::new();
        source.reply_details("tt1375666", Reply::Details(details("tt1375666", "Inception", "148 min", "8.8")));
        let store = Arc::new(MemoryStore::new());
        let mut session = session(&source, &store);

        session.select_movie("tt1375666");
        assert_eq!(session.selected(), Some("tt1375666"));
        session.select_movie("tt1375666");
        assert_eq!(session.selected(), None);
        assert_eq!(session.details().state(), DetailState::Idle);
    }

    #[tokio::test]
    async fn test_new_search_closes_detail_view() {
        let source = FakeSource::new();
        source.reply_details("tt1375666", Reply::Details(details("tt1375666", "Inception", "148 min", "8.8")));
        source.reply_search("matrix", Reply::Movies(Vec::new()));
        let store = Arc::new(MemoryStore::new());
        let mut session = session(&source, &store);

        session.select_movie("tt1375666");
        session.set_query("mat");
        assert_eq!(session.selected(), Some("tt1375666"));
        session.set_query("matrix");
        assert_eq!(session.selected(), None);
    }

    #[tokio::test]
    async fn test_rate_and_add_selected() {
        let source = FakeSource::new();
        source.reply_details("tt1375666", Reply::Details(details("tt1375666", "Inception", "148 min", "8.8")));
        let store = Arc::new(MemoryStore::new());
        let mut session = session(&source, &store);

        assert!(matches!(
            session.add_selected_to_watched(9),
            Err(SessionError::NothingSelected)
        ));

        session.select_movie("tt1375666");
        session.details().settled().await;
        let added = session.add_selected_to_watched(9).unwrap();

        assert_eq!(added.runtime, Some(148));
        assert_eq!(added.imdb_rating, Some(8.8));
        assert_eq!(session.selected(), None);
        assert_eq!(session.watched().len(), 1);

        let stored = store.get(WATCHED_KEY).unwrap().unwrap();
        assert!(stored.contains("tt1375666"));

        session.select_movie("tt1375666");
        assert_eq!(session.selected_user_rating(), Some(9));
        session.details().settled().await;
        assert!(matches!(
            session.add_selected_to_watched(4),
            Err(SessionError::Watched(WatchedListError::Duplicate { .. }))
        ));
        assert_eq!(session.watched().len(), 1);
    }

    #[tokio::test]
    async fn test_add_before_details_load() {
        let source = FakeSource::new();
        let _slow = source.gate_details("tt1375666");
        let store = Arc::new(MemoryStore::new());
        let mut session = session(&source, &store);

        session.select_movie("tt1375666");
        assert!(matches!(
            session.add_selected_to_watched(8),
            Err(SessionError::DetailsNotReady(_))
        ));
        assert!(session.watched().is_empty());
    }

    #[tokio::test]
    async fn test_watched_list_survives_restart() {
        let source = FakeSource::new();
        let store = Arc::new(MemoryStore::new());
        {
            let mut session = session(&source, &store);
            let movie = WatchedMovie::from_details(&details("tt0088763", "Back to the Future", "116 min", "8.5"), 9);
            session.add_watched(movie).unwrap();
        }

        let mut session = session(&source, &store);
        assert_eq!(session.watched().len(), 1);
        assert_eq!(session.summary().avg_runtime, 116.0);

        assert_eq!(session.remove_watched("tt9999999").unwrap(), 0);
        assert_eq!(session.remove_watched("tt0088763").unwrap(), 1);
        assert_eq!(store.get(WATCHED_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_clear_watched_persists() {
        let source = FakeSource::new();
        let store = Arc::new(MemoryStore::new());
        {
            let mut session = session(&source, &store);
            for (id, title) in [("tt0088763", "Back to the Future"), ("tt0133093", "The Matrix")] {
                let movie = WatchedMovie::from_details(&details(id, title, "120 min", "8.0"), 7);
                session.add_watched(movie).unwrap();
            }
            assert_eq!(session.clear_watched().unwrap(), 2);
            assert!(session.watched().is_empty());
        }

        assert_eq!(store.get(WATCHED_KEY).unwrap(), None);
        let session = session(&source, &store);
        assert!(session.watched().is_empty());
    }

    #[test]
    fn test_watched_store_without_a_source() {
        let store = Arc::new(MemoryStore::new());
        let repository = || WatchedRepository::new(Box::new(Arc::clone(&store)));

        let mut watched = WatchedStore::open(repository()).unwrap();
        let movie = WatchedMovie::from_details(&details("tt0133093", "The Matrix", "136 min", "8.7"), 10);
        watched.add(movie).unwrap();
        assert_eq!(watched.remove("tt0000001").unwrap(), 0);

        let mut reopened = WatchedStore::open(repository()).unwrap();
        assert_eq!(reopened.list().len(), 1);
        assert_eq!(reopened.remove("tt0133093").unwrap(), 1);
        assert_eq!(reopened.clear().unwrap(), 0);
        assert!(WatchedStore::open(repository()).unwrap().list().is_empty());
    }
}
