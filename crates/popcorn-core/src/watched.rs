use popcorn_models::{WatchedMovie, MAX_USER_RATING, MIN_USER_RATING};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WatchedListError {
    #[error("'{title}' ({imdb_id}) is already in the watched list")]
    Duplicate { imdb_id: String, title: String },
    #[error("Rating {rating} is outside {min}..={max}")]
    InvalidRating { rating: u8, min: u8, max: u8 },
}

/// Arithmetic mean; 0 for an empty slice so summaries never show NaN
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Averages shown above the watched list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_imdb_rating: f64,
    pub avg_user_rating: f64,
    pub avg_runtime: f64,
}

/// Movies the user has watched, unique by IMDb id, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchedList {
    movies: Vec<WatchedMovie>,
}

impl WatchedList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from stored records under the same rules as [`WatchedList::add`]:
    /// the first of any repeated id is kept and out-of-range ratings are dropped.
    /// Returns the list and how many records were discarded.
    pub fn from_records(records: Vec<WatchedMovie>) -> (Self, usize) {
        let mut list = Self::new();
        let mut discarded = 0;
        for movie in records {
            if list.add(movie).is_err() {
                discarded += 1;
            }
        }
        (list, discarded)
    }

    pub fn add(&mut self, movie: WatchedMovie) -> Result<(), WatchedListError> {
        if !(MIN_USER_RATING..=MAX_USER_RATING).contains(&movie.user_rating) {
            return Err(WatchedListError::InvalidRating {
                rating: movie.user_rating,
                min: MIN_USER_RATING,
                max: MAX_USER_RATING,
            });
        }
        if self.contains(&movie.imdb_id) {
            return Err(WatchedListError::Duplicate {
                imdb_id: movie.imdb_id,
                title: movie.title,
            });
        }
        self.movies.push(movie);
        Ok(())
    }

    /// Removes every entry with `imdb_id`; returns how many went
    pub fn remove(&mut self, imdb_id: &str) -> usize {
        let before = self.movies.len();
        self.movies.retain(|m| m.imdb_id != imdb_id);
        before - self.movies.len()
    }

    pub fn contains(&self, imdb_id: &str) -> bool {
        self.movies.iter().any(|m| m.imdb_id == imdb_id)
    }

    pub fn get(&self, imdb_id: &str) -> Option<&WatchedMovie> {
        self.movies.iter().find(|m| m.imdb_id == imdb_id)
    }

    pub fn user_rating_for(&self, imdb_id: &str) -> Option<u8> {
        self.get(imdb_id).map(|m| m.user_rating)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WatchedMovie> {
        self.movies.iter()
    }

    pub fn as_slice(&self) -> &[WatchedMovie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Missing IMDb ratings and runtimes are left out of their average
    pub fn summary(&self) -> WatchedSummary {
        let imdb: Vec<f64> = self.movies.iter().filter_map(|m| m.imdb_rating).collect();
        let user: Vec<f64> = self.movies.iter().map(|m| f64::from(m.user_rating)).collect();
        let runtime: Vec<f64> = self.movies.iter().filter_map(|m| m.runtime).map(f64::from).collect();

        WatchedSummary {
            count: self.movies.len(),
            avg_imdb_rating: mean(&imdb),
            avg_user_rating: mean(&user),
            avg_runtime: mean(&runtime),
        }
    }
}
