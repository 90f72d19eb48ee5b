use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::movie::MovieDetails;

/// Lowest star a user can give
pub const MIN_USER_RATING: u8 = 1;
/// Highest star a user can give
pub const MAX_USER_RATING: u8 = 10;

/// A movie the user has watched and rated.
///
/// Serialized with the same field names the watched list has always been
/// stored under, so existing `watched.json` files keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedMovie {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub poster: String,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<f64>, // null when the API has no rating
    #[serde(default)]
    pub runtime: Option<u32>, // minutes
    #[serde(rename = "userRating")]
    pub user_rating: u8,
    #[serde(rename = "addedAt", default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

impl WatchedMovie {
    pub fn from_details(details: &MovieDetails, user_rating: u8) -> Self {
        Self {
            imdb_id: details.imdb_id.clone(),
            title: details.title.clone(),
            year: details.year.clone().unwrap_or_default(),
            poster: details.poster.clone().unwrap_or_default(),
            imdb_rating: details.imdb_rating_value(),
            runtime: details.runtime_minutes(),
            user_rating,
            added_at: Some(Utc::now()),
        }
    }
}
