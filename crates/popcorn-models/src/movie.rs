use serde::{Deserialize, Serialize};

/// One entry of a search result list.
///
/// Field names on the wire follow the OMDb search payload so a result list
/// can be decoded and re-serialized without a mapping layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieSummary {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
}

/// Full record for a single title, shown in the detail view.
///
/// Values the API reports as "N/A" are stored as `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MovieDetails {
    pub imdb_id: String,
    pub title: String,
    pub year: Option<String>,
    pub poster: Option<String>,
    pub runtime: Option<String>, // e.g. "148 min"
    pub imdb_rating: Option<String>,
    pub plot: Option<String>,
    pub released: Option<String>,
    pub actors: Option<String>,
    pub director: Option<String>,
    pub genre: Option<String>,
}

impl MovieDetails {
    /// Leading integer of the runtime string ("148 min" -> 148)
    pub fn runtime_minutes(&self) -> Option<u32> {
        self.runtime
            .as_deref()
            .and_then(|r| r.split_whitespace().next())
            .and_then(|n| n.parse().ok())
    }

    pub fn imdb_rating_value(&self) -> Option<f64> {
        self.imdb_rating
            .as_deref()
            .and_then(|r| r.trim().parse::<f64>().ok())
            .filter(|r| r.is_finite())
    }

    /// Heading used while the detail view is open
    pub fn heading(&self) -> String {
        format!("Movie | {}", self.title)
    }
}
