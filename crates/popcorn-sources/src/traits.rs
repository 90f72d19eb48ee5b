use async_trait::async_trait;
use popcorn_models::{MovieDetails, MovieSummary};

use crate::error::SourceError;

/// A remote catalogue that can be searched by free text and queried by id.
///
/// Implementations must be cancel-safe: the caller may drop either future at
/// any await point when a newer request supersedes it.
#[async_trait]
pub trait MovieSource: Send + Sync {
    fn source_name(&self) -> &str;

    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>, SourceError>;

    async fn movie_details(&self, imdb_id: &str) -> Result<MovieDetails, SourceError>;
}
