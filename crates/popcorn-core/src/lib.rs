pub mod detail;
pub mod error;
pub mod search;
pub mod session;
pub mod store;
pub mod watched;

mod latest;

#[cfg(test)]
mod fake;

pub use detail::{DetailFetcher, DetailState};
pub use error::FetchError;
pub use search::{FetchState, SearchFetcher, SearchSnapshot};
pub use session::{MovieSession, SessionError, WatchedStore};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError, WatchedRepository, WATCHED_KEY};
pub use watched::{mean, WatchedList, WatchedListError, WatchedSummary};
