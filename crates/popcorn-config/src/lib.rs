pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{Config, LoggingConfig, OmdbConfig, SearchOptions, DEFAULT_OMDB_BASE_URL, DEFAULT_MIN_QUERY_LENGTH, OMDB_API_KEY_ENV};
pub use credentials::{CredentialStore, mask_secret};
pub use paths::{PathManager, base_path_override};
