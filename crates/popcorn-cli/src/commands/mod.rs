pub mod config;
pub mod interactive;
pub mod prompts;
pub mod render;
pub mod search;
pub mod show;
pub mod spinner;
pub mod watched;

use color_eyre::Result;
use popcorn_config::{Config, CredentialStore, PathManager};
use popcorn_core::{JsonFileStore, MovieSession, WatchedRepository, WatchedStore};
use popcorn_sources::{MovieSource, OmdbClient};
use std::sync::Arc;

/// Paths, configuration and credentials loaded once per command
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
    pub credentials: CredentialStore,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| color_eyre::eyre::eyre!("Invalid config in {}: {}", config_file.display(), e))?;

        let mut credentials = CredentialStore::new(paths.credentials_file());
        credentials
            .load()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;

        Ok(Self {
            paths,
            config,
            credentials,
        })
    }

    /// OMDb client built from the resolved API key
    pub fn source(&self) -> Result<Arc<dyn MovieSource>> {
        let api_key = self.config.resolve_api_key(&self.credentials).ok_or_else(|| {
            color_eyre::eyre::eyre!(
                "No OMDb API key configured. Run 'popcorn config set-key' or set {}",
                popcorn_config::OMDB_API_KEY_ENV
            )
        })?;
        tracing::debug!(base_url = %self.config.omdb.base_url, "Using OMDb source");
        Ok(Arc::new(OmdbClient::new(api_key, self.config.omdb.base_url.clone())))
    }

    /// Watched list storage under the data directory
    fn repository(&self) -> WatchedRepository {
        WatchedRepository::new(Box::new(JsonFileStore::new(self.paths.data_dir())))
    }

    /// The watched list alone, for commands that never reach OMDb
    pub fn watched_store(&self) -> Result<WatchedStore> {
        WatchedStore::open(self.repository())
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load watched list: {}", e))
    }

    pub fn session(&self) -> Result<MovieSession> {
        let source = self.source()?;
        MovieSession::new(source, &self.config.search, self.repository())
            .map_err(|e| color_eyre::eyre::eyre!("Failed to open watched list: {}", e))
    }
}
