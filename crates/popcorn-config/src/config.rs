use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::credentials::CredentialStore;

pub const DEFAULT_OMDB_BASE_URL: &str = "http://www.omdbapi.com/";
pub const DEFAULT_MIN_QUERY_LENGTH: usize = 5;
/// Environment variable that takes precedence over stored keys
pub const OMDB_API_KEY_ENV: &str = "OMDB_API_KEY";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub search: SearchOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OmdbConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Prefer `credentials.toml`; this is read last
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchOptions {
    /// Trimmed queries shorter than this never reach the API
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Filter directive used when neither `-v` nor `RUST_LOG` is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_OMDB_BASE_URL.to_string()
}

fn default_min_query_length() -> usize {
    DEFAULT_MIN_QUERY_LENGTH
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
        }
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            min_query_length: default_min_query_length(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Missing file means defaults; a present but malformed file is an error
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let base_url = self.omdb.base_url.trim();
        if base_url.is_empty() {
            return Err(anyhow::anyhow!("omdb.base_url cannot be empty"));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("omdb.base_url must be an http(s) URL: {}", base_url));
        }
        if self.search.min_query_length == 0 {
            return Err(anyhow::anyhow!("search.min_query_length must be at least 1"));
        }
        if let Some(key) = &self.omdb.api_key {
            if key.trim().is_empty() || key == "YOUR_API_KEY" {
                return Err(anyhow::anyhow!("omdb.api_key is set but not configured"));
            }
        }
        Ok(())
    }

    /// API key lookup order: environment, credential store, then config file
    pub fn resolve_api_key(&self, credentials: &CredentialStore) -> Option<String> {
        let from_env = std::env::var(OMDB_API_KEY_ENV).ok();
        Self::pick_api_key(from_env, credentials, self.omdb.api_key.as_deref())
    }

    fn pick_api_key(
        from_env: Option<String>,
        credentials: &CredentialStore,
        from_config: Option<&str>,
    ) -> Option<String> {
        from_env
            .filter(|k| !k.trim().is_empty())
            .or_else(|| credentials.get_omdb_api_key().cloned())
            .or_else(|| {
                from_config
                    .filter(|k| !k.trim().is_empty() && *k != "YOUR_API_KEY")
                    .map(str::to_string)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            omdb: OmdbConfig {
                base_url: "http://localhost:8080/".to_string(),
                api_key: Some("test_key".to_string()),
            },
            search: SearchOptions { min_query_length: 3 },
            logging: LoggingConfig::default(),
        };

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.omdb.base_url, "http://localhost:8080/");
        assert_eq!(loaded.omdb.api_key.as_deref(), Some("test_key"));
        assert_eq!(loaded.search.min_query_length, 3);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let file = NamedTempFile::new().unwrap();
        let loaded = Config::load_from_file(&file.path().to_path_buf()).unwrap();
        assert_eq!(loaded.omdb.base_url, DEFAULT_OMDB_BASE_URL);
        assert_eq!(loaded.search.min_query_length, DEFAULT_MIN_QUERY_LENGTH);
        assert!(loaded.omdb.api_key.is_none());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.search.min_query_length, 5);
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.omdb.api_key = Some("YOUR_API_KEY".to_string());
        assert!(config.validate().is_err());
        config.omdb.api_key = None;

        config.search.min_query_length = 0;
        assert!(config.validate().is_err());
        config.search.min_query_length = 5;

        config.omdb.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_precedence() {
        let mut creds = CredentialStore::new(PathBuf::from("/tmp/popcorn-test-creds.toml"));

        assert_eq!(Config::pick_api_key(None, &creds, None), None);
        assert_eq!(
            Config::pick_api_key(None, &creds, Some("from_config")).as_deref(),
            Some("from_config")
        );
        assert_eq!(Config::pick_api_key(None, &creds, Some("YOUR_API_KEY")), None);

        creds.set_omdb_api_key("from_creds".to_string());
        assert_eq!(
            Config::pick_api_key(None, &creds, Some("from_config")).as_deref(),
            Some("from_creds")
        );
        assert_eq!(
            Config::pick_api_key(Some("from_env".to_string()), &creds, Some("from_config")).as_deref(),
            Some("from_env")
        );
        assert_eq!(
            Config::pick_api_key(Some(" ".to_string()), &creds, None).as_deref(),
            Some("from_creds")
        );
    }
}
