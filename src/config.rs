use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::movies::PageStrategy;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub appdir: Option<String>,
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OmdbConfig {
    #[serde(default)]
    pub apikey: Option<String>,
    #[serde(default = "default_baseurl")]
    pub baseurl: String,
    /// Page selection for `/api/movies/generate`.
    #[serde(default = "default_pages")]
    pub pages: PageStrategy,
    /// Page selection for the batch fetched at startup.
    #[serde(default)]
    pub startup_pages: PageStrategy,
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
    #[serde(default)]
    pub max_terms: Option<usize>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            apikey: None,
            baseurl: default_baseurl(),
            pages: default_pages(),
            startup_pages: PageStrategy::default(),
            pause_ms: default_pause_ms(),
            max_terms: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OmdbConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub sqlite: Option<SqliteConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SqliteConfig {
    pub filename: String,
}

fn default_port() -> String {
    "3001".to_string()
}

fn default_baseurl() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_pages() -> PageStrategy {
    PageStrategy::Random
}

fn default_pause_ms() -> u64 {
    100
}

fn default_timeout_secs() -> u64 {
    120
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        Self::from_yaml(&content).map_err(|e| ConfigError::ParseError(path.to_string(), e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Loads `path` if it exists, otherwise starts from defaults. Environment
    /// overrides are applied in both cases.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// `OMDBKEY` wins over `omdb.apikey`, `PORT` over `listen.port`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OMDBKEY").filter(|k| !k.trim().is_empty()) {
            self.omdb.apikey = Some(key.trim().to_string());
        }
        if let Some(port) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
            self.listen.port = port.trim().to_string();
        }
    }

    /// Blank keys count as absent.
    pub fn api_key(&self) -> Option<String> {
        self.omdb
            .apikey
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
    }

    pub fn get_database_url(&self) -> String {
        match self.database.sqlite {
            Some(ref sqlite) if sqlite.filename.starts_with("sqlite:") => sqlite.filename.clone(),
            Some(ref sqlite) => format!("sqlite://{}", sqlite.filename),
            None => "sqlite://snurrio.db".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.listen.port, "3001");
        assert_eq!(config.omdb.baseurl, "https://www.omdbapi.com/");
        assert_eq!(config.omdb.pages, PageStrategy::Random);
        assert_eq!(config.omdb.startup_pages, PageStrategy::First);
        assert_eq!(config.omdb.pause(), Duration::from_millis(100));
        assert_eq!(config.api_key(), None);
        assert_eq!(config.get_database_url(), "sqlite://snurrio.db");
    }

    #[test]
    fn test_parse_full() {
        let yaml = r#"
listen:
  address: 127.0.0.1
  port: "8080"
appdir: ./web
omdb:
  apikey: abc123
  pages: first
  pause_ms: 0
  max_terms: 5
database:
  sqlite:
    filename: /var/lib/snurrio/favorites.db
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.listen.address.as_deref(), Some("127.0.0.1"));
        assert_eq!(config.listen.port, "8080");
        assert_eq!(config.appdir.as_deref(), Some("./web"));
        assert_eq!(config.api_key().as_deref(), Some("abc123"));
        assert_eq!(config.omdb.pages, PageStrategy::First);
        assert_eq!(config.omdb.max_terms, Some(5));
        assert_eq!(
            config.get_database_url(),
            "sqlite:///var/lib/snurrio/favorites.db"
        );
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::from_yaml("omdb:\n  apikey: fromfile\n").unwrap();
        config.apply_env(|key| match key {
            "OMDBKEY" => Some("fromenv".to_string()),
            "PORT" => Some("9000".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key().as_deref(), Some("fromenv"));
        assert_eq!(config.listen.port, "9000");
    }

    #[test]
    fn test_blank_key_is_absent() {
        let mut config = Config::from_yaml("omdb:\n  apikey: \"  \"\n").unwrap();
        config.apply_env(|_| Some(String::new()));
        assert_eq!(config.api_key(), None);
        assert_eq!(config.listen.port, "3001");
    }
}
