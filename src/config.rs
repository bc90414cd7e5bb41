//! Service configuration loaded from the environment.

use std::env;

/// Default port if not specified via environment variable.
pub const DEFAULT_PORT: u16 = 3000;

/// Default database path if not specified via environment variable.
pub const DEFAULT_DB_URL: &str = "sqlite:floodalert.db?mode=rwc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Reverse geocoding is disabled when unset.
    pub geocoder_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: DEFAULT_DB_URL.to_string(),
            geocoder_url: None,
        }
    }
}

impl Config {
    /// Read `FLOODALERT_PORT`, `FLOODALERT_DATABASE_URL` and
    /// `FLOODALERT_GEOCODER_URL`. Missing or unparsable values use defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("FLOODALERT_PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let database_url = lookup("FLOODALERT_DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_URL.to_string());

        let geocoder_url = lookup("FLOODALERT_GEOCODER_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        Self {
            port,
            database_url,
            geocoder_url,
        }
    }
}
