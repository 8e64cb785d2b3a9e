//! Application settings loaded from config.toml
//!
//! The file is optional. Every section has a default, so a missing file behaves like an
//! empty one. `DATABASE_URL` in the environment (or `.env`) overrides `[database] url`.
//! Price items listed under `[[price_items]]` seed an empty price database on startup.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Store connection settings
    pub database: DatabaseSettings,
    /// Identity provider settings
    pub auth: AuthSettings,
    /// Reference prices inserted when the catalog is empty
    pub price_items: Vec<PriceItemConfig>,
}

/// `[database]` section
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Connection string, e.g. `sqlite://costbook.sqlite?mode=rwc`
    pub url: Option<String>,
}

/// `[auth]` section
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthSettings {
    /// PBKDF2 rounds used when hashing passwords
    pub pbkdf2_iterations: u32,
    /// Shortest password accepted at sign-up
    pub min_password_length: usize,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: 100_000,
            min_password_length: 6,
        }
    }
}

/// Configuration for a single seeded price item
#[derive(Debug, Deserialize, Clone)]
pub struct PriceItemConfig {
    /// Catalog code
    pub code: String,
    /// Item description
    pub description: String,
    /// Unit of measure
    pub unit: String,
    /// Unit price in BRL
    pub price: f64,
    /// Price table name, e.g. `SINAPI`
    pub source: String,
    /// `YYYY-MM-DD`
    pub reference_date: NaiveDate,
}

impl Settings {
    /// Returns the connection string to use, preferring `DATABASE_URL`.
    #[must_use]
    pub fn database_url(&self) -> String {
        std::env::var("DATABASE_URL")
            .ok()
            .or_else(|| self.database.url.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
    }
}

/// Loads settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    debug!("Loading settings from {}", path_ref.display());
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads settings from `COSTBOOK_CONFIG` or ./config.toml, falling back to defaults when
/// the file does not exist.
pub fn load_default_settings() -> Result<Settings> {
    let path = std::env::var("COSTBOOK_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_settings(&path)
    } else {
        info!("No config file at {path}; using defaults.");
        Ok(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            [database]
            url = "sqlite::memory:"

            [auth]
            pbkdf2_iterations = 1000
            min_password_length = 8

            [[price_items]]
            code = "01.001"
            description = "Concreto usinado fck 25 MPa"
            unit = "m3"
            price = 512.4
            source = "SINAPI"
            reference_date = "2024-03-01"
        "#;

        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.database.url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(settings.auth.pbkdf2_iterations, 1000);
        assert_eq!(settings.auth.min_password_length, 8);
        assert_eq!(settings.price_items.len(), 1);
        assert_eq!(settings.price_items[0].price, 512.4);
        assert_eq!(
            settings.price_items[0].reference_date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert!(settings.database.url.is_none());
        assert_eq!(settings.auth.pbkdf2_iterations, 100_000);
        assert_eq!(settings.auth.min_password_length, 6);
        assert!(settings.price_items.is_empty());
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let toml_str = r#"
            [[price_items]]
            code = "01.001"
            description = "Concreto"
            unit = "m3"
            price = 1.0
            source = "SINAPI"
            reference_date = "01/03/2024"
        "#;

        assert!(toml::from_str::<Settings>(toml_str).is_err());
    }

    #[test]
    fn test_load_settings_missing_file() {
        let result = load_settings("/nonexistent/costbook.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
