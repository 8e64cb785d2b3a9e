/// Database configuration and connection management
pub mod database;

/// Application settings loading from config.toml
pub mod settings;

pub use settings::{AuthSettings, PriceItemConfig, Settings, load_default_settings, load_settings};
