use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Directory holding the six prioritisation GeoJSON files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Leaflet tile URL template for the basemap
    #[serde(default = "default_map_tiles")]
    pub map_tiles: String,
    #[serde(default = "default_map_attribution")]
    pub map_attribution: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_map_tiles() -> String {
    "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png".to_string()
}

fn default_map_attribution() -> String {
    "&copy; OpenStreetMap contributors &copy; CARTO".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            bind_addr: default_bind_addr(),
            log_level: default_log_level(),
            map_tiles: default_map_tiles(),
            map_attribution: default_map_attribution(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        // Parse environment variables into the Config struct
        envy::from_env().context("Failed to load config from environment")
    }

    /// Same as [`Config::from_env`] but reads from an explicit variable list.
    pub fn from_iter<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars).context("Failed to load config from variables")
    }
}
