use std::{env, fmt::Display, fs, path::Path, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

const ENV_PREFIX: &str = "SHARENOTE_";

/// Server configuration.
///
/// Layers, lowest precedence first: defaults, YAML file, environment, CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite database file
    pub database: PathBuf,
    /// Keep notes in process memory instead of `database`
    pub memory: bool,
    pub collection: String,
    /// Prefix of every `share_url`
    pub share_base_url: String,
    /// Allowed origins; empty means any origin
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database: PathBuf::from("sharenote.db"),
            memory: false,
            collection: "notes".to_string(),
            share_base_url: "http://localhost:5173/share".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Defaults overlaid with an optional YAML file and the environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_yaml(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Override fields from `SHARENOTE_*` variables as resolved by `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(host) = var("HOST") {
            self.host = host;
        }
        if let Some(port) = parse_var("PORT", var("PORT")) {
            self.port = port;
        }
        if let Some(database) = var("DATABASE") {
            self.database = PathBuf::from(database);
        }
        if let Some(memory) = parse_var("MEMORY", var("MEMORY")) {
            self.memory = memory;
        }
        if let Some(collection) = var("COLLECTION") {
            self.collection = collection;
        }
        if let Some(url) = var("SHARE_BASE_URL") {
            self.share_base_url = url;
        }
        if let Some(origins) = var("CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &str, value: Option<String>) -> Option<T>
where
    T::Err: Display,
{
    let value = value?;
    value
        .trim()
        .parse()
        .map_err(|e| {
            warn!("Invalid {ENV_PREFIX}{name} value '{value}': {e}, keeping current setting");
        })
        .ok()
}
