use serde_derive::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {1}", .0.display())]
    Read(PathBuf, io::Error),
    #[error("could not parse {}: {1}", .0.display())]
    Parse(PathBuf, toml::de::Error),
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub jobs: Option<usize>,
    pub follow_links: bool,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Loads the file passed with `--config`; without one every key keeps its
    /// default. Nothing is ever written back.
    pub fn get(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = explicit else {
            return Ok(Config::default());
        };

        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_owned(), e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_owned(), e))?;

        log::debug!("loaded {}: {:?}", path.display(), config);
        Ok(config)
    }
}
