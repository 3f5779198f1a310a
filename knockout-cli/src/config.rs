use std::env;
use std::io;
use std::path::{Path, PathBuf};

use knockout_core::DEFAULT_CAPACITY;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

macro_rules! from_environment {
    ($config:expr, $($key:expr, $name:tt),*$(,)?) => {{
        $(
            {
                if let Ok(value) = env::var($key) {
                    $config.$name = value
                        .parse()
                        .map_err(|_| ConfigError::InvalidEnvironment($key))?;
                }
            }
        )*
    }};
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub loglevel: LevelFilter,
    /// The file the tournament is stored in.
    pub state: PathBuf,
    /// The number of participants of the bracket. Only used when a new tournament is created.
    pub capacity: usize,
}

impl Config {
    /// Reads the config from the file at `path`. A missing file yields the default config.
    pub async fn from_file<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let buf = match fs::read_to_string(path).await {
            Ok(buf) => buf,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err.into()),
        };

        Self::from_toml(&buf)
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Overrides all fields that are set in the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvironment`] if a variable is set to a value that does not
    /// parse.
    pub fn with_environment(mut self) -> Result<Self, ConfigError> {
        from_environment!(
            self,
            "KO_LOGLEVEL",
            loglevel,
            "KO_STATE",
            state,
            "KO_CAPACITY",
            capacity,
        );

        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity < 2 || !self.capacity.is_power_of_two() {
            return Err(ConfigError::InvalidCapacity(self.capacity));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            loglevel: LevelFilter::Warn,
            state: PathBuf::from("tournament.json"),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("invalid capacity {0}: expected a power of two of at least 2")]
    InvalidCapacity(usize),
    #[error("invalid value in environment variable {0}")]
    InvalidEnvironment(&'static str),
}
