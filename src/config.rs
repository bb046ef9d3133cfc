//! Configuration manager for the users service.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_TIMEOUT: u64 = 10;
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Configuration {
    /// Instance name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Listening address, `host:port`.
    #[serde(default = "default_address")]
    pub address: String,
    /// Maximum duration of a request, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to PostgreSQL configuration.
    pub postgres: Option<Postgres>,
}

fn default_name() -> String {
    env!("CARGO_CRATE_NAME").to_owned()
}

fn default_address() -> String {
    DEFAULT_ADDRESS.to_owned()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: default_name(),
            address: default_address(),
            timeout: DEFAULT_TIMEOUT,
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            postgres: None,
        }
    }
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
    /// Run bundled migrations on start.
    #[serde(default)]
    pub migrate: bool,
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Application version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Arc<Self> {
        let file_path: &Path = if self.path.is_file() {
            &self.path
        } else {
            Path::new(DEFAULT_CONFIG_PATH)
        };

        match File::open(file_path) {
            Ok(file) => match Self::from_reader(file) {
                Ok(config) => Arc::new(config),
                Err(err) => Arc::new(self.error(err)),
            },
            Err(err) => Arc::new(self.error(err)),
        }
    }

    /// Parse a YAML document and apply environment overrides.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, serde_yaml::Error> {
        let mut config: Configuration = serde_yaml::from_reader(reader)?;

        // set app version.
        config.version = VERSION.to_owned();

        if let (Some(postgres), Ok(password)) =
            (config.postgres.as_mut(), std::env::var("POSTGRES_PASSWORD"))
        {
            postgres.password = Some(password);
        }

        Ok(config)
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "cannot read `config.yaml` file, using defaults");
        Self::default()
    }
}
