//! # Configuration
//!
//! Layered settings for the `dealscope` service.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. TOML file at `$DEALSCOPE_CONFIG` (required) or `config/dealscope.toml`
//!    (optional)
//! 3. Environment variables prefixed `DEALSCOPE__`, with `__` between keys,
//!    e.g. `DEALSCOPE__SERVER__PORT=9000`
//!
//! A `.env` file is loaded first if present.
//!
//! Weight tables are validated once by [`Settings::validate`]; the service
//! refuses to start with an invalid table.

use crate::application::services::scoring_pipeline::ScoringEngine;
use crate::application::services::{
    DataProvider, EngineConfig, FallbackSignalProvider, PipelineConfig,
};
use crate::domain::services::{MetricConfig, ScoringConfig, ValuationConfig};
use crate::infrastructure::logging::LogSettings;
use crate::infrastructure::providers::{DEFAULT_SEED, SeededSignalProvider, StaticSignalProvider};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Environment variable naming an explicit settings file.
pub const CONFIG_PATH_ENV: &str = "DEALSCOPE_CONFIG";

/// Settings file read when `DEALSCOPE_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/dealscope.toml";

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "DEALSCOPE";

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A fixture file could not be read.
    #[error("failed to read fixtures {path}: {source}")]
    FixtureRead {
        /// Fixture path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A fixture file could not be parsed.
    #[error("failed to parse fixtures {path}: {source}")]
    FixtureParse {
        /// Fixture path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// A setting has an invalid value.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Creates an invalid-value error.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    /// Returns the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `host` is not an IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| ConfigError::invalid(format!("server.host {:?}: {e}", self.host)))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Which signal provider backs the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Deterministic synthetic signals.
    #[default]
    Seeded,
    /// Fixtures from `fixtures_path`, falling back to seeded signals.
    Static,
}

/// Signal provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Provider kind.
    pub kind: ProviderKind,
    /// Seed of the synthetic provider.
    pub seed: u64,
    /// Fixture document for the static provider.
    pub fixtures_path: Option<PathBuf>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Seeded,
            seed: DEFAULT_SEED,
            fixtures_path: None,
        }
    }
}

/// Complete service settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP listener.
    pub server: ServerSettings,
    /// Tracing output.
    pub logging: LogSettings,
    /// Worker pool and batch limits.
    pub pipeline: PipelineConfig,
    /// Metric tunables.
    pub metrics: MetricConfig,
    /// Composite score weights.
    pub scoring: ScoringConfig,
    /// Valuation tables.
    pub valuation: ValuationConfig,
    /// Signal provider.
    pub provider: ProviderSettings,
}

impl Settings {
    /// Loads settings from every source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if an explicit settings file is missing or
    /// any source fails to deserialize.
    pub fn load() -> Result<Self, ConfigError> {
        // a missing .env is not an error
        let _ = dotenvy::dotenv();

        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from(Path::new(&path), true),
            Err(_) => Self::load_from(Path::new(DEFAULT_CONFIG_PATH), false),
        }
    }

    /// Loads settings from `path` plus environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if `required` and the file is missing, or
    /// if any source fails to deserialize.
    pub fn load_from(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(required))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Self>()?;
        Ok(settings)
    }

    /// Parses settings from a TOML string, without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` on malformed TOML.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Self>()?;
        Ok(settings)
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            pipeline: self.pipeline.clone(),
            metrics: self.metrics.clone(),
            scoring: self.scoring.clone(),
            valuation: self.valuation.clone(),
        }
    }

    /// Validates every section by building the engine.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first invalid section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.socket_addr()?;
        self.build_engine(Arc::new(SeededSignalProvider::new(self.provider.seed)))
            .map(|_| ())
    }

    /// Builds the configured signal provider.
    ///
    /// # Errors
    ///
    /// Returns a fixture error if the static provider's document cannot be
    /// loaded, or `ConfigError::Invalid` if it has no `fixtures_path`.
    pub fn build_provider(&self) -> Result<Arc<dyn DataProvider>, ConfigError> {
        let seeded = SeededSignalProvider::new(self.provider.seed)
            .with_scale_count(self.metrics.scales_km.len());

        match self.provider.kind {
            ProviderKind::Seeded => Ok(Arc::new(seeded)),
            ProviderKind::Static => {
                let path = self.provider.fixtures_path.as_ref().ok_or_else(|| {
                    ConfigError::invalid("provider.fixtures_path is required for kind = static")
                })?;
                let fixtures = load_fixtures(path)?;
                Ok(Arc::new(FallbackSignalProvider::new(vec![
                    Arc::new(fixtures),
                    Arc::new(seeded),
                ])))
            }
        }
    }

    /// Builds the engine over `provider`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if any weight table or limit is invalid.
    pub fn build_engine(
        &self,
        provider: Arc<dyn DataProvider>,
    ) -> Result<ScoringEngine, ConfigError> {
        ScoringEngine::new(provider, self.engine_config())
            .map_err(|e| ConfigError::invalid(e.to_string()))
    }
}

fn load_fixtures(path: &Path) -> Result<StaticSignalProvider, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::FixtureRead {
        path: path.to_path_buf(),
        source,
    })?;
    StaticSignalProvider::from_json(&json).map_err(|source| ConfigError::FixtureParse {
        path: path.to_path_buf(),
        source,
    })
}
