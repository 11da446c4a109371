//! Configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from an
//! optional TOML file merged with `HOOKBUS__`-prefixed environment variables.
//! Every field has a default, so a missing file yields a working setup.

pub mod dispatch;
pub mod lifecycle;
pub mod logging;

use serde::{Deserialize, Serialize};

use self::dispatch::DispatchConfig;
use self::lifecycle::LifecycleConfig;
use self::logging::LoggingConfig;

use crate::error::HookError;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HookBusConfig {
    /// Dispatch settings.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Lifecycle settings.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HookBusConfig {
    /// Load configuration from a TOML file (optional) and the environment.
    ///
    /// Environment overrides use a double underscore between path segments,
    /// e.g. `HOOKBUS__DISPATCH__HANDLER_TIMEOUT_MS=5000`.
    pub fn load(path: &str) -> Result<Self, HookError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("HOOKBUS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| HookError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| HookError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, HookError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
