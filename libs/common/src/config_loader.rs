//! Layered configuration loading
//!
//! Priority (lowest to highest):
//! 1. `T::default()`
//! 2. Config file (YAML or TOML, chosen by extension)
//! 3. Environment variables `{PREFIX}_SECTION__FIELD`

use std::path::Path;

use errors::ServiceError;
use figment::{
    providers::{Env, Format, Serialized, Toml, Yaml},
    Figment,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

/// Where a configuration file comes from
#[derive(Debug, Clone, Copy)]
pub enum ConfigSource<'a> {
    /// Explicitly requested; must exist
    Required(&'a Path),
    /// Conventional location; skipped when absent
    Optional(&'a Path),
}

fn file_provider(figment: Figment, path: &Path) -> Result<Figment, ServiceError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ServiceError::Configuration("Config file must have an extension".into()))?;

    match extension {
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        "toml" => Ok(figment.merge(Toml::file(path))),
        other => Err(ServiceError::Configuration(format!(
            "Unsupported config file format: {}",
            other
        ))),
    }
}

/// Build the layered figment without extracting it
pub fn build_figment<T>(
    env_prefix: &str,
    source: Option<ConfigSource<'_>>,
) -> Result<Figment, ServiceError>
where
    T: Serialize + Default,
{
    let mut figment = Figment::from(Serialized::defaults(T::default()));

    match source {
        Some(ConfigSource::Required(path)) => {
            if !path.exists() {
                return Err(ServiceError::Configuration(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            info!("Loading config from {}", path.display());
            figment = file_provider(figment, path)?;
        },
        Some(ConfigSource::Optional(path)) => {
            if path.exists() {
                info!("Loading config from {}", path.display());
                figment = file_provider(figment, path)?;
            } else {
                warn!("Config file {} not found, using defaults", path.display());
            }
        },
        None => {},
    }

    Ok(figment.merge(Env::prefixed(&format!("{}_", env_prefix)).split("__")))
}

/// Load `T` from defaults, an optional file, and prefixed environment variables
pub fn load_config<T>(env_prefix: &str, source: Option<ConfigSource<'_>>) -> Result<T, ServiceError>
where
    T: Serialize + DeserializeOwned + Default,
{
    build_figment::<T>(env_prefix, source)?
        .extract()
        .map_err(|e| ServiceError::Configuration(format!("Failed to load configuration: {}", e)))
}
