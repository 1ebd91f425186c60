//! Tally common library
//!
//! Shared by every Tally service:
//! - logging and HTTP access logging
//! - SQLite client
//! - layered configuration loading
//! - API response envelopes and `AppError`
//! - startup arguments and graceful shutdown

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod api_types;
pub mod bootstrap_args;
pub mod config_loader;
pub mod logging;
pub mod serde_helpers;
pub mod shutdown;

pub use api_types::{
    ComponentHealth, ErrorInfo, ErrorResponse, HealthStatus, ServiceStatus, SuccessResponse,
};

#[cfg(feature = "axum")]
pub use api_types::AppError;

pub use bootstrap_args::ServiceArgs;
pub use config_loader::{load_config, ConfigSource};

// Re-export common dependencies
pub use anyhow;
pub use serde;
pub use serde_json;
pub use tokio;

#[cfg(feature = "cli")]
pub use clap;

#[cfg(feature = "cli")]
pub use clap::Parser;
