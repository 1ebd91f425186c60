//! Common command-line arguments for Tally services

#[cfg(feature = "cli")]
use clap::Parser;
use std::path::PathBuf;

/// Service startup arguments
///
/// Every field is an override; unset fields fall through to the config file,
/// then environment, then defaults.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", clap(author, version, about))]
pub struct ServiceArgs {
    /// Config file (YAML or TOML)
    #[cfg_attr(feature = "cli", clap(short = 'c', long))]
    pub config: Option<PathBuf>,

    /// Bind address override (e.g. 127.0.0.1:6080)
    #[cfg_attr(feature = "cli", clap(short = 'b', long = "bind", env = "BIND_ADDRESS"))]
    pub bind_address: Option<String>,

    /// SQLite database path override
    #[cfg_attr(feature = "cli", clap(long, env = "DB_PATH"))]
    pub db_path: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[cfg_attr(feature = "cli", clap(short = 'l', long))]
    pub log_level: Option<String>,

    /// Only validate configuration without starting the service
    #[cfg_attr(feature = "cli", clap(long))]
    pub validate: bool,

    /// Disable colored output
    #[cfg_attr(feature = "cli", clap(long))]
    pub no_color: bool,
}

impl ServiceArgs {
    /// Parse a level string to `tracing::Level`, defaulting to INFO
    pub fn parse_log_level(level: &str) -> tracing::Level {
        match level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "warn" | "warning" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }

    /// Split `host:port`, accepting bracketed IPv6 hosts
    pub fn split_bind_address(&self) -> Option<Result<(String, u16), String>> {
        let raw = self.bind_address.as_deref()?;
        let Some((host, port)) = raw.rsplit_once(':') else {
            return Some(Err(format!("Bind address '{}' must be host:port", raw)));
        };
        let host = host.trim_start_matches('[').trim_end_matches(']');
        Some(
            port.parse::<u16>()
                .map(|p| (host.to_string(), p))
                .map_err(|e| format!("Invalid port in bind address '{}': {}", raw, e)),
        )
    }
}
