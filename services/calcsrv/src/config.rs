//! Service configuration
//!
//! Loaded in layers by [`CalcsrvConfig::load`]: built-in defaults, then an
//! optional YAML/TOML file, then `CALCSRV_*` environment variables
//! (`CALCSRV_AUTH__JWT_SECRET`, `CALCSRV_API__PORT`, ...), then command-line
//! overrides from [`ServiceArgs`].

use std::path::{Path, PathBuf};

use common::config_loader::ConfigSource;
use common::ServiceArgs;
use errors::ServiceError;
use serde::{Deserialize, Serialize};
use tally_calc::EvaluatorConfig;
use tally_ledger::LedgerConfig;

use crate::auth::{JwtConfig, DEFAULT_BCRYPT_COST, MAX_TOKEN_TTL_HOURS};

// ============================================================================
// Default configuration constants
// ============================================================================

pub const SERVICE_NAME: &str = "calcsrv";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "CALCSRV";

/// Conventional config file location, used when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config/calcsrv.yaml";

pub const DEFAULT_API_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 6080;
pub const DEFAULT_DB_PATH: &str = "data/calcsrv.db";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Minimum HS256 secret length in bytes
pub const MIN_SECRET_LEN: usize = 16;

/// Token lifetime when not configured
pub const DEFAULT_TOKEN_TTL_HOURS: u64 = 72;

/// API server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on request bodies in bytes
    pub body_limit: usize,
    /// Mount `/api/v1/admin/*`; leave off unless the port is private
    pub enable_admin: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_API_HOST.to_string(),
            port: DEFAULT_PORT,
            body_limit: 64 * 1024,
            enable_admin: false,
        }
    }
}

impl ApiConfig {
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
        }
    }
}

/// Token signing configuration
///
/// `jwt_secret` has no usable default; startup fails until one is provided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: u64,
    pub issuer: String,
    /// bcrypt cost for newly stored password hashes
    pub bcrypt_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            issuer: SERVICE_NAME.to_string(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl AuthConfig {
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig::new(self.jwt_secret.as_bytes(), self.token_ttl_hours, &self.issuer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: PathBuf,
    pub json: bool,
    pub enable_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            json: false,
            enable_file: true,
        }
    }
}

/// Complete calcsrv configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcsrvConfig {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub evaluator: EvaluatorConfig,
    pub ledger: LedgerConfig,
    pub logging: LoggingConfig,
}

impl CalcsrvConfig {
    /// Load, apply command-line overrides, and validate
    pub fn load(args: &ServiceArgs) -> Result<Self, ServiceError> {
        let source = match &args.config {
            Some(path) => ConfigSource::Required(path.as_path()),
            None => ConfigSource::Optional(Path::new(DEFAULT_CONFIG_PATH)),
        };

        let mut config: Self = common::load_config(ENV_PREFIX, Some(source))?;
        config.apply_args(args)?;
        config.validate()?;
        Ok(config)
    }

    /// Command-line arguments take precedence over every other layer
    pub fn apply_args(&mut self, args: &ServiceArgs) -> Result<(), ServiceError> {
        if let Some(bind) = args.split_bind_address() {
            let (host, port) = bind.map_err(ServiceError::Configuration)?;
            self.api.host = host;
            self.api.port = port;
        }
        if let Some(path) = &args.db_path {
            self.database.path = path.clone();
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        Ok(())
    }

    /// Reject configurations the service cannot run with
    ///
    /// All problems are reported at once.
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut problems = Vec::new();

        if self.api.port == 0 {
            problems.push("api.port must not be 0".to_string());
        }
        if self.api.body_limit == 0 {
            problems.push("api.body_limit must be greater than 0".to_string());
        }
        if self.database.path.as_os_str().is_empty() {
            problems.push("database.path must not be empty".to_string());
        }
        if self.auth.jwt_secret.trim().is_empty() {
            problems.push("auth.jwt_secret is required".to_string());
        } else if self.auth.jwt_secret.len() < MIN_SECRET_LEN {
            problems.push(format!(
                "auth.jwt_secret must be at least {} bytes",
                MIN_SECRET_LEN
            ));
        }
        if self.auth.token_ttl_hours == 0 || self.auth.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            problems.push(format!(
                "auth.token_ttl_hours must be between 1 and {}",
                MAX_TOKEN_TTL_HOURS
            ));
        }
        if !(crate::auth::password::MIN_COST..=crate::auth::password::MAX_COST).contains(&self.auth.bcrypt_cost) {
            problems.push(format!(
                "auth.bcrypt_cost must be between {} and {}",
                crate::auth::password::MIN_COST,
                crate::auth::password::MAX_COST
            ));
        }
        if self.evaluator.max_expression_len == 0 {
            problems.push("evaluator.max_expression_len must be greater than 0".to_string());
        }
        if self.evaluator.max_depth == 0 {
            problems.push("evaluator.max_depth must be greater than 0".to_string());
        }
        if self.ledger.timeout_ms == 0 {
            problems.push("ledger.timeout_ms must be greater than 0".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(problems.join("; ")))
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::io::Write;

    fn valid() -> CalcsrvConfig {
        let mut config = CalcsrvConfig::default();
        config.auth.jwt_secret = "0123456789abcdef0123".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = CalcsrvConfig::default();
        assert_eq!(config.api.port, DEFAULT_PORT);
        assert_eq!(config.auth.token_ttl_hours, 72);
        assert_eq!(config.evaluator.max_expression_len, 1024);
        assert_eq!(config.database.path, PathBuf::from(DEFAULT_DB_PATH));
    }

    #[test]
    fn test_missing_secret_rejected() {
        let err = CalcsrvConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("auth.jwt_secret is required"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut config = valid();
        config.auth.jwt_secret = "short".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least 16 bytes"));
    }

    #[test]
    fn test_all_problems_reported() {
        let mut config = valid();
        config.api.port = 0;
        config.evaluator.max_depth = 0;
        config.ledger.timeout_ms = 0;
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("api.port"));
        assert!(msg.contains("evaluator.max_depth"));
        assert!(msg.contains("ledger.timeout_ms"));
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        let mut config = valid();
        assert_eq!(config.auth.bcrypt_cost, 10);
        for cost in [0, 3, 32] {
            config.auth.bcrypt_cost = cost;
            let msg = config.validate().unwrap_err().to_string();
            assert!(msg.contains("auth.bcrypt_cost must be between 4 and 31"), "{}", msg);
        }
        config.auth.bcrypt_cost = crate::auth::password::MIN_COST;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_args_override() {
        let mut config = valid();
        let args = ServiceArgs {
            bind_address: Some("127.0.0.1:7000".into()),
            db_path: Some(PathBuf::from("/tmp/other.db")),
            log_level: Some("debug".into()),
            ..Default::default()
        };
        config.apply_args(&args).unwrap();
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.api.port, 7000);
        assert_eq!(config.database.path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_bad_bind_override_rejected() {
        let mut config = valid();
        let args = ServiceArgs {
            bind_address: Some("no-port".into()),
            ..Default::default()
        };
        assert!(config.apply_args(&args).is_err());
    }

    #[test]
    fn test_bind_address_formats_ipv6() {
        let api = ApiConfig {
            host: "::1".to_string(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(api.bind_address(), "[::1]:8080");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calcsrv.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "api:\n  port: 7100\nauth:\n  jwt_secret: file-secret-0123456789\nevaluator:\n  max_expression_len: 64"
        )
        .unwrap();

        let args = ServiceArgs {
            config: Some(path),
            ..Default::default()
        };
        let config = CalcsrvConfig::load(&args).unwrap();
        assert_eq!(config.api.port, 7100);
        assert_eq!(config.evaluator.max_expression_len, 64);
        assert_eq!(config.evaluator.max_depth, tally_calc::DEFAULT_MAX_DEPTH);
        assert_eq!(config.auth.jwt_config().ttl_hours(), 72);
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let args = ServiceArgs {
            config: Some(PathBuf::from("/nonexistent/calcsrv.yaml")),
            ..Default::default()
        };
        assert!(CalcsrvConfig::load(&args).is_err());
    }
}
