//! Unified logging module for Tally services
//!
//! Console output always; optional daily-rolling file output (plain or JSON)
//! through non-blocking writers. HTTP access logs go to a separate
//! `{service}_api` file under the `api_access` target.

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter,
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Target used by [`http_request_logger`]
pub const API_ACCESS_TARGET: &str = "api_access";

fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Event formatter producing `timestamp [LEVEL] message fields`
///
/// Example: `2026-10-17T09:12:44.809112Z [INFO] Calculation persisted id=3`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m",
                Level::DEBUG => "\x1b[34m",
                Level::INFO => "\x1b[32m",
                Level::WARN => "\x1b[33m",
                Level::ERROR => "\x1b[31m",
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// Non-blocking writer guards; dropping one loses buffered lines
static GUARDS: OnceLock<Mutex<Vec<WorkerGuard>>> = OnceLock::new();

type EnvFilterReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;
static LOG_FILTER_HANDLE: OnceLock<EnvFilterReloadHandle> = OnceLock::new();
static CURRENT_LOG_LEVEL: OnceLock<Mutex<String>> = OnceLock::new();

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Service name, used for file names and the default filter
    pub service_name: String,
    /// Directory for log files
    pub log_dir: PathBuf,
    /// Filter used when `RUST_LOG` is unset (e.g. "info" or "info,calcsrv=debug")
    pub level: String,
    /// Write JSON lines to the business log file
    pub enable_json: bool,
    /// Write log files at all
    pub enable_file: bool,
    /// Colored console output
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".to_string(),
            log_dir: PathBuf::from("logs"),
            level: "info".to_string(),
            enable_json: false,
            enable_file: true,
            ansi: true,
        }
    }
}

fn keep_guard(guard: WorkerGuard) {
    let guards = GUARDS.get_or_init(|| Mutex::new(Vec::new()));
    match guards.lock() {
        Ok(mut guards) => guards.push(guard),
        Err(poisoned) => poisoned.into_inner().push(guard),
    }
}

/// Build the top-level filter string
///
/// `RUST_LOG` wins when set; `api_access` is appended unless it already
/// names that target.
fn build_filter(config: &LogConfig) -> String {
    match std::env::var("RUST_LOG") {
        Ok(env_str) if env_str.contains(API_ACCESS_TARGET) => env_str,
        Ok(env_str) => {
            let api_level = if env_str.contains("debug") || env_str.contains("trace") {
                "debug"
            } else {
                "info"
            };
            format!("{},{}={}", env_str, API_ACCESS_TARGET, api_level)
        },
        Err(_) => format!("{},{}=info", config.level, API_ACCESS_TARGET),
    }
}

/// Initialize the global subscriber
pub fn init_with_config(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = build_filter(&config);
    let env_filter = EnvFilter::try_new(&filter_str)?;

    let (reload_filter, reload_handle) = reload::Layer::new(env_filter);
    let _ = LOG_FILTER_HANDLE.set(reload_handle);
    let _ = CURRENT_LOG_LEVEL.set(Mutex::new(filter_str));

    let console_layer = fmt::layer()
        .with_ansi(config.ansi)
        .event_format(BracketedLevelFormat)
        .boxed();

    let (business_file_layer, api_file_layer) = if config.enable_file {
        fs::create_dir_all(&config.log_dir)?;

        let business_appender = tracing_appender::rolling::daily(
            &config.log_dir,
            format!("{}.log", config.service_name),
        );
        let (business_writer, guard) = tracing_appender::non_blocking(business_appender);
        keep_guard(guard);

        let business_layer = if config.enable_json {
            fmt::layer()
                .json()
                .with_writer(business_writer)
                .with_target(true)
                .with_filter(filter::filter_fn(|m| m.target() != API_ACCESS_TARGET))
                .boxed()
        } else {
            fmt::layer()
                .with_writer(business_writer)
                .with_ansi(false)
                .event_format(BracketedLevelFormat)
                .with_filter(filter::filter_fn(|m| m.target() != API_ACCESS_TARGET))
                .boxed()
        };

        let api_appender = tracing_appender::rolling::daily(
            &config.log_dir,
            format!("{}_api.log", config.service_name),
        );
        let (api_writer, api_guard) = tracing_appender::non_blocking(api_appender);
        keep_guard(api_guard);

        let api_layer = fmt::layer()
            .with_writer(api_writer)
            .with_ansi(false)
            .event_format(BracketedLevelFormat)
            .with_filter(filter::filter_fn(|m| m.target() == API_ACCESS_TARGET))
            .boxed();

        (Some(business_layer), Some(api_layer))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(reload_filter)
        .with(console_layer)
        .with(business_file_layer)
        .with(api_file_layer)
        .try_init()?;

    if config.enable_file {
        tracing::info!("Logging: {} @ {:?}", config.service_name, config.log_dir);
    } else {
        tracing::info!("Logging: {} (console only)", config.service_name);
    }
    Ok(())
}

/// Change the log filter at runtime
///
/// Accepts a bare level ("debug") or a full filter spec ("info,calcsrv=debug").
pub fn set_log_level(level: &str) -> Result<(), String> {
    let handle = LOG_FILTER_HANDLE
        .get()
        .ok_or("Logging not initialized with reload support")?;

    let new_filter =
        EnvFilter::try_new(level).map_err(|e| format!("Invalid log level '{}': {}", level, e))?;

    handle
        .reload(new_filter)
        .map_err(|e| format!("Failed to reload log filter: {}", e))?;

    if let Some(current) = CURRENT_LOG_LEVEL.get() {
        if let Ok(mut guard) = current.lock() {
            *guard = level.to_string();
        }
    }

    tracing::info!("Log level changed to: {}", level);
    Ok(())
}

/// Whether [`set_log_level`] can take effect in this process
pub fn reload_available() -> bool {
    LOG_FILTER_HANDLE.get().is_some()
}

/// Current log filter string
pub fn get_log_level() -> String {
    CURRENT_LOG_LEVEL
        .get()
        .and_then(|m| m.lock().ok())
        .map(|guard| guard.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

// ============================================================================
// HTTP API Request Logging Middleware
// ============================================================================

const SENSITIVE_KEYS: &[&str] = &["password", "token", "api_key", "secret", "authorization"];

/// Replace values of sensitive JSON keys with `***REDACTED***`
///
/// Non-JSON input is returned unchanged.
fn redact_sensitive_fields(json_str: &str) -> String {
    use serde_json::Value;

    let Ok(mut value) = serde_json::from_str::<Value>(json_str) else {
        return json_str.to_string();
    };

    fn redact_recursive(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    if SENSITIVE_KEYS.iter().any(|&k| key_lower.contains(k)) {
                        *val = Value::String("***REDACTED***".to_string());
                    } else {
                        redact_recursive(val);
                    }
                }
            },
            Value::Array(arr) => arr.iter_mut().for_each(redact_recursive),
            _ => {},
        }
    }

    redact_recursive(&mut value);
    serde_json::to_string(&value).unwrap_or_else(|_| json_str.to_string())
}

/// Truncate to at most `max_length` bytes on a char boundary
fn truncate_body(body: &str, max_length: usize) -> String {
    if body.len() <= max_length {
        return body.to_string();
    }
    let mut cut = max_length;
    while !body.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}[truncated {} bytes]", &body[..cut], body.len() - cut)
}

/// HTTP request logger middleware
///
/// - INFO: every mutating request (method, path, status, duration)
/// - DEBUG: all requests; JSON bodies of mutating requests are included,
///   redacted and truncated to 500 bytes
///
/// Add before `.with_state()`:
/// ```rust,ignore
/// let app = Router::new()
///     .route(...)
///     .layer(axum::middleware::from_fn(common::logging::http_request_logger))
///     .with_state(state);
/// ```
#[cfg(feature = "axum")]
pub async fn http_request_logger(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    use axum::body::Body;
    use std::time::Instant;
    use tracing::{debug, info, level_enabled};

    const MAX_BODY_LENGTH: usize = 500;

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let is_mutating = matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE");
    let is_json = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    let start = Instant::now();

    let should_read_body = level_enabled!(Level::DEBUG) && is_mutating && is_json;

    let (req, body_str) = if should_read_body {
        let (parts, body) = req.into_parts();
        let bytes = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!("Failed to read request body: {}", e);
                let new_req = axum::extract::Request::from_parts(parts, Body::empty());
                return next.run(new_req).await;
            },
        };

        let body_str = match std::str::from_utf8(&bytes) {
            Ok(s) => truncate_body(&redact_sensitive_fields(s), MAX_BODY_LENGTH),
            Err(_) => "<binary data>".to_string(),
        };

        (
            axum::extract::Request::from_parts(parts, Body::from(bytes)),
            Some(body_str),
        )
    } else {
        (req, None)
    };

    let response = next.run(req).await;

    let duration_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    if is_mutating {
        info!(
            target: "api_access",
            method = %method,
            path = %path,
            status,
            duration_ms = %duration_ms,
            "HTTP request"
        );
    }

    match body_str {
        Some(body) => debug!(
            target: "api_access",
            method = %method,
            path = %path,
            status,
            duration_ms = %duration_ms,
            request_body = %body,
            "HTTP request (detailed)"
        ),
        None if !is_mutating => debug!(
            target: "api_access",
            method = %method,
            path = %path,
            status,
            duration_ms = %duration_ms,
            "HTTP request"
        ),
        None => {},
    }

    response
}
