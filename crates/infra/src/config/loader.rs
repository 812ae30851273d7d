//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `COURIER_BASE_URL` is missing, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! - `COURIER_BASE_URL`: Base URL of the remote API (required)
//! - `COURIER_TIMEOUT_MS`: Default per-call timeout
//! - `COURIER_RETRY_ATTEMPTS`: Retries after the first attempt
//! - `COURIER_RETRY_INITIAL_DELAY_MS`: Delay before the first retry
//! - `COURIER_RETRY_MAX_DELAY_MS`: Backoff ceiling
//! - `COURIER_CACHE_SWEEP_INTERVAL_MS`: Cache sweep period
//! - `COURIER_CACHE_TTL_MS`: Default TTL of cached responses
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `courier.{json,toml}` then `config.{json,toml}` in the working directory
//! 2. The same names in the parent and grandparent directories
//! 3. The same names beside the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use courier_domain::{ClientConfig, CourierError, Result};

const FILE_NAMES: [&str; 4] = ["courier.json", "courier.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `CourierError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration does not validate
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `COURIER_BASE_URL` is required; unset optional variables keep their
/// defaults.
///
/// # Errors
/// Returns `CourierError::Config` if the base URL is missing, a variable
/// does not parse, or the result does not validate.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::with_base_url(env_var("COURIER_BASE_URL")?);

    if let Some(ms) = env_parse::<u64>("COURIER_TIMEOUT_MS")? {
        config.timeout = Duration::from_millis(ms);
    }
    if let Some(attempts) = env_parse::<u32>("COURIER_RETRY_ATTEMPTS")? {
        config.retry_attempts = attempts;
    }
    if let Some(ms) = env_parse::<u64>("COURIER_RETRY_INITIAL_DELAY_MS")? {
        config.retry_initial_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = env_parse::<u64>("COURIER_RETRY_MAX_DELAY_MS")? {
        config.retry_max_delay = Duration::from_millis(ms);
    }
    if let Some(ms) = env_parse::<u64>("COURIER_CACHE_SWEEP_INTERVAL_MS")? {
        config.cache_sweep_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = env_parse::<u64>("COURIER_CACHE_TTL_MS")? {
        config.default_cache_ttl = Duration::from_millis(ms);
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. Format is detected
/// by extension; fields missing from the file keep their defaults.
///
/// # Errors
/// Returns `CourierError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The configuration does not validate
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CourierError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CourierError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CourierError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CourierError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CourierError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(CourierError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file in the standard locations, if any.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    probe_in(&dirs)
}

fn probe_in(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        CourierError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// `Ok(None)` when unset or empty.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| CourierError::Config(format!("Invalid value for {key}: {e}"))),
        _ => Ok(None),
    }
}
