//! Configuration loader for the `solar-fault-analyzer` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::{anyhow, Result};

use crate::service::ArtifactPaths;

/// Parse an optional environment variable into `$ty`, with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Read an optional string environment variable, with a default value.
macro_rules! string_env {
    ($var_name:expr, $default:expr) => {
        env::var($var_name).unwrap_or_else(|_| $default.to_string())
    };
}

pub const DEFAULT_PORT: u16 = 4300;
pub const DEFAULT_MODEL_FILE: &str = "solar_panel_classifier.json";
pub const DEFAULT_SCALER_FILE: &str = "scaler.json";

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Address the HTTP listener binds to.
    pub bind_addr: IpAddr,

    /// Port the HTTP listener binds to.
    pub port: u16,

    /// Directory holding the model and scaler artifacts.
    pub model_dir: PathBuf,

    /// Classifier artifact file name inside `model_dir`.
    pub model_file: String,

    /// Scaler artifact file name inside `model_dir`.
    pub scaler_file: String,

    /// Allowed CORS origins: `*` or a comma-separated list.
    pub cors_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        // ---
        Config {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            model_dir: default_model_dir(),
            model_file: DEFAULT_MODEL_FILE.to_string(),
            scaler_file: DEFAULT_SCALER_FILE.to_string(),
            cors_origin: "*".to_string(),
        }
    }
}

/// `model/` next to the installed executable, or relative to the working
/// directory if the executable path is unknown.
fn default_model_dir() -> PathBuf {
    // ---
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("model")))
        .unwrap_or_else(|| PathBuf::from("model"))
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `SOLAR_BIND_ADDR` – listen address (default: `0.0.0.0`)
/// - `SOLAR_PORT` – listen port (default: 4300)
/// - `SOLAR_MODEL_DIR` – artifact directory (default: `model/` beside the executable)
/// - `SOLAR_MODEL_FILE` – classifier file name (default: `solar_panel_classifier.json`)
/// - `SOLAR_SCALER_FILE` – scaler file name (default: `scaler.json`)
/// - `SOLAR_CORS_ORIGIN` – `*` or comma-separated origins (default: `*`)
///
/// Returns an error if any variable is set but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let defaults = Config::default();

    let bind_addr = parse_env!("SOLAR_BIND_ADDR", IpAddr, defaults.bind_addr);
    let port = parse_env!("SOLAR_PORT", u16, defaults.port);
    let model_dir = env::var_os("SOLAR_MODEL_DIR")
        .map(PathBuf::from)
        .unwrap_or(defaults.model_dir);
    let model_file = string_env!("SOLAR_MODEL_FILE", defaults.model_file);
    let scaler_file = string_env!("SOLAR_SCALER_FILE", defaults.scaler_file);
    let cors_origin = string_env!("SOLAR_CORS_ORIGIN", defaults.cors_origin);

    Ok(Config {
        bind_addr,
        port,
        model_dir,
        model_file,
        scaler_file,
        cors_origin,
    })
}

impl Config {
    // ---
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.model_dir.join(&self.model_file),
            scaler: self.model_dir.join(&self.scaler_file),
        }
    }

    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  SOLAR_BIND_ADDR   : {}", self.bind_addr);
        tracing::info!("  SOLAR_PORT        : {}", self.port);
        tracing::info!("  SOLAR_MODEL_DIR   : {}", self.model_dir.display());
        tracing::info!("  SOLAR_MODEL_FILE  : {}", self.model_file);
        tracing::info!("  SOLAR_SCALER_FILE : {}", self.scaler_file);
        tracing::info!("  SOLAR_CORS_ORIGIN : {}", self.cors_origin);
    }
}
