// rest_api/src/config.rs

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_STORAGE_PATH: &str = "./clinic_data";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_JWT_SECRET: &str = "clinic-portal-dev-secret-change-me";
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = security::DEFAULT_TOKEN_TTL_HOURS;
/// Upper bound on every list endpoint.
pub const DEFAULT_LIST_LIMIT: usize = 1000;

/// Base name of the optional configuration file looked up in the working
/// directory (`clinic_portal.toml`, `clinic_portal.yaml`, ...).
pub const DEFAULT_CONFIG_BASENAME: &str = "clinic_portal";
pub const ENV_PREFIX: &str = "CLINIC";

/// Represents the configuration for the REST API server itself.
#[derive(Debug, Clone, Deserialize)]
pub struct RestApiConfig {
    pub host: String,
    pub port: u16,
    /// Location of the sled database.
    pub storage_path: PathBuf,
    /// Extra origin allowed by CORS besides the local dev frontend.
    pub frontend_url: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub list_limit: usize,
}

impl Default for RestApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Loads the REST API configuration.
///
/// Layers, lowest precedence first: built-in defaults, the configuration
/// file (`config_file`, or `clinic_portal.*` if present), `CLINIC_*`
/// environment variables, then `DATABASE_PATH`, `FRONTEND_URL` and
/// `JWT_SECRET`.
pub fn load_rest_api_config(config_file: Option<&Path>) -> Result<RestApiConfig> {
    let mut builder = Config::builder()
        .set_default("host", DEFAULT_HOST)?
        .set_default("port", i64::from(DEFAULT_PORT))?
        .set_default("storage_path", DEFAULT_STORAGE_PATH)?
        .set_default("frontend_url", DEFAULT_FRONTEND_URL)?
        .set_default("jwt_secret", DEFAULT_JWT_SECRET)?
        .set_default("token_ttl_hours", DEFAULT_TOKEN_TTL_HOURS)?
        .set_default("list_limit", DEFAULT_LIST_LIMIT as i64)?;

    builder = match config_file {
        Some(path) => builder.add_source(File::from(path).required(true)),
        None => builder.add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false)),
    };

    let config = builder
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .set_override_option("storage_path", env::var("DATABASE_PATH").ok())?
        .set_override_option("frontend_url", env::var("FRONTEND_URL").ok())?
        .set_override_option("jwt_secret", env::var("JWT_SECRET").ok())?
        .build()
        .context("Failed to build REST API configuration")?;

    let rest_api_config: RestApiConfig = config
        .try_deserialize()
        .context("Failed to parse REST API configuration")?;
    if rest_api_config.jwt_secret.is_empty() {
        anyhow::bail!("jwt_secret must not be empty");
    }
    Ok(rest_api_config)
}
