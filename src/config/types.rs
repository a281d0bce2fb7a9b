use std::path::Path;

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::storage::StorageConfig;
use crate::models::Role;

/// Prefix for environment overrides, e.g. `SAVOLALAB_API__BASE_URL`.
pub const ENV_PREFIX: &str = "SAVOLALAB_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: backend, token slot, session, navigation and route policies.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub routes: Vec<RoutePolicyConfig>,
}

/// Builds the figment for a config file plus `SAVOLALAB_` environment overrides.
/// A missing file yields the defaults.
pub fn config_figment(path: &Path) -> Figment {
    Figment::from(Serialized::default("version", "1.0.0"))
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Extracts a versioned config from any figment.
pub fn extract_config(figment: &Figment) -> Result<ConfigV1, figment::Error> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Load config from a YAML file, exiting the process when it cannot be parsed.
pub fn load_config(path: &Path) -> ConfigV1 {
    match extract_config(&config_figment(path)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    match serde_json::to_string_pretty(&schema) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to render schema: {}", e),
    }
}

/// Where the backend lives and how long we wait for it.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_in_ms: default_timeout_in_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_in_ms() -> u64 {
    10_000
}

/// Token handling knobs.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct SessionConfig {
    /// When set, HS256 signatures are verified with this secret.
    #[serde(default)]
    pub verify_secret: Option<String>,
    /// Log the session out when the token's `exp` passes.
    #[serde(default = "default_true")]
    pub expiry_timer: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            verify_secret: None,
            expiry_timer: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Redirect targets used by logout and the route guard.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct NavigationConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_unauthorized_path")]
    pub unauthorized_path: String,
    #[serde(default = "default_home_path")]
    pub home_path: String,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            unauthorized_path: default_unauthorized_path(),
            home_path: default_home_path(),
        }
    }
}

pub(crate) fn default_login_path() -> String {
    "/login".to_string()
}

pub(crate) fn default_unauthorized_path() -> String {
    "/unauthorized".to_string()
}

fn default_home_path() -> String {
    "/dashboard".to_string()
}

/// Restricts every path under `prefix` to the listed roles.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct RoutePolicyConfig {
    pub prefix: String,
    #[schemars(with = "Vec<String>")]
    pub roles: Vec<Role>,
}
