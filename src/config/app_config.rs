use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;

use crate::services::osrm::OsrmConfig;

/// Server configuration.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: num_cpus::get(),
        }
    }
}

/// VRP solver subprocess configuration (§4.3, §5).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SolverConfig {
    pub executable: String,
    pub args: Vec<String>,
    pub spawn_timeout_seconds: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            executable: "vrp-solver".to_string(),
            args: Vec::new(),
            spawn_timeout_seconds: 30,
        }
    }
}

/// Process-global application configuration, loaded once at startup (§9:
/// distinct from the per-request [`Profile`](crate::models::Profile)).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// Road-service backends, keyed by city (§5).
    pub osrm: HashMap<String, OsrmConfig>,
    pub solver: SolverConfig,
    /// Path to the on-disk zone polygon file, when requests don't override
    /// zones inline (§6).
    pub zones_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerConfig::default(),
            osrm: HashMap::new(),
            solver: SolverConfig::default(),
            zones_file: None,
        }
    }
}

impl AppConfig {
    /// Layers `config/default` under `config/{RUN_MODE}` under `APP__`-prefixed
    /// environment variables (§10.2).
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("APP").separator("__").ignore_empty(true));

        builder.build()?.try_deserialize()
    }
}
