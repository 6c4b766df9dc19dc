//! Server configuration.
//!
//! Resolution order (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env`)
//! 3. TOML file (`~/.config/taskflow/config.toml` unless `--config` is given)
//! 4. Compiled defaults

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::store::DEFAULT_LATENCY;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// --------------------------------------------------
// TOML file (every key optional)
// --------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerSection,
    store: StoreSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerSection {
    bind_addr: Option<String>,
    static_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoreSection {
    seed_path: Option<PathBuf>,
    latency_ms: Option<u64>,
}

#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "TaskFlow task dashboard backend")]
pub struct CliArgs {
    /// Address to listen on.
    #[arg(short, long, env = "TASKFLOW_ADDR")]
    pub bind: Option<String>,

    /// Config file path.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON seed file; the built-in fixture is used when omitted.
    #[arg(long)]
    pub seed: Option<PathBuf>,

    /// Simulated access latency per store operation, in milliseconds.
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Directory of static UI files served at `/`.
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKFLOW_LOG")]
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    pub seed_path: Option<PathBuf>,
    pub latency: Duration,
    pub static_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            seed_path: None,
            latency: DEFAULT_LATENCY,
            static_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Loads the config file (explicit or default location) and merges it
    /// with CLI arguments.
    ///
    /// A missing default file counts as empty; a missing explicit file is an
    /// error.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, file))
    }

    fn resolve(cli: &CliArgs, file: ConfigFile) -> Self {
        let defaults = Self::default();
        let latency_ms = cli.latency_ms.or(file.store.latency_ms);

        Self {
            bind_addr: cli
                .bind
                .clone()
                .or(file.server.bind_addr)
                .unwrap_or(defaults.bind_addr),
            seed_path: cli.seed.clone().or(file.store.seed_path),
            latency: latency_ms.map_or(defaults.latency, Duration::from_millis),
            static_dir: cli.static_dir.clone().or(file.server.static_dir),
            log_level: cli.log_level.clone(),
        }
    }
}

fn load_config_file(explicit: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(path) = explicit {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("taskflow").join("config.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(source) => Err(ConfigError::ReadFile { path, source }),
    }
}
