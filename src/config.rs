use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use clap::Parser;
use std::fs;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Secret used when none is configured; fine for local development only
pub const DEFAULT_JWT_SECRET: &str = "bazaar-development-secret";

/// Configuration for the Bazaar server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server listens on
    pub bind_address: String,
    /// HS256 secret used to sign login tokens
    pub jwt_secret: String,
    /// Lifetime of issued tokens in hours
    pub token_ttl_hours: i64,
    /// Directory for JSON log files; console only when unset
    pub log_dir: Option<String>,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub bind_address: Option<String>,
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default)]
    pub token_ttl_hours: Option<i64>,
    #[serde(default)]
    pub log_dir: Option<String>,
}

/// Command line arguments for the server
#[derive(Parser, Debug, Default)]
#[clap(name = "bazaar", about = "A marketplace REST backend")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to listen on, e.g. 127.0.0.1:8080
    #[clap(long, env = "BAZAAR_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Secret used to sign login tokens
    #[clap(long, env = "BAZAAR_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Token lifetime in hours
    #[clap(long, env = "BAZAAR_TOKEN_TTL_HOURS")]
    pub token_ttl_hours: Option<i64>,

    /// Directory for rolling JSON log files
    #[clap(long, env = "BAZAAR_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Debug mode
    #[clap(long, env = "BAZAAR_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            bind_address: update.bind_address.unwrap_or(self.bind_address),
            jwt_secret: update.jwt_secret.unwrap_or(self.jwt_secret),
            token_ttl_hours: update.token_ttl_hours.unwrap_or(self.token_ttl_hours),
            log_dir: update.log_dir.or(self.log_dir),
        }
    }
}

/// Returns the base (default) configuration
///
/// The database lives in `data_dir` when one is given, otherwise in the
/// working directory.
pub fn base_config(data_dir: Option<PathBuf>) -> Config {
    let database_url = data_dir.map_or("bazaar.db".to_string(), |path| path.join("bazaar.db").to_string_lossy().to_string());

    Config {
        database_url,
        bind_address: "0.0.0.0:8080".to_string(),
        jwt_secret: DEFAULT_JWT_SECRET.to_string(),
        token_ttl_hours: 72,
        log_dir: None,
    }
}

/// Loads configuration from a TOML file
///
/// A missing file is not an error and yields an empty update.
pub fn config_from_file(config_file: Option<PathBuf>) -> Result<ConfigUpdate> {
    let Some(config_file) = config_file else {
        return Ok(ConfigUpdate::default());
    };

    if !config_file.exists() {
        info!("Config file not found at {:?}, using defaults", config_file);
        return Ok(ConfigUpdate::default());
    }

    let content = fs::read_to_string(&config_file)
        .with_context(|| format!("Failed to read config file {:?}", config_file))?;
    let update = toml::from_str::<ConfigUpdate>(&content)
        .with_context(|| format!("Failed to parse config file {:?}", config_file))?;

    info!("Loaded configuration from {:?}", config_file);
    Ok(update)
}

/// Loads configuration from command line arguments and environment variables
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        bind_address: args.bind_address,
        jwt_secret: args.jwt_secret,
        token_ttl_hours: args.token_ttl_hours,
        log_dir: args.log_dir,
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let project_dirs = ProjectDirs::from("com", "bazaar", "bazaar");
    if project_dirs.is_none() {
        warn!("Could not determine XDG directories, using working directory");
    }

    let data_dir = project_dirs.as_ref().and_then(|dirs| {
        let path = dirs.data_dir().to_path_buf();
        match fs::create_dir_all(&path) {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("Could not create data directory {:?}: {}", path, e);
                None
            }
        }
    });
    let config_file = project_dirs.map(|dirs| dirs.config_dir().join("config.toml"));

    let file_update = config_from_file(config_file).unwrap_or_else(|e| {
        warn!("Ignoring config file: {:#}", e);
        ConfigUpdate::default()
    });

    // Apply updates in order of increasing precedence
    let config = base_config(data_dir)
        .apply_update(file_update)
        .apply_update(config_from_args(args));

    if config.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("Using the built-in JWT secret; set BAZAAR_JWT_SECRET in production");
    }

    info!("Final configuration: database_url={}, bind_address={}, token_ttl={}h, log_dir={:?}",
          config.database_url, config.bind_address, config.token_ttl_hours, config.log_dir);

    config
}
