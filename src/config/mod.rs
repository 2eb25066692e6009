//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::cache::CacheStrategy;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vetrina";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_DB_MAX_LIFETIME_SECS: u64 = 300;
const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_CACHE_PORT: u16 = 6379;
const DEFAULT_CACHE_DB: i64 = 0;
const DEFAULT_CACHE_LIST_TTL_SECS: u64 = 3600;

/// Command-line arguments for the Vetrina binary.
#[derive(Debug, Parser)]
#[command(name = "vetrina", version, about = "Vetrina product catalog server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "VETRINA_CONFIG_FILE",
        value_name = "PATH"
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the primary (write) database connection URL.
    #[arg(long = "database-write-url", value_name = "URL")]
    pub database_write_url: Option<String>,

    /// Override the replica (read) database connection URL.
    #[arg(long = "database-read-url", value_name = "URL")]
    pub database_read_url: Option<String>,

    /// Override the per-pool connection ceiling.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Override the cache host; omit to run without a cache.
    #[arg(long = "cache-host", value_name = "HOST")]
    pub cache_host: Option<String>,

    /// Override the cache port.
    #[arg(long = "cache-port", value_name = "PORT")]
    pub cache_port: Option<u16>,

    /// Override the cache password.
    #[arg(long = "cache-password", value_name = "PASSWORD")]
    pub cache_password: Option<String>,

    /// Override the cache logical database index.
    #[arg(long = "cache-db", value_name = "INDEX")]
    pub cache_db: Option<i64>,

    /// Override the caching strategy (list-snapshot|entity-counter).
    #[arg(long = "cache-strategy", value_name = "STRATEGY")]
    pub cache_strategy: Option<String>,

    /// Override the list snapshot lifetime in seconds.
    #[arg(long = "cache-list-ttl-seconds", value_name = "SECONDS")]
    pub cache_list_ttl_seconds: Option<u64>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub write_url: String,
    pub read_url: String,
    pub max_connections: NonZeroU32,
    pub max_lifetime: Duration,
    pub acquire_timeout: Duration,
}

/// Cache connectivity. A missing host means the cache is disabled, which is
/// a fully supported mode, never a startup failure.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub host: Option<String>,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
    pub strategy: CacheStrategy,
    pub list_ttl_seconds: u64,
}

impl CacheSettings {
    pub fn enabled(&self) -> bool {
        self.host.is_some()
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("VETRINA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_serve_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.database_write_url.as_ref() {
            self.database.write_url = Some(url.clone());
        }
        if let Some(url) = overrides.database_read_url.as_ref() {
            self.database.read_url = Some(url.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(host) = overrides.cache_host.as_ref() {
            self.cache.host = Some(host.clone());
        }
        if let Some(port) = overrides.cache_port {
            self.cache.port = Some(port);
        }
        if let Some(password) = overrides.cache_password.as_ref() {
            self.cache.password = Some(password.clone());
        }
        if let Some(db) = overrides.cache_db {
            self.cache.db = Some(db);
        }
        if let Some(strategy) = overrides.cache_strategy.as_ref() {
            self.cache.strategy = Some(strategy.clone());
        }
        if let Some(ttl) = overrides.cache_list_ttl_seconds {
            self.cache.list_ttl_seconds = Some(ttl);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            cache,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let database = build_database_settings(database)?;
        let cache = build_cache_settings(cache)?;

        Ok(Self {
            server,
            logging,
            database,
            cache,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let write_url = database
        .write_url
        .and_then(non_blank)
        .ok_or_else(|| LoadError::invalid("database.write_url", "a write endpoint is required"))?;

    // Without a dedicated replica, reads share the primary.
    let read_url = database
        .read_url
        .and_then(non_blank)
        .unwrap_or_else(|| write_url.clone());

    let max_value = database
        .max_connections
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS);
    let max_connections = non_zero_u32(max_value.into(), "database.max_connections")?;

    let lifetime_secs = database
        .max_lifetime_seconds
        .unwrap_or(DEFAULT_DB_MAX_LIFETIME_SECS);
    if lifetime_secs == 0 {
        return Err(LoadError::invalid(
            "database.max_lifetime_seconds",
            "must be greater than zero",
        ));
    }

    let acquire_secs = database
        .acquire_timeout_seconds
        .unwrap_or(DEFAULT_DB_ACQUIRE_TIMEOUT_SECS);
    if acquire_secs == 0 {
        return Err(LoadError::invalid(
            "database.acquire_timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(DatabaseSettings {
        write_url,
        read_url,
        max_connections,
        max_lifetime: Duration::from_secs(lifetime_secs),
        acquire_timeout: Duration::from_secs(acquire_secs),
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let host = cache.host.and_then(non_blank);

    let port = cache.port.unwrap_or(DEFAULT_CACHE_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "cache.port",
            "port must be greater than zero",
        ));
    }

    let db = cache.db.unwrap_or(DEFAULT_CACHE_DB);
    if db < 0 {
        return Err(LoadError::invalid(
            "cache.db",
            "logical database index must not be negative",
        ));
    }

    let strategy = match cache.strategy {
        Some(raw) => CacheStrategy::from_str(&raw)
            .map_err(|reason| LoadError::invalid("cache.strategy", reason))?,
        None => CacheStrategy::ListSnapshot,
    };

    let list_ttl_seconds = cache
        .list_ttl_seconds
        .unwrap_or(DEFAULT_CACHE_LIST_TTL_SECS);
    if list_ttl_seconds == 0 {
        return Err(LoadError::invalid(
            "cache.list_ttl_seconds",
            "must be greater than zero",
        ));
    }

    Ok(CacheSettings {
        host,
        port,
        password: cache.password.and_then(non_blank),
        db,
        strategy,
        list_ttl_seconds,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    write_url: Option<String>,
    read_url: Option<String>,
    max_connections: Option<u32>,
    max_lifetime_seconds: Option<u64>,
    acquire_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    host: Option<String>,
    port: Option<u16>,
    password: Option<String>,
    db: Option<i64>,
    strategy: Option<String>,
    list_ttl_seconds: Option<u64>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

/// Resolve configuration from the process arguments.
pub fn load_with_cli() -> Result<Settings, LoadError> {
    let args = CliArgs::parse();
    load(&args)
}
