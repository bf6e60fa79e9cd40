use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use crate::models::DeliverySemantic;

/// All broker-facing configuration keys. Loaded the way the sibling
/// `rsmqttd` example loads its config: a
/// `serde`-deserialized struct with per-field defaults, read from an optional
/// file and overridable by environment variables for the values that would
/// otherwise be secrets or deployment-specific (`DATABASE_FILE` is the
/// direct ancestor of `database_file` here).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub db_persistence: bool,

    #[serde(default = "default_semantic")]
    pub delivery_semantic: DeliverySemantic,

    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout: u64,

    #[serde(default = "default_elimination_period")]
    pub elimination_period: u64,

    #[serde(default = "default_request_lifetime")]
    pub request_lifetime: f64,

    #[serde(default = "default_gc_period")]
    pub garbage_collector_period: u64,

    #[serde(default = "default_token_expiration")]
    pub token_expiration_time: u64,

    #[serde(default = "default_port")]
    pub app_listening_port: String,

    #[serde(default = "default_db_file")]
    pub database_file: String,
}

fn default_semantic() -> DeliverySemantic {
    DeliverySemantic::AtMostOnce
}
fn default_retry_limit() -> u32 {
    5
}
fn default_delivery_timeout() -> u64 {
    2_000
}
fn default_elimination_period() -> u64 {
    10
}
fn default_request_lifetime() -> f64 {
    30.0
}
fn default_gc_period() -> u64 {
    5
}
fn default_token_expiration() -> u64 {
    15
}
fn default_port() -> String {
    "5000".to_string()
}
fn default_db_file() -> String {
    ":memory:".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_persistence: false,
            delivery_semantic: default_semantic(),
            retry_limit: default_retry_limit(),
            delivery_timeout: default_delivery_timeout(),
            elimination_period: default_elimination_period(),
            request_lifetime: default_request_lifetime(),
            garbage_collector_period: default_gc_period(),
            token_expiration_time: default_token_expiration(),
            app_listening_port: default_port(),
            database_file: default_db_file(),
        }
    }
}

/// CLI surface for `geobrokerd`.
#[derive(Debug, Parser)]
#[command(name = "geobrokerd", about = "geo-aware publish/subscribe broker")]
pub struct Options {
    /// Path to a TOML config file; falls back to all-default config if absent.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overrides `db-persistence` regardless of the config file.
    #[arg(long)]
    pub db_persistence: bool,

    /// Overrides `database-file` / the legacy `DATABASE_FILE` env var.
    #[arg(long, env = "DATABASE_FILE")]
    pub database_file: Option<String>,
}

impl Config {
    pub fn load(opts: &Options) -> Config {
        let mut config = match &opts.config {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
                Err(_) => Config::default(),
            },
            None => Config::default(),
        };

        if opts.db_persistence {
            config.db_persistence = true;
        }
        if let Some(db_file) = &opts.database_file {
            config.database_file = db_file.clone();
        }

        config
    }
}
