//! Runtime configuration read from the environment.
//!
//! Every setting has a default that is logged when the variable is unset; a set
//! but unparsable value is an error.

use anyhow::{anyhow, Context, Result};
use std::{env, fmt::Display, net::IpAddr, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};
use tracing::info;

use crate::backend::domain::session::DEFAULT_SESSION_TTL_MINUTES;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";
pub const DEFAULT_FEED_RECONCILE_SECS: u64 = 30;
const DATABASE_FILE: &str = "meal-credit.db";
const APP_DIR: &str = "meal-credit";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub session_ttl_minutes: i64,
    pub feed_reconcile_interval: Duration,
    /// `None` disables the CORS layer
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let session_ttl_minutes: i64 = try_load(
            &lookup,
            "MEAL_CREDIT_SESSION_TTL_MINUTES",
            &DEFAULT_SESSION_TTL_MINUTES.to_string(),
        )?;
        if session_ttl_minutes <= 0 {
            return Err(anyhow!("MEAL_CREDIT_SESSION_TTL_MINUTES must be positive"));
        }

        let reconcile_secs: u64 = try_load(
            &lookup,
            "MEAL_CREDIT_FEED_RECONCILE_SECS",
            &DEFAULT_FEED_RECONCILE_SECS.to_string(),
        )?;
        if reconcile_secs == 0 {
            return Err(anyhow!("MEAL_CREDIT_FEED_RECONCILE_SECS must be positive"));
        }

        let database_url = match lookup("MEAL_CREDIT_DATABASE_URL") {
            Some(url) => url,
            None => {
                let url = default_database_url();
                info!("MEAL_CREDIT_DATABASE_URL not set, using default: {url}");
                url
            }
        };

        let cors_origin = match lookup("MEAL_CREDIT_CORS_ORIGIN") {
            Some(origin) if origin.trim().is_empty() || origin == "none" => None,
            Some(origin) => Some(origin),
            None => {
                info!("MEAL_CREDIT_CORS_ORIGIN not set, using default: {DEFAULT_CORS_ORIGIN}");
                Some(DEFAULT_CORS_ORIGIN.to_string())
            }
        };

        Ok(Self {
            bind: try_load(&lookup, "MEAL_CREDIT_BIND", DEFAULT_BIND)?,
            port: try_load(&lookup, "MEAL_CREDIT_PORT", &DEFAULT_PORT.to_string())?,
            database_url,
            session_ttl_minutes,
            feed_reconcile_interval: Duration::from_secs(reconcile_secs),
            cors_origin,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Filesystem path of a file-backed SQLite url
    pub fn database_file(&self) -> Option<PathBuf> {
        let path = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path.contains(":memory:") {
            return None;
        }
        Some(PathBuf::from(path))
    }

    /// Create the directory that will hold the database file
    pub fn prepare_database_dir(&self) -> Result<()> {
        if let Some(parent) = self.database_file().as_deref().and_then(|p| p.parent()) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
            }
        }
        Ok(())
    }
}

fn default_database_url() -> String {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);
    format!("sqlite://{}", dir.join(DATABASE_FILE).display())
}

fn try_load<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    value
        .trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value {value:?}: {e}"))
}
