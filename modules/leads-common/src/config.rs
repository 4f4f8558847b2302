use std::env;
use std::path::PathBuf;

use crate::error::{LeadsError, Result};

pub const DEFAULT_ADMIN_SECRET: &str = "admin123";
pub const DEFAULT_LEADS_PATH: &str = "../contractor-leads-backend/leads";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_DATE_PREFIX: &str = "2025-";

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // Admin
    pub admin_secret: String,

    // Leads tree
    pub leads_path: PathBuf,
    pub date_prefix: String,

    // Web server
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_secret: DEFAULT_ADMIN_SECRET.to_string(),
            leads_path: PathBuf::from(DEFAULT_LEADS_PATH),
            date_prefix: DEFAULT_DATE_PREFIX.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| LeadsError::Config(format!("PORT must be a number, got {raw:?}")))?,
            None => defaults.port,
        };

        Ok(Self {
            admin_secret: lookup("ADMIN_SECRET").unwrap_or(defaults.admin_secret),
            leads_path: lookup("LEADS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.leads_path),
            date_prefix: lookup("LEADS_DATE_PREFIX").unwrap_or(defaults.date_prefix),
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.admin_secret == DEFAULT_ADMIN_SECRET
    }

    pub fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.chars().count().min(3);
            let head: String = val.chars().take(n).collect();
            format!("{head}...({} chars)", val.chars().count())
        }

        tracing::info!("Config loaded:");
        tracing::info!("  ADMIN_SECRET: {}", preview(&self.admin_secret));
        tracing::info!("  LEADS_PATH: {}", self.leads_path.display());
        tracing::info!("  LEADS_DATE_PREFIX: {}", self.date_prefix);
        tracing::info!("  HOST: {}", self.host);
        tracing::info!("  PORT: {}", self.port);

        if self.uses_default_secret() {
            tracing::warn!("ADMIN_SECRET is not set; using the insecure default");
        }
    }
}
