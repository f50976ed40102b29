use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use dotenvy::dotenv;

use crate::model::payroll::PaymentStatus;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub jwt_secret: String,

    /// No database configured means in-memory stores.
    pub database_url: Option<String>,
    /// JSON roster used when running without a database.
    pub roster_path: Option<PathBuf>,

    pub api_prefix: String,
    pub rate_protected_per_min: u32,
    pub log_dir: String,

    // Payroll
    pub payroll_initial_status: PaymentStatus,
    pub payroll_timeout: Duration,
    pub compensation_base: f64,
    pub compensation_step: f64,
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has invalid value '{raw}': {e}")),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            jwt_secret: required("JWT_SECRET")?,
            database_url: optional("DATABASE_URL"),
            roster_path: optional("ROSTER_PATH").map(PathBuf::from),

            api_prefix: optional("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,
            log_dir: optional("LOG_DIR").unwrap_or_else(|| "logs".to_string()),

            payroll_initial_status: parsed_or("PAYROLL_INITIAL_STATUS", PaymentStatus::Paid)?,
            payroll_timeout: Duration::from_secs(parsed_or("PAYROLL_TIMEOUT_SECS", 30)?),
            compensation_base: parsed_or("COMPENSATION_BASE", 50_000.0)?,
            compensation_step: parsed_or("COMPENSATION_STEP", 1_000.0)?,
        })
    }

    /// Defaults for everything that has one; used by tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".into(),
            jwt_secret: "test-secret".into(),
            database_url: None,
            roster_path: None,
            api_prefix: "/api".into(),
            rate_protected_per_min: 1000,
            log_dir: "logs".into(),
            payroll_initial_status: PaymentStatus::Paid,
            payroll_timeout: Duration::from_secs(30),
            compensation_base: 50_000.0,
            compensation_step: 1_000.0,
        }
    }
}
