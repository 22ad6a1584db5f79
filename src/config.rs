use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use sqlx::postgres::PgConnectOptions;

pub const DEFAULT_FHIR_BASE_URL: &str = "https://fhir.epic.com/interconnect-fhir-oauth/api/FHIR/R4";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

#[derive(Clone)]
pub struct Config {
    pub pg_options: PgConnectOptions,
    pub db_connect_attempts: u32,
    pub db_connect_delay: Duration,
    pub db_acquire_timeout: Duration,
    pub fhir_base_url: String,
    pub fhir_access_token: String,
    pub bind_addr: SocketAddr,
    pub ocr_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pg_options = match non_empty(&lookup, "DATABASE_URL") {
            Some(url) => PgConnectOptions::from_str(url.trim())
                .map_err(|_| anyhow!("DATABASE_URL is not a valid PostgreSQL URL"))?,
            None => {
                let host_name = required(&lookup, "PG_HOST")?;
                let user_name = required(&lookup, "PG_USERNAME")?;
                let password = required(&lookup, "PG_PASSWORD")?;
                let db_name = required(&lookup, "PG_DBNAME")?;
                let port: u16 = parsed_or(&lookup, "PG_PORT", 5432)?;
                pg_options(&user_name, &password, &host_name, port, &db_name)
            }
        };

        Ok(Config {
            pg_options,
            db_connect_attempts: parsed_or(&lookup, "DB_CONNECT_ATTEMPTS", 5)?,
            db_connect_delay: Duration::from_secs(parsed_or(&lookup, "DB_CONNECT_DELAY_SECS", 3)?),
            db_acquire_timeout: Duration::from_secs(parsed_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", 10)?),
            fhir_base_url: non_empty(&lookup, "FHIR_BASE_URL")
                .unwrap_or_else(|| DEFAULT_FHIR_BASE_URL.to_string()),
            fhir_access_token: required(&lookup, "FHIR_ACCESS_TOKEN")?,
            bind_addr: parsed_or(&lookup, "BIND_ADDR", SocketAddr::from_str(DEFAULT_BIND_ADDR)?)?,
            ocr_delay: Duration::from_millis(parsed_or(&lookup, "OCR_DELAY_MS", 3000)?),
        })
    }
}

/// Connection options from separate parts. Nothing is pasted into a URL, so
/// credentials may contain any character.
pub fn pg_options(user_name: &str, password: &str, host_name: &str, port: u16, db_name: &str) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(host_name)
        .port(port)
        .username(user_name)
        .password(password)
        .database(db_name)
}

// only the connection target is printed; passwords and the token never are
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pg_target = format!(
            "{}@{}:{}/{}",
            self.pg_options.get_username(),
            self.pg_options.get_host(),
            self.pg_options.get_port(),
            self.pg_options.get_database().unwrap_or_default()
        );
        f.debug_struct("Config")
            .field("pg_target", &pg_target)
            .field("db_connect_attempts", &self.db_connect_attempts)
            .field("db_connect_delay", &self.db_connect_delay)
            .field("db_acquire_timeout", &self.db_acquire_timeout)
            .field("fhir_base_url", &self.fhir_base_url)
            .field("fhir_access_token", &"***")
            .field("bind_addr", &self.bind_addr)
            .field("ocr_delay", &self.ocr_delay)
            .finish()
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).ok_or_else(|| anyhow!("{} must be set", key))
}

fn parsed_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}
