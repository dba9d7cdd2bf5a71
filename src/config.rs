//! Runtime settings read from the environment (and `.env` when present).

use std::time::Duration;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_idle_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        Ok(Self {
            port: parse_or(&lookup, "PORT", 4000)?,
            environment: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
            database_url,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 25)?,
            db_idle_timeout: Duration::from_secs(parse_or(&lookup, "DB_IDLE_TIMEOUT_SECS", 900)?),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_fill_optional_settings() {
        let s = settings(&[("DATABASE_URL", "postgres://localhost/restaurant")]).unwrap();
        assert_eq!(s.port, 4000);
        assert_eq!(s.environment, "development");
        assert_eq!(s.db_max_connections, 25);
        assert_eq!(s.db_idle_timeout, Duration::from_secs(900));
    }

    #[test]
    fn database_url_is_required() {
        assert!(settings(&[("PORT", "8080")]).is_err());
    }

    #[test]
    fn invalid_numbers_are_errors() {
        let err = settings(&[("DATABASE_URL", "postgres://x"), ("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
