use anyhow::{bail, Context, Result};

/// Default page size used when `limit` is absent or unusable.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    /// Upper bound applied to the `limit` query parameter when listing.
    pub max_page_limit: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let max_page_limit = parse_env("MAX_PAGE_LIMIT", 100u32)?;
        if max_page_limit == 0 {
            bail!("MAX_PAGE_LIMIT must be greater than zero");
        }

        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", 10u32)?,
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_page_limit,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: None,
            db_max_connections: 10,
            port: 8080,
            rust_log: "info".to_string(),
            max_page_limit: 100,
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let port: u16 = parse_env("TRACKER_API_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("TRACKER_API_TEST_BAD_PORT", "eighty");
        let result: Result<u16> = parse_env("TRACKER_API_TEST_BAD_PORT", 8080);
        assert!(result.is_err());
        std::env::remove_var("TRACKER_API_TEST_BAD_PORT");
    }

    #[test]
    fn test_default_config_uses_memory_store() {
        let config = Config::default();
        assert!(config.database_url.is_none());
        assert_eq!(config.max_page_limit, 100);
    }
}
