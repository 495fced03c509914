use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

/// One year; longer TTLs overflow timestamp arithmetic.
const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub ttl_minutes: i64,
}

impl SessionConfig {
    pub fn ttl(&self) -> time::Duration {
        time::Duration::minutes(self.ttl_minutes)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub static_dir: String,
    pub query_timeout_secs: u64,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("APP_PORT", 8080)?,
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./data/forkedflavors.db".into()),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into()),
            query_timeout_secs: parse_var("DB_QUERY_TIMEOUT_SECS", 5)?,
            session: SessionConfig {
                cookie_name: std::env::var("SESSION_COOKIE_NAME")
                    .unwrap_or_else(|_| "forkedflavors.sid".into()),
                cookie_secure: parse_var("SESSION_COOKIE_SECURE", false)?,
                ttl_minutes: session_ttl(parse_var("SESSION_TTL_MINUTES", 60 * 6)?)?,
            },
        })
    }

    /// Defaults for tests: in-memory store, short query timeout.
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            database_path: crate::db::MEMORY_LOCATION.into(),
            static_dir: "./static".into(),
            query_timeout_secs: 5,
            session: SessionConfig {
                cookie_name: "forkedflavors.sid".into(),
                cookie_secure: false,
                ttl_minutes: 60 * 6,
            },
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

fn session_ttl(minutes: i64) -> anyhow::Result<i64> {
    if !(1..=MAX_SESSION_TTL_MINUTES).contains(&minutes) {
        anyhow::bail!(
            "SESSION_TTL_MINUTES must be between 1 and {MAX_SESSION_TTL_MINUTES}, got {minutes}"
        );
    }
    Ok(minutes)
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_falls_back_to_default_when_unset() {
        let port: u16 = parse_var("FORKEDFLAVORS_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn parse_var_rejects_garbage() {
        std::env::set_var("FORKEDFLAVORS_TEST_BAD_TTL", "six hours");
        let err = parse_var::<i64>("FORKEDFLAVORS_TEST_BAD_TTL", 360).unwrap_err();
        assert!(err.to_string().contains("FORKEDFLAVORS_TEST_BAD_TTL"));
        std::env::remove_var("FORKEDFLAVORS_TEST_BAD_TTL");
    }

    #[test]
    fn session_ttl_must_be_positive_and_bounded() {
        assert_eq!(session_ttl(360).unwrap(), 360);
        assert_eq!(session_ttl(MAX_SESSION_TTL_MINUTES).unwrap(), MAX_SESSION_TTL_MINUTES);
        assert!(session_ttl(0).is_err());
        assert!(session_ttl(-5).is_err());
        assert!(session_ttl(i64::MAX).is_err());
    }

    #[test]
    fn default_session_ttl_is_six_hours() {
        let config = AppConfig::for_tests();
        assert_eq!(config.session.ttl(), time::Duration::hours(6));
    }
}
