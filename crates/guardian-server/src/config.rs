//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Session lifetime in hours.
    pub session_ttl_hours: i64,
    /// Coins granted when a balance is first created.
    pub welcome_bonus: i64,
    /// Email that is promoted to super admin on sign-in.
    pub super_admin_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8790)),
            database_url: "sqlite:mangroveguard.db?mode=rwc".to_string(),
            session_ttl_hours: 168,
            welcome_bonus: 50,
            super_admin_email: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `GUARDIAN_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:mangroveguard.db?mode=rwc` |
    /// | `SESSION_TTL_HOURS` | Session lifetime | `168` |
    /// | `WELCOME_BONUS` | Coins on first balance access | `50` |
    /// | `SUPER_ADMIN_EMAIL` | Auto-provisioned super admin | (unset) |
    ///
    /// The validator and location clients read their own variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let addr = match env::var("GUARDIAN_ADDR") {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidAddr)?,
            Err(_) => defaults.addr,
        };

        let database_url = env::var("SQLITE_PATH").unwrap_or(defaults.database_url);

        let session_ttl_hours = parse_number("SESSION_TTL_HOURS", defaults.session_ttl_hours)?;
        if session_ttl_hours <= 0 {
            return Err(ConfigError::InvalidNumber("SESSION_TTL_HOURS"));
        }

        let welcome_bonus = parse_number("WELCOME_BONUS", defaults.welcome_bonus)?;
        if welcome_bonus < 0 {
            return Err(ConfigError::InvalidNumber("WELCOME_BONUS"));
        }

        let super_admin_email = env::var("SUPER_ADMIN_EMAIL")
            .ok()
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty());

        Ok(Self {
            addr,
            database_url,
            session_ttl_hours,
            welcome_bonus,
            super_admin_email,
        })
    }

    /// Session lifetime in seconds.
    pub fn session_ttl_secs(&self) -> i64 {
        self.session_ttl_hours * 3600
    }
}

fn parse_number(var: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(var)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid GUARDIAN_ADDR format")]
    InvalidAddr,

    #[error("{0} must be a valid non-negative number")]
    InvalidNumber(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_vars() {
            for var in [
                "GUARDIAN_ADDR",
                "SQLITE_PATH",
                "SESSION_TTL_HOURS",
                "WELCOME_BONUS",
                "SUPER_ADMIN_EMAIL",
            ] {
                std::env::remove_var(var);
            }
        }

        clear_vars();
        let config = Config::from_env().unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8790");
        assert_eq!(config.session_ttl_secs(), 168 * 3600);
        assert_eq!(config.welcome_bonus, 50);
        assert!(config.super_admin_email.is_none());

        std::env::set_var("GUARDIAN_ADDR", "0.0.0.0:9000");
        std::env::set_var("WELCOME_BONUS", "0");
        std::env::set_var("SUPER_ADMIN_EMAIL", " Root@Example.org ");
        let config = Config::from_env().unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.welcome_bonus, 0);
        assert_eq!(config.super_admin_email.as_deref(), Some("root@example.org"));

        std::env::set_var("GUARDIAN_ADDR", "not-an-addr");
        assert!(matches!(Config::from_env(), Err(ConfigError::InvalidAddr)));

        clear_vars();
        std::env::set_var("SESSION_TTL_HOURS", "forever");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidNumber("SESSION_TTL_HOURS"))
        ));

        clear_vars();
    }
}
