//! Configuration for the location client.

use std::env;

/// Default web services host.
pub const DEFAULT_API_URL: &str = "https://maps.googleapis.com";

#[derive(Debug, Clone)]
pub struct GeoConfig {
    /// Base URL; service paths such as `/maps/api/geocode/json` are appended.
    pub api_url: String,

    /// API key. Without one every lookup degrades.
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

impl GeoConfig {
    /// Create configuration from environment variables.
    ///
    /// - `GOOGLE_MAPS_API_KEY` - API key (optional)
    /// - `GOOGLE_MAPS_API_URL` - API URL (default: https://maps.googleapis.com)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_key = env::var("GOOGLE_MAPS_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let api_url = env::var("GOOGLE_MAPS_API_URL").unwrap_or(defaults.api_url);

        Self {
            api_url,
            api_key,
            timeout_secs: defaults.timeout_secs,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        std::env::remove_var("GOOGLE_MAPS_API_KEY");
        std::env::remove_var("GOOGLE_MAPS_API_URL");
        let config = GeoConfig::from_env();
        assert!(config.api_key.is_none());
        assert_eq!(config.api_url, DEFAULT_API_URL);

        std::env::set_var("GOOGLE_MAPS_API_KEY", "maps-key");
        std::env::set_var("GOOGLE_MAPS_API_URL", "http://127.0.0.1:1");
        let config = GeoConfig::from_env();
        assert_eq!(config.api_key.as_deref(), Some("maps-key"));
        assert_eq!(config.api_url, "http://127.0.0.1:1");

        std::env::remove_var("GOOGLE_MAPS_API_KEY");
        std::env::remove_var("GOOGLE_MAPS_API_URL");
    }
}
