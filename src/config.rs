use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::constants::{BROWSER_USER_AGENT, DEFAULT_BASE_URL, DEFAULT_COOKIE_TIME, DEFAULT_FORUM_ID};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as URL: {source}")]
    ParseUrl {
        name: String,
        #[source]
        source: url::ParseError,
    },
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Forum root, e.g. `https://www.4d4y.com/forum`. Always ends with `/`.
    pub base_url: Url,
    /// Board whose topics are listed.
    pub forum_id: u32,
    pub request_timeout: Duration,
    /// Seconds the login cookie should live, sent as `cookietime`.
    pub cookie_time: u64,
    pub user_agent: String,
}

impl Config {
    /// Load `.env` if present, then read the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but malformed.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let config = Self::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(&env_or_default("HIPDA_BASE_URL", DEFAULT_BASE_URL))?,
            forum_id: parse_env_u32("HIPDA_FORUM_ID", DEFAULT_FORUM_ID)?,
            request_timeout: Duration::from_secs(parse_env_u64("HIPDA_TIMEOUT_SECS", 30)?),
            cookie_time: parse_env_u64("HIPDA_COOKIE_TIME", DEFAULT_COOKIE_TIME)?,
            user_agent: env_or_default("HIPDA_USER_AGENT", BROWSER_USER_AGENT),
        })
    }

    /// Configuration pointing at a local test server.
    ///
    /// # Panics
    ///
    /// Panics if `base_url` is not a valid URL.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            base_url: parse_base_url(base_url).expect("test base URL must be valid"),
            forum_id: DEFAULT_FORUM_ID,
            request_timeout: Duration::from_secs(5),
            cookie_time: DEFAULT_COOKIE_TIME,
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                name: "HIPDA_BASE_URL".to_string(),
                message: format!("scheme must be http or https, got '{}'", self.base_url.scheme()),
            });
        }
        if self.forum_id == 0 {
            return Err(ConfigError::InvalidValue {
                name: "HIPDA_FORUM_ID".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "HIPDA_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Site origin (`scheme://host[:port]`), sent as the `origin` header.
    #[must_use]
    pub fn origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }
}

/// Parse a base URL, making sure relative joins stay below it.
fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let normalized = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };
    Url::parse(&normalized).map_err(|e| ConfigError::ParseUrl {
        name: "HIPDA_BASE_URL".to_string(),
        source: e,
    })
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("https://www.4d4y.com/forum").unwrap();
        assert_eq!(url.as_str(), "https://www.4d4y.com/forum/");
        assert_eq!(
            url.join("forumdisplay.php?fid=2&page=1").unwrap().as_str(),
            "https://www.4d4y.com/forum/forumdisplay.php?fid=2&page=1"
        );
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        std::env::remove_var("HIPDA_BASE_URL");
        std::env::remove_var("HIPDA_FORUM_ID");
        std::env::remove_var("HIPDA_TIMEOUT_SECS");

        let config = Config::from_env().unwrap();
        assert_eq!(config.base_url.as_str(), "https://www.4d4y.com/forum/");
        assert_eq!(config.forum_id, 2);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.cookie_time, 2_592_000);
        assert_eq!(config.origin(), "https://www.4d4y.com");
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_integer() {
        std::env::set_var("HIPDA_FORUM_ID", "two");
        let result = Config::from_env();
        std::env::remove_var("HIPDA_FORUM_ID");
        assert!(matches!(result, Err(ConfigError::ParseInt { .. })));
    }

    #[test]
    fn test_validate() {
        let mut config = Config::for_testing("http://127.0.0.1:8080/forum");
        assert!(config.validate().is_ok());

        config.forum_id = 0;
        assert!(config.validate().is_err());

        let mut config = Config::for_testing("ftp://example.com/");
        assert!(config.validate().is_err());
        config.base_url = Url::parse("https://example.com/").unwrap();
        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
