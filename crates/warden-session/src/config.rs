//! Configuration for the session manager.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default inactivity timeout for sessions.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default name of the cookie carrying the session token.
pub const DEFAULT_COOKIE_NAME: &str = "session_id";

/// Default interval between cleanup sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Configuration for the session manager.
///
/// Fixed once the manager is built; changing it requires a new manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Inactivity period after which a session is eligible for cleanup.
    pub ttl: Duration,

    /// Name of the cookie that carries the token.
    pub cookie_name: String,

    /// Whether the cookie should be marked `Secure`.
    pub secure_cookie: bool,

    /// Interval between background cleanup sweeps.
    pub cleanup_interval: Duration,

    /// Whether to run the background cleanup sweep at all.
    /// If false, expired sessions stay until `cleanup_now` is called.
    pub enable_cleanup_task: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            secure_cookie: true,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            enable_cleanup_task: true,
        }
    }
}

/// On-disk shape of [`ManagerConfig`]. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    ttl_secs: Option<u64>,
    cookie_name: Option<String>,
    secure_cookie: Option<bool>,
    cleanup_interval_secs: Option<u64>,
    enable_cleanup_task: Option<bool>,
}

impl ManagerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a TOML document.
    ///
    /// ```toml
    /// ttl_secs = 1800
    /// cookie_name = "sid"
    /// secure_cookie = false
    /// cleanup_interval_secs = 300
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        let defaults = Self::default();

        let config = Self {
            ttl: raw.ttl_secs.map(Duration::from_secs).unwrap_or(defaults.ttl),
            cookie_name: raw.cookie_name.unwrap_or(defaults.cookie_name),
            secure_cookie: raw.secure_cookie.unwrap_or(defaults.secure_cookie),
            cleanup_interval: raw
                .cleanup_interval_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
            enable_cleanup_task: raw
                .enable_cleanup_task
                .unwrap_or(defaults.enable_cleanup_task),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.enable_cleanup_task && self.cleanup_interval.is_zero() {
            return Err(Error::Config(
                "cleanup_interval must be non-zero when the cleanup task is enabled".to_string(),
            ));
        }
        if self.cookie_name.is_empty() {
            return Err(Error::Config("cookie_name must not be empty".to_string()));
        }
        Ok(())
    }

    /// Set the session TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set whether cookies are marked secure.
    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    /// Enable or disable the background cleanup task.
    pub fn with_cleanup_task(mut self, enabled: bool) -> Self {
        self.enable_cleanup_task = enabled;
        self
    }

    /// Set the cleanup interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ManagerConfig::default();
        assert_eq!(config.ttl, DEFAULT_TTL);
        assert_eq!(config.cookie_name, "session_id");
        assert!(config.secure_cookie);
        assert_eq!(config.cleanup_interval, Duration::from_secs(3600));
        assert!(config.enable_cleanup_task);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ManagerConfig::new()
            .with_ttl(Duration::from_secs(60))
            .with_cookie_name("sid")
            .with_secure_cookie(false)
            .with_cleanup_interval(Duration::from_secs(5))
            .with_cleanup_task(false);

        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.cookie_name, "sid");
        assert!(!config.secure_cookie);
        assert_eq!(config.cleanup_interval, Duration::from_secs(5));
        assert!(!config.enable_cleanup_task);
    }

    #[test]
    fn test_from_toml() {
        let config = ManagerConfig::from_toml_str(
            r#"
            ttl_secs = 1800
            cookie_name = "sid"
            secure_cookie = false
            "#,
        )
        .unwrap();

        assert_eq!(config.ttl, Duration::from_secs(1800));
        assert_eq!(config.cookie_name, "sid");
        assert!(!config.secure_cookie);
        assert_eq!(config.cleanup_interval, DEFAULT_CLEANUP_INTERVAL);
    }

    #[test]
    fn test_from_empty_toml() {
        let config = ManagerConfig::from_toml_str("").unwrap();
        assert_eq!(config.ttl, DEFAULT_TTL);
        assert_eq!(config.cookie_name, DEFAULT_COOKIE_NAME);
    }

    #[test]
    fn test_from_toml_rejects_bad_input() {
        assert!(matches!(
            ManagerConfig::from_toml_str("ttl_secs = \"soon\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ManagerConfig::from_toml_str("unknown_key = 1"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ManagerConfig::from_toml_str("cleanup_interval_secs = 0"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_zero_interval_allowed_without_task() {
        let config = ManagerConfig::new()
            .with_cleanup_interval(Duration::ZERO)
            .with_cleanup_task(false);
        assert!(config.validate().is_ok());
    }
}
