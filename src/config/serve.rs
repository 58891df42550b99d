//! `[serve]` and `[watch]` section configuration.
//!
//! Settings for the static file server and the periodic scan loop.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[serve]` section in quire.toml - static file server settings.
///
/// # Example
/// ```toml
/// [serve]
/// interface = "0.0.0.0"  # Listen on all interfaces
/// port = 3000
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    #[serde(default = "defaults::serve::interface")]
    #[educe(Default = defaults::serve::interface())]
    pub interface: String,

    /// HTTP port number (default: 8080).
    #[serde(default = "defaults::serve::port")]
    #[educe(Default = defaults::serve::port())]
    pub port: u16,
}

/// `[watch]` section in quire.toml - scan loop settings.
///
/// # Example
/// ```toml
/// [watch]
/// interval = 10   # seconds between cycles
/// notify = false  # rely on the timer only
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Seconds between two scan cycles.
    #[serde(default = "defaults::watch::interval")]
    #[educe(Default = defaults::watch::interval())]
    pub interval: u64,

    /// Wake the loop early on filesystem events in the source and template dirs.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub notify: bool,
}

impl WatchConfig {
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::time::Duration;

    #[test]
    fn test_serve_config() {
        let config: SiteConfig = toml::from_str(
            r#"
            [serve]
            interface = "0.0.0.0"
            port = 3000
        "#,
        )
        .unwrap();

        assert_eq!(config.serve.interface, "0.0.0.0");
        assert_eq!(config.serve.port, 3000);
    }

    #[test]
    fn test_serve_and_watch_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.serve.interface, "127.0.0.1");
        assert_eq!(config.serve.port, 8080);
        assert_eq!(config.watch.interval, 4);
        assert!(config.watch.notify);
        assert_eq!(config.watch.interval(), Duration::from_secs(4));
    }

    #[test]
    fn test_watch_config_override() {
        let config: SiteConfig = toml::from_str(
            r#"
            [watch]
            interval = 10
            notify = false
        "#,
        )
        .unwrap();

        assert_eq!(config.watch.interval, 10);
        assert!(!config.watch.notify);
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [serve]
            unknown_field = "should_fail"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);

        assert!(result.is_err());
    }
}
