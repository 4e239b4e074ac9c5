//! Environment-driven gateway configuration.
//!
//! | variable                | default               |
//! |-------------------------|-----------------------|
//! | `GATEWATCH_MODEL`       | unset: polling off    |
//! | `GATEWATCH_USER`        | `admin`               |
//! | `GATEWATCH_PASSWORD`    | unset: no auto-login  |
//! | `GATEWATCH_URL`         | `http://192.168.12.1` |
//! | `GATEWATCH_INTERVAL_MS` | `2000`                |
//! | `GATEWATCH_TIMEOUT_MS`  | `5000`                |

use std::time::Duration;

/// Default gateway address on the LAN side.
pub const DEFAULT_BASE_URL: &str = "http://192.168.12.1";
/// Observed dashboard cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
/// Per-request timeout applied by the HTTP client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_USERNAME: &str = "admin";

/// Connection and polling settings for one gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Device model identifier. Absent disables all polling.
    pub model: Option<String>,
    pub username: String,
    pub password: Option<String>,
    pub base_url: String,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            model: None,
            username: DEFAULT_USERNAME.to_string(),
            password: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup. Empty values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            model: get("GATEWATCH_MODEL"),
            username: get("GATEWATCH_USER").unwrap_or(defaults.username),
            password: get("GATEWATCH_PASSWORD"),
            base_url: get("GATEWATCH_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            poll_interval: millis_or(
                "GATEWATCH_INTERVAL_MS",
                get("GATEWATCH_INTERVAL_MS"),
                defaults.poll_interval,
            ),
            timeout: millis_or(
                "GATEWATCH_TIMEOUT_MS",
                get("GATEWATCH_TIMEOUT_MS"),
                defaults.timeout,
            ),
        }
    }

    /// Polling happens only when a model is configured.
    pub fn polling_enabled(&self) -> bool {
        self.model.as_deref().is_some_and(|m| !m.is_empty())
    }

    /// Auto-login happens only with both a username and a password.
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

fn millis_or(key: &str, raw: Option<String>, default: Duration) -> Duration {
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<u64>() {
        Ok(ms) if ms > 0 => Duration::from_millis(ms),
        _ => {
            log::warn!("ignoring {key}={raw:?}, using {}ms", default.as_millis());
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> GatewayConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GatewayConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_when_empty() {
        let c = config(&[]);
        assert_eq!(c, GatewayConfig::default());
        assert!(!c.polling_enabled());
        assert!(!c.has_credentials());
        assert_eq!(c.username, "admin");
        assert_eq!(c.poll_interval, Duration::from_millis(2000));
    }

    #[test]
    fn model_enables_polling() {
        let c = config(&[("GATEWATCH_MODEL", "KVD21")]);
        assert!(c.polling_enabled());
        assert_eq!(c.model.as_deref(), Some("KVD21"));
    }

    #[test]
    fn blank_model_keeps_polling_off() {
        let c = config(&[("GATEWATCH_MODEL", "   ")]);
        assert!(!c.polling_enabled());
    }

    #[test]
    fn credentials_need_password() {
        let c = config(&[("GATEWATCH_USER", "admin")]);
        assert!(!c.has_credentials());
        let c = config(&[("GATEWATCH_PASSWORD", "hunter2")]);
        assert!(c.has_credentials());
    }

    #[test]
    fn url_trailing_slash_trimmed() {
        let c = config(&[("GATEWATCH_URL", "http://10.0.0.1/")]);
        assert_eq!(c.base_url, "http://10.0.0.1");
    }

    #[test]
    fn numeric_settings_parse() {
        let c = config(&[
            ("GATEWATCH_INTERVAL_MS", "500"),
            ("GATEWATCH_TIMEOUT_MS", "1500"),
        ]);
        assert_eq!(c.poll_interval, Duration::from_millis(500));
        assert_eq!(c.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn bad_numbers_fall_back() {
        let c = config(&[
            ("GATEWATCH_INTERVAL_MS", "fast"),
            ("GATEWATCH_TIMEOUT_MS", "0"),
        ]);
        assert_eq!(c.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(c.timeout, DEFAULT_TIMEOUT);
    }
}
