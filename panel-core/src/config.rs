// Runtime settings, read from the environment.
//
// Env vars (all optional, shown with defaults):
//   FAY_API_URL                 http://127.0.0.1:5000
//   FAY_WS_URL                  ws://127.0.0.1:10003
//   FAY_PANEL_PREFS             <config dir>/fay-panel/preferences.toml
//   FAY_ROSTER_POLL_SECS        30
//   FAY_REQUEST_TIMEOUT_SECS    10
//   FAY_RECONNECT_MAX_ATTEMPTS  30   (0 retries forever)

use std::{path::PathBuf, time::Duration};

use tracing::warn;

use crate::socket::ReconnectPolicy;

#[derive(Debug, Clone)]
pub struct PanelConfig {
    pub api_url: String,
    pub ws_url: String,
    /// Overrides the platform preferences location.
    pub prefs_path: Option<PathBuf>,
    pub roster_poll_interval: Duration,
    pub request_timeout: Duration,
    pub reconnect: ReconnectPolicy,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000".into(),
            ws_url: "ws://127.0.0.1:10003".into(),
            prefs_path: None,
            roster_poll_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl PanelConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with the variable source injected.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let secs = |key: &str, fallback: Duration| match lookup(key) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(n) if n > 0 => Duration::from_secs(n),
                _ => {
                    warn!("{key}={raw:?} is not a positive integer, using {fallback:?}");
                    fallback
                }
            },
            None => fallback,
        };

        let max_attempts = match lookup("FAY_RECONNECT_MAX_ATTEMPTS") {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(0) => None,
                Ok(n) => Some(n),
                Err(_) => {
                    warn!("FAY_RECONNECT_MAX_ATTEMPTS={raw:?} is not an integer");
                    defaults.reconnect.max_attempts
                }
            },
            None => defaults.reconnect.max_attempts,
        };

        Self {
            api_url: lookup("FAY_API_URL").unwrap_or(defaults.api_url),
            ws_url: lookup("FAY_WS_URL").unwrap_or(defaults.ws_url),
            prefs_path: lookup("FAY_PANEL_PREFS").map(PathBuf::from),
            roster_poll_interval: secs("FAY_ROSTER_POLL_SECS", defaults.roster_poll_interval),
            request_timeout: secs("FAY_REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            reconnect: ReconnectPolicy { max_attempts, ..defaults.reconnect },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> PanelConfig {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        PanelConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_point_at_the_local_backend() {
        let cfg = config(&[]);
        assert_eq!(cfg.api_url, "http://127.0.0.1:5000");
        assert_eq!(cfg.ws_url, "ws://127.0.0.1:10003");
        assert_eq!(cfg.roster_poll_interval, Duration::from_secs(30));
        assert_eq!(cfg.reconnect.initial_delay, Duration::from_millis(5000));
        assert!(cfg.prefs_path.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config(&[
            ("FAY_API_URL", "http://10.0.0.2:5000"),
            ("FAY_ROSTER_POLL_SECS", "5"),
            ("FAY_RECONNECT_MAX_ATTEMPTS", "0"),
            ("FAY_PANEL_PREFS", "/tmp/p.toml"),
        ]);
        assert_eq!(cfg.api_url, "http://10.0.0.2:5000");
        assert_eq!(cfg.roster_poll_interval, Duration::from_secs(5));
        assert_eq!(cfg.reconnect.max_attempts, None);
        assert_eq!(cfg.prefs_path, Some(PathBuf::from("/tmp/p.toml")));
    }

    #[test]
    fn bad_numbers_fall_back() {
        let cfg = config(&[("FAY_REQUEST_TIMEOUT_SECS", "soon"), ("FAY_ROSTER_POLL_SECS", "0")]);
        assert_eq!(cfg.request_timeout, Duration::from_secs(10));
        assert_eq!(cfg.roster_poll_interval, Duration::from_secs(30));
    }
}
