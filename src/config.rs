use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_RENDER_URL: &str = "https://flight-predictor-model-ro8r.onrender.com";
pub const DEFAULT_LOCAL_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_FORM_IDLE_TTL_SECS: u64 = 30 * 60;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{var}: '{value}' is not a socket address")]
    InvalidBind { var: &'static str, value: String },
    #[error("{var}: '{value}' is not an http(s) url")]
    InvalidUrl { var: &'static str, value: String },
    #[error("{var}: '{value}' is not a positive number of seconds")]
    InvalidSeconds { var: &'static str, value: String },
}

/// Runtime settings, read from `FLIGHT_FORM_*` environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub render_url: String,
    pub local_url: String,
    /// No timeout unless configured
    pub request_timeout: Option<Duration>,
    /// Forms untouched for this long are dropped
    pub form_idle_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_var = "FLIGHT_FORM_BIND";
        let bind_raw = lookup(bind_var).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBind {
                var: bind_var,
                value: bind_raw.clone(),
            })?;

        let render_url = url_var(&lookup, "FLIGHT_FORM_RENDER_URL", DEFAULT_RENDER_URL)?;
        let local_url = url_var(&lookup, "FLIGHT_FORM_LOCAL_URL", DEFAULT_LOCAL_URL)?;

        let request_timeout = match lookup("FLIGHT_FORM_TIMEOUT_SECS") {
            None => None,
            Some(raw) => Some(seconds("FLIGHT_FORM_TIMEOUT_SECS", &raw)?),
        };

        let form_idle_ttl = match lookup("FLIGHT_FORM_IDLE_TTL_SECS") {
            None => Duration::from_secs(DEFAULT_FORM_IDLE_TTL_SECS),
            Some(raw) => seconds("FLIGHT_FORM_IDLE_TTL_SECS", &raw)?,
        };

        Ok(Self {
            bind,
            render_url,
            local_url,
            request_timeout,
            form_idle_ttl,
        })
    }
}

fn seconds(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidSeconds {
            var,
            value: raw.to_string(),
        }),
    }
}

fn url_var(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: &str,
) -> Result<String, ConfigError> {
    let value = lookup(var).unwrap_or_else(|| default.to_string());
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value)
    } else {
        Err(ConfigError::InvalidUrl { var, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
        assert_eq!(config.render_url, DEFAULT_RENDER_URL);
        assert_eq!(config.local_url, DEFAULT_LOCAL_URL);
        assert!(config.request_timeout.is_none());
        assert_eq!(
            config.form_idle_ttl,
            Duration::from_secs(DEFAULT_FORM_IDLE_TTL_SECS)
        );
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("FLIGHT_FORM_BIND", "0.0.0.0:9000"),
            ("FLIGHT_FORM_LOCAL_URL", "http://model:8000"),
            ("FLIGHT_FORM_TIMEOUT_SECS", "90"),
            ("FLIGHT_FORM_IDLE_TTL_SECS", "600"),
        ]))
        .unwrap();
        assert_eq!(config.form_idle_ttl, Duration::from_secs(600));
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.local_url, "http://model:8000");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("FLIGHT_FORM_BIND", "localhost")])),
            Err(ConfigError::InvalidBind { .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("FLIGHT_FORM_RENDER_URL", "ftp://x")])),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            AppConfig::from_lookup(lookup(&[("FLIGHT_FORM_TIMEOUT_SECS", "0")])),
            Err(ConfigError::InvalidSeconds { .. })
        ));
    }
}
