//! Server configuration loaded from environment variables.
//!
//! Every setting has a development default except `JWT_SECRET`. Parsing goes
//! through [`ServerConfig::from_lookup`] so tests can supply variables
//! without touching the process environment.

use std::fmt::Display;
use std::str::FromStr;

use vinco_core::claims::{validate_claim_ttl, DEFAULT_CLAIM_TTL_MINS, DEFAULT_SWEEP_INTERVAL_SECS};
use vinco_core::error::CoreError;
use vinco_core::ingest::{ThresholdPolicy, DEFAULT_AUTO_APPROVE_THRESHOLD, DEFAULT_REVIEW_FLOOR};

use crate::auth::jwt::JwtConfig;

/// A missing or malformed environment variable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Parse `name` from `lookup`, falling back to `default` when unset.
pub(crate) fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

/* --------------------------------------------------------------------------
Logging
-------------------------------------------------------------------------- */

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/* --------------------------------------------------------------------------
Queue
-------------------------------------------------------------------------- */

/// Validation queue tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueConfig {
    /// Claim lifetime in minutes, within `[1, 240]`.
    pub claim_ttl_mins: i64,
    pub auto_approve_threshold: f64,
    /// `None` queues every detection below the auto-approve threshold.
    pub review_floor: Option<f64>,
    pub claim_sweep_interval_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            claim_ttl_mins: DEFAULT_CLAIM_TTL_MINS,
            auto_approve_threshold: DEFAULT_AUTO_APPROVE_THRESHOLD,
            review_floor: Some(DEFAULT_REVIEW_FLOOR),
            claim_sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

impl QueueConfig {
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `CLAIM_TTL_MINS`            | `15`    |
    /// | `AUTO_APPROVE_THRESHOLD`    | `0.85`  |
    /// | `REVIEW_FLOOR`              | `0.5` (`none` disables) |
    /// | `CLAIM_SWEEP_INTERVAL_SECS` | `60`    |
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let claim_ttl_mins = parse_or(lookup, "CLAIM_TTL_MINS", DEFAULT_CLAIM_TTL_MINS)?;
        validate_claim_ttl(claim_ttl_mins).map_err(|reason| ConfigError::Invalid {
            name: "CLAIM_TTL_MINS",
            value: claim_ttl_mins.to_string(),
            reason,
        })?;

        let auto_approve_threshold =
            parse_or(lookup, "AUTO_APPROVE_THRESHOLD", DEFAULT_AUTO_APPROVE_THRESHOLD)?;

        let review_floor = match lookup("REVIEW_FLOOR") {
            Some(raw) if raw.trim().eq_ignore_ascii_case("none") => None,
            _ => Some(parse_or(lookup, "REVIEW_FLOOR", DEFAULT_REVIEW_FLOOR)?),
        };

        let claim_sweep_interval_secs =
            parse_or(lookup, "CLAIM_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS)?;
        if claim_sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "CLAIM_SWEEP_INTERVAL_SECS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        let config = Self {
            claim_ttl_mins,
            auto_approve_threshold,
            review_floor,
            claim_sweep_interval_secs,
        };
        config.policy().map_err(|e| ConfigError::Invalid {
            name: "AUTO_APPROVE_THRESHOLD",
            value: auto_approve_threshold.to_string(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }

    pub fn policy(&self) -> Result<ThresholdPolicy, CoreError> {
        ThresholdPolicy::new(self.auto_approve_threshold, self.review_floor)
    }

    pub fn claim_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.claim_ttl_mins)
    }
}

/* --------------------------------------------------------------------------
Server
-------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// How long background tasks get to stop after the listener closes.
    pub shutdown_timeout_secs: u64,
    /// PostgreSQL URL. `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub log_format: LogFormat,
    pub jwt: JwtConfig,
    pub queue: QueueConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `DATABASE_URL`          | unset (in-memory store) |
    /// | `DB_MAX_CONNECTIONS`    | `20`                    |
    /// | `LOG_FORMAT`            | `pretty`                |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&|name: &str| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = parse_or(lookup, "PORT", 3000u16)?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<String>>();
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| axum::http::HeaderValue::from_str(o).is_err())
        {
            return Err(ConfigError::Invalid {
                name: "CORS_ORIGINS",
                value: bad.clone(),
                reason: "not a valid header value".into(),
            });
        }

        let request_timeout_secs = parse_or(lookup, "REQUEST_TIMEOUT_SECS", 30u64)?;
        let shutdown_timeout_secs = parse_or(lookup, "SHUTDOWN_TIMEOUT_SECS", 30u64)?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let db_max_connections =
            parse_or(lookup, "DB_MAX_CONNECTIONS", vinco_db::DEFAULT_MAX_CONNECTIONS)?;
        let log_format = parse_or(lookup, "LOG_FORMAT", LogFormat::default())?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_url,
            db_max_connections,
            log_format,
            jwt: JwtConfig::from_lookup(lookup)?,
            queue: QueueConfig::from_lookup(lookup)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_with_only_secret_set() {
        let config = ServerConfig::from_lookup(&lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert!(config.database_url.is_none());
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.queue, QueueConfig::default());
        assert_eq!(config.jwt.access_token_expiry_mins, 15);
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert_matches!(
            ServerConfig::from_lookup(&lookup_from(&[])),
            Err(ConfigError::Missing("JWT_SECRET"))
        );
    }

    #[test]
    fn bad_port_names_the_variable() {
        let err = ServerConfig::from_lookup(&lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "PORT", .. });
    }

    #[test]
    fn claim_ttl_outside_bounds_is_rejected() {
        let err = QueueConfig::from_lookup(&lookup_from(&[("CLAIM_TTL_MINS", "500")])).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "CLAIM_TTL_MINS", .. });
    }

    #[test]
    fn review_floor_can_be_disabled() {
        let config = QueueConfig::from_lookup(&lookup_from(&[("REVIEW_FLOOR", "none")])).unwrap();
        assert_eq!(config.review_floor, None);
    }

    #[test]
    fn floor_above_threshold_is_rejected() {
        let err = QueueConfig::from_lookup(&lookup_from(&[
            ("AUTO_APPROVE_THRESHOLD", "0.6"),
            ("REVIEW_FLOOR", "0.7"),
        ]))
        .unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "AUTO_APPROVE_THRESHOLD", .. });
    }

    #[test]
    fn cors_origin_with_control_characters_is_rejected() {
        let err = ServerConfig::from_lookup(&lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("CORS_ORIGINS", "http://ok.test,http://bad\u{7f}.test"),
        ]))
        .unwrap_err();
        assert_matches!(err, ConfigError::Invalid { name: "CORS_ORIGINS", .. });
    }

    #[test]
    fn json_log_format_and_database_url() {
        let config = ServerConfig::from_lookup(&lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("LOG_FORMAT", "JSON"),
            ("DATABASE_URL", "postgres://localhost/vinco"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
        ]))
        .unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/vinco"));
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
    }
}
