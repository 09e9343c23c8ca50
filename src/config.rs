//! Runtime configuration from environment variables (and `.env` via dotenvy).

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

use crate::ledger::SellPolicy;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEV_JWT_SECRET: &str = "celeb-exchange-dev-secret";
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub jwt_secret: Vec<u8>,
    pub session_ttl_hours: i64,
    pub sell_policy: SellPolicy,
}

impl Config {
    /// Reads `BIND_ADDR`, `JWT_SECRET`, `SESSION_TTL_HOURS` and `SELL_POLICY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            var: "BIND_ADDR",
            value: bind_raw.clone(),
            reason: "expected host:port",
        })?;

        let jwt_secret = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret.into_bytes(),
            None => {
                tracing::warn!("JWT_SECRET not set, using development secret");
                DEV_JWT_SECRET.as_bytes().to_vec()
            }
        };

        let session_ttl_hours = match lookup("SESSION_TTL_HOURS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(hours) if hours > 0 => hours,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "SESSION_TTL_HOURS",
                        value: raw,
                        reason: "expected a positive whole number of hours",
                    });
                }
            },
            None => DEFAULT_SESSION_TTL_HOURS,
        };

        let sell_policy = match lookup("SELL_POLICY") {
            Some(raw) => parse_sell_policy(&raw).ok_or(ConfigError::Invalid {
                var: "SELL_POLICY",
                value: raw,
                reason: "expected permissive or strict",
            })?,
            None => SellPolicy::default(),
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            session_ttl_hours,
            sell_policy,
        })
    }
}

fn parse_sell_policy(raw: &str) -> Option<SellPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "permissive" => Some(SellPolicy::Permissive),
        "strict" => Some(SellPolicy::Strict),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET.as_bytes());
        assert_eq!(config.session_ttl_hours, DEFAULT_SESSION_TTL_HOURS);
        assert_eq!(config.sell_policy, SellPolicy::Permissive);
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("JWT_SECRET", "s3cret"),
            ("SESSION_TTL_HOURS", "2"),
            ("SELL_POLICY", "Strict"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.jwt_secret, b"s3cret");
        assert_eq!(config.session_ttl_hours, 2);
        assert_eq!(config.sell_policy, SellPolicy::Strict);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup_from(&[("BIND_ADDR", "nope")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("SESSION_TTL_HOURS", "0")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("SELL_POLICY", "loose")])).is_err());
    }
}
