//! Runtime configuration from environment variables (and `.env`, if present).

use crate::ai::AiConfig;
use crate::sampler::{DEFAULT_DOMAIN, DEFAULT_STEPS};
use crate::session::DEFAULT_HISTORY_LIMIT;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_AI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub domain: (f64, f64),
    pub steps: usize,
    pub history_limit: usize,
    pub log_file: Option<PathBuf>,
    pub ai: AiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            domain: DEFAULT_DOMAIN,
            steps: DEFAULT_STEPS,
            history_limit: DEFAULT_HISTORY_LIMIT,
            log_file: None,
            ai: AiConfig {
                api_key: String::new(),
                model: DEFAULT_AI_MODEL.to_string(),
                timeout_seconds: DEFAULT_AI_TIMEOUT_SECS,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let min = parse_or(&lookup, "SCI_CALC_DOMAIN_MIN", defaults.domain.0);
        let max = parse_or(&lookup, "SCI_CALC_DOMAIN_MAX", defaults.domain.1);
        let domain = if min < max {
            (min, max)
        } else {
            warn!("plot domain [{}, {}] is empty, using default", min, max);
            defaults.domain
        };

        let api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .unwrap_or_default();

        AppConfig {
            domain,
            steps: parse_or(&lookup, "SCI_CALC_STEPS", defaults.steps),
            history_limit: parse_or(&lookup, "SCI_CALC_HISTORY_LIMIT", defaults.history_limit),
            log_file: lookup("SCI_CALC_LOG").filter(|s| !s.is_empty()).map(PathBuf::from),
            ai: AiConfig {
                api_key,
                model: lookup("SCI_CALC_AI_MODEL").unwrap_or(defaults.ai.model),
                timeout_seconds: parse_or(
                    &lookup,
                    "SCI_CALC_AI_TIMEOUT_SECS",
                    defaults.ai.timeout_seconds,
                ),
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {}={:?}", key, raw);
            default
        }),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.domain, (-10.0, 10.0));
        assert_eq!(config.steps, 200);
        assert_eq!(config.history_limit, 10);
        assert!(config.log_file.is_none());
        assert!(config.ai.api_key.is_empty());
        assert_eq!(config.ai.model, DEFAULT_AI_MODEL);
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("SCI_CALC_DOMAIN_MIN", "-2"),
            ("SCI_CALC_DOMAIN_MAX", "2"),
            ("SCI_CALC_STEPS", "4"),
            ("SCI_CALC_LOG", "/tmp/sci-calc.log"),
            ("GEMINI_API_KEY", "k"),
        ]);
        assert_eq!(config.domain, (-2.0, 2.0));
        assert_eq!(config.steps, 4);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/sci-calc.log")));
        assert_eq!(config.ai.api_key, "k");
    }

    #[test]
    fn api_key_falls_back() {
        let config = config_from(&[("API_KEY", "legacy")]);
        assert_eq!(config.ai.api_key, "legacy");
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = config_from(&[
            ("SCI_CALC_STEPS", "many"),
            ("SCI_CALC_DOMAIN_MIN", "5"),
            ("SCI_CALC_DOMAIN_MAX", "1"),
        ]);
        assert_eq!(config.steps, 200);
        assert_eq!(config.domain, (-10.0, 10.0));
    }
}
