//! Engine configuration
//!
//! Runtime knobs for the comparison, selection, and adapter layers,
//! loaded from environment variables with sensible defaults.

use std::time::Duration;

use crate::{env_or_default, env_parse_or, ConfigError, FromEnv};

/// Runtime configuration for the cost intelligence engines.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// TTL for catalog/pricing and selection-result caches
    pub cache_ttl: Duration,
    /// Upper bound on a whole comparison fan-out
    pub comparison_timeout: Duration,
    /// Upper bound on a whole selection evaluation
    pub selection_timeout: Duration,
    /// Maximum selection evaluations in flight at once
    pub max_concurrent_evaluations: usize,
    /// Diagnostic target for cache hit ratio reporting
    pub cache_hit_ratio_target: f64,
    /// Retry attempts for transient adapter errors
    pub max_retries: u32,
    /// ISO code all normalized costs are converted into
    pub default_currency: String,
    /// When true the adapter factory hands out fixture-backed adapters
    pub simulation_mode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            comparison_timeout: Duration::from_secs(30),
            selection_timeout: Duration::from_secs(30),
            max_concurrent_evaluations: 10,
            cache_hit_ratio_target: 0.8,
            max_retries: 3,
            default_currency: "USD".to_string(),
            simulation_mode: false,
        }
    }
}

impl FromEnv for EngineConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = EngineConfig::default();

        Ok(Self {
            cache_ttl: Duration::from_secs(env_parse_or("CACHE_TTL_SECS", 300u64)?),
            comparison_timeout: Duration::from_secs(env_parse_or("COMPARISON_TIMEOUT_SECS", 30u64)?),
            selection_timeout: Duration::from_secs(env_parse_or("SELECTION_TIMEOUT_SECS", 30u64)?),
            max_concurrent_evaluations: env_parse_or("MAX_CONCURRENT_EVALUATIONS", 10usize)?,
            cache_hit_ratio_target: env_parse_or("CACHE_HIT_RATIO_TARGET", 0.8f64)?,
            max_retries: env_parse_or("MAX_RETRIES", 3u32)?,
            default_currency: env_or_default("DEFAULT_CURRENCY", &defaults.default_currency),
            simulation_mode: env_parse_or("SIMULATION_MODE", false)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults() {
        temp_env::with_vars_unset(
            [
                "CACHE_TTL_SECS",
                "COMPARISON_TIMEOUT_SECS",
                "SELECTION_TIMEOUT_SECS",
                "MAX_CONCURRENT_EVALUATIONS",
                "MAX_RETRIES",
                "DEFAULT_CURRENCY",
                "SIMULATION_MODE",
            ],
            || {
                let config = EngineConfig::from_env().unwrap();
                assert_eq!(config.cache_ttl, Duration::from_secs(300));
                assert_eq!(config.comparison_timeout, Duration::from_secs(30));
                assert_eq!(config.selection_timeout, Duration::from_secs(30));
                assert_eq!(config.max_concurrent_evaluations, 10);
                assert_eq!(config.max_retries, 3);
                assert_eq!(config.default_currency, "USD");
                assert!(!config.simulation_mode);
            },
        );
    }

    #[test]
    fn test_engine_config_overrides() {
        temp_env::with_vars(
            [
                ("CACHE_TTL_SECS", Some("60")),
                ("COMPARISON_TIMEOUT_SECS", Some("5")),
                ("MAX_CONCURRENT_EVALUATIONS", Some("2")),
                ("DEFAULT_CURRENCY", Some("EUR")),
                ("SIMULATION_MODE", Some("true")),
            ],
            || {
                let config = EngineConfig::from_env().unwrap();
                assert_eq!(config.cache_ttl, Duration::from_secs(60));
                assert_eq!(config.comparison_timeout, Duration::from_secs(5));
                assert_eq!(config.max_concurrent_evaluations, 2);
                assert_eq!(config.default_currency, "EUR");
                assert!(config.simulation_mode);
            },
        );
    }

    #[test]
    fn test_engine_config_rejects_invalid_timeout() {
        temp_env::with_var("COMPARISON_TIMEOUT_SECS", Some("soon"), || {
            let err = EngineConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("COMPARISON_TIMEOUT_SECS"));
        });
    }
}
