//! Pool and executor configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, ConfigError, RetryPolicy};

/// Prefix of every environment variable read by [`ExecutorConfig::from_env`].
pub const ENV_PREFIX: &str = "TASK_CORE_";

/// Name of the pool created when configuration comes from the environment.
const DEFAULT_POOL: &str = "default";

/// Worker pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum tasks running at once.
    pub concurrency: usize,
    /// Optional per-task timeout in milliseconds.
    pub task_timeout_ms: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            concurrency: num_cpus::get(),
            task_timeout_ms: None,
        }
    }
}

impl PoolConfig {
    /// Validate pool configuration values.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for a zero concurrency or zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::invalid("concurrency", "must be greater than 0"));
        }
        if self.task_timeout_ms == Some(0) {
            return Err(ConfigError::invalid(
                "task_timeout_ms",
                "must be greater than 0 when set",
            ));
        }
        Ok(())
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry in milliseconds.
    pub initial_delay_ms: u64,
    /// Factor applied to the wait after each retry.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_retries: policy.max_retries,
            initial_delay_ms: u64::try_from(policy.initial_delay.as_millis()).unwrap_or(u64::MAX),
            backoff_multiplier: policy.backoff_multiplier,
        }
    }
}

impl RetryConfig {
    /// Convert into a runtime policy.
    pub const fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
        }
    }

    /// Validate retry configuration values.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] when the multiplier is below one or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_policy().validate()
    }
}

/// Root executor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Map of pool name to configuration.
    pub pools: HashMap<String, PoolConfig>,
    /// Retry policy shared by retry executors built from this config.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            pools: HashMap::from([(DEFAULT_POOL.to_string(), PoolConfig::default())]),
            retry: RetryConfig::default(),
        }
    }
}

impl ExecutorConfig {
    /// Validate all pools and ensure at least one pool exists.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the offending pool or field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pools.is_empty() {
            return Err(ConfigError::invalid("pools", "at least one pool must be defined"));
        }
        for (name, pool) in &self.pools {
            pool.validate().map_err(|e| match e {
                ConfigError::Invalid { field, reason } => {
                    ConfigError::invalid(format!("pools.{name}.{field}"), reason)
                }
                other => other,
            })?;
        }
        self.retry.validate()
    }

    /// Parse executor configuration from a JSON string and validate.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed JSON, otherwise the validation error.
    pub fn from_json_str(input: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(input)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Build configuration from `TASK_CORE_*` environment variables, loading
    /// a `.env` file first when one is present.
    ///
    /// Recognized variables: `TASK_CORE_CONCURRENCY`, `TASK_CORE_TASK_TIMEOUT_MS`,
    /// `TASK_CORE_MAX_RETRIES`, `TASK_CORE_INITIAL_DELAY_MS`,
    /// `TASK_CORE_BACKOFF_MULTIPLIER`. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Fails when a variable does not parse or the result is invalid.
    pub fn from_env() -> AppResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup. Names passed to
    /// `lookup` include [`ENV_PREFIX`].
    ///
    /// # Errors
    ///
    /// Fails when a variable does not parse or the result is invalid.
    pub fn from_lookup<L>(lookup: L) -> AppResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let read = |suffix: &str| {
            let name = format!("{ENV_PREFIX}{suffix}");
            lookup(&name).map(|value| (name, value))
        };

        let mut pool = PoolConfig::default();
        if let Some((name, value)) = read("CONCURRENCY") {
            pool.concurrency = value.trim().parse().with_context(|| format!("parsing {name}"))?;
        }
        if let Some((name, value)) = read("TASK_TIMEOUT_MS") {
            pool.task_timeout_ms =
                Some(value.trim().parse().with_context(|| format!("parsing {name}"))?);
        }

        let mut retry = RetryConfig::default();
        if let Some((name, value)) = read("MAX_RETRIES") {
            retry.max_retries = value.trim().parse().with_context(|| format!("parsing {name}"))?;
        }
        if let Some((name, value)) = read("INITIAL_DELAY_MS") {
            retry.initial_delay_ms =
                value.trim().parse().with_context(|| format!("parsing {name}"))?;
        }
        if let Some((name, value)) = read("BACKOFF_MULTIPLIER") {
            retry.backoff_multiplier =
                value.trim().parse().with_context(|| format!("parsing {name}"))?;
        }

        let cfg = Self {
            pools: HashMap::from([(DEFAULT_POOL.to_string(), pool)]),
            retry,
        };
        cfg.validate().context("invalid environment configuration")?;
        Ok(cfg)
    }
}
