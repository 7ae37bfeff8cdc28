//! Configuration from environment variables
//!
//! `EngineConfig` covers the library; `RuntimeConfig` the `trade_runtime`
//! binary. Both fall back to defaults for unset or unparsable variables and
//! leave range checks to `validate()`.

use crate::pipeline::ingestion::DrainPolicy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Engine tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Bound on `top_trades` in published summaries
    pub summary_item_count: usize,

    /// Delay after a cycle that drained events
    pub busy_poll_interval: Duration,

    /// Delay after a cycle that found the buffer empty
    pub idle_poll_interval: Duration,

    /// Delay before the first drain cycle
    pub startup_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            summary_item_count: 5,
            busy_poll_interval: Duration::from_millis(100),
            idle_poll_interval: Duration::from_millis(500),
            startup_delay: Duration::from_millis(200),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `TRADEFLOW_SUMMARY_SIZE` (default: 5)
    /// - `TRADEFLOW_BUSY_POLL_MS` (default: 100)
    /// - `TRADEFLOW_IDLE_POLL_MS` (default: 500)
    /// - `TRADEFLOW_STARTUP_DELAY_MS` (default: 200)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            summary_item_count: parse_var("TRADEFLOW_SUMMARY_SIZE")
                .unwrap_or(defaults.summary_item_count),

            busy_poll_interval: parse_var("TRADEFLOW_BUSY_POLL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.busy_poll_interval),

            idle_poll_interval: parse_var("TRADEFLOW_IDLE_POLL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.idle_poll_interval),

            startup_delay: parse_var("TRADEFLOW_STARTUP_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.startup_delay),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.busy_poll_interval.is_zero() || self.idle_poll_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "poll intervals must be greater than zero".to_string(),
            ));
        }

        if self.busy_poll_interval > self.idle_poll_interval {
            return Err(ConfigError::InvalidValue(format!(
                "busy poll interval ({:?}) must not exceed idle poll interval ({:?})",
                self.busy_poll_interval, self.idle_poll_interval
            )));
        }

        Ok(())
    }

    pub fn drain_policy(&self) -> DrainPolicy {
        DrainPolicy {
            busy_interval: self.busy_poll_interval,
            idle_interval: self.idle_poll_interval,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Log,
    Jsonl,
}

impl SinkKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "log" => Some(SinkKind::Log),
            "jsonl" => Some(SinkKind::Jsonl),
            _ => None,
        }
    }

    /// `--sink <kind>` on the command line wins over `TRADEFLOW_SINK`
    pub fn from_args_or_env() -> Result<Self, ConfigError> {
        let args: Vec<String> = env::args().collect();
        let from_args = args
            .iter()
            .position(|arg| arg == "--sink")
            .and_then(|idx| args.get(idx + 1).cloned());

        match from_args.or_else(|| env::var("TRADEFLOW_SINK").ok()) {
            Some(value) => Self::parse(&value).ok_or_else(|| {
                ConfigError::InvalidValue(format!("unknown sink '{}' (expected log or jsonl)", value))
            }),
            None => Ok(SinkKind::Log),
        }
    }
}

/// Settings for the `trade_runtime` binary
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    pub snapshot_path: Option<PathBuf>,
    pub sink: SinkKind,
    pub jsonl_path: PathBuf,
    pub report_top: usize,
    pub burst_unit: usize,
}

impl RuntimeConfig {
    /// Environment variables (besides those of [`EngineConfig::from_env`]):
    /// - `TRADEFLOW_SNAPSHOT_PATH` (optional)
    /// - `TRADEFLOW_SINK` (default: log; `--sink` overrides)
    /// - `TRADEFLOW_JSONL_PATH` (default: summaries.jsonl)
    /// - `TRADEFLOW_REPORT_TOP` (default: 10)
    /// - `TRADEFLOW_BURST_UNIT` (default: 100000)
    pub fn from_env() -> Result<Self, ConfigError> {
        let engine = EngineConfig::from_env();
        engine.validate()?;

        let burst_unit = parse_var("TRADEFLOW_BURST_UNIT").unwrap_or(100_000);
        if burst_unit == 0 {
            return Err(ConfigError::InvalidValue(
                "TRADEFLOW_BURST_UNIT must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            engine,
            snapshot_path: env::var("TRADEFLOW_SNAPSHOT_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            sink: SinkKind::from_args_or_env()?,
            jsonl_path: env::var("TRADEFLOW_JSONL_PATH")
                .unwrap_or_else(|_| "summaries.jsonl".to_string())
                .into(),
            report_top: parse_var("TRADEFLOW_REPORT_TOP").unwrap_or(10),
            burst_unit,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.summary_item_count, 5);
        assert_eq!(config.busy_poll_interval, Duration::from_millis(100));
        assert_eq!(config.idle_poll_interval, Duration::from_millis(500));
        assert_eq!(config.startup_delay, Duration::from_millis(200));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_engine_config_from_env() {
        // All env mutation for engine vars lives in this one test
        env::set_var("TRADEFLOW_SUMMARY_SIZE", "8");
        env::set_var("TRADEFLOW_BUSY_POLL_MS", "20");
        env::set_var("TRADEFLOW_IDLE_POLL_MS", "not-a-number");
        env::remove_var("TRADEFLOW_STARTUP_DELAY_MS");

        let config = EngineConfig::from_env();

        assert_eq!(config.summary_item_count, 8);
        assert_eq!(config.busy_poll_interval, Duration::from_millis(20));
        assert_eq!(config.idle_poll_interval, Duration::from_millis(500));
        assert_eq!(config.startup_delay, Duration::from_millis(200));

        env::remove_var("TRADEFLOW_SUMMARY_SIZE");
        env::remove_var("TRADEFLOW_BUSY_POLL_MS");
        env::remove_var("TRADEFLOW_IDLE_POLL_MS");
    }

    #[test]
    fn test_validate_rejects_bad_intervals() {
        let zero = EngineConfig {
            busy_poll_interval: Duration::ZERO,
            ..EngineConfig::default()
        };
        assert!(matches!(zero.validate(), Err(ConfigError::InvalidValue(_))));

        let inverted = EngineConfig {
            busy_poll_interval: Duration::from_secs(2),
            idle_poll_interval: Duration::from_secs(1),
            ..EngineConfig::default()
        };
        assert!(matches!(inverted.validate(), Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_sink_kind_parse() {
        assert_eq!(SinkKind::parse("log"), Some(SinkKind::Log));
        assert_eq!(SinkKind::parse("JSONL"), Some(SinkKind::Jsonl));
        assert_eq!(SinkKind::parse("sqlite"), None);
    }

    #[test]
    fn test_drain_policy_mirrors_intervals() {
        let policy = EngineConfig::default().drain_policy();

        assert_eq!(policy.busy_interval, Duration::from_millis(100));
        assert_eq!(policy.idle_interval, Duration::from_millis(500));
    }
}
