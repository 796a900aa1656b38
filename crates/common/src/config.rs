use anyhow::{Context, Result};
use serde::Deserialize;
use validator::Validate;

// Default constants
pub const DEFAULT_MAX_WORKERS: usize = 16;
pub const DEFAULT_FAIL_FAST: bool = false;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 50;
pub const DEFAULT_MAX_DELAY_MS: u64 = 2000;

/// Backoff settings for connection acquisition.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct RetrySettings {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}
fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}

/// Settings for one executor engine instance.
///
/// `max_workers` bounds how many execution groups run concurrently; it is
/// independent of how many connections the pool can hand out.
#[derive(Debug, Deserialize, Clone, Validate)]
pub struct ExecutorSettings {
    #[serde(default = "default_max_workers")]
    #[validate(range(min = 1))]
    pub max_workers: usize,

    /// Process-wide default for the exception policy. Snapshot at the start
    /// of each logical execution.
    #[serde(default = "default_fail_fast")]
    pub fail_fast: bool,

    #[serde(default)]
    pub retry: RetrySettings,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            fail_fast: default_fail_fast(),
            retry: RetrySettings::default(),
        }
    }
}

fn default_max_workers() -> usize {
    DEFAULT_MAX_WORKERS
}

fn default_fail_fast() -> bool {
    DEFAULT_FAIL_FAST
}

impl ExecutorSettings {
    /// Load settings from an optional file, layered with environment
    /// variables. `SHARDFLOW_RETRY__MAX_ATTEMPTS=5` maps to
    /// `retry.max_attempts`, etc.
    pub fn from_file(path: &str) -> Result<Self> {
        let builder = config::Config::builder();

        let builder = if std::path::Path::new(path).exists() {
            builder.add_source(config::File::with_name(path))
        } else {
            builder
        };

        let builder = builder.add_source(
            config::Environment::with_prefix("SHARDFLOW")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build().context("Failed to build configuration")?;

        let settings: ExecutorSettings = cfg
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        settings
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {:?}", e))?;

        Ok(settings)
    }
}
