//! Sync client configuration.
//!
//! Configuration is layered with the `config` crate, later sources overriding
//! earlier ones:
//! 1. Bundled defaults (`execwatch.toml` shipped with the workspace)
//! 2. `~/.config/execwatch/execwatch.toml`
//! 3. `./execwatch.toml`
//! 4. An explicit file, when one is given
//! 5. `EXECWATCH_`-prefixed environment variables

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use execwatch_core::{BackoffPolicy, DEFAULT_RUNNING_LIMIT};
use execwatch_error::{BuilderError, BuilderErrorKind, ConfigError, ExecwatchError, ExecwatchResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// Settings for one sync client instance.
///
/// # Example
///
/// ```
/// use execwatch_client::SyncConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SyncConfig::builder()
///     .server_url("ws://127.0.0.1:9000/ws")
///     .max_reconnect_attempts(5)
///     .build()?;
///
/// assert_eq!(*config.keep_alive_secs(), 30);
/// assert_eq!(*config.max_reconnect_attempts(), Some(5));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(build_fn(private, name = "build_internal"))]
#[serde(default)]
pub struct SyncConfig {
    /// Event source endpoint (`ws://` or `wss://`)
    #[builder(setter(into), default = "default_server_url()")]
    server_url: String,

    /// Seconds between keep-alive pings
    #[builder(default = "default_keep_alive_secs()")]
    keep_alive_secs: u64,

    /// Seconds allowed for a connection to open
    #[builder(default = "default_connect_timeout_secs()")]
    connect_timeout_secs: u64,

    /// Initial reconnect delay in milliseconds
    #[builder(default = "default_backoff_base_ms()")]
    backoff_base_ms: u64,

    /// Reconnect delay ceiling in milliseconds
    #[builder(default = "default_backoff_max_ms()")]
    backoff_max_ms: u64,

    /// Reconnect attempts before giving up (`None` retries forever)
    #[builder(setter(strip_option), default)]
    max_reconnect_attempts: Option<u32>,

    /// Entries kept in the running-executions list
    #[builder(default = "DEFAULT_RUNNING_LIMIT")]
    running_limit: usize,
}

/// Upper bound for `keep_alive_secs` and `connect_timeout_secs`.
pub const MAX_PERIOD_SECS: u64 = 86_400;

/// Upper bound for `backoff_max_ms`.
pub const MAX_BACKOFF_MS: u64 = MAX_PERIOD_SECS * 1000;

fn default_server_url() -> String {
    "ws://localhost:8000/ws".to_string()
}

fn default_keep_alive_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_backoff_max_ms() -> u64 {
    30_000
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            keep_alive_secs: default_keep_alive_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            max_reconnect_attempts: None,
            running_limit: DEFAULT_RUNNING_LIMIT,
        }
    }
}

impl SyncConfigBuilder {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any value fails [`SyncConfig::validate`].
    pub fn build(&self) -> ExecwatchResult<SyncConfig> {
        let config = self.build_internal().map_err(|e| {
            let kind = match e {
                SyncConfigBuilderError::UninitializedField(field) => {
                    BuilderErrorKind::MissingField(field)
                }
                SyncConfigBuilderError::ValidationError(message) => {
                    BuilderErrorKind::ValidationFailed(message)
                }
            };
            BuilderError::new("SyncConfig", kind)
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl SyncConfig {
    /// Creates a new config builder.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Load configuration from a specific file path.
    ///
    /// Keys missing from the file take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> ExecwatchResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ExecwatchError::from(ConfigError::load(
                    path.as_ref().display().to_string(),
                    e.to_string(),
                ))
            })?
            .try_deserialize()
            .map_err(|e| {
                ExecwatchError::from(ConfigError::parse(e.to_string()))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: environment > user files > bundled default.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use execwatch_client::SyncConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = SyncConfig::load()?;
    /// println!("Connecting to {}", config.server_url());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load() -> ExecwatchResult<Self> {
        Self::load_with_override(None)
    }

    /// Layered load with an optional explicit file above the user files.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing, or if any source
    /// fails to parse or the result fails validation.
    #[instrument(skip(path))]
    pub fn load_with_override(path: Option<&Path>) -> ExecwatchResult<Self> {
        debug!("Loading configuration with precedence: env > file > current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../execwatch.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/execwatch/execwatch.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("execwatch").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(Environment::with_prefix("EXECWATCH").try_parsing(true));

        let config: Self = builder
            .build()
            .map_err(|e| {
                ExecwatchError::from(ConfigError::load("layered configuration", e.to_string()))
            })?
            .try_deserialize()
            .map_err(|e| {
                ExecwatchError::from(ConfigError::parse(e.to_string()))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first invalid setting. Periods
    /// must lie in `1..=MAX_PERIOD_SECS`.
    pub fn validate(&self) -> ExecwatchResult<()> {
        if !(self.server_url.starts_with("ws://") || self.server_url.starts_with("wss://")) {
            return Err(ConfigError::invalid(
                "server_url",
                format!("must start with ws:// or wss://, got '{}'", self.server_url),
            )
            .into());
        }
        check_period("keep_alive_secs", self.keep_alive_secs)?;
        check_period("connect_timeout_secs", self.connect_timeout_secs)?;
        if self.backoff_base_ms == 0 {
            return Err(ConfigError::invalid("backoff_base_ms", "must be greater than zero").into());
        }
        if self.backoff_max_ms < self.backoff_base_ms {
            return Err(ConfigError::invalid(
                "backoff_max_ms",
                format!(
                    "{} is below backoff_base_ms ({})",
                    self.backoff_max_ms, self.backoff_base_ms
                ),
            )
            .into());
        }
        if self.backoff_max_ms > MAX_BACKOFF_MS {
            return Err(ConfigError::invalid(
                "backoff_max_ms",
                format!("must not exceed {}", MAX_BACKOFF_MS),
            )
            .into());
        }
        if self.running_limit == 0 {
            return Err(ConfigError::invalid("running_limit", "must be greater than zero").into());
        }
        Ok(())
    }

    /// Reconnect delay policy derived from the backoff settings.
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(
            Duration::from_millis(self.backoff_base_ms.min(MAX_BACKOFF_MS)),
            Duration::from_millis(self.backoff_max_ms.min(MAX_BACKOFF_MS)),
        )
    }

    /// Keep-alive period, clamped to [`MAX_PERIOD_SECS`].
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs.min(MAX_PERIOD_SECS))
    }

    /// Connection-open timeout, clamped to [`MAX_PERIOD_SECS`].
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.min(MAX_PERIOD_SECS))
    }

    /// Replace the server URL, e.g. from a command-line flag.
    pub fn with_server_url(mut self, server_url: impl Into<String>) -> Self {
        self.server_url = server_url.into();
        self
    }

    /// Replace the reconnect ceiling.
    pub fn with_max_reconnect_attempts(mut self, attempts: Option<u32>) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }
}

fn check_period(key: &'static str, secs: u64) -> ExecwatchResult<()> {
    if secs == 0 {
        return Err(ConfigError::invalid(key, "must be greater than zero").into());
    }
    if secs > MAX_PERIOD_SECS {
        return Err(ConfigError::invalid(
            key,
            format!("{} exceeds the maximum of {} seconds", secs, MAX_PERIOD_SECS),
        )
        .into());
    }
    Ok(())
}
