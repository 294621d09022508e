//! Shared configuration for the tint supervisor.
//!
//! Values are layered by `ortho_config`: built-in defaults first, then an
//! optional configuration file, then `TINT_*` environment variables, and
//! finally command-line flags. The supervisor binary only hands the flags
//! listed in [`CONFIG_CLI_FLAGS`] to the loader; every other argument is
//! forwarded to the worker process untouched.

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod defaults;
mod logging;

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_WORKER_LOCALE, DEFAULT_WORKER_PATH, DEFAULT_WORKER_VERBOSE_FLAG,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Command-line flags recognised by the configuration loader.
///
/// Keep in sync with the fields of [`Config`].
pub const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--worker-path",
    "--worker-verbose-flag",
    "--worker-locale",
    "--log-filter",
    "--log-format",
];

/// Resolved supervisor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TINT")]
pub struct Config {
    /// Worker executable, resolved through `PATH` when given as a bare name.
    #[serde(default = "defaults::default_worker_path")]
    #[ortho_config(default = defaults::default_worker_path())]
    pub worker_path: String,
    /// Flag inserted ahead of the worker arguments when missing. Empty disables it.
    #[serde(default = "defaults::default_worker_verbose_flag")]
    #[ortho_config(default = defaults::default_worker_verbose_flag())]
    pub worker_verbose_flag: String,
    /// Locale forced onto the worker environment.
    #[serde(default = "defaults::default_worker_locale")]
    #[ortho_config(default = defaults::default_worker_locale())]
    pub worker_locale: String,
    /// Tracing filter expression.
    #[serde(default = "defaults::default_log_filter_string")]
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format for structured logs.
    #[serde(default = "defaults::default_log_format")]
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_path: defaults::default_worker_path(),
            worker_verbose_flag: defaults::default_worker_verbose_flag(),
            worker_locale: defaults::default_worker_locale(),
            log_filter: defaults::default_log_filter_string(),
            log_format: defaults::default_log_format(),
        }
    }
}

impl Config {
    /// Worker executable path.
    #[must_use]
    pub fn worker_path(&self) -> &str {
        &self.worker_path
    }

    /// Flag to insert ahead of the worker arguments, if any.
    #[must_use]
    pub fn worker_verbose_flag(&self) -> Option<&str> {
        let flag = self.worker_verbose_flag.trim();
        (!flag.is_empty()).then_some(flag)
    }

    /// Locale forced onto the worker environment.
    #[must_use]
    pub fn worker_locale(&self) -> &str {
        &self.worker_locale
    }

    /// Tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format for structured logs.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
