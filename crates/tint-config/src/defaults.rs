//! Default values shared by the configuration loader and serde.

use crate::logging::LogFormat;

/// Worker executable launched when no path is configured.
pub const DEFAULT_WORKER_PATH: &str = "redshift";

/// Flag that switches the worker into line-reporting mode.
pub const DEFAULT_WORKER_VERBOSE_FLAG: &str = "-v";

/// Locale forced onto the worker so its report lines stay parseable.
pub const DEFAULT_WORKER_LOCALE: &str = "C";

/// Default log filter expression used by the binary.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned worker path used where allocation is required (e.g. serde).
pub fn default_worker_path() -> String {
    DEFAULT_WORKER_PATH.to_owned()
}

/// Owned verbose flag used where allocation is required.
pub fn default_worker_verbose_flag() -> String {
    DEFAULT_WORKER_VERBOSE_FLAG.to_owned()
}

/// Owned worker locale used where allocation is required.
pub fn default_worker_locale() -> String {
    DEFAULT_WORKER_LOCALE.to_owned()
}

/// Owned log filter value used where allocation is required.
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binary.
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
