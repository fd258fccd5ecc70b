//! Environment variable names read by [`Config::from_env`].
//!
//! These are purely helpers; the logger itself only ever sees a
//! [`Config`] value.
//!
//! [`Config`]: crate::config::Config
//! [`Config::from_env`]: crate::config::Config::from_env

/// Log file path; unset or empty means stderr.
pub const LOG_ENRICH_OUTPUT_ENV: &str = "LOG_ENRICH_OUTPUT";

/// Minimum severity, e.g. `debug`.
pub const LOG_ENRICH_LEVEL_ENV: &str = "LOG_ENRICH_LEVEL";

/// Also copy file output to stderr.
pub const LOG_ENRICH_VERBOSE_ENV: &str = "LOG_ENRICH_VERBOSE";

/// Turn colour rendering off.
pub const LOG_ENRICH_DISABLE_COLORS_ENV: &str = "LOG_ENRICH_DISABLE_COLORS";

/// Component name attached to every record.
pub const LOG_ENRICH_PREFIX_ENV: &str = "LOG_ENRICH_PREFIX";

/// Attach the call site to every record.
pub const LOG_ENRICH_SHOW_CALLER_ENV: &str = "LOG_ENRICH_SHOW_CALLER";

/// Extra frames to skip past the logger when resolving the call site.
pub const LOG_ENRICH_CALLER_DEPTH_ENV: &str = "LOG_ENRICH_CALLER_DEPTH";

/// Trailing path segments kept in the call site.
pub const LOG_ENRICH_CALLER_PATH_LEN_ENV: &str = "LOG_ENRICH_CALLER_PATH_LEN";

/// Parse the usual spellings of a boolean flag.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
