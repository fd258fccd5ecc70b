use crate::env::*;
use crate::resolver::DEFAULT_PATH_LEN;
use serde::Deserialize;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

/// Logger configuration.
///
/// **Fields**
/// - `output`: log file path. `None`, empty or `"stderr"` write to stderr.
///   The file is opened for append and its directory created on demand.
/// - `level`: minimum severity name; empty means `info`.
/// - `verbose`: when writing to a file, also copy every line to stderr.
/// - `disable_colors`: colour rendering is off; the prefix is then also
///   recorded under `@prefix`.
/// - `prefix`: component name attached to every record.
/// - `show_caller`: attach the call site (`@at`) to every record.
/// - `caller_depth_adjust`: extra frames to skip past the logger, for
///   loggers wrapped by helper functions.
/// - `caller_path_len`: trailing path segments kept in `@at`; 0 keeps the
///   whole path.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub output: Option<String>,
    pub level: String,
    pub verbose: bool,
    pub disable_colors: bool,
    pub prefix: Option<String>,
    pub show_caller: bool,
    pub caller_depth_adjust: usize,
    pub caller_path_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: None,
            level: "info".to_string(),
            verbose: false,
            disable_colors: false,
            prefix: None,
            show_caller: false,
            caller_depth_adjust: 0,
            caller_path_len: DEFAULT_PATH_LEN,
        }
    }
}

/// Configuration problems. Destination errors are recovered by falling back
/// to stderr.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("create log directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("open log file {}: {source}", .path.display())]
    OpenFile { path: PathBuf, source: io::Error },

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

impl Config {
    /// Build a configuration from `LOG_ENRICH_*` environment variables.
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup using the
    /// `LOG_ENRICH_*` names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(output) = lookup(LOG_ENRICH_OUTPUT_ENV) {
            config.output = Some(output).filter(|o| !o.is_empty());
        }
        if let Some(level) = lookup(LOG_ENRICH_LEVEL_ENV) {
            config.level = level;
        }
        if let Some(prefix) = lookup(LOG_ENRICH_PREFIX_ENV) {
            config.prefix = Some(prefix).filter(|p| !p.is_empty());
        }
        config.verbose = flag(&lookup, LOG_ENRICH_VERBOSE_ENV, config.verbose)?;
        config.disable_colors = flag(&lookup, LOG_ENRICH_DISABLE_COLORS_ENV, config.disable_colors)?;
        config.show_caller = flag(&lookup, LOG_ENRICH_SHOW_CALLER_ENV, config.show_caller)?;
        config.caller_depth_adjust = number(&lookup, LOG_ENRICH_CALLER_DEPTH_ENV, config.caller_depth_adjust)?;
        config.caller_path_len = number(&lookup, LOG_ENRICH_CALLER_PATH_LEN_ENV, config.caller_path_len)?;
        Ok(config)
    }

    /// Severity threshold; an empty level means `info`.
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        let level = self.level.trim();
        if level.is_empty() {
            return Ok(LevelFilter::INFO);
        }
        LevelFilter::from_str(level).map_err(|_| ConfigError::InvalidValue {
            key: "level",
            value: self.level.clone(),
        })
    }

    /// `prefix`, ignoring an empty string.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref().filter(|p| !p.is_empty())
    }
}

fn flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => parse_flag(&value).ok_or(ConfigError::InvalidValue { key, value }),
    }
}

fn number<F>(lookup: &F, key: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}
