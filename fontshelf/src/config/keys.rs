//! Type-safe get/set of configuration values by key name.

use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use super::parser::{expand_tilde, parse_dir_list};
use super::settings::ConfigFile;
use super::size::{format_size, parse_size};

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigKeyError {
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    PreviewCacheCapacity,
    PreviewPrefetchDelayMs,
    PreviewMinDwellMs,
    PreviewLoadTimeoutSecs,
    FontsMaxFileSize,
    FontsAllowedDirs,
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Canonical key name (e.g., "preview.cache_capacity").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::PreviewCacheCapacity => "preview.cache_capacity",
            ConfigKey::PreviewPrefetchDelayMs => "preview.prefetch_delay_ms",
            ConfigKey::PreviewMinDwellMs => "preview.min_dwell_ms",
            ConfigKey::PreviewLoadTimeoutSecs => "preview.load_timeout_secs",
            ConfigKey::FontsMaxFileSize => "fonts.max_file_size",
            ConfigKey::FontsAllowedDirs => "fonts.allowed_dirs",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Current value as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::PreviewCacheCapacity => config.preview.cache_capacity.to_string(),
            ConfigKey::PreviewPrefetchDelayMs => config.preview.prefetch_delay_ms.to_string(),
            ConfigKey::PreviewMinDwellMs => config.preview.min_dwell_ms.to_string(),
            ConfigKey::PreviewLoadTimeoutSecs => config.preview.load_timeout_secs.to_string(),
            ConfigKey::FontsMaxFileSize => format_size(config.fonts.max_file_size),
            ConfigKey::FontsAllowedDirs => config
                .fonts
                .allowed_dirs
                .iter()
                .map(|p| path_to_display(p))
                .collect::<Vec<_>>()
                .join(", "),
            ConfigKey::LoggingFile => path_to_display(&config.logging.file),
        }
    }

    /// Validate and set the value.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let invalid = |reason: &str| ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason: reason.to_string(),
        };
        let value = value.trim();

        match self {
            ConfigKey::PreviewCacheCapacity => {
                config.preview.cache_capacity = value
                    .parse()
                    .ok()
                    .filter(|n: &usize| *n > 0)
                    .ok_or_else(|| invalid("must be an integer of at least 1"))?;
            }
            ConfigKey::PreviewPrefetchDelayMs => {
                config.preview.prefetch_delay_ms = parse_non_negative(value).ok_or_else(|| {
                    invalid("must be a non-negative integer (milliseconds)")
                })?;
            }
            ConfigKey::PreviewMinDwellMs => {
                config.preview.min_dwell_ms = parse_non_negative(value).ok_or_else(|| {
                    invalid("must be a non-negative integer (milliseconds)")
                })?;
            }
            ConfigKey::PreviewLoadTimeoutSecs => {
                config.preview.load_timeout_secs = parse_non_negative(value)
                    .ok_or_else(|| invalid("must be a non-negative integer (seconds, 0 disables)"))?;
            }
            ConfigKey::FontsMaxFileSize => {
                config.fonts.max_file_size = parse_size(value)
                    .map_err(|_| invalid("must be a size like '25MB', '512KB', or '1048576'"))?;
            }
            ConfigKey::FontsAllowedDirs => {
                config.fonts.allowed_dirs = parse_dir_list(value);
            }
            ConfigKey::LoggingFile => {
                if value.is_empty() {
                    return Err(invalid("must be a valid path"));
                }
                config.logging.file = expand_tilde(value);
            }
        }
        Ok(())
    }

    /// All supported keys, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::PreviewCacheCapacity,
            ConfigKey::PreviewPrefetchDelayMs,
            ConfigKey::PreviewMinDwellMs,
            ConfigKey::PreviewLoadTimeoutSecs,
            ConfigKey::FontsMaxFileSize,
            ConfigKey::FontsAllowedDirs,
            ConfigKey::LoggingFile,
        ]
    }
}

fn parse_non_negative(value: &str) -> Option<u64> {
    value.parse().ok()
}

/// Display a path, collapsing the home directory to `~`.
fn path_to_display(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
