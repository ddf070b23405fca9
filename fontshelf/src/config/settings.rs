//! Settings structs, one per `[section]` of the INI file.

use std::path::PathBuf;
use std::time::Duration;

use crate::fonts::{DirectoryPolicy, FontFileFetcher};
use crate::preview::{LoaderConfig, PreviewServiceConfig};

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub preview: PreviewSettings,
    pub fonts: FontsSettings,
    pub logging: LoggingSettings,
}

/// `[preview]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSettings {
    /// Maximum number of cached previews (at least 1)
    pub cache_capacity: usize,
    /// Prefetch debounce delay in milliseconds
    pub prefetch_delay_ms: u64,
    /// Minimum loading indicator time in milliseconds
    pub min_dwell_ms: u64,
    /// Load timeout in seconds, 0 disables
    pub load_timeout_secs: u64,
}

/// `[fonts]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontsSettings {
    /// Largest font file that will be read, in bytes
    pub max_file_size: usize,
    /// Directories fonts may be read from; empty means the platform dirs
    pub allowed_dirs: Vec<PathBuf>,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub file: PathBuf,
}

impl ConfigFile {
    pub fn service_config(&self) -> PreviewServiceConfig {
        PreviewServiceConfig {
            cache_capacity: self.preview.cache_capacity,
            prefetch_delay: Duration::from_millis(self.preview.prefetch_delay_ms),
        }
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            min_dwell: Duration::from_millis(self.preview.min_dwell_ms),
            load_timeout: match self.preview.load_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }

    pub fn directory_policy(&self) -> DirectoryPolicy {
        DirectoryPolicy::from_config(&self.fonts.allowed_dirs)
    }

    /// Build the file fetcher, optionally lifting the directory restriction.
    pub fn font_fetcher(&self, anywhere: bool) -> FontFileFetcher {
        let policy = if anywhere {
            DirectoryPolicy::Anywhere
        } else {
            self.directory_policy()
        };
        FontFileFetcher::new(policy, self.fonts.max_file_size as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_conversions() {
        let config = ConfigFile::default();

        assert_eq!(config.service_config(), PreviewServiceConfig::default());
        assert_eq!(config.loader_config(), LoaderConfig::default());
        assert_eq!(config.directory_policy(), DirectoryPolicy::platform());
    }

    #[test]
    fn test_zero_timeout_disables() {
        let mut config = ConfigFile::default();
        config.preview.load_timeout_secs = 0;
        assert_eq!(config.loader_config().load_timeout, None);
    }

    #[test]
    fn test_font_fetcher_uses_size_limit() {
        let mut config = ConfigFile::default();
        config.fonts.max_file_size = 1024;
        assert_eq!(config.font_fetcher(true).max_file_size(), 1024);
    }
}
