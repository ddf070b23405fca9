//! Default values for every configuration setting.

use super::settings::*;
use crate::fonts::DEFAULT_MAX_FONT_FILE_SIZE;
use crate::logging::default_log_path;
use crate::preview::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_LOAD_TIMEOUT, DEFAULT_MIN_DWELL, DEFAULT_PREFETCH_DELAY,
};

pub const DEFAULT_PREFETCH_DELAY_MS: u64 = DEFAULT_PREFETCH_DELAY.as_millis() as u64;
pub const DEFAULT_MIN_DWELL_MS: u64 = DEFAULT_MIN_DWELL.as_millis() as u64;
pub const DEFAULT_LOAD_TIMEOUT_SECS: u64 = DEFAULT_LOAD_TIMEOUT.as_secs();

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            prefetch_delay_ms: DEFAULT_PREFETCH_DELAY_MS,
            min_dwell_ms: DEFAULT_MIN_DWELL_MS,
            load_timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
        }
    }
}

impl Default for FontsSettings {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FONT_FILE_SIZE as usize,
            allowed_dirs: Vec::new(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: default_log_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_defaults() {
        let preview = PreviewSettings::default();
        assert_eq!(preview.cache_capacity, 50);
        assert_eq!(preview.prefetch_delay_ms, 120);
        assert_eq!(preview.min_dwell_ms, 500);
        assert_eq!(preview.load_timeout_secs, 15);
    }

    #[test]
    fn test_fonts_defaults() {
        let fonts = FontsSettings::default();
        assert_eq!(fonts.max_file_size, 25 * 1024 * 1024);
        assert!(fonts.allowed_dirs.is_empty());
    }
}
