//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use super::size::parse_size;

/// Parse an `Ini` into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [preview] section
    if let Some(section) = ini.section(Some("preview")) {
        if let Some(v) = section.get("cache_capacity") {
            config.preview.cache_capacity = parse_number("preview", "cache_capacity", v)?;
            if config.preview.cache_capacity == 0 {
                return Err(invalid("preview", "cache_capacity", v, "must be at least 1"));
            }
        }
        if let Some(v) = section.get("prefetch_delay_ms") {
            config.preview.prefetch_delay_ms = parse_number("preview", "prefetch_delay_ms", v)?;
        }
        if let Some(v) = section.get("min_dwell_ms") {
            config.preview.min_dwell_ms = parse_number("preview", "min_dwell_ms", v)?;
        }
        if let Some(v) = section.get("load_timeout_secs") {
            config.preview.load_timeout_secs = parse_number("preview", "load_timeout_secs", v)?;
        }
    }

    // [fonts] section
    if let Some(section) = ini.section(Some("fonts")) {
        if let Some(v) = section.get("max_file_size") {
            config.fonts.max_file_size = parse_size(v).map_err(|_| {
                invalid(
                    "fonts",
                    "max_file_size",
                    v,
                    "expected format like '25MB', '512KB', or '1048576'",
                )
            })?;
        }
        if let Some(v) = section.get("allowed_dirs") {
            config.fonts.allowed_dirs = parse_dir_list(v);
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn parse_number<T: FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "must be a non-negative integer"))
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Split a comma-separated directory list, dropping empty entries.
pub(super) fn parse_dir_list(value: &str) -> Vec<PathBuf> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(expand_tilde)
        .collect()
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
