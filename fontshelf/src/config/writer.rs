//! INI serialization: `ConfigFile` → commented INI string.

use std::path::Path;

use super::settings::ConfigFile;
use super::size::format_size;

/// Convert a `ConfigFile` to the commented INI text written to `config.ini`.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let allowed_dirs = config
        .fonts
        .allowed_dirs
        .iter()
        .map(|p| path_to_string(p))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"[preview]
; Number of font previews kept in memory (default: 50)
cache_capacity = {}
; Delay in milliseconds a prefetch hint must stay quiet before fetching (default: 120)
prefetch_delay_ms = {}
; Minimum time in milliseconds the loading indicator stays visible (default: 500)
min_dwell_ms = {}
; Seconds before a preview load is reported as failed, 0 waits forever (default: 15)
load_timeout_secs = {}

[fonts]
; Largest font file that will be previewed (default: 25MB)
; Supports: KB, MB, GB suffixes
max_file_size = {}
; Comma-separated directories fonts may be read from
; If empty, the system and per-user font directories are used
allowed_dirs = {}

[logging]
; Log file location, cleared at the start of each run
file = {}
"#,
        config.preview.cache_capacity,
        config.preview.prefetch_delay_ms,
        config.preview.min_dwell_ms,
        config.preview.load_timeout_secs,
        format_size(config.fonts.max_file_size),
        allowed_dirs,
        path_to_string(&config.logging.file),
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ini::Ini;
    use std::path::PathBuf;

    #[test]
    fn test_written_config_parses_back() {
        let mut config = ConfigFile::default();
        config.preview.cache_capacity = 7;
        config.preview.load_timeout_secs = 0;
        config.fonts.max_file_size = 3 * 1024 * 1024;
        config.fonts.allowed_dirs = vec![PathBuf::from("/opt/fonts"), PathBuf::from("/srv/fonts")];
        config.logging.file = PathBuf::from("/tmp/fontshelf/test.log");

        let text = to_config_string(&config);
        let ini = Ini::load_from_str(&text).unwrap();
        let parsed = super::super::parser::parse_ini(&ini).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_default_config_has_comments() {
        let text = to_config_string(&ConfigFile::default());
        assert!(text.contains("; Number of font previews kept in memory"));
        assert!(text.contains("max_file_size = 25MB"));
        assert!(text.contains("allowed_dirs = \n"));
    }
}
