//! Platform font directories.

use std::path::{Path, PathBuf};

/// Directory holding fonts that ship with the operating system.
#[cfg(target_os = "windows")]
pub fn system_fonts_dir() -> PathBuf {
    let root = std::env::var("SystemRoot").unwrap_or_else(|_| "C:\\Windows".to_string());
    Path::new(&root).join("Fonts")
}

/// Directory holding fonts that ship with the operating system.
#[cfg(target_os = "macos")]
pub fn system_fonts_dir() -> PathBuf {
    PathBuf::from("/System/Library/Fonts")
}

/// Directory holding fonts that ship with the operating system.
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
pub fn system_fonts_dir() -> PathBuf {
    PathBuf::from("/usr/share/fonts")
}

/// Per-user font directories.
pub fn user_fonts_dirs() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        dirs::data_local_dir()
            .map(|d| vec![d.join("Microsoft").join("Windows").join("Fonts")])
            .unwrap_or_default()
    }
    #[cfg(target_os = "macos")]
    {
        let mut out = vec![PathBuf::from("/Library/Fonts")];
        if let Some(home) = dirs::home_dir() {
            out.push(home.join("Library").join("Fonts"));
        }
        out
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let mut out = vec![PathBuf::from("/usr/local/share/fonts")];
        if let Some(data) = dirs::data_dir() {
            out.push(data.join("fonts"));
        }
        if let Some(home) = dirs::home_dir() {
            out.push(home.join(".fonts"));
        }
        out
    }
}

/// System directory followed by the per-user directories.
pub fn platform_font_dirs() -> Vec<PathBuf> {
    let mut out = vec![system_fonts_dir()];
    out.extend(user_fonts_dirs());
    out
}

/// Canonicalize a directory, keeping the original path if it cannot be
/// resolved (for example because it does not exist yet).
pub fn canonical_or_original(dir: &Path) -> PathBuf {
    dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf())
}

/// Returns true for font files that belong to the operating system and must
/// not be uninstalled.
pub fn is_system_font(path: &Path) -> bool {
    let system = canonical_or_original(&system_fonts_dir());
    canonical_or_original(path).starts_with(system)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_dirs_start_with_system_dir() {
        let dirs = platform_font_dirs();
        assert_eq!(dirs.first(), Some(&system_fonts_dir()));
        assert!(dirs.len() >= 2);
    }

    #[test]
    fn test_canonical_or_original_keeps_missing_paths() {
        let missing = Path::new("/definitely/not/a/real/font/dir");
        assert_eq!(canonical_or_original(missing), missing.to_path_buf());
    }

    #[test]
    fn test_temp_file_is_not_system_font() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("a.ttf");
        std::fs::write(&path, b"x").unwrap();
        assert!(!is_system_font(&path));
    }
}
