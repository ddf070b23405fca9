//! Installed font discovery.
//!
//! Walks font directories, parses each `.ttf`/`.otf` face with `ttf-parser`
//! and turns it into a [`FontVariant`]:
//!
//! - names prefer Simplified Chinese, then US English records
//! - faces whose OS/2 weight claims Regular but whose PostScript name says
//!   otherwise (`MiSans-Thin`) get the weight the name implies
//! - the display name is rebuilt from family + subfamily and corrected to
//!   carry the weight for non-regular faces
//! - ids are the SHA-1 of path + PostScript name, stable across runs

use sha1::{Digest, Sha1};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use ttf_parser::{name_id, Face};
use walkdir::WalkDir;

use super::locations::{is_system_font, platform_font_dirs};
use super::model::{FontStyle, FontVariant, ListFontsResult};
use crate::preview::best_name;

/// File extensions considered font files, matched case-insensitively.
pub const FONT_EXTENSIONS: &[&str] = &["ttf", "otf"];

/// Failure reading one font file during a scan.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FontScanError {
    #[error("Failed to read font file {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Not a parseable font {path}: {reason}")]
    InvalidFont { path: PathBuf, reason: String },
}

/// Stable variant id for a face: hex SHA-1 of its path and PostScript name.
pub fn variant_id(path: &str, postscript_name: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(path.as_bytes());
    hasher.update(postscript_name.as_bytes());
    hex::encode(hasher.finalize())
}

/// Scan the platform's system and per-user font directories.
pub fn list_fonts() -> ListFontsResult {
    list_fonts_in(&platform_font_dirs())
}

/// Scan `dirs` and group the result by family.
pub fn list_fonts_in(dirs: &[PathBuf]) -> ListFontsResult {
    let result = ListFontsResult::from_variants(scan_dirs(dirs));
    info!(
        families = result.total_families,
        variants = result.total_variants,
        "Font scan complete"
    );
    result
}

/// Every readable font face below `dirs`.
///
/// Missing directories are skipped. Files that fail to parse are logged and
/// skipped. A face reachable through two directories is reported once.
pub fn scan_dirs(dirs: &[PathBuf]) -> Vec<FontVariant> {
    let mut seen = HashSet::new();
    let mut variants = Vec::new();

    for dir in dirs {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "Font directory missing, skipping");
            continue;
        }
        for entry in WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() || !has_font_extension(entry.path()) {
                continue;
            }
            match read_variant(entry.path()) {
                Ok(variant) => {
                    if seen.insert(variant.id.clone()) {
                        variants.push(variant);
                    }
                }
                Err(e) => debug!(error = %e, "Skipping font file"),
            }
        }
    }

    variants
}

/// Parse the first face of one font file.
pub fn read_variant(path: &Path) -> Result<FontVariant, FontScanError> {
    let data = fs::read(path).map_err(|e| FontScanError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let face = Face::parse(&data, 0).map_err(|e| FontScanError::InvalidFont {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let path_str = path.to_string_lossy().into_owned();
    let postscript_name = best_name(&face, name_id::POST_SCRIPT_NAME);
    let weight = corrected_weight(face.weight().to_number(), postscript_name.as_deref());

    let family = best_name(&face, name_id::TYPOGRAPHIC_FAMILY)
        .or_else(|| best_name(&face, name_id::FAMILY))
        .unwrap_or_else(|| "Unknown".to_string());

    let full_name = constructed_full_name(&face, weight)
        .or_else(|| postscript_name.clone())
        .map(|name| with_weight_label(&name, weight));

    let style = match face.style() {
        ttf_parser::Style::Normal => FontStyle::Normal,
        ttf_parser::Style::Italic => FontStyle::Italic,
        ttf_parser::Style::Oblique => FontStyle::Oblique,
    };

    Ok(FontVariant {
        id: variant_id(&path_str, postscript_name.as_deref().unwrap_or_default()),
        family,
        style,
        weight,
        path: path_str,
        postscript_name,
        full_name,
        is_system_core: is_system_font(path),
    })
}

fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FONT_EXTENSIONS.iter().any(|f| e.eq_ignore_ascii_case(f)))
}

fn is_regular_weight(weight: u16) -> bool {
    (400..500).contains(&weight)
}

fn weight_label(weight: u16) -> &'static str {
    match weight {
        100..=199 => "Thin",
        200..=299 => "ExtraLight",
        300..=349 => "Light",
        350..=399 => "DemiLight",
        400..=499 => "Regular",
        500..=599 => "Medium",
        600..=699 => "SemiBold",
        700..=799 => "Bold",
        800..=899 => "ExtraBold",
        900..=999 => "Black",
        _ => "Regular",
    }
}

/// Weight implied by the PostScript name when OS/2 reports exactly 400.
fn corrected_weight(weight: u16, postscript_name: Option<&str>) -> u16 {
    let Some(ps) = postscript_name.filter(|_| weight == 400) else {
        return weight;
    };
    let ps = ps.to_lowercase();
    // Compound names first: "extralight" also contains "light"
    const HINTS: &[(&str, u16)] = &[
        ("thin", 100),
        ("extralight", 200),
        ("demilight", 350),
        ("light", 300),
        ("medium", 500),
        ("semibold", 600),
        ("extrabold", 800),
        ("bold", 700),
        ("black", 900),
        ("heavy", 900),
    ];
    HINTS
        .iter()
        .find(|(hint, _)| ps.contains(hint))
        .map_or(weight, |(_, w)| *w)
}

/// Family + subfamily, falling back to the full name record.
fn constructed_full_name(face: &Face<'_>, weight: u16) -> Option<String> {
    let family = best_name(face, name_id::TYPOGRAPHIC_FAMILY)
        .or_else(|| best_name(face, name_id::FAMILY));
    let subfamily = best_name(face, name_id::TYPOGRAPHIC_SUBFAMILY)
        .or_else(|| best_name(face, name_id::SUBFAMILY));

    match (family, subfamily) {
        (Some(family), Some(subfamily)) => Some(join_names(&family, &subfamily, weight)),
        _ => best_name(face, name_id::FULL_NAME),
    }
}

fn join_names(family: &str, subfamily: &str, weight: u16) -> String {
    let sub = subfamily.to_lowercase();
    if (sub == "regular" || sub == "normal") && !is_regular_weight(weight) {
        // Legacy subfamily left at Regular on a non-regular face
        format!("{} {}", family, weight_label(weight))
    } else if sub.contains(&family.to_lowercase()) {
        subfamily.to_string()
    } else {
        format!("{} {}", family, subfamily)
    }
}

/// Make sure a non-regular face's name mentions its weight.
fn with_weight_label(name: &str, weight: u16) -> String {
    if is_regular_weight(weight) {
        return name.to_string();
    }
    let label = weight_label(weight);

    let mut out = name.to_string();
    let mut replaced = false;
    for target in ["Normal", "Regular", "normal", "regular"] {
        if out.contains(target) {
            out = out.replace(target, label);
            replaced = true;
        }
    }
    if !replaced && !name.to_lowercase().contains(&label.to_lowercase()) {
        out = format!("{} {}", name, label);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::sample::{minimal_ttf, minimal_ttf_with_names};
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_variant_id_is_stable_and_path_sensitive() {
        let a = variant_id("/fonts/a/Inter.ttf", "Inter-Regular");
        assert_eq!(a, variant_id("/fonts/a/Inter.ttf", "Inter-Regular"));
        assert_eq!(a.len(), 40);
        assert_ne!(a, variant_id("/fonts/b/Inter.ttf", "Inter-Regular"));
        assert_ne!(a, variant_id("/fonts/a/Inter.ttf", "Inter-Bold"));
    }

    #[test]
    fn test_read_variant_names() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            "Inter-Italic.ttf",
            &minimal_ttf_with_names(&[
                (name_id::FAMILY, "Inter"),
                (name_id::SUBFAMILY, "Italic"),
                (name_id::POST_SCRIPT_NAME, "Inter-Italic"),
            ]),
        );

        let v = read_variant(&path).unwrap();

        assert_eq!(v.family, "Inter");
        assert_eq!(v.weight, 400);
        assert_eq!(v.postscript_name.as_deref(), Some("Inter-Italic"));
        assert_eq!(v.full_name.as_deref(), Some("Inter Italic"));
        assert_eq!(v.path, path.to_string_lossy());
        assert_eq!(v.id, variant_id(&v.path, "Inter-Italic"));
        assert!(!v.is_system_core);
    }

    #[test]
    fn test_postscript_name_corrects_regular_weight() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            "MiSans-Thin.ttf",
            &minimal_ttf_with_names(&[
                (name_id::FAMILY, "MiSans"),
                (name_id::SUBFAMILY, "Regular"),
                (name_id::POST_SCRIPT_NAME, "MiSans-Thin"),
            ]),
        );

        let v = read_variant(&path).unwrap();

        assert_eq!(v.weight, 100);
        assert_eq!(v.full_name.as_deref(), Some("MiSans Thin"));
    }

    #[test]
    fn test_missing_postscript_name_falls_back_to_full_name_record() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            tmp.path(),
            "Plain.ttf",
            &minimal_ttf_with_names(&[(name_id::FULL_NAME, "Plain Face")]),
        );

        let v = read_variant(&path).unwrap();

        assert_eq!(v.family, "Unknown");
        assert_eq!(v.postscript_name, None);
        assert_eq!(v.full_name.as_deref(), Some("Plain Face"));
    }

    #[test]
    fn test_read_variant_rejects_garbage() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "broken.ttf", b"not a font");

        assert!(matches!(
            read_variant(&path),
            Err(FontScanError::InvalidFont { .. })
        ));
    }

    #[test]
    fn test_same_file_name_in_two_dirs_gets_distinct_ids() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        write(&a, "Inter.ttf", &minimal_ttf("Inter"));
        write(&b, "Inter.ttf", &minimal_ttf("Inter"));

        let variants = scan_dirs(&[tmp.path().to_path_buf()]);

        assert_eq!(variants.len(), 2);
        assert_ne!(variants[0].id, variants[1].id);
        assert_ne!(variants[0].preview_family(), variants[1].preview_family());
    }

    #[test]
    fn test_scan_filters_extensions_and_skips_bad_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "Good.TTF", &minimal_ttf("Good"));
        write(tmp.path(), "Other.otf", &minimal_ttf("Other"));
        write(tmp.path(), "notes.txt", &minimal_ttf("Ignored"));
        write(tmp.path(), "broken.ttf", b"garbage");

        let result = list_fonts_in(&[tmp.path().to_path_buf(), tmp.path().join("missing")]);

        let families: Vec<_> = result.families.iter().map(|f| f.family.as_str()).collect();
        assert_eq!(families, vec!["Good", "Other"]);
        assert_eq!(result.total_variants, 2);
    }

    #[test]
    fn test_overlapping_dirs_report_each_face_once() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "Inter.ttf", &minimal_ttf("Inter"));

        let dir = tmp.path().to_path_buf();
        let variants = scan_dirs(&[dir.clone(), dir]);

        assert_eq!(variants.len(), 1);
    }

    #[test]
    fn test_corrected_weight() {
        assert_eq!(corrected_weight(400, Some("Font-ExtraLight")), 200);
        assert_eq!(corrected_weight(400, Some("Font-SemiBold")), 600);
        assert_eq!(corrected_weight(400, Some("Font-Regular")), 400);
        assert_eq!(corrected_weight(700, Some("Font-Thin")), 700);
        assert_eq!(corrected_weight(400, None), 400);
    }

    #[test]
    fn test_join_names() {
        assert_eq!(join_names("Inter", "Bold Italic", 700), "Inter Bold Italic");
        assert_eq!(join_names("MiSans", "MiSans Bold", 700), "MiSans Bold");
        assert_eq!(join_names("MiSans", "Regular", 200), "MiSans ExtraLight");
        assert_eq!(join_names("Inter", "Regular", 400), "Inter Regular");
    }

    #[test]
    fn test_with_weight_label() {
        assert_eq!(with_weight_label("MiSans Normal", 700), "MiSans Bold");
        assert_eq!(with_weight_label("MiSans", 200), "MiSans ExtraLight");
        assert_eq!(with_weight_label("Inter Bold", 700), "Inter Bold");
        assert_eq!(with_weight_label("Inter Regular", 400), "Inter Regular");
    }
}
