//! Font family and variant records shared with the listing UI.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Slant of a font face.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Italic => "italic",
            Self::Oblique => "oblique",
        }
    }

    /// Capitalised label used in display names ("Italic").
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Italic => "Italic",
            Self::Oblique => "Oblique",
        }
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "italic" => Ok(Self::Italic),
            "oblique" => Ok(Self::Oblique),
            other => Err(format!(
                "unknown font style '{}' (expected normal, italic or oblique)",
                other
            )),
        }
    }
}

/// One installed font face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontVariant {
    /// Stable identifier, unique across all variants
    pub id: String,
    pub family: String,
    pub style: FontStyle,
    /// OS/2 weight class (100-900)
    pub weight: u16,
    /// Font file path; the preview resource identity
    pub path: String,
    pub postscript_name: Option<String>,
    pub full_name: Option<String>,
    /// Lives in the system fonts directory and must not be uninstalled
    #[serde(default)]
    pub is_system_core: bool,
}

impl FontVariant {
    /// Name shown above the preview.
    ///
    /// Prefers the PostScript name (macOS hides some faces behind a leading
    /// `.`, which is stripped), then the full name, then `"{family} {Style}"`.
    pub fn display_name(&self) -> String {
        if let Some(ps) = self
            .postscript_name
            .as_deref()
            .map(|n| n.strip_prefix('.').unwrap_or(n))
            .filter(|n| !n.is_empty())
        {
            return ps.to_string();
        }
        if let Some(full) = self.full_name.as_deref().filter(|n| !n.is_empty()) {
            return full.to_string();
        }
        format!("{} {}", self.family, self.style.label())
    }

    /// Synthetic family name a decoded preview of this variant is registered
    /// under, so variants sharing a family name never collide.
    pub fn preview_family(&self) -> String {
        preview_family_name(&self.id)
    }
}

/// Synthetic family name for a variant id.
pub fn preview_family_name(variant_id: &str) -> String {
    format!("__preview_{}", variant_id)
}

/// All variants of one family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontFamily {
    pub family: String,
    pub variants: Vec<FontVariant>,
}

/// Grouped listing of installed fonts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFontsResult {
    pub families: Vec<FontFamily>,
    pub total_families: usize,
    pub total_variants: usize,
}

impl ListFontsResult {
    /// Group variants by family.
    ///
    /// Variants are ordered by weight then style, families by name.
    pub fn from_variants(variants: impl IntoIterator<Item = FontVariant>) -> Self {
        let mut by_family: HashMap<String, Vec<FontVariant>> = HashMap::new();
        for variant in variants {
            by_family
                .entry(variant.family.clone())
                .or_default()
                .push(variant);
        }

        let mut families: Vec<FontFamily> = by_family
            .into_iter()
            .map(|(family, mut variants)| {
                variants.sort_by(|a, b| a.weight.cmp(&b.weight).then(a.style.cmp(&b.style)));
                FontFamily { family, variants }
            })
            .collect();
        families.sort_by(|a, b| a.family.cmp(&b.family));

        let total_families = families.len();
        let total_variants = families.iter().map(|f| f.variants.len()).sum();

        Self {
            families,
            total_families,
            total_variants,
        }
    }

    /// Find a variant by id.
    pub fn variant(&self, id: &str) -> Option<&FontVariant> {
        self.families
            .iter()
            .flat_map(|f| f.variants.iter())
            .find(|v| v.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: &str, family: &str, weight: u16, style: FontStyle) -> FontVariant {
        FontVariant {
            id: id.to_string(),
            family: family.to_string(),
            style,
            weight,
            path: format!("/fonts/{}.ttf", id),
            postscript_name: None,
            full_name: None,
            is_system_core: false,
        }
    }

    #[test]
    fn test_display_name_prefers_postscript_without_dot() {
        let mut v = variant("1", "SF Pro", 400, FontStyle::Normal);
        v.postscript_name = Some(".SFNS-Regular".to_string());
        v.full_name = Some("SF Pro Regular".to_string());

        assert_eq!(v.display_name(), "SFNS-Regular");
    }

    #[test]
    fn test_display_name_falls_back_to_full_name_then_family() {
        let mut v = variant("1", "Inter", 700, FontStyle::Italic);
        v.full_name = Some("Inter Bold Italic".to_string());
        assert_eq!(v.display_name(), "Inter Bold Italic");

        v.full_name = None;
        assert_eq!(v.display_name(), "Inter Italic");
    }

    #[test]
    fn test_preview_family_is_unique_per_variant() {
        let a = variant("abc", "Inter", 400, FontStyle::Normal);
        let b = variant("def", "Inter", 700, FontStyle::Normal);

        assert_eq!(a.preview_family(), "__preview_abc");
        assert_ne!(a.preview_family(), b.preview_family());
    }

    #[test]
    fn test_style_parse() {
        assert_eq!("Italic".parse::<FontStyle>(), Ok(FontStyle::Italic));
        assert!("slanted".parse::<FontStyle>().is_err());
    }

    #[test]
    fn test_list_result_groups_and_sorts() {
        let result = ListFontsResult::from_variants(vec![
            variant("3", "Roboto", 700, FontStyle::Normal),
            variant("1", "Inter", 700, FontStyle::Normal),
            variant("2", "Inter", 400, FontStyle::Italic),
            variant("4", "Inter", 400, FontStyle::Normal),
        ]);

        assert_eq!(result.total_families, 2);
        assert_eq!(result.total_variants, 4);
        assert_eq!(result.families[0].family, "Inter");
        let ids: Vec<_> = result.families[0]
            .variants
            .iter()
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(ids, vec!["4", "2", "1"]);
        assert_eq!(result.variant("3").map(|v| v.weight), Some(700));
    }

    #[test]
    fn test_variant_serializes_camel_case() {
        let mut v = variant("1", "Inter", 400, FontStyle::Italic);
        v.postscript_name = Some("Inter-Italic".to_string());

        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["postscriptName"], "Inter-Italic");
        assert_eq!(json["style"], "italic");
        assert_eq!(json["isSystemCore"], false);
    }
}
