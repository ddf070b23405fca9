//! Font catalogue types and on-disk font access.

mod enumerate;
mod fetch;
mod locations;
mod model;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod sample;

pub use enumerate::{
    list_fonts, list_fonts_in, read_variant, scan_dirs, variant_id, FontScanError, FONT_EXTENSIONS,
};
pub use fetch::{DirectoryPolicy, FontFileFetcher, DEFAULT_MAX_FONT_FILE_SIZE};
pub use locations::{is_system_font, platform_font_dirs, system_fonts_dir, user_fonts_dirs};
pub use model::{preview_family_name, FontFamily, FontStyle, FontVariant, ListFontsResult};
