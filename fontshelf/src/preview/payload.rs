//! Encoded preview payloads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use std::fmt;
use std::path::Path;

/// MIME type of a previewable font file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontMime {
    /// TrueType (`font/ttf`)
    Ttf,
    /// OpenType with CFF outlines (`font/otf`)
    Otf,
}

impl FontMime {
    /// Resolve the MIME type from a file extension (case-insensitive).
    ///
    /// Returns `None` for anything other than `ttf` and `otf`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ttf" => Some(Self::Ttf),
            "otf" => Some(Self::Otf),
            _ => None,
        }
    }

    /// Resolve the MIME type from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ttf => "font/ttf",
            Self::Otf => "font/otf",
        }
    }
}

impl fmt::Display for FontMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fetched font resource ready to hand to a renderer.
///
/// Cloning is cheap: the bytes are reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSrc {
    mime: FontMime,
    bytes: Bytes,
}

impl PreviewSrc {
    pub fn new(mime: FontMime, bytes: impl Into<Bytes>) -> Self {
        Self {
            mime,
            bytes: bytes.into(),
        }
    }

    pub fn mime(&self) -> FontMime {
        self.mime
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Size of the raw font data in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Encode as a `data:` URI suitable for a web-style font source.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_extension_is_case_insensitive() {
        assert_eq!(FontMime::from_extension("TTF"), Some(FontMime::Ttf));
        assert_eq!(FontMime::from_extension("Otf"), Some(FontMime::Otf));
        assert_eq!(FontMime::from_extension("woff2"), None);
        assert_eq!(FontMime::from_extension(""), None);
    }

    #[test]
    fn test_mime_from_path() {
        assert_eq!(
            FontMime::from_path(Path::new("/fonts/Inter-Bold.OTF")),
            Some(FontMime::Otf)
        );
        assert_eq!(FontMime::from_path(Path::new("/fonts/README")), None);
    }

    #[test]
    fn test_data_uri_format() {
        let src = PreviewSrc::new(FontMime::Ttf, vec![0x00, 0x01, 0x00, 0x00]);
        assert_eq!(src.data_uri(), "data:font/ttf;base64,AAEAAA==");
        assert_eq!(src.len(), 4);
        assert!(!src.is_empty());
    }
}
