//! Render surface types and a headless surface implementation.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use ttf_parser::{name_id, Face};

use super::error::DecodeError;
use super::payload::PreviewSrc;
use super::traits::RenderSurface;
use crate::fonts::FontStyle;

/// Style attributes a preview face is decoded with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FaceStyle {
    pub weight: u16,
    pub style: FontStyle,
}

/// A decoded face, ready but not necessarily registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFace {
    /// Synthetic identifier the face is registered under
    pub identifier: String,
    pub style: FaceStyle,
    /// Family name read from the font's `name` table, if present
    pub family_name: Option<String>,
    pub glyph_count: u16,
}

/// What the preview area should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewDisplay {
    /// Loading indicator over the preview text
    Loading { family: String },
    /// Preview text drawn with the registered face
    Revealed { identifier: String, family: String },
    /// Preview text drawn by family name only, no custom resource
    Fallback { family: String },
}

impl PreviewDisplay {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// CSS-style font family stack for the preview text.
    ///
    /// A revealed face comes first with the plain family as fallback.
    pub fn font_stack(&self) -> String {
        match self {
            Self::Revealed { identifier, family } => format!("\"{}\", \"{}\"", identifier, family),
            Self::Loading { family } | Self::Fallback { family } => format!("\"{}\"", family),
        }
    }
}

/// Something that happened on a [`HeadlessSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Decoded(String),
    Registered(String),
    Released(String),
    Presented(PreviewDisplay),
}

/// Render surface without a display.
///
/// Decodes payloads with `ttf-parser`, keeps the registered set in memory and
/// records every call. Used by the CLI and throughout the tests.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    registered: Mutex<HashMap<String, DecodedFace>>,
    events: Mutex<Vec<SurfaceEvent>>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifiers currently registered, sorted.
    pub fn registered(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.registered.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// The registered face for `identifier`.
    pub fn face(&self, identifier: &str) -> Option<DecodedFace> {
        self.registered.lock().get(identifier).cloned()
    }

    /// Every call made on the surface, oldest first.
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().clone()
    }

    /// The most recently presented display.
    pub fn last_display(&self) -> Option<PreviewDisplay> {
        self.events.lock().iter().rev().find_map(|e| match e {
            SurfaceEvent::Presented(display) => Some(display.clone()),
            _ => None,
        })
    }

    /// Number of `register` calls for `identifier`.
    pub fn register_count(&self, identifier: &str) -> usize {
        self.count(|e| matches!(e, SurfaceEvent::Registered(id) if id == identifier))
    }

    /// Number of `release` calls for `identifier`.
    pub fn release_count(&self, identifier: &str) -> usize {
        self.count(|e| matches!(e, SurfaceEvent::Released(id) if id == identifier))
    }

    fn count(&self, pred: impl Fn(&SurfaceEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| pred(e)).count()
    }

    fn record(&self, event: SurfaceEvent) {
        self.events.lock().push(event);
    }
}

/// Parse a payload into a [`DecodedFace`].
pub fn decode_face(
    identifier: &str,
    src: &PreviewSrc,
    style: &FaceStyle,
) -> Result<DecodedFace, DecodeError> {
    let face = Face::parse(src.bytes(), 0).map_err(|e| DecodeError::InvalidFont {
        identifier: identifier.to_string(),
        reason: e.to_string(),
    })?;

    let family_name =
        best_name(&face, name_id::TYPOGRAPHIC_FAMILY).or_else(|| best_name(&face, name_id::FAMILY));

    Ok(DecodedFace {
        identifier: identifier.to_string(),
        style: *style,
        family_name,
        glyph_count: face.number_of_glyphs(),
    })
}

/// Pick the best Unicode name record for `id`.
///
/// Simplified Chinese (2052) wins over US English (1033), which wins over any
/// other language.
pub(crate) fn best_name(face: &Face<'_>, id: u16) -> Option<String> {
    let mut best: Option<(u8, String)> = None;
    for name in face.names() {
        if name.name_id != id || !name.is_unicode() {
            continue;
        }
        let score = match name.language_id {
            2052 => 3,
            1033 => 2,
            _ => 1,
        };
        if best.as_ref().is_some_and(|(s, _)| *s >= score) {
            continue;
        }
        if let Some(value) = name.to_string() {
            best = Some((score, value));
        }
    }
    best.map(|(_, value)| value)
}

impl RenderSurface for HeadlessSurface {
    fn decode(
        &self,
        identifier: &str,
        src: &PreviewSrc,
        style: &FaceStyle,
    ) -> impl Future<Output = Result<DecodedFace, DecodeError>> + Send {
        let result = decode_face(identifier, src, style);
        if result.is_ok() {
            self.record(SurfaceEvent::Decoded(identifier.to_string()));
        }
        std::future::ready(result)
    }

    fn register(&self, face: DecodedFace) {
        let identifier = face.identifier.clone();
        self.registered.lock().insert(identifier.clone(), face);
        self.record(SurfaceEvent::Registered(identifier));
    }

    fn release(&self, identifier: &str) {
        self.registered.lock().remove(identifier);
        self.record(SurfaceEvent::Released(identifier.to_string()));
    }

    fn present(&self, display: &PreviewDisplay) {
        self.record(SurfaceEvent::Presented(display.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::sample::minimal_ttf;
    use crate::preview::FontMime;

    fn style() -> FaceStyle {
        FaceStyle {
            weight: 400,
            style: FontStyle::Normal,
        }
    }

    #[tokio::test]
    async fn test_decode_valid_font() {
        let surface = HeadlessSurface::new();
        let src = PreviewSrc::new(FontMime::Ttf, minimal_ttf("Sample Serif"));

        let face = surface.decode("__preview_1", &src, &style()).await.unwrap();

        assert_eq!(face.identifier, "__preview_1");
        assert_eq!(face.family_name.as_deref(), Some("Sample Serif"));
        assert_eq!(face.glyph_count, 1);
        // Decoding alone does not register
        assert!(surface.registered().is_empty());
    }

    #[tokio::test]
    async fn test_decode_rejects_garbage() {
        let surface = HeadlessSurface::new();
        let src = PreviewSrc::new(FontMime::Ttf, b"definitely not a font".to_vec());

        let err = surface.decode("__preview_1", &src, &style()).await.unwrap_err();

        assert!(matches!(err, DecodeError::InvalidFont { .. }));
        assert!(surface.events().is_empty());
    }

    #[test]
    fn test_register_and_release_track_set() {
        let surface = HeadlessSurface::new();
        let src = PreviewSrc::new(FontMime::Ttf, minimal_ttf("A"));
        let face = decode_face("__preview_a", &src, &style()).unwrap();

        surface.register(face);
        assert_eq!(surface.registered(), vec!["__preview_a".to_string()]);

        surface.release("__preview_a");
        assert!(surface.registered().is_empty());
        assert_eq!(surface.register_count("__preview_a"), 1);
        assert_eq!(surface.release_count("__preview_a"), 1);
    }

    #[test]
    fn test_font_stack() {
        let revealed = PreviewDisplay::Revealed {
            identifier: "__preview_a".to_string(),
            family: "Inter".to_string(),
        };
        let fallback = PreviewDisplay::Fallback {
            family: "Inter".to_string(),
        };

        assert_eq!(revealed.font_stack(), "\"__preview_a\", \"Inter\"");
        assert_eq!(fallback.font_stack(), "\"Inter\"");
        assert!(!fallback.is_loading());
    }

    #[test]
    fn test_last_display() {
        let surface = HeadlessSurface::new();
        assert_eq!(surface.last_display(), None);

        surface.present(&PreviewDisplay::Loading {
            family: "Inter".to_string(),
        });
        surface.present(&PreviewDisplay::Fallback {
            family: "Inter".to_string(),
        });

        assert_eq!(
            surface.last_display(),
            Some(PreviewDisplay::Fallback {
                family: "Inter".to_string()
            })
        );
    }
}
