//! Collaborator traits consumed by the preview core.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  PreviewService / PreviewLoader depend on:               │
//! │    ResourceFetcher  - raw font bytes for an identity     │
//! │    RenderSurface    - decode, register, release, present │
//! └──────────────────────────────────────────────────────────┘
//! ┌──────────────────────────────────────────────────────────┐
//! │  Provided implementations:                               │
//! │    FontFileFetcher  - local font files (fonts::fetch)    │
//! │    HeadlessSurface  - ttf-parser validation (surface)    │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;

use super::error::{DecodeError, FetchError};
use super::payload::PreviewSrc;
use super::surface::{DecodedFace, FaceStyle, PreviewDisplay};

/// Obtains the encoded payload for a resource identity.
///
/// Opaque beyond success or failure; implementations may read from disk,
/// an IPC bridge, or memory in tests.
pub trait ResourceFetcher: Send + Sync + 'static {
    /// Fetch the resource identified by `identity` (a font file path).
    fn fetch(&self, identity: &str) -> impl Future<Output = Result<PreviewSrc, FetchError>> + Send;
}

/// The UI rendering collaborator the loader drives.
///
/// The loader only relies on "decode then await ready", "register makes a
/// decoded face active" and "release releases exactly the given identifier".
pub trait RenderSurface: Send + Sync + 'static {
    /// Decode `src` under `identifier` and resolve once it is ready to draw.
    ///
    /// A decoded face is not visible until passed to [`register`](Self::register).
    fn decode(
        &self,
        identifier: &str,
        src: &PreviewSrc,
        style: &FaceStyle,
    ) -> impl Future<Output = Result<DecodedFace, DecodeError>> + Send;

    /// Make a decoded face the active preview resource.
    fn register(&self, face: DecodedFace);

    /// Release the resource registered under `identifier`.
    fn release(&self, identifier: &str);

    /// Show the given display state (loading indicator, revealed or fallback).
    fn present(&self, display: &PreviewDisplay);
}
