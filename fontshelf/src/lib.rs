//! fontshelf - font preview acquisition and caching
//!
//! Turns a selected or hovered font variant into a renderable preview:
//! payloads are cached, concurrent requests for the same file share one read,
//! hover hints are debounced into background prefetches, and a loader keeps
//! the preview surface consistent with the latest selection.
//!
//! # High-Level API
//!
//! ```ignore
//! use fontshelf::fonts::FontFileFetcher;
//! use fontshelf::preview::{HeadlessSurface, PreviewLoader, PreviewService};
//!
//! let service = Arc::new(PreviewService::new(FontFileFetcher::platform(), Default::default()));
//! let loader = PreviewLoader::new(service, Arc::new(HeadlessSurface::new()), Default::default(), logger);
//! loader.select((&variant).into());
//! ```

pub mod config;
pub mod fonts;
pub mod log;
pub mod logging;
pub mod preview;

/// Version of the fontshelf library and CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
