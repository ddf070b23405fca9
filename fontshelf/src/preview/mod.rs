//! Preview acquisition, caching and the selection-bound loader.
//!
//! # Architecture
//!
//! ```text
//!  hover ──► PreviewService::prefetch ──► PrefetchScheduler (debounce)
//!                                               │ quiet for delay
//!                                               ▼
//!  select ─► PreviewLoader ──► PreviewService::get_preview_src
//!               │                   │ cache hit ──► PreviewCache (LRU)
//!               │                   │ miss ──────► FetchCoalescer ──► ResourceFetcher
//!               ▼
//!          RenderSurface (decode, register, release, present)
//! ```
//!
//! # Key Components
//!
//! - [`PreviewService`] - cache-first, coalesced payload access plus prefetch hints
//! - [`PreviewLoader`] - Idle/Loading/Revealed/Failed state machine with a minimum dwell
//! - [`PreviewCache`] - LRU of decoded-ready payloads
//! - [`FetchCoalescer`] - one in-flight fetch per identity
//! - [`PrefetchScheduler`] - per-identity debounce timers

mod cache;
mod coalesce;
mod error;
mod loader;
mod payload;
mod prefetch;
mod service;
mod surface;
mod traits;

pub use cache::{CacheStats, PreviewCache, DEFAULT_CACHE_CAPACITY};
pub use coalesce::{CoalescerStats, FetchCoalescer, FetchOutcome};
pub use error::{DecodeError, FetchError, PreviewError};
pub use loader::{
    ActiveSelection, LoaderConfig, LoaderState, PreviewLoader, DEFAULT_LOAD_TIMEOUT,
    DEFAULT_MIN_DWELL,
};
pub use payload::{FontMime, PreviewSrc};
pub use prefetch::{PrefetchScheduler, PrefetchStats, PrefetchStatsSnapshot, DEFAULT_PREFETCH_DELAY};
pub use service::{PreviewService, PreviewServiceConfig};
pub(crate) use surface::best_name;
pub use surface::{decode_face, DecodedFace, FaceStyle, HeadlessSurface, PreviewDisplay, SurfaceEvent};
pub use traits::{RenderSurface, ResourceFetcher};
