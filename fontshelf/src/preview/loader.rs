//! Selection-bound preview loading state machine.
//!
//! ```text
//!            select(new)              ready, dwell met, generation current
//!   Idle ───────────────► Loading ───────────────────────────────► Revealed
//!     ▲                    │  ▲                                        │
//!     │ teardown           │  │ select(new) from any state             │
//!     │                    ▼  │                                        │
//!     └──────────────────  Failed ◄── fetch/decode error or timeout ───┘
//! ```
//!
//! Every selection bumps a generation counter and the async chain captures
//! the value it started with. Before touching the surface or the active
//! resource, the chain compares its generation with the current one under the
//! loader lock; a superseded chain has no side effects at all. Nothing is
//! forcibly cancelled.
//!
//! Surface callbacks run while the loader lock is held and must not call back
//! into the loader.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use super::error::PreviewError;
use super::service::PreviewService;
use super::surface::{DecodedFace, FaceStyle, PreviewDisplay};
use super::traits::{RenderSurface, ResourceFetcher};
use crate::fonts::{preview_family_name, FontVariant};
use crate::log::Logger;
use crate::{log_debug, log_info, log_warn};

/// Minimum time the loading indicator stays visible.
pub const DEFAULT_MIN_DWELL: Duration = Duration::from_millis(500);

/// Time after which a load still in progress is reported as failed.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// The variant the user currently has selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSelection {
    pub variant_id: String,
    /// Resource identity handed to the preview service
    pub path: String,
    /// Family name used by the fallback rendering
    pub family: String,
    pub style: FaceStyle,
}

impl ActiveSelection {
    /// Synthetic identifier this selection's face is registered under.
    pub fn identifier(&self) -> String {
        preview_family_name(&self.variant_id)
    }
}

impl From<&FontVariant> for ActiveSelection {
    fn from(variant: &FontVariant) -> Self {
        Self {
            variant_id: variant.id.clone(),
            path: variant.path.clone(),
            family: variant.family.clone(),
            style: FaceStyle {
                weight: variant.weight,
                style: variant.style,
            },
        }
    }
}

/// Observable loader state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Loading {
        variant_id: String,
    },
    Revealed {
        variant_id: String,
        identifier: String,
    },
    Failed {
        variant_id: String,
        error: PreviewError,
    },
}

impl LoaderState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn is_revealed(&self) -> bool {
        matches!(self, Self::Revealed { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Variant this state refers to, if any.
    pub fn variant_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Loading { variant_id }
            | Self::Revealed { variant_id, .. }
            | Self::Failed { variant_id, .. } => Some(variant_id),
        }
    }
}

/// Tunables for [`PreviewLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Minimum visible loading time, measured from selection
    pub min_dwell: Duration,
    /// Upper bound on fetch + decode; `None` waits forever
    pub load_timeout: Option<Duration>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            min_dwell: DEFAULT_MIN_DWELL,
            load_timeout: Some(DEFAULT_LOAD_TIMEOUT),
        }
    }
}

/// Handle to the face currently registered with the surface.
#[derive(Debug)]
struct LoadedResource {
    identifier: String,
}

/// Mutable loader state, only touched under the lock.
struct LoaderCore {
    generation: u64,
    selection: Option<ActiveSelection>,
    active: Option<LoadedResource>,
    state: LoaderState,
}

struct LoaderShared<F, S> {
    service: Arc<PreviewService<F>>,
    surface: Arc<S>,
    config: LoaderConfig,
    logger: Arc<dyn Logger>,
    core: Mutex<LoaderCore>,
    state_tx: watch::Sender<LoaderState>,
}

/// Drives one preview surface from the current selection.
///
/// Owns the single active [`DecodedFace`] registration for its surface and
/// releases it on replacement, on [`teardown`](Self::teardown) and on drop.
/// Must be used from within a tokio runtime.
pub struct PreviewLoader<F: ResourceFetcher, S: RenderSurface> {
    shared: Arc<LoaderShared<F, S>>,
}

impl<F: ResourceFetcher, S: RenderSurface> PreviewLoader<F, S> {
    pub fn new(
        service: Arc<PreviewService<F>>,
        surface: Arc<S>,
        config: LoaderConfig,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let (state_tx, _) = watch::channel(LoaderState::Idle);
        Self {
            shared: Arc::new(LoaderShared {
                service,
                surface,
                config,
                logger,
                core: Mutex::new(LoaderCore {
                    generation: 0,
                    selection: None,
                    active: None,
                    state: LoaderState::Idle,
                }),
                state_tx,
            }),
        }
    }

    /// Make `selection` current and start loading it.
    ///
    /// Selecting the variant that is already current does nothing, unless the
    /// previous attempt failed, in which case it is retried. Returns true if a
    /// new load was started.
    pub fn select(&self, selection: ActiveSelection) -> bool {
        let generation = {
            let mut core = self.shared.core.lock();
            let unchanged = core
                .selection
                .as_ref()
                .is_some_and(|current| current.variant_id == selection.variant_id);
            if unchanged && !core.state.is_failed() {
                return false;
            }

            core.generation += 1;
            core.selection = Some(selection.clone());
            self.shared.transition(
                &mut core,
                LoaderState::Loading {
                    variant_id: selection.variant_id.clone(),
                },
                PreviewDisplay::Loading {
                    family: selection.family.clone(),
                },
            );
            core.generation
        };

        log_debug!(
            self.shared.logger,
            "Preview load started: variant={} generation={}",
            selection.variant_id,
            generation
        );

        let started_at = Instant::now();
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move { shared.run_load(generation, selection, started_at).await });
        true
    }

    /// Release the active resource and return to `Idle`.
    ///
    /// In-flight loads become inert. Safe to call repeatedly; only the first
    /// call after a reveal releases anything.
    pub fn teardown(&self) {
        let mut core = self.shared.core.lock();
        core.generation += 1;
        core.selection = None;
        if let Some(active) = core.active.take() {
            self.shared.surface.release(&active.identifier);
            log_debug!(self.shared.logger, "Released preview face {}", active.identifier);
        }
        core.state = LoaderState::Idle;
        self.shared.state_tx.send_replace(LoaderState::Idle);
    }

    /// Current state.
    pub fn state(&self) -> LoaderState {
        self.shared.core.lock().state.clone()
    }

    /// Receive every state transition.
    pub fn subscribe(&self) -> watch::Receiver<LoaderState> {
        self.shared.state_tx.subscribe()
    }

    /// Identifier of the face currently registered with the surface.
    pub fn active_identifier(&self) -> Option<String> {
        self.shared
            .core
            .lock()
            .active
            .as_ref()
            .map(|a| a.identifier.clone())
    }

    pub fn selection(&self) -> Option<ActiveSelection> {
        self.shared.core.lock().selection.clone()
    }

    pub fn generation(&self) -> u64 {
        self.shared.core.lock().generation
    }

    pub fn service(&self) -> &Arc<PreviewService<F>> {
        &self.shared.service
    }
}

impl<F: ResourceFetcher, S: RenderSurface> Drop for PreviewLoader<F, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<F: ResourceFetcher, S: RenderSurface> LoaderShared<F, S> {
    /// Set the state, publish it and mirror it onto the surface.
    fn transition(&self, core: &mut LoaderCore, state: LoaderState, display: PreviewDisplay) {
        core.state = state.clone();
        self.state_tx.send_replace(state);
        self.surface.present(&display);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.core.lock().generation == generation
    }

    async fn run_load(&self, generation: u64, selection: ActiveSelection, started_at: Instant) {
        let identifier = selection.identifier();

        // Timeout and dwell share the selection instant as their origin
        let result = match self.config.load_timeout {
            Some(limit) => {
                let acquire = self.acquire_face(&identifier, &selection);
                match tokio::time::timeout_at(started_at + limit, acquire).await {
                    Ok(result) => result,
                    Err(_) => Err(PreviewError::Timeout { after: limit }),
                }
            }
            None => self.acquire_face(&identifier, &selection).await,
        };

        match result {
            Ok(face) => {
                if !self.is_current(generation) {
                    log_debug!(
                        self.logger,
                        "Discarding stale preview for {} (generation {})",
                        selection.variant_id,
                        generation
                    );
                    return;
                }

                let elapsed = started_at.elapsed();
                if elapsed < self.config.min_dwell {
                    tokio::time::sleep(self.config.min_dwell - elapsed).await;
                }

                self.reveal(generation, &selection, face);
            }
            Err(error) => self.fail(generation, &selection, error),
        }
    }

    async fn acquire_face(
        &self,
        identifier: &str,
        selection: &ActiveSelection,
    ) -> Result<DecodedFace, PreviewError> {
        let src = self.service.get_preview_src(&selection.path).await?;
        let face = self
            .surface
            .decode(identifier, &src, &selection.style)
            .await?;
        Ok(face)
    }

    fn reveal(&self, generation: u64, selection: &ActiveSelection, face: DecodedFace) {
        let mut core = self.core.lock();
        if core.generation != generation {
            log_debug!(
                self.logger,
                "Discarding stale preview for {} after dwell",
                selection.variant_id
            );
            return;
        }

        if let Some(previous) = core.active.take() {
            self.surface.release(&previous.identifier);
        }
        let identifier = face.identifier.clone();
        self.surface.register(face);
        core.active = Some(LoadedResource {
            identifier: identifier.clone(),
        });

        self.transition(
            &mut core,
            LoaderState::Revealed {
                variant_id: selection.variant_id.clone(),
                identifier: identifier.clone(),
            },
            PreviewDisplay::Revealed {
                identifier: identifier.clone(),
                family: selection.family.clone(),
            },
        );
        log_info!(
            self.logger,
            "Preview revealed: variant={} face={}",
            selection.variant_id,
            identifier
        );
    }

    fn fail(&self, generation: u64, selection: &ActiveSelection, error: PreviewError) {
        let mut core = self.core.lock();
        if core.generation != generation {
            return;
        }

        log_warn!(
            self.logger,
            "Preview failed for {}: {}",
            selection.variant_id,
            error
        );
        self.transition(
            &mut core,
            LoaderState::Failed {
                variant_id: selection.variant_id.clone(),
                error,
            },
            PreviewDisplay::Fallback {
                family: selection.family.clone(),
            },
        );
    }
}
