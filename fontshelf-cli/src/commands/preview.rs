//! `preview` command: replay a sequence of selections through a loader.
//!
//! Every path is parsed into its variant record first, so selections carry
//! the same stable id, family and style the `list` command reports. Each
//! path is selected in turn, `--gap-ms` apart, on a headless surface.
//! With `--hover` every path is first hinted through prefetch, the way a
//! pointer passing over a font list would. The final loader state and the
//! registered face are printed once loading settles.

use clap::Args;
use fontshelf::fonts::{read_variant, variant_id};
use fontshelf::preview::{ActiveSelection, FaceStyle, HeadlessSurface, LoaderState};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use super::fetch::file_stem;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Upper bound on waiting for the final selection when timeouts are disabled.
const SETTLE_LIMIT: Duration = Duration::from_secs(60);

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Font files to select, in order
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Milliseconds between selections
    #[arg(long, default_value = "0")]
    pub gap_ms: u64,

    /// Send prefetch hints for every path before selecting
    #[arg(long)]
    pub hover: bool,

    /// Allow fonts outside the configured font directories
    #[arg(long)]
    pub anywhere: bool,
}

/// Selection for a font file.
///
/// A file that cannot be parsed here still gets a path-derived id, so the
/// loader runs and reports why it fails.
fn selection_for(path: &str) -> ActiveSelection {
    match read_variant(Path::new(path)) {
        Ok(variant) => ActiveSelection::from(&variant),
        Err(e) => {
            debug!(error = %e, "Selecting unparsed font file");
            ActiveSelection {
                variant_id: variant_id(path, ""),
                path: path.to_string(),
                family: file_stem(path),
                style: FaceStyle::default(),
            }
        }
    }
}

pub async fn run(args: PreviewArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("preview");

    let service = runner.create_service(args.anywhere);
    let surface = Arc::new(HeadlessSurface::new());
    let loader = runner.create_loader(Arc::clone(&service), Arc::clone(&surface));
    let gap = Duration::from_millis(args.gap_ms);

    if args.hover {
        for path in &args.paths {
            service.prefetch(path);
            sleep(gap).await;
        }
    }

    let paths = args.paths.clone();
    let selections = tokio::task::spawn_blocking(move || {
        paths.iter().map(|p| selection_for(p)).collect::<Vec<_>>()
    })
    .await
    .map_err(|e| CliError::Command(format!("Reading font files failed: {}", e)))?;

    for (i, selection) in selections.into_iter().enumerate() {
        if i > 0 {
            sleep(gap).await;
        }
        let path = selection.path.clone();
        let started = loader.select(selection);
        debug!(path = %path, started, "Selected");
    }

    let mut states = loader.subscribe();
    let settled = tokio::time::timeout(
        SETTLE_LIMIT,
        states.wait_for(|s| !s.is_loading()),
    )
    .await
    .map_err(|_| CliError::Command("Preview did not settle in time".to_string()))?
    .map(|s| s.clone())
    .map_err(|_| CliError::Command("Preview loader stopped".to_string()))?;

    print_state(&settled, &surface);

    let cache = service.cache_stats();
    let coalescer = service.coalescer_stats();
    let prefetch = service.prefetch_stats();
    println!();
    println!(
        "Cache:     {} entries, {} hits, {} misses, {} evictions",
        service.cached_len(),
        cache.hits,
        cache.misses,
        cache.evictions
    );
    println!(
        "Fetches:   {} requests, {} coalesced",
        coalescer.total_requests, coalescer.coalesced_requests
    );
    println!(
        "Prefetch:  {} scheduled, {} superseded, {} skipped, {} fired",
        prefetch.scheduled, prefetch.superseded, prefetch.skipped, prefetch.fired
    );
    service.log_stats();

    let failed = match &settled {
        LoaderState::Failed { variant_id, error } => Some(CliError::Preview {
            path: loader
                .selection()
                .map(|s| s.path)
                .unwrap_or_else(|| variant_id.clone()),
            error: error.clone(),
        }),
        _ => None,
    };

    loader.teardown();
    failed.map_or(Ok(()), Err)
}

fn print_state(state: &LoaderState, surface: &HeadlessSurface) {
    match state {
        LoaderState::Revealed {
            variant_id,
            identifier,
        } => {
            println!("Revealed:  {}", variant_id);
            if let Some(face) = surface.face(identifier) {
                println!("Face:      {}", face.identifier);
                println!(
                    "Family:    {}",
                    face.family_name.as_deref().unwrap_or("(unnamed)")
                );
                println!("Glyphs:    {}", face.glyph_count);
            }
        }
        LoaderState::Failed { variant_id, error } => {
            println!("Failed:    {} ({})", variant_id, error);
        }
        LoaderState::Idle | LoaderState::Loading { .. } => {
            println!("State:     {:?}", state);
        }
    }
    if let Some(display) = surface.last_display() {
        println!("Font:      {}", display.font_stack());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fontshelf::fonts::{DirectoryPolicy, FontFileFetcher};
    use fontshelf::log::NoOpLogger;
    use fontshelf::preview::{LoaderConfig, PreviewLoader, PreviewService, PreviewServiceConfig};

    #[test]
    fn test_selection_for_unreadable_path() {
        let selection = selection_for("/fonts/Inter-Regular.otf");
        assert_eq!(selection.variant_id, variant_id("/fonts/Inter-Regular.otf", ""));
        assert_eq!(selection.family, "Inter-Regular");
        assert_eq!(selection.path, "/fonts/Inter-Regular.otf");
        assert!(selection.identifier().starts_with("__preview_"));
    }

    #[test]
    fn test_same_stem_paths_get_distinct_identifiers() {
        let a = selection_for("/fonts/a/Inter.ttf");
        let b = selection_for("/fonts/b/Inter.ttf");

        assert_ne!(a.variant_id, b.variant_id);
        assert_ne!(a.identifier(), b.identifier());
    }

    #[tokio::test]
    async fn test_same_stem_paths_both_start_loads() {
        let fetcher = FontFileFetcher::new(DirectoryPolicy::Anywhere, 1024);
        let service = Arc::new(PreviewService::new(fetcher, PreviewServiceConfig::default()));
        let loader = PreviewLoader::new(
            service,
            Arc::new(HeadlessSurface::new()),
            LoaderConfig::default(),
            Arc::new(NoOpLogger),
        );

        assert!(loader.select(selection_for("/fonts/a/Inter.ttf")));
        assert!(loader.select(selection_for("/fonts/b/Inter.ttf")));
        assert_eq!(
            loader.selection().map(|s| s.path).as_deref(),
            Some("/fonts/b/Inter.ttf")
        );
        assert_eq!(loader.generation(), 2);
    }
}
