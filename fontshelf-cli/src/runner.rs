//! CLI runner for common setup.
//!
//! Loads configuration, initializes logging and builds the preview service
//! and loader that command handlers share.

use fontshelf::config::ConfigFile;
use fontshelf::fonts::FontFileFetcher;
use fontshelf::log::TracingLogger;
use fontshelf::logging::{default_log_file, init_logging_full, LoggingGuard};
use fontshelf::preview::{HeadlessSurface, PreviewLoader, PreviewService};
use std::sync::Arc;
use tracing::info;

use crate::error::CliError;

pub type FileService = PreviewService<FontFileFetcher>;
pub type FileLoader = PreviewLoader<FontFileFetcher, HeadlessSurface>;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Keeps logging active while the runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Load config and initialize logging.
    ///
    /// Console logging is only enabled when stdout is not a terminal, so
    /// command output stays readable; the log file always receives events.
    pub fn with_debug(debug_mode: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let log_path = &config.logging.file;
        let log_dir = log_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| ".".into());
        let log_file = log_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| default_log_file().to_string());

        let stdout_enabled = !atty::is(atty::Stream::Stdout);

        let logging_guard = init_logging_full(&log_dir, &log_file, stdout_enabled, debug_mode)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("fontshelf v{}", fontshelf::VERSION);
        info!("fontshelf CLI: {} command", command);
    }

    /// Preview service reading fonts from disk.
    ///
    /// `anywhere` lifts the allowed-directory restriction for this run.
    pub fn create_service(&self, anywhere: bool) -> Arc<FileService> {
        let fetcher = self.config.font_fetcher(anywhere);
        Arc::new(PreviewService::new(fetcher, self.config.service_config()))
    }

    /// Loader driving a headless surface, logging through `tracing`.
    pub fn create_loader(
        &self,
        service: Arc<FileService>,
        surface: Arc<HeadlessSurface>,
    ) -> FileLoader {
        PreviewLoader::new(
            service,
            surface,
            self.config.loader_config(),
            Arc::new(TracingLogger),
        )
    }
}
