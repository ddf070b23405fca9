//! CLI error handling with user-friendly messages.

use fontshelf::config::ConfigFileError;
use fontshelf::preview::{FetchError, PreviewError};
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to load a font preview
    Preview { path: String, error: PreviewError },
    /// A command could not finish
    Command(String),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Preview {
            error: PreviewError::Fetch(FetchError::OutsideAllowedDirectory { .. }),
            ..
        } = self
        {
            eprintln!();
            eprintln!("Fonts are only read from the configured font directories.");
            eprintln!("  Add the directory with: fontshelf config set fonts.allowed_dirs <dirs>");
            eprintln!("  Or pass --anywhere to lift the restriction for one run");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Preview { path, error } => {
                write!(f, "Failed to load preview for '{}': {}", path, error)
            }
            CliError::Command(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Preview { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}
