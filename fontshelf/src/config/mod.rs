//! User configuration stored in `config.ini`.
//!
//! Settings structs live in [`settings`], constants in [`defaults`], parsing
//! in `parser`, serialization in `writer` and key-based access for the CLI in
//! [`keys`].

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod size;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{ConfigFile, FontsSettings, LoggingSettings, PreviewSettings};
pub use size::{format_size, parse_size, SizeParseError};
