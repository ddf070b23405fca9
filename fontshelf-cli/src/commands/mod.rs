//! CLI command implementations.
//!
//! - [`config`] - Configuration management (get, set, list, path)
//! - [`fetch`] - Read one font file and report its preview payload
//! - [`list`] - Enumerate installed fonts by family
//! - [`preview`] - Replay selections through a preview loader

pub mod config;
pub mod fetch;
pub mod list;
pub mod preview;
