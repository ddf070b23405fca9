//! Logging abstraction used by long-lived preview components.
//!
//! Components accept an `Arc<dyn Logger>` and log through the `log_*` macros,
//! so the CLI can wire in [`TracingLogger`] while tests stay silent with
//! [`NoOpLogger`].
//!
//! ```
//! use fontshelf::log::{Logger, NoOpLogger};
//! use fontshelf::log_info;
//! use std::sync::Arc;
//!
//! let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
//! log_info!(logger, "Preview surface ready");
//! ```

mod noop;
mod tracing_adapter;
mod r#trait;

pub use noop::NoOpLogger;
pub use r#trait::{LogLevel, Logger};
pub use tracing_adapter::TracingLogger;
