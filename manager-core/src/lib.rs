//! Manager Core Library
//!
//! This library provides the non-visual half of the extension manager:
//! inventory listing and search, user annotations, manual enable/disable
//! and uninstall with audit history, and logging initialization. Rendering
//! is the embedding application's concern.

pub mod extensions;
pub mod search;

/// Logging configuration and initialization
pub mod logging;

/// Error types for manager operations
pub mod error;

pub use error::ManagerError;
pub use extensions::{ExtensionRow, ExtensionService};
pub use logging::{init_logging, LoggingConfig};
pub use search::is_match;

/// Result type alias for manager operations
pub type Result<T> = std::result::Result<T, ManagerError>;
