//! Command-line argument parsing and handling.

pub mod check;
pub mod definition;
pub mod diff;
pub mod list;
pub mod permissions;
pub mod utils;

// Re-export commonly used items
pub use definition::{Args, Command, process_args};
pub use utils::determine_log_level;

/// Result of a command handler: text for stdout, or the error to report.
pub type HandlerResult = Result<String, Box<dyn std::error::Error + Send + Sync>>;
