//! Presentation layer for sci-storm
//!
//! This crate contains the CLI definition, the interactive checkpoint
//! reviewer, console formatting and progress reporters.

pub mod cli;
pub mod output;
pub mod progress;
pub mod reviewer;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, ExperimentArgs, GenerateArgs};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
pub use reviewer::{InteractiveCheckpointReviewer, ReviewCommand, parse_command};
