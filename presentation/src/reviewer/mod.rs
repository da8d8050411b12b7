//! Terminal checkpoint review

pub mod interactive;

pub use interactive::{InteractiveCheckpointReviewer, ReviewCommand, parse_command};
