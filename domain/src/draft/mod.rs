//! Draft output: one section per outline heading, assembled into a document.

pub mod entities;

pub use entities::{DraftSection, Document};
