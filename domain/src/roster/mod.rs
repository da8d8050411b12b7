//! Expert roster: the simulated panel that debates the document.

pub mod entities;
pub mod manager;

pub use entities::{ExpertPatch, ExpertProfile, RosterEdit, MODERATOR_ID};
pub use manager::RosterManager;
