//! Debate transcript: the ordered record of who said what, citing which evidence.

pub mod transcript;

pub use transcript::{DebateOutcome, DialogueTurn, Speaker, Transcript};
