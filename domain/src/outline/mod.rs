//! Document outline negotiated with the human before the debate.

pub mod entities;
pub mod parsing;

pub use entities::{Outline, OutlineSection};
pub use parsing::{parse_outline, parse_outline_strict};
