//! Prompt domain
//!
//! Templates for the outline, debate and synthesis stages.

mod template;

pub use template::PromptTemplate;
