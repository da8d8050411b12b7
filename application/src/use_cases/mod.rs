//! Use cases
//!
//! Stage producers, the checkpoint orchestrator and the driver loop.

pub mod gather_evidence;
pub mod negotiate_outline;
pub mod orchestrator;
pub mod run_debate;
pub mod run_pipeline;
pub mod shared;
pub mod synthesize_draft;
