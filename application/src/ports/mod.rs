//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod completion;
pub mod decision_log;
pub mod evidence;
pub mod progress;
pub mod reviewer;
pub mod tool_server;
pub mod transport;
