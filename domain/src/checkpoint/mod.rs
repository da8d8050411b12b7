//! Checkpoint domain: the pipeline stages, what each stage proposes and the
//! human decisions taken on it.

pub mod decision;
pub mod proposal;
pub mod stage;

pub use decision::{DecisionKind, HumanDecision};
pub use proposal::Proposal;
pub use stage::Stage;
