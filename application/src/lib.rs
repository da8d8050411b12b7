//! Application layer for sci-storm
//!
//! This crate contains the stage use cases, the checkpoint orchestrator,
//! port definitions, resilient clients and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod resilience;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{PipelineConfig, RetryPolicy};
pub use ports::{
    completion::{BackendError, CompletionBackend, CompletionOptions, CompletionTransport},
    decision_log::{DecisionLog, DecisionLogError, DecisionRecord, InMemoryDecisionLog},
    evidence::{NoSearch, ReferenceIndexPort, SearchPort, SourceError},
    progress::{NoProgress, ProgressNotifier},
    reviewer::{AutoApproveReviewer, CheckpointReviewer, ReviewError},
    tool_server::{ServerLauncher, ToolInvocation, ToolServerError, ToolServerTransport},
    transport::TransportError,
};
pub use resilience::{ResilientBackend, ToolServerClient};
pub use use_cases::gather_evidence::{EvidenceSources, GatherEvidenceUseCase};
pub use use_cases::orchestrator::{
    CheckpointOrchestrator, PipelineError, PipelineSeed, PipelineStatus, StageProducers,
};
pub use use_cases::run_pipeline::RunPipelineUseCase;
pub use use_cases::shared::StageError;
