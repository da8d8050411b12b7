//! Progress notification port
//!
//! Defines the interface for reporting progress while the pipeline runs.

use storm_domain::Stage;

/// Callback for progress updates during a pipeline run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console spinner, log lines, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a stage producer starts
    fn on_stage_start(&self, stage: Stage);

    /// Called when a stage producer finished (successfully or not)
    fn on_stage_complete(&self, stage: Stage, success: bool);

    /// Called after each debate turn
    fn on_turn_complete(&self, _round: usize, _speaker: &str) {}

    /// Called after each drafted section
    fn on_section_complete(&self, _heading: &str) {}

    /// Called after each evidence gather call
    fn on_evidence_gathered(&self, _topic: &str, _count: usize) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: Stage) {}
    fn on_stage_complete(&self, _stage: Stage, _success: bool) {}
}
