//! Negotiate Outline use case
//!
//! Proposes a complete outline for the brief and roster. Every proposal is
//! generated from scratch; reviewer feedback is only extra context for the
//! next one.

use crate::ports::completion::{CompletionBackend, CompletionOptions};
use crate::use_cases::shared::{StageError, complete_cancellable};
use std::sync::Arc;
use storm_domain::{
    DocumentBrief, DomainError, Outline, PromptTemplate, RosterManager, parse_outline_strict,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Use case for proposing outlines
pub struct NegotiateOutlineUseCase {
    backend: Arc<dyn CompletionBackend>,
    options: CompletionOptions,
}

impl NegotiateOutlineUseCase {
    /// Total proposals per call: the first one plus one internal retry.
    const ATTEMPTS: usize = 2;

    pub fn new(backend: Arc<dyn CompletionBackend>, options: CompletionOptions) -> Self {
        Self { backend, options }
    }

    /// Propose an outline. A proposal without headings is retried once
    /// with a stricter prompt, then reported as `MalformedOutline`.
    pub async fn propose(
        &self,
        brief: &DocumentBrief,
        roster: &RosterManager,
        feedback: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Outline, StageError> {
        let team = roster.describe_team();
        let hooks = roster.outline_hooks();
        let mut last_response = String::new();

        for attempt in 0..Self::ATTEMPTS {
            let prompt = PromptTemplate::outline_prompt(brief, &team, &hooks, feedback, attempt > 0);
            let response = complete_cancellable(
                self.backend.as_ref(),
                PromptTemplate::outline_system(),
                &prompt,
                &self.options,
                cancel,
            )
            .await?;

            if let Some(outline) = parse_outline_strict(&response) {
                info!("Outline proposed with {} sections", outline.len());
                return Ok(outline.with_format(brief.structure.clone()));
            }

            warn!(
                "Outline proposal {}/{} contained no headings",
                attempt + 1,
                Self::ATTEMPTS
            );
            debug!("Unparseable outline response: {}", response);
            last_response = response;
        }

        Err(DomainError::MalformedOutline(format!(
            "no section headings after {} proposals (last response: {:?})",
            Self::ATTEMPTS,
            storm_domain::core::text::truncate(last_response.trim(), 120)
        ))
        .into())
    }
}
