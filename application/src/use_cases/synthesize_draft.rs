//! Synthesize Draft use case
//!
//! One backend call per outline heading. Each call only sees the debate
//! turns and ledger records that mention one of the heading's keywords,
//! plus evidence gathered for the heading itself. A heading that matches
//! nothing, such as "Introduction", falls back to the research goal's
//! keywords and then to the whole debate.

use crate::ports::completion::{CompletionBackend, CompletionOptions};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::gather_evidence::GatherEvidenceUseCase;
use crate::use_cases::shared::{StageError, complete_cancellable};
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use storm_domain::core::text::{keywords, mentions_any};
use storm_domain::{
    DebateOutcome, DialogueTurn, Document, DocumentBrief, DraftSection, EvidenceRecord, Outline,
    OutlineSection, PromptTemplate,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Input for the SynthesizeDraft use case
#[derive(Debug, Clone, Copy)]
pub struct SynthesizeDraftInput<'a> {
    pub brief: &'a DocumentBrief,
    pub outline: &'a Outline,
    pub debate: &'a DebateOutcome,
}

/// Use case for drafting the document section by section
pub struct SynthesizeDraftUseCase {
    backend: Arc<dyn CompletionBackend>,
    evidence: GatherEvidenceUseCase,
    options: CompletionOptions,
}

impl SynthesizeDraftUseCase {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        evidence: GatherEvidenceUseCase,
        options: CompletionOptions,
    ) -> Self {
        Self {
            backend,
            evidence,
            options,
        }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: SynthesizeDraftInput<'_>,
        cancel: &CancellationToken,
    ) -> Result<Document, StageError> {
        self.execute_with_progress(input, cancel, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: SynthesizeDraftInput<'_>,
        cancel: &CancellationToken,
        progress: &dyn ProgressNotifier,
    ) -> Result<Document, StageError> {
        info!("Synthesizing {} sections", input.outline.len());

        let mut sections = Vec::with_capacity(input.outline.len());
        let mut cited: Vec<EvidenceRecord> = Vec::new();

        for section in input.outline.sections() {
            let (draft, used) = self.draft_section(&input, section, cancel).await?;
            progress.on_section_complete(&draft.heading);
            cited.extend(used);
            sections.push(draft);
        }

        Ok(Document::assemble(input.brief.title(), sections, &cited))
    }

    async fn draft_section(
        &self,
        input: &SynthesizeDraftInput<'_>,
        section: &OutlineSection,
        cancel: &CancellationToken,
    ) -> Result<(DraftSection, Vec<EvidenceRecord>), StageError> {
        let term_sets = [keywords(&section.title), keywords(&input.brief.goal)];
        let fresh = self.evidence.gather(&section.title, cancel).await?;

        let turns: Vec<&DialogueTurn> = relevant(input.debate.transcript.turns(), &term_sets, |t| {
            t.statement.clone()
        });
        let from_ledger = relevant(input.debate.ledger.records(), &term_sets, |r| {
            r.searchable_text()
        })
        .into_iter()
        .cloned();
        let claims = turns
            .iter()
            .filter(|t| !t.speaker.is_moderator())
            .map(|t| t.as_claim());

        let mut seen = HashSet::new();
        let evidence: Vec<EvidenceRecord> = from_ledger
            .chain(fresh)
            .chain(claims)
            .filter(|r| seen.insert(r.id.clone()))
            .collect();

        debug!(
            "Section '{}': {} relevant turns, {} evidence records",
            section.title,
            turns.len(),
            evidence.len()
        );

        let prompt =
            PromptTemplate::synthesis_prompt(input.brief, input.outline, section, &turns, &evidence);
        let text = complete_cancellable(
            self.backend.as_ref(),
            PromptTemplate::synthesis_system(),
            &prompt,
            &self.options,
            cancel,
        )
        .await?;

        let ids = evidence.iter().map(|r| r.id.clone()).collect();
        Ok((DraftSection::new(section.title.clone(), text, ids), evidence))
    }
}

/// Items mentioning the first term set that matches anything, or all items
/// when none does.
fn relevant<'a, T>(
    items: &'a [T],
    term_sets: &[BTreeSet<String>],
    text: impl Fn(&T) -> String,
) -> Vec<&'a T> {
    term_sets
        .iter()
        .map(|terms| {
            items
                .iter()
                .filter(|item| mentions_any(&text(item), terms))
                .collect::<Vec<_>>()
        })
        .find(|matched| !matched.is_empty())
        .unwrap_or_else(|| items.iter().collect())
}
