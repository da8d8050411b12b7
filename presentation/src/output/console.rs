//! Console output for checkpoints and results

use colored::Colorize;
use storm_application::PipelineError;
use storm_domain::{
    DebateOutcome, Document, DocumentBrief, Outline, Proposal, RosterManager, Stage, Transcript,
};
use storm_domain::core::text::truncate;

/// Formats proposals, debate rounds and results for the terminal
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a checkpoint proposal for review
    pub fn format_proposal(proposal: &Proposal) -> String {
        let stage = proposal.stage();
        let mut output = Self::header(&format!(
            "Checkpoint {}/5: {}",
            Self::checkpoint_number(stage),
            stage.display_name()
        ));
        output.push('\n');

        match proposal {
            Proposal::StyleGoal(brief) => output.push_str(&Self::format_brief(brief)),
            Proposal::Roster(roster) => output.push_str(&Self::format_roster(roster)),
            Proposal::Outline(outline) => output.push_str(&Self::format_outline(outline)),
            Proposal::Debate(outcome) => output.push_str(&Self::format_debate(outcome)),
            Proposal::Synthesis(document) => output.push_str(&Self::format_document(document)),
        }

        output.push_str(&Self::footer());
        output
    }

    fn checkpoint_number(stage: Stage) -> usize {
        Stage::ORDER
            .iter()
            .position(|s| *s == stage)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    fn format_brief(brief: &DocumentBrief) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{} {}\n", "Goal:".cyan().bold(), brief.goal));
        output.push_str(&format!("{} {}\n", "Style:".cyan().bold(), brief.style.as_str()));
        if !brief.structure.is_empty() {
            output.push_str(&format!("{} {}\n", "Structure:".cyan().bold(), brief.structure));
        }
        if let Some(language) = &brief.language {
            output.push_str(&format!("{} {}\n", "Language:".cyan().bold(), language));
        }
        if !brief.notes.is_empty() {
            output.push_str(&format!("{}\n", "Notes:".cyan().bold()));
            for note in &brief.notes {
                output.push_str(&format!("  * {}\n", note));
            }
        }
        output
    }

    fn format_roster(roster: &RosterManager) -> String {
        let mut output = Self::section_header(&format!("Experts ({})", roster.len()));
        if roster.is_empty() {
            output.push_str(&format!(
                "  {}\n",
                "(empty; add an expert before approving)".yellow()
            ));
        }
        for expert in roster.experts() {
            output.push_str(&format!(
                "  {:<24} {}  ({})\n",
                expert.id.yellow(),
                expert.name.bold(),
                expert.focus()
            ));
            if !expert.stance.is_empty() {
                output.push_str(&format!("  {:<24} stance: {}\n", "", expert.stance.dimmed()));
            }
        }
        output
    }

    fn format_outline(outline: &Outline) -> String {
        let mut output = Self::section_header("Proposed Outline");
        if let Some(format) = outline.format() {
            output.push_str(&format!("{} {}\n", "Format:".dimmed(), format));
        }
        output.push_str(&Self::indent(&outline.to_markdown(), "  "));
        output.push('\n');
        output
    }

    fn format_debate(outcome: &DebateOutcome) -> String {
        let mut output = Self::section_header(&format!(
            "Debate ({} rounds, {} turns)",
            outcome.transcript.rounds(),
            outcome.transcript.len()
        ));
        output.push_str(&Self::format_turns(&outcome.transcript, None));

        output.push_str(&Self::section_header(&format!(
            "Evidence ({} records)",
            outcome.ledger.len()
        )));
        for record in outcome.ledger.records() {
            output.push_str(&format!(
                "  [{}] {} {}\n",
                record.id.yellow(),
                format!("{}", record.kind).dimmed(),
                truncate(&record.title, 70)
            ));
        }
        output
    }

    /// Format the turns of one debate round
    pub fn format_round(round: usize, transcript: &Transcript) -> String {
        let mut output = Self::section_header(&format!("Round {} complete", round + 1));
        output.push_str(&Self::format_turns(transcript, Some(round)));
        output
    }

    fn format_turns(transcript: &Transcript, only_round: Option<usize>) -> String {
        let mut output = String::new();
        for turn in transcript.turns() {
            if only_round.is_some_and(|r| r != turn.round) {
                continue;
            }
            let speaker = if turn.speaker.is_moderator() {
                format!("── R{} {} ──", turn.round + 1, turn.speaker).magenta().bold()
            } else {
                format!("── R{} {} ──", turn.round + 1, turn.speaker).yellow().bold()
            };
            output.push_str(&format!("\n{}\n{}\n", speaker, truncate(&turn.statement, 600)));
            if !turn.cited_evidence.is_empty() {
                output.push_str(&format!(
                    "{} {}\n",
                    "cites:".dimmed(),
                    turn.cited_evidence.join(", ").dimmed()
                ));
            }
        }
        output
    }

    fn format_document(document: &Document) -> String {
        let mut output = format!("\n{} {}\n", "Title:".cyan().bold(), document.title);
        for section in &document.sections {
            output.push_str(&Self::section_header(&section.heading));
            output.push_str(&section.text);
            output.push('\n');
            if section.evidence_ids.is_empty() {
                output.push_str(&format!("{}\n", "(no citations)".dimmed()));
            }
        }
        output.push_str(&Self::section_header(&format!(
            "References ({})",
            document.references.len()
        )));
        for record in &document.references {
            output.push_str(&format!(
                "  [{}] {} <{}>\n",
                record.id.yellow(),
                record.title,
                record.locator.dimmed()
            ));
        }
        output
    }

    /// One-line summary printed after the document is written
    pub fn format_written(document: &Document, path: &std::path::Path) -> String {
        format!(
            "{} Wrote \"{}\" ({} sections, {} references) to {}",
            "✓".green(),
            document.title,
            document.sections.len(),
            document.references.len(),
            path.display()
        )
    }

    /// Format a pipeline failure, naming the stage and failing component
    pub fn format_error(error: &PipelineError) -> String {
        match error {
            PipelineError::Halted { stage, source } => format!(
                "{} Pipeline halted at {} ({})\n  {}\n  {}",
                "✗".red(),
                stage.display_name().bold(),
                source.component(),
                source,
                "Approved checkpoints are kept in the decision log; rerun to resume.".dimmed()
            ),
            PipelineError::Aborted => format!("{} Pipeline aborted", "✗".red()),
            other => format!("{} {}", "✗".red(), other),
        }
    }

    /// Format a decision that could not be applied
    pub fn format_rejected(stage: Stage, reason: &str) -> String {
        format!(
            "{} {}\n  {}",
            "⚠️".yellow(),
            reason.red(),
            format!("{} is still open; enter another command.", stage.display_name()).dimmed()
        )
    }

    fn header(title: &str) -> String {
        let line = "═".repeat(63);
        format!("{}\n  {}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "═".repeat(63).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storm_domain::{
        DialogueTurn, DraftSection, EvidenceKind, EvidenceLedger, EvidenceRecord, OutlineSection,
    };

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_brief_proposal() {
        plain();
        let brief = DocumentBrief::new("Entanglement distribution survey")
            .unwrap()
            .with_language("German");
        let text = ConsoleFormatter::format_proposal(&Proposal::StyleGoal(brief));
        assert!(text.contains("Checkpoint 1/5: Style & Goal"));
        assert!(text.contains("Goal: Entanglement distribution survey"));
        assert!(text.contains("Language: German"));
    }

    #[test]
    fn test_roster_proposal_lists_ids() {
        plain();
        let brief = DocumentBrief::new("goal").unwrap();
        let roster = RosterManager::seed_default(&brief);
        let text = ConsoleFormatter::format_proposal(&Proposal::Roster(roster));
        assert!(text.contains("Checkpoint 2/5"));
        assert!(text.contains("Experts (3)"));
        assert!(text.contains("methodologist"));
    }

    #[test]
    fn test_empty_roster_warns() {
        plain();
        let text = ConsoleFormatter::format_proposal(&Proposal::Roster(RosterManager::new()));
        assert!(text.contains("add an expert before approving"));
    }

    #[test]
    fn test_outline_proposal() {
        plain();
        let outline = Outline::new(vec![
            OutlineSection::new("Introduction"),
            OutlineSection::new("Methods"),
        ])
        .unwrap();
        let text = ConsoleFormatter::format_proposal(&Proposal::Outline(outline));
        assert!(text.contains("  1. Introduction"));
        assert!(text.contains("  2. Methods"));
    }

    #[test]
    fn test_round_shows_only_that_round() {
        plain();
        let mut transcript = Transcript::new();
        transcript.append(DialogueTurn::expert(0, "methodologist", "First round.", vec![]));
        transcript.append(DialogueTurn::expert(1, "methodologist", "Second round.", vec![]));
        let text = ConsoleFormatter::format_round(1, &transcript);
        assert!(text.contains("Second round."));
        assert!(!text.contains("First round."));
    }

    #[test]
    fn test_debate_lists_evidence() {
        plain();
        let record = EvidenceRecord::new(EvidenceKind::Search, "Bell tests", "Loophole-free.", "https://x");
        let id = record.id.clone();
        let mut ledger = EvidenceLedger::new();
        ledger.insert(record);
        let mut transcript = Transcript::new();
        transcript.append(DialogueTurn::expert(0, "methodologist", "Cite it.", vec![id.clone()]));
        let text = ConsoleFormatter::format_proposal(&Proposal::Debate(DebateOutcome {
            transcript,
            ledger,
        }));
        assert!(text.contains("Evidence (1 records)"));
        assert!(text.contains(&format!("cites: {}", id)));
    }

    #[test]
    fn test_document_lists_references() {
        plain();
        let record = EvidenceRecord::new(EvidenceKind::LocalRag, "notes.md (paragraph 1)", "Swapping.", "notes.md#0");
        let section = DraftSection::new("Introduction", "Text.", vec![record.id.clone()]);
        let document = Document::assemble("Survey", vec![section], &[record]);
        let text = ConsoleFormatter::format_proposal(&Proposal::Synthesis(document));
        assert!(text.contains("Checkpoint 5/5"));
        assert!(text.contains("References (1)"));
        assert!(text.contains("<notes.md#0>"));
    }

    #[test]
    fn test_aborted_error() {
        plain();
        assert!(ConsoleFormatter::format_error(&PipelineError::Aborted).contains("aborted"));
    }

    #[test]
    fn test_rejected_decision_names_stage() {
        plain();
        let text = ConsoleFormatter::format_rejected(Stage::Roster, "Unknown expert: nobody");
        assert!(text.contains("Unknown expert: nobody"));
        assert!(text.contains(Stage::Roster.display_name()));
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
