//! Prompt templates for the drafting pipeline

use crate::brief::DocumentBrief;
use crate::debate::DialogueTurn;
use crate::evidence::EvidenceRecord;
use crate::outline::{Outline, OutlineSection};
use crate::roster::ExpertProfile;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for the outline proposal
    pub fn outline_system() -> &'static str {
        r#"You are coordinating a collaborative outline session for a scientific document.
Use the expert roster to propose a draft outline that a human will review.
Each section must be a numbered heading. Sub-points go underneath as bullets."#
    }

    /// User prompt for an outline proposal.
    ///
    /// `strict` is set on the internal retry after a proposal without headings.
    pub fn outline_prompt(
        brief: &DocumentBrief,
        team: &str,
        hooks: &[String],
        feedback: Option<&str>,
        strict: bool,
    ) -> String {
        let mut prompt = format!(
            r#"Goal: {}
Document Style: {}
Structural Requirements: {}
"#,
            brief.goal, brief.style, brief.structure
        );

        if let Some(language) = &brief.language {
            prompt.push_str(&format!("Output Language: {}\n", language));
        }
        for note in &brief.notes {
            prompt.push_str(&format!("Note: {}\n", note));
        }

        prompt.push_str(&format!("\nAvailable Experts:\n{}\n", team));

        if !hooks.is_empty() {
            prompt.push_str("\nMake sure the outline gives room to these focus areas:\n");
            for hook in hooks {
                prompt.push_str(&format!("- {}\n", hook));
            }
        }

        if let Some(feedback) = feedback.map(str::trim).filter(|f| !f.is_empty()) {
            prompt.push_str(&format!(
                "\nThe reviewer rejected the previous outline with this feedback:\n{}\nPropose a complete new outline that addresses it.\n",
                feedback
            ));
        }

        prompt.push_str(
            "\nReturn a markdown outline with numbered sections and a short rationale for each section.",
        );

        if strict {
            prompt.push_str(
                "\nYour previous answer contained no section headings. Respond ONLY with lines of the form `1. Heading`.",
            );
        }

        prompt
    }

    /// System prompt for one expert's debate turn
    pub fn debate_system(expert: &ExpertProfile) -> String {
        let mut system = format!(
            "You are {}, an expert in {}, taking part in a panel discussion about a scientific document.",
            expert.name,
            expert.focus()
        );

        if !expert.system_prompt.trim().is_empty() {
            system.push('\n');
            system.push_str(expert.system_prompt.trim());
        }

        if !expert.stance.trim().is_empty() {
            system.push_str(&format!("\nYour stance: {}", expert.stance.trim()));
        }

        system.push_str(
            "\nCite evidence by its bracketed id, e.g. [rag-0123abcd4567]. Do not invent ids.",
        );
        system
    }

    /// User prompt for one expert's debate turn
    pub fn debate_turn_prompt(
        brief: &DocumentBrief,
        outline: &Outline,
        expert: &ExpertProfile,
        round: usize,
        transcript: &str,
        evidence: &[EvidenceRecord],
    ) -> String {
        let mut prompt = format!(
            r#"Goal: {}
Round: {}

Approved outline:
{}
"#,
            brief.goal,
            round + 1,
            outline.to_markdown()
        );

        if transcript.trim().is_empty() {
            prompt.push_str("\nYou open the discussion.\n");
        } else {
            prompt.push_str(&format!("\nDiscussion so far:\n{}\n", transcript));
        }

        prompt.push_str(&format!("\nEvidence gathered for your focus:\n{}\n", Self::render_evidence(evidence)));

        prompt.push_str(&format!(
            "\nAs {}, analyze the goal from the angle of {}. Respond to earlier points where relevant and return key facts.",
            expert.name,
            expert.focus()
        ));

        prompt
    }

    /// System prompt for section synthesis
    pub fn synthesis_system() -> &'static str {
        r#"You are a lead author merging expert findings into a draft.
Ground the section in the provided discussion and evidence, and cite evidence ids in brackets.
Use bullet points for experimental results and keep terminology precise."#
    }

    /// User prompt for one draft section
    pub fn synthesis_prompt(
        brief: &DocumentBrief,
        outline: &Outline,
        section: &OutlineSection,
        turns: &[&DialogueTurn],
        evidence: &[EvidenceRecord],
    ) -> String {
        let mut prompt = format!(
            r#"Section: {}
Goal: {}
Document Style: {}

Outline:
{}
"#,
            section.title,
            brief.goal,
            brief.style,
            outline.to_markdown()
        );

        for note in &brief.notes {
            prompt.push_str(&format!("Note: {}\n", note));
        }

        if !section.hints.is_empty() {
            prompt.push_str("\nCover these points:\n");
            for hint in &section.hints {
                prompt.push_str(&format!("- {}\n", hint));
            }
        }

        if !turns.is_empty() {
            prompt.push_str("\nRelevant discussion:\n");
            for turn in turns {
                prompt.push_str(&format!("- {}: {}\n", turn.speaker, turn.statement.trim()));
            }
        }

        prompt.push_str(&format!("\nCollected Evidence:\n{}\n", Self::render_evidence(evidence)));

        if let Some(language) = &brief.language {
            prompt.push_str(&format!("\nWrite in {}.", language));
        }
        prompt.push_str("\nWrite a concise draft of this section in markdown without repeating the heading.");

        prompt
    }

    /// One line per record: `[id] (KIND) title: snippet`
    pub fn render_evidence(records: &[EvidenceRecord]) -> String {
        if records.is_empty() {
            return "(none)".to_string();
        }
        records
            .iter()
            .map(|r| format!("[{}] ({}) {}: {}", r.id, r.kind, r.title, r.snippet.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
