//! Interactive checkpoint review over stdin.
//!
//! Each checkpoint prints its proposal and reads commands until one of them
//! is a decision:
//!
//! ```text
//! ═══════════════════════════════════════════════════════════════
//!   Checkpoint 2/5: Expert Roster
//! ═══════════════════════════════════════════════════════════════
//!
//!   literature-reviewer  Literature Reviewer  (prior work and citations)
//!   ...
//!
//! storm[roster]>
//! ```
//!
//! # Commands
//!
//! | Command | Aliases | Description |
//! |---------|---------|-------------|
//! | `/approve` | `approve`, `a` | Accept the proposal |
//! | `/reject <feedback>` | `reject`, `r` | Regenerate with feedback |
//! | `/edit add <name> \| <focus> [\| <stance>]` | `edit`, `e` | Add an expert (roster only) |
//! | `/edit remove <id>` | | Remove an expert (roster only) |
//! | `/edit set <id> <field>=<value>` | | Change name, focus, stance or prompt |
//! | `/abort` | `abort`, `q` | Stop the pipeline |
//! | `/help` | `help`, `?` | Show the commands |

use crate::output::console::ConsoleFormatter;
use async_trait::async_trait;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use storm_application::{CheckpointReviewer, ReviewError};
use storm_domain::{
    ExpertPatch, ExpertProfile, HumanDecision, Proposal, RosterEdit, Stage, Transcript,
};

/// A parsed line of reviewer input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewCommand {
    Decide(HumanDecision),
    Help,
    /// Blank line; prompt again
    Nothing,
}

/// Parse one input line at `stage`.
///
/// Returns a message to show the user when the line is not a valid command.
pub fn parse_command(input: &str, stage: Stage) -> Result<ReviewCommand, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(ReviewCommand::Nothing);
    }

    let (head, rest) = match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    };

    match head.to_lowercase().as_str() {
        "/approve" | "approve" | "a" => Ok(ReviewCommand::Decide(HumanDecision::Approve)),
        "/abort" | "abort" | "q" => Ok(ReviewCommand::Decide(HumanDecision::Abort)),
        "/help" | "help" | "?" => Ok(ReviewCommand::Help),
        "/reject" | "reject" | "r" => {
            if rest.is_empty() {
                Err("/reject needs feedback, e.g. /reject focus on photonic systems".to_string())
            } else {
                Ok(ReviewCommand::Decide(HumanDecision::RejectWithFeedback(
                    rest.to_string(),
                )))
            }
        }
        "/edit" | "edit" | "e" => {
            if stage != Stage::Roster {
                return Err("/edit is only available at the roster checkpoint".to_string());
            }
            parse_edit(rest).map(|edit| ReviewCommand::Decide(HumanDecision::EditRoster(vec![edit])))
        }
        _ => Err(format!("Unknown command: {}", input)),
    }
}

fn parse_edit(args: &str) -> Result<RosterEdit, String> {
    let (action, rest) = match args.split_once(char::is_whitespace) {
        Some((action, rest)) => (action, rest.trim()),
        None => (args, ""),
    };

    match action {
        "add" => {
            let parts: Vec<&str> = rest.split('|').map(str::trim).collect();
            let name = parts.first().copied().unwrap_or_default();
            if name.is_empty() {
                return Err("usage: /edit add <name> | <focus> [| <stance>]".to_string());
            }
            let focus = parts.get(1).copied().unwrap_or_default();
            let mut profile = ExpertProfile::new(name, focus);
            if let Some(stance) = parts.get(2).filter(|s| !s.is_empty()) {
                profile = profile.with_stance(*stance);
            }
            Ok(RosterEdit::Add { profile })
        }
        "remove" | "rm" => {
            if rest.is_empty() {
                return Err("usage: /edit remove <id>".to_string());
            }
            Ok(RosterEdit::Remove {
                id: rest.to_string(),
            })
        }
        "set" => {
            let Some((id, assignment)) = rest.split_once(char::is_whitespace) else {
                return Err("usage: /edit set <id> <field>=<value>".to_string());
            };
            let Some((field, value)) = assignment.split_once('=') else {
                return Err("usage: /edit set <id> <field>=<value>".to_string());
            };
            let value = value.trim().to_string();
            let mut patch = ExpertPatch::default();
            match field.trim() {
                "name" => patch.name = Some(value),
                "focus" | "expertise" => patch.expertise = Some(value),
                "stance" => patch.stance = Some(value),
                "prompt" | "system_prompt" => patch.system_prompt = Some(value),
                other => {
                    return Err(format!(
                        "Unknown field '{}' (expected name, focus, stance or prompt)",
                        other
                    ));
                }
            }
            Ok(RosterEdit::Edit {
                id: id.to_string(),
                patch,
            })
        }
        _ => Err("usage: /edit add|remove|set ...".to_string()),
    }
}

/// Interactive reviewer for the terminal.
pub struct InteractiveCheckpointReviewer {
    interject_between_rounds: bool,
}

impl InteractiveCheckpointReviewer {
    pub fn new() -> Self {
        Self {
            interject_between_rounds: true,
        }
    }

    /// Skip the moderator prompt between debate rounds.
    pub fn without_interjections(mut self) -> Self {
        self.interject_between_rounds = false;
        self
    }

    fn print_help(stage: Stage) {
        println!("{}", "Commands:".cyan().bold());
        println!("  {}              - Accept and continue", "/approve".green());
        println!("  {}   - Regenerate with feedback", "/reject <text>".yellow());
        if stage == Stage::Roster {
            println!(
                "  {} - Add an expert",
                "/edit add <name> | <focus> [| <stance>]".yellow()
            );
            println!("  {}              - Remove an expert", "/edit remove <id>".yellow());
            println!(
                "  {} - Change name, focus, stance or prompt",
                "/edit set <id> <field>=<value>".yellow()
            );
        }
        println!("  {}                - Stop the pipeline", "/abort".red());
        println!();
    }

    /// Read one line from stdin without blocking the runtime.
    ///
    /// End of input is reported as [`ReviewError::Cancelled`].
    async fn read_line(prompt: String) -> Result<String, ReviewError> {
        tokio::task::spawn_blocking(move || {
            print!("{} ", prompt.magenta().bold());
            io::stdout()
                .flush()
                .map_err(|e| ReviewError::Io(format!("Failed to flush stdout: {}", e)))?;

            let mut input = String::new();
            let read = io::stdin()
                .lock()
                .read_line(&mut input)
                .map_err(|e| ReviewError::Io(format!("Failed to read input: {}", e)))?;
            if read == 0 {
                return Err(ReviewError::Cancelled);
            }
            Ok(input.trim().to_string())
        })
        .await
        .map_err(|e| ReviewError::Io(format!("Input task failed: {}", e)))?
    }
}

impl Default for InteractiveCheckpointReviewer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CheckpointReviewer for InteractiveCheckpointReviewer {
    async fn review(&self, proposal: &Proposal) -> Result<HumanDecision, ReviewError> {
        let stage = proposal.stage();
        println!();
        println!("{}", ConsoleFormatter::format_proposal(proposal));
        Self::print_help(stage);

        let prompt = format!("storm[{}]>", stage.as_str());
        loop {
            let input = Self::read_line(prompt.clone()).await?;
            match parse_command(&input, stage) {
                Ok(ReviewCommand::Decide(decision)) => {
                    println!();
                    match &decision {
                        HumanDecision::Approve => {
                            println!("{}", format!("✓ {} approved", stage.display_name()).green())
                        }
                        HumanDecision::RejectWithFeedback(_) => {
                            println!("{}", "↻ Regenerating with feedback...".yellow())
                        }
                        HumanDecision::EditRoster(_) => {
                            println!("{}", "✎ Applying roster edit...".yellow())
                        }
                        HumanDecision::Abort => println!("{}", "✗ Aborted".red()),
                    }
                    return Ok(decision);
                }
                Ok(ReviewCommand::Help) => Self::print_help(stage),
                Ok(ReviewCommand::Nothing) => continue,
                Err(message) => {
                    println!("{} {}", "⚠️".yellow(), message.red());
                    println!();
                }
            }
        }
    }

    async fn interject(
        &self,
        round: usize,
        transcript: &Transcript,
    ) -> Result<Option<String>, ReviewError> {
        if !self.interject_between_rounds {
            return Ok(None);
        }

        println!();
        println!("{}", ConsoleFormatter::format_round(round, transcript));
        println!(
            "{}",
            "Moderator note for the next round (empty line to continue):".dimmed()
        );
        let input = Self::read_line("moderator>".to_string()).await?;
        Ok(Some(input).filter(|s| !s.is_empty()))
    }
    fn decision_rejected(&self, stage: Stage, reason: &str) {
        println!("{}", ConsoleFormatter::format_rejected(stage, reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(input: &str, stage: Stage) -> HumanDecision {
        match parse_command(input, stage).unwrap() {
            ReviewCommand::Decide(decision) => decision,
            other => panic!("expected a decision, got {:?}", other),
        }
    }

    #[test]
    fn test_approve_and_abort_aliases() {
        for input in ["/approve", "approve", "a", "  A  "] {
            assert_eq!(decision(input, Stage::Outline), HumanDecision::Approve);
        }
        for input in ["/abort", "abort", "q"] {
            assert_eq!(decision(input, Stage::Debate), HumanDecision::Abort);
        }
    }

    #[test]
    fn test_reject_carries_feedback() {
        assert_eq!(
            decision("/reject  add a section on photonics ", Stage::Outline),
            HumanDecision::RejectWithFeedback("add a section on photonics".to_string())
        );
        assert!(parse_command("/reject", Stage::Outline).is_err());
    }

    #[test]
    fn test_blank_and_help() {
        assert_eq!(parse_command("   ", Stage::StyleGoal), Ok(ReviewCommand::Nothing));
        assert_eq!(parse_command("/help", Stage::StyleGoal), Ok(ReviewCommand::Help));
        assert!(parse_command("/frobnicate", Stage::StyleGoal).is_err());
    }

    #[test]
    fn test_edit_add() {
        let HumanDecision::EditRoster(edits) = decision(
            "/edit add Photonics Physicist | photonic qubits | skeptical of hype",
            Stage::Roster,
        ) else {
            panic!("expected roster edit");
        };
        let RosterEdit::Add { profile } = &edits[0] else {
            panic!("expected add");
        };
        assert_eq!(profile.id, "photonics-physicist");
        assert_eq!(profile.expertise, "photonic qubits");
        assert_eq!(profile.stance, "skeptical of hype");
    }

    #[test]
    fn test_edit_remove_and_set() {
        assert_eq!(
            decision("/edit remove data-engineer", Stage::Roster),
            HumanDecision::EditRoster(vec![RosterEdit::Remove {
                id: "data-engineer".to_string()
            }])
        );

        let HumanDecision::EditRoster(edits) =
            decision("/edit set methodologist stance=favors RCTs", Stage::Roster)
        else {
            panic!("expected roster edit");
        };
        let RosterEdit::Edit { id, patch } = &edits[0] else {
            panic!("expected edit");
        };
        assert_eq!(id, "methodologist");
        assert_eq!(patch.stance.as_deref(), Some("favors RCTs"));
        assert!(patch.name.is_none());
    }

    #[test]
    fn test_edit_rejected_outside_roster() {
        assert!(parse_command("/edit remove methodologist", Stage::Outline).is_err());
    }

    #[test]
    fn test_edit_usage_errors() {
        assert!(parse_command("/edit add", Stage::Roster).is_err());
        assert!(parse_command("/edit set methodologist", Stage::Roster).is_err());
        assert!(parse_command("/edit set methodologist mood=happy", Stage::Roster).is_err());
        assert!(parse_command("/edit rename x", Stage::Roster).is_err());
    }

    #[tokio::test]
    async fn test_interjections_can_be_turned_off() {
        let reviewer = InteractiveCheckpointReviewer::new().without_interjections();

        let note = reviewer.interject(0, &Transcript::default()).await.unwrap();

        assert!(note.is_none());
    }
}
