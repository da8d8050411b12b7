//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use storm_domain::DocumentStyle;

/// CLI arguments for sci-storm
#[derive(Parser, Debug)]
#[command(name = "sci-storm")]
#[command(author, version, about = "Expert-panel drafting of scientific documents")]
#[command(long_about = r#"
sci-storm drafts a scientific document with a panel of simulated experts.

The pipeline stops at five checkpoints for your decision:
1. Style & Goal   confirm what is being written
2. Expert Roster  review, add, remove or edit experts
3. Outline        approve or reject the proposed structure
4. Expert Debate  multi-round discussion grounded in gathered evidence
5. Synthesis      evidence-cited draft, written to --output on approval

Approved checkpoints are recorded in a decision log; rerunning resumes
after the last approved checkpoint (use --fresh to start over).

Configuration files are loaded from (in priority order):
1. SCI_STORM_* environment variables (e.g. SCI_STORM_BACKEND__MODEL)
2. --config <path>     Explicit config file (YAML or TOML)
3. ./sci-storm.yaml    Project-level config
4. ~/.config/sci-storm/config.yaml   Global config

Example:
  sci-storm generate --goal "Survey of entanglement distribution" --output survey.md
  sci-storm generate --config run.yaml --experts panel.yaml --yes
  sci-storm experiment --hypothesis "Fidelity drops with distance" fit.py
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the checkpointed drafting pipeline
    Generate(GenerateArgs),

    /// Run code on the tool server and print the interpreted result
    Experiment(ExperimentArgs),

    /// Show configuration file locations and exit
    ShowConfig,
}

/// Arguments of `sci-storm experiment`
#[derive(Args, Debug)]
pub struct ExperimentArgs {
    /// Config file (YAML or TOML)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Hypothesis the experiment tests
    #[arg(long)]
    pub hypothesis: String,

    /// File with the code to run
    #[arg(value_name = "CODE")]
    pub code: PathBuf,
}

/// Arguments of `sci-storm generate`
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Markdown file for the final document (overrides output.path)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Research goal; prompted for when omitted
    #[arg(short, long, value_name = "TEXT")]
    pub goal: Option<String>,

    /// Document style (paper, report, blog)
    #[arg(long, value_name = "STYLE")]
    pub style: Option<DocumentStyle>,

    /// Structural requirements, e.g. "IMRaD"
    #[arg(long, value_name = "TEXT")]
    pub structure: Option<String>,

    /// Output language
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// YAML roster file replacing the default expert panel
    #[arg(long, value_name = "PATH")]
    pub experts: Option<PathBuf>,

    /// Debate rounds (overrides debate.rounds)
    #[arg(long, value_name = "N")]
    pub rounds: Option<usize>,

    /// Approve every checkpoint without prompting
    #[arg(short, long)]
    pub yes: bool,

    /// Discard the decision log and start from the first checkpoint
    #[arg(long)]
    pub fresh: bool,

    /// Do not ask for a moderator note between debate rounds
    #[arg(long, conflicts_with = "yes")]
    pub no_interject: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::parse_from([
            "sci-storm",
            "-vv",
            "generate",
            "--config",
            "run.yaml",
            "--output",
            "out.md",
            "--goal",
            "Entanglement survey",
            "--style",
            "paper",
            "--yes",
        ]);

        assert_eq!(cli.verbose, 2);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.config, Some(PathBuf::from("run.yaml")));
        assert_eq!(args.output, Some(PathBuf::from("out.md")));
        assert_eq!(args.style, Some(DocumentStyle::Paper));
        assert!(args.yes);
        assert!(!args.fresh);
        assert!(!args.no_interject);
    }

    #[test]
    fn test_no_interject_flag() {
        let cli = Cli::parse_from(["sci-storm", "generate", "--no-interject"]);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert!(args.no_interject);
        assert!(Cli::try_parse_from(["sci-storm", "generate", "--yes", "--no-interject"]).is_err());
    }

    #[test]
    fn test_parse_experiment() {
        let cli = Cli::parse_from(["sci-storm", "experiment", "--hypothesis", "H1", "fit.py"]);
        let Command::Experiment(args) = cli.command else {
            panic!("expected experiment");
        };
        assert_eq!(args.hypothesis, "H1");
        assert_eq!(args.code, PathBuf::from("fit.py"));
        assert!(Cli::try_parse_from(["sci-storm", "experiment", "fit.py"]).is_err());
    }

    #[test]
    fn test_unknown_style_rejected() {
        let result = Cli::try_parse_from(["sci-storm", "generate", "--style", "poem"]);
        assert!(result.is_err());
    }
}
