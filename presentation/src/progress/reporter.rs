//! Progress reporting for pipeline stages

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use storm_application::ProgressNotifier;
use storm_domain::Stage;

/// Reports progress with a spinner per running stage
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.stage_bar.lock()
            && let Some(pb) = guard.as_ref()
        {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: Stage) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix(stage.display_name().to_string());
        pb.set_message("Working...");
        pb.enable_steady_tick(Duration::from_millis(120));

        if let Ok(mut slot) = self.stage_bar.lock()
            && let Some(previous) = slot.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn on_stage_complete(&self, stage: Stage, success: bool) {
        let Ok(mut slot) = self.stage_bar.lock() else {
            return;
        };
        if let Some(pb) = slot.take() {
            if success {
                pb.finish_with_message(format!("{}", "ready for review".green()));
            } else {
                pb.abandon_with_message(format!("{} failed", stage.display_name().red()));
            }
        }
    }

    fn on_turn_complete(&self, round: usize, speaker: &str) {
        self.with_bar(|pb| pb.set_message(format!("round {} · {} spoke", round + 1, speaker)));
    }

    fn on_section_complete(&self, heading: &str) {
        self.with_bar(|pb| pb.set_message(format!("drafted \"{}\"", heading)));
    }

    fn on_evidence_gathered(&self, topic: &str, count: usize) {
        self.with_bar(|pb| pb.set_message(format!("{} records for {}", count, topic)));
    }
}

/// Simple text-based progress (no spinners)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: Stage) {
        println!("{} {}", "->".cyan(), stage.display_name().bold());
    }

    fn on_stage_complete(&self, stage: Stage, success: bool) {
        if success {
            println!("  {} {}", "v".green(), stage.display_name());
        } else {
            println!("  {} {} (failed)", "x".red(), stage.display_name());
        }
    }

    fn on_turn_complete(&self, round: usize, speaker: &str) {
        println!("  {} round {}: {}", "·".dimmed(), round + 1, speaker);
    }

    fn on_section_complete(&self, heading: &str) {
        println!("  {} {}", "·".dimmed(), heading);
    }
}
