//! Progress reporting for pipeline runs

use super::step::{Step, StepStatus};
use colored::Colorize;

/// Tally of one pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Steps that never ran because the pipeline halted
    pub fn not_run(&self) -> usize {
        self.total - self.succeeded - self.failed - self.skipped
    }
}

/// Receives pipeline progress events.
///
/// Every method has a no-op default so implementors only override what they
/// display.
pub trait Reporter {
    fn run_started(&mut self, _total: usize) {}

    /// `index` is 1-based
    fn step_started(&mut self, _index: usize, _total: usize, _step: &Step) {}

    fn step_finished(&mut self, _index: usize, _total: usize, _step: &Step) {}

    fn handler_failed(&mut self, _step: &Step, _error: &str) {}

    fn halted(&mut self, _index: usize, _total: usize) {}

    fn run_finished(&mut self, _summary: &RunSummary, _failed: &[&Step]) {}
}

/// Reporter that prints nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {}

/// Colored console output
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn run_started(&mut self, total: usize) {
        println!();
        println!("{}", format!("Running {} steps...", total).cyan().bold());
        println!();
    }

    fn step_started(&mut self, index: usize, total: usize, step: &Step) {
        println!("{} {}", format!("[{}/{}]", index, total).blue(), step.name());
        if !step.describe().is_empty() {
            println!("  {}", step.describe().dimmed());
        }
    }

    fn step_finished(&mut self, _index: usize, _total: usize, step: &Step) {
        match step.status() {
            StepStatus::Success => println!("  {} {}", "✓".green(), "done".green()),
            StepStatus::Skipped => println!(
                "  {} {} ({})",
                "⊘".yellow(),
                "skipped".yellow(),
                step.error_message().unwrap_or("optional step failed")
            ),
            StepStatus::Failed => println!(
                "  {} {}: {}",
                "✗".red(),
                "failed".red(),
                step.error_message().unwrap_or("unknown error")
            ),
            StepStatus::Pending | StepStatus::Running => {}
        }
        println!();
    }

    fn handler_failed(&mut self, step: &Step, error: &str) {
        eprintln!(
            "{} error handler for '{}' failed: {}",
            "Warning:".yellow(),
            step.name(),
            error
        );
    }

    fn halted(&mut self, index: usize, total: usize) {
        println!(
            "{}",
            format!("Stopped after {}/{} steps", index, total).red()
        );
    }

    fn run_finished(&mut self, summary: &RunSummary, failed: &[&Step]) {
        println!();
        println!("{}", "Summary".bold());
        println!("  {} {}", "succeeded:".green(), summary.succeeded);
        println!("  {} {}", "failed:".red(), summary.failed);
        println!("  {} {}", "skipped:".yellow(), summary.skipped);

        if !failed.is_empty() {
            println!();
            println!("{}", "Failed steps:".red().bold());
            for step in failed {
                println!(
                    "  - {}: {}",
                    step.name(),
                    step.error_message().unwrap_or("unknown error")
                );
            }
        }
    }
}
