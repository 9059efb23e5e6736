//! Pipeline progress rendered as cliclack log lines

use crate::pipeline::{Reporter, RunSummary, Step, StepStatus};

/// Reports each step as cliclack log lines.
///
/// Output errors are ignored: a broken terminal must not fail a run.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliclackReporter;

/// `[i/n] name`, followed by the description on its own line when present
fn started_line(index: usize, total: usize, step: &Step) -> String {
    let mut line = format!("[{}/{}] {}", index, total, step.name());
    if !step.describe().is_empty() {
        line.push('\n');
        line.push_str(step.describe());
    }
    line
}

fn summary_line(summary: &RunSummary) -> String {
    let mut line = format!(
        "{} succeeded, {} failed, {} skipped",
        summary.succeeded, summary.failed, summary.skipped
    );
    if summary.not_run() > 0 {
        line.push_str(&format!(", {} not run", summary.not_run()));
    }
    line
}

/// One `name: message` line per failed step
fn failure_lines(failed: &[&Step]) -> Vec<String> {
    failed
        .iter()
        .map(|step| {
            format!(
                "{}: {}",
                step.name(),
                step.error_message().unwrap_or("unknown error")
            )
        })
        .collect()
}

impl Reporter for CliclackReporter {
    fn step_started(&mut self, index: usize, total: usize, step: &Step) {
        let _ = cliclack::log::step(started_line(index, total, step));
    }

    fn step_finished(&mut self, _index: usize, _total: usize, step: &Step) {
        let _ = match step.status() {
            StepStatus::Success => cliclack::log::success(step.name()),
            StepStatus::Skipped => cliclack::log::warning(format!(
                "{} skipped: {}",
                step.name(),
                step.error_message().unwrap_or("optional step failed")
            )),
            StepStatus::Failed => cliclack::log::error(format!(
                "{} failed: {}",
                step.name(),
                step.error_message().unwrap_or("unknown error")
            )),
            StepStatus::Pending | StepStatus::Running => Ok(()),
        };
    }

    fn handler_failed(&mut self, step: &Step, error: &str) {
        let _ = cliclack::log::warning(format!(
            "Error handler for '{}' failed: {}",
            step.name(),
            error
        ));
    }

    fn halted(&mut self, index: usize, total: usize) {
        let _ = cliclack::log::remark(format!("Stopped after {}/{} steps", index, total));
    }

    fn run_finished(&mut self, summary: &RunSummary, failed: &[&Step]) {
        let _ = cliclack::log::info(summary_line(summary));
        if !failed.is_empty() {
            let lines = failure_lines(failed);
            let _ = cliclack::log::error(format!("Failed steps:\n{}", lines.join("\n")));
        }
    }
}
