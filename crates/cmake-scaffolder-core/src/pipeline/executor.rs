//! Ordered step execution over one shared context

use super::context::Context;
use super::report::{ConsoleReporter, Reporter, RunSummary, SilentReporter};
use super::step::{Step, StepStatus};
use serde_json::Value;

/// An ordered list of steps plus the context they share.
///
/// ```ignore
/// let mut pipeline = Pipeline::new();
/// pipeline
///     .set_context("project_root", "/work/demo")
///     .register(Step::check("Validate project root", validate_root))
///     .register(Step::new("Copy CMakeLists.txt", copy_project_file));
/// let ok = pipeline.execute(true);
/// ```
pub struct Pipeline {
    steps: Vec<Step>,
    context: Context,
    reporter: Box<dyn Reporter>,
    summary: Option<RunSummary>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Pipeline reporting to the console
    pub fn new() -> Self {
        Self::with_reporter(ConsoleReporter)
    }

    /// Pipeline that reports nothing
    pub fn silent() -> Self {
        Self::with_reporter(SilentReporter)
    }

    pub fn with_reporter(reporter: impl Reporter + 'static) -> Self {
        Self {
            steps: Vec::new(),
            context: Context::new(),
            reporter: Box::new(reporter),
            summary: None,
        }
    }

    /// Append a step. Steps run in registration order.
    pub fn register(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Seed a context value before the run. Seeding always overwrites.
    pub fn set_context(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.context.overwrite(key, value);
        self
    }

    /// Make step writes fail when they would replace an existing key
    pub fn strict_context(&mut self, strict: bool) -> &mut Self {
        self.context.set_strict(strict);
        self
    }

    pub fn get_context(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn into_context(self) -> Context {
        self.context
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order.
    ///
    /// A failing optional step is relabeled `Skipped` and never fails the
    /// run. A failing required step halts the run when `stop_on_error` is
    /// set, leaving later steps `Pending`. Returns `true` when no required
    /// step failed. The pipeline runs once; later calls return the first
    /// result.
    pub fn execute(&mut self, stop_on_error: bool) -> bool {
        if let Some(summary) = self.summary {
            return summary.is_success();
        }

        let Self {
            steps,
            context,
            reporter,
            ..
        } = self;

        let total = steps.len();
        let mut summary = RunSummary {
            total,
            ..RunSummary::default()
        };
        reporter.run_started(total);

        for (idx, step) in steps.iter_mut().enumerate() {
            let index = idx + 1;
            reporter.step_started(index, total, step);

            let ok = step.execute(context);
            if let Some(error) = step.handler_error() {
                reporter.handler_failed(step, error);
            }

            if ok {
                summary.succeeded += 1;
            } else if step.is_optional() {
                step.mark_skipped();
                summary.skipped += 1;
            } else {
                summary.failed += 1;
            }
            reporter.step_finished(index, total, step);

            if !ok && !step.is_optional() && stop_on_error {
                reporter.halted(index, total);
                break;
            }
        }

        let failed: Vec<&Step> = steps
            .iter()
            .filter(|s| s.status() == StepStatus::Failed)
            .collect();
        reporter.run_finished(&summary, &failed);

        self.summary = Some(summary);
        summary.is_success()
    }

    pub fn summary(&self) -> Option<RunSummary> {
        self.summary
    }

    /// Status of the first step with this name
    pub fn status(&self, name: &str) -> Option<StepStatus> {
        self.steps
            .iter()
            .find(|step| step.name() == name)
            .map(Step::status)
    }

    /// Steps currently in `Failed` status
    pub fn failed_steps(&self) -> Vec<&Step> {
        self.steps
            .iter()
            .filter(|step| step.status() == StepStatus::Failed)
            .collect()
    }
}
