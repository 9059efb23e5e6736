//! A single named unit of work in a pipeline

use super::context::Context;
use anyhow::Result;
use std::fmt;

/// Message stored when a step reports failure without saying why
pub const GENERIC_FAILURE: &str = "step reported failure";

/// Result of a step's work function.
///
/// `Failure` is an expected, detected failure (a missing file, an empty
/// selection). Unexpected faults travel in the `Err` arm of the surrounding
/// `Result` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    Failure(String),
}

impl StepOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }
}

impl From<bool> for StepOutcome {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Success
        } else {
            Self::Failure(GENERIC_FAILURE.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepStatus {
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepStatus::Success | StepStatus::Failed | StepStatus::Skipped)
    }

    pub fn label(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Success => "success",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub type WorkFn = Box<dyn FnMut(&mut Context) -> Result<StepOutcome>>;
pub type ValidatorFn = Box<dyn Fn(&Context) -> std::result::Result<(), String>>;
pub type ErrorHandlerFn = Box<dyn Fn(&anyhow::Error, &Step, &mut Context) -> Result<()>>;

/// A registered unit of work.
///
/// Built with [`Step::new`] and the chained setters, then handed to
/// [`Pipeline::register`](super::Pipeline::register).
pub struct Step {
    name: String,
    description: String,
    optional: bool,
    work: WorkFn,
    validator: Option<ValidatorFn>,
    error_handler: Option<ErrorHandlerFn>,
    status: StepStatus,
    error_message: Option<String>,
    handler_error: Option<String>,
}

impl Step {
    pub fn new<F>(name: impl Into<String>, work: F) -> Self
    where
        F: FnMut(&mut Context) -> Result<StepOutcome> + 'static,
    {
        Self {
            name: name.into(),
            description: String::new(),
            optional: false,
            work: Box::new(work),
            validator: None,
            error_handler: None,
            status: StepStatus::Pending,
            error_message: None,
            handler_error: None,
        }
    }

    /// A step whose only job is its validator
    pub fn check<V>(name: impl Into<String>, validator: V) -> Self
    where
        V: Fn(&Context) -> std::result::Result<(), String> + 'static,
    {
        Self::new(name, |_| Ok(StepOutcome::Success)).validator(validator)
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn validator<V>(mut self, validator: V) -> Self
    where
        V: Fn(&Context) -> std::result::Result<(), String> + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn on_error<H>(mut self, handler: H) -> Self
    where
        H: Fn(&anyhow::Error, &Step, &mut Context) -> Result<()> + 'static,
    {
        self.error_handler = Some(Box::new(handler));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn describe(&self) -> &str {
        &self.description
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Error raised by the error handler itself, if it failed
    pub fn handler_error(&self) -> Option<&str> {
        self.handler_error.as_deref()
    }

    /// Run the step against the context. Returns `true` on success.
    ///
    /// A step only runs once; calling this on a step in a terminal state
    /// returns whether that state was a success.
    pub fn execute(&mut self, ctx: &mut Context) -> bool {
        if self.status.is_terminal() {
            return self.status == StepStatus::Success;
        }
        self.status = StepStatus::Running;

        if let Some(validator) = &self.validator {
            if let Err(message) = validator(ctx) {
                self.fail(message);
                return false;
            }
        }

        match (self.work)(ctx) {
            Ok(StepOutcome::Success) => {
                self.status = StepStatus::Success;
                true
            }
            Ok(StepOutcome::Failure(message)) => {
                let message = if message.is_empty() {
                    GENERIC_FAILURE.to_string()
                } else {
                    message
                };
                self.fail(message);
                false
            }
            Err(err) => {
                self.fail(format!("{:#}", err));
                if let Some(handler) = &self.error_handler {
                    if let Err(handler_err) = handler(&err, self, ctx) {
                        self.handler_error = Some(format!("{:#}", handler_err));
                    }
                }
                false
            }
        }
    }

    fn fail(&mut self, message: String) {
        self.status = StepStatus::Failed;
        self.error_message = Some(message);
    }

    /// Relabel a failed optional step. Only `Failed` can become `Skipped`.
    pub(crate) fn mark_skipped(&mut self) {
        if self.status == StepStatus::Failed {
            self.status = StepStatus::Skipped;
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("optional", &self.optional)
            .field("status", &self.status)
            .field("error_message", &self.error_message)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_successful_step() {
        let mut ctx = Context::new();
        let mut step = Step::new("write name", |ctx| {
            ctx.set("project_name", "demo")?;
            Ok(StepOutcome::Success)
        });

        assert_eq!(step.status(), StepStatus::Pending);
        assert!(step.execute(&mut ctx));
        assert_eq!(step.status(), StepStatus::Success);
        assert_eq!(ctx.get_str("project_name"), Some("demo"));
        assert!(step.error_message().is_none());
    }

    #[test]
    fn test_validator_failure_skips_work() {
        let ran = Rc::new(Cell::new(false));
        let ran_in_step = Rc::clone(&ran);
        let mut step = Step::new("copy", move |_| {
            ran_in_step.set(true);
            Ok(StepOutcome::Success)
        })
        .validator(|_| Err("project root is not set".to_string()));

        assert!(!step.execute(&mut Context::new()));
        assert!(!ran.get());
        assert_eq!(step.status(), StepStatus::Failed);
        assert_eq!(step.error_message(), Some("project root is not set"));
    }

    #[test]
    fn test_expected_failure_keeps_message() {
        let mut step = Step::new("replace", |_| {
            Ok(StepOutcome::failure("file not found: CMakeLists.txt"))
        });
        assert!(!step.execute(&mut Context::new()));
        assert_eq!(step.error_message(), Some("file not found: CMakeLists.txt"));
    }

    #[test]
    fn test_bare_failure_gets_generic_message() {
        let mut step = Step::new("replace", |_| Ok(StepOutcome::from(false)));
        assert!(!step.execute(&mut Context::new()));
        assert_eq!(step.error_message(), Some(GENERIC_FAILURE));
    }

    #[test]
    fn test_fault_invokes_error_handler() {
        let mut ctx = Context::new();
        let mut step = Step::new("read template", |_| anyhow::bail!("permission denied"))
            .on_error(|err, step, ctx| {
                ctx.set("recovered_from", format!("{}: {}", step.name(), err))?;
                Ok(())
            });

        assert!(!step.execute(&mut ctx));
        assert_eq!(step.status(), StepStatus::Failed);
        assert_eq!(step.error_message(), Some("permission denied"));
        assert_eq!(
            ctx.get_str("recovered_from"),
            Some("read template: permission denied")
        );
        assert!(step.handler_error().is_none());
    }

    #[test]
    fn test_failing_error_handler_is_swallowed() {
        let mut step = Step::new("read template", |_| anyhow::bail!("boom"))
            .on_error(|_, _, _| anyhow::bail!("handler exploded"));

        assert!(!step.execute(&mut Context::new()));
        assert_eq!(step.status(), StepStatus::Failed);
        assert_eq!(step.error_message(), Some("boom"));
        assert_eq!(step.handler_error(), Some("handler exploded"));
    }

    #[test]
    fn test_terminal_step_does_not_rerun() {
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        let mut step = Step::new("count", move |_| {
            counter.set(counter.get() + 1);
            Ok(StepOutcome::Success)
        });
        let mut ctx = Context::new();

        assert!(step.execute(&mut ctx));
        assert!(step.execute(&mut ctx));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn test_check_step_runs_validator_only() {
        let mut ctx = Context::new();
        ctx.set("project_root", "/tmp").unwrap();
        let mut step = Step::check("validate root", |ctx| {
            ctx.require_str("project_root")
                .map(|_| ())
                .map_err(|e| e.to_string())
        });
        assert!(step.execute(&mut ctx));
    }
}
