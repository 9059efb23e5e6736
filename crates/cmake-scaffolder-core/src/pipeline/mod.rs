//! Step pipeline execution
//!
//! This module provides:
//! - `Step`: a named unit of work with optional validation and error handling
//! - `Context`: the key-value store shared by every step of a run
//! - `Pipeline`: ordered execution with stop-on-error and optional steps
//! - `Reporter`: progress output (console, silent, or custom)

pub mod context;
pub mod executor;
pub mod report;
pub mod step;

pub use context::{Context, ContextError};
pub use executor::Pipeline;
pub use report::{ConsoleReporter, Reporter, RunSummary, SilentReporter};
pub use step::{Step, StepOutcome, StepStatus};
