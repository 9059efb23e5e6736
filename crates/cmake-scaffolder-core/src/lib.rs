//! CMake Scaffolder Core - Shared library for the CMake scaffolding CLIs
//!
//! This library provides the machinery behind `cmake-init` and
//! `cmake-add-lib`: a step pipeline, a component registry and the two
//! workflows built on top of them.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Step pipeline, component discovery, template rendering, tool detection
//! - **Layer 2: Workflow Orchestration** - `ProductConfig` trait and the init / add-library step sets
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use cmake_scaffolder_core::pipeline::Pipeline;
//! use cmake_scaffolder_core::templates::TemplateSet;
//! use cmake_scaffolder_core::workflows::{register_init_steps, InitOptions};
//!
//! let templates = TemplateSet::open("templates")?;
//! let mut options = InitOptions::new("/work/demo", "demo");
//! options.components = vec!["gtest".to_string()];
//!
//! let mut pipeline = Pipeline::new();
//! register_init_steps(&mut pipeline, &templates, &options);
//! let ok = pipeline.execute(true);
//! ```

pub mod clipboard;
pub mod components;
pub mod config;
pub mod pipeline;
pub mod product;
pub mod project;
pub mod runtime;
pub mod templates;
pub mod workflows;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use components::{Component, ComponentRegistry, ExampleDescriptor};
pub use pipeline::{Context, Pipeline, Step, StepOutcome, StepStatus};
pub use product::ProductConfig;
pub use runtime::{check_cmake, BuildTool, ToolInfo};
pub use templates::{TemplateManifest, TemplateSet};

#[cfg(feature = "tui")]
pub use tui::{run_add_library, run_init};

/// CLI version - used for template compatibility checking
/// Each binary should define its own version, but this provides a fallback
pub const DEFAULT_CLI_VERSION: &str = "0.2.0";
