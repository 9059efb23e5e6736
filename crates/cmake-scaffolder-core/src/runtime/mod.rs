//! Build tool detection
//!
//! Probes the tools a generated project is built with (CMake, Ninja) so the
//! workflows can report what is missing.

pub mod check;

pub use check::{check_cmake, check_ninja, check_tool, BuildTool, ToolInfo};
