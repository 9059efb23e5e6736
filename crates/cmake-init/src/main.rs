//! cmake-init CLI - Initialize CMake projects from templates

use anyhow::Result;
use clap::Parser;
use cmake_scaffolder_core::tui::InitArgs;
use cmake_scaffolder_core::ProductConfig;
use std::path::{Path, PathBuf};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// cmake-init product configuration
#[derive(Clone)]
pub struct CMakeInitConfig;

impl ProductConfig for CMakeInitConfig {
    fn name(&self) -> &'static str {
        "cmake-init"
    }

    fn display_name(&self) -> &'static str {
        "cmake-init"
    }

    fn templates_dir_env(&self) -> &'static str {
        "CMAKE_INIT_TEMPLATES"
    }

    fn cli_description(&self) -> &'static str {
        "CLI for initializing CMake projects"
    }

    fn upgrade_command(&self) -> &'static str {
        "cargo install cmake-init --force"
    }

    fn next_steps(&self, project_root: &Path, _project_name: &str) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        if current.as_deref() != Some(project_root) {
            steps.push(format!("cd {}", project_root.display()));
        }
        steps.push("cmake -S . -B build".to_string());
        steps.push("cmake --build build".to_string());
        steps.push("Add libraries with cmake-add-lib".to_string());

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "cmake-init")]
#[command(about = "CLI for initializing CMake projects")]
#[command(version)]
pub struct Args {
    /// Templates directory (overrides CMAKE_INIT_TEMPLATES)
    #[arg(long = "templates-dir")]
    pub templates_dir: Option<PathBuf>,

    /// Project root directory
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Project name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Components to wire in (comma-separated, e.g. gtest,grpc)
    #[arg(short, long, value_delimiter = ',')]
    pub components: Option<Vec<String>>,

    /// Examples to install (comma-separated component/example pairs)
    #[arg(short, long, value_delimiter = ',')]
    pub examples: Option<Vec<String>>,

    /// Fail instead of replacing existing project files
    #[arg(long = "no-overwrite")]
    pub no_overwrite: bool,

    /// Run the remaining steps after a required step fails
    #[arg(long = "keep-going")]
    pub keep_going: bool,

    /// Refuse to overwrite values in the step context
    #[arg(long = "strict-context")]
    pub strict_context: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<Args> for InitArgs {
    fn from(args: Args) -> Self {
        InitArgs {
            templates_dir: args.templates_dir,
            directory: args.directory,
            name: args.name,
            components: args.components,
            examples: args.examples,
            no_overwrite: args.no_overwrite,
            keep_going: args.keep_going,
            strict_context: args.strict_context,
            yes: args.yes,
        }
    }
}

fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let config = CMakeInitConfig;

    let result = cmake_scaffolder_core::run_init(&config, args.into(), CLI_VERSION);

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    if !result? {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_component_lists() {
        let args = Args::parse_from([
            "cmake-init",
            "--name",
            "tab_game",
            "-c",
            "gtest,grpc",
            "--examples",
            "gtest/gtest_example",
            "--yes",
        ]);
        let init: InitArgs = args.into();
        assert_eq!(init.name.as_deref(), Some("tab_game"));
        assert_eq!(
            init.components,
            Some(vec!["gtest".to_string(), "grpc".to_string()])
        );
        assert_eq!(init.examples, Some(vec!["gtest/gtest_example".to_string()]));
        assert!(init.yes);
        assert!(!init.keep_going);
    }

    #[test]
    fn test_next_steps_mention_build() {
        let steps = CMakeInitConfig.next_steps(Path::new("/nonexistent/demo"), "demo");
        assert_eq!(steps[0], "cd /nonexistent/demo");
        assert!(steps.iter().any(|s| s.contains("cmake --build")));
    }
}
