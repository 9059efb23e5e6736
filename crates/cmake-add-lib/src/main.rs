//! cmake-add-lib CLI - Generate add_library fragments for CMake projects

use anyhow::Result;
use clap::Parser;
use cmake_scaffolder_core::tui::LibraryArgs;
use cmake_scaffolder_core::ProductConfig;
use std::path::{Path, PathBuf};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// cmake-add-lib product configuration
#[derive(Clone)]
pub struct CMakeAddLibConfig;

impl ProductConfig for CMakeAddLibConfig {
    fn name(&self) -> &'static str {
        "cmake-add-lib"
    }

    fn display_name(&self) -> &'static str {
        "cmake-add-lib"
    }

    fn templates_dir_env(&self) -> &'static str {
        "CMAKE_ADD_LIB_TEMPLATES"
    }

    fn cli_description(&self) -> &'static str {
        "CLI for generating CMake library targets"
    }

    fn upgrade_command(&self) -> &'static str {
        "cargo install cmake-add-lib --force"
    }

    fn next_steps(&self, _project_root: &Path, _project_name: &str) -> Vec<String> {
        vec!["Paste the fragment into CMakeLists.txt".to_string()]
    }
}

#[derive(Parser, Debug)]
#[command(name = "cmake-add-lib")]
#[command(about = "CLI for generating CMake library targets")]
#[command(version)]
pub struct Args {
    /// Templates directory (overrides CMAKE_ADD_LIB_TEMPLATES)
    #[arg(long = "templates-dir")]
    pub templates_dir: Option<PathBuf>,

    /// Project root directory
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Project name (read from CMakeLists.txt when omitted)
    #[arg(short, long = "project-name")]
    pub project_name: Option<String>,

    /// Library name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Existing source files (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub src: Option<Vec<String>>,

    /// Source files to create (comma-separated)
    #[arg(long = "new-src", value_delimiter = ',')]
    pub new_src: Option<Vec<String>>,

    /// Existing header files (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub headers: Option<Vec<String>>,

    /// Header files to create (comma-separated)
    #[arg(long = "new-headers", value_delimiter = ',')]
    pub new_headers: Option<Vec<String>>,

    /// Append the generated fragment to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not copy the fragment to the clipboard
    #[arg(long = "no-clipboard")]
    pub no_clipboard: bool,

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

impl From<Args> for LibraryArgs {
    fn from(args: Args) -> Self {
        LibraryArgs {
            templates_dir: args.templates_dir,
            directory: args.directory,
            project_name: args.project_name,
            lib_name: args.name,
            src: args.src,
            new_src: args.new_src,
            headers: args.headers,
            new_headers: args.new_headers,
            output: args.output,
            no_clipboard: args.no_clipboard,
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
    let config = CMakeAddLibConfig;

    let result = cmake_scaffolder_core::run_add_library(&config, args.into(), CLI_VERSION);

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
    fn test_parse_file_lists() {
        let args = Args::parse_from([
            "cmake-add-lib",
            "-n",
            "net",
            "--src",
            "src/a.cc,src/b.cc",
            "--new-headers",
            "include/net.h",
            "--no-clipboard",
        ]);
        let lib: LibraryArgs = args.into();
        assert_eq!(lib.lib_name.as_deref(), Some("net"));
        assert_eq!(lib.src.unwrap().len(), 2);
        assert_eq!(lib.new_headers, Some(vec!["include/net.h".to_string()]));
        assert!(lib.no_clipboard);
        assert!(lib.headers.is_none());
    }
}
