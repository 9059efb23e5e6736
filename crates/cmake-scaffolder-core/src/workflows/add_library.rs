//! Add-library workflow: render an `add_library` fragment for a set of files

use super::{keys, path_string, validate_project_root};
use crate::clipboard::copy_to_clipboard;
use crate::pipeline::{Context, Pipeline, Step, StepOutcome};
use crate::project;
use crate::templates::{copier, render_library, LibraryFragment};
use anyhow::{Context as _, Result};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct LibraryOptions {
    pub project_root: PathBuf,
    /// Detected from `CMakeLists.txt` when not given
    pub project_name: Option<String>,
    pub lib_name: String,
    /// Existing source files, absolute or relative to the project root
    pub src_files: Vec<String>,
    /// Source files to create as placeholders
    pub new_src_files: Vec<String>,
    pub header_files: Vec<String>,
    pub new_header_files: Vec<String>,
    pub copy_to_clipboard: bool,
    /// Append the fragment to this file
    pub output_file: Option<PathBuf>,
    /// Print the fragment to stdout
    pub print: bool,
}

/// Register the add-library steps on `pipeline` and seed its context.
/// `library_template` is the template file path.
pub fn register_library_steps(pipeline: &mut Pipeline, library_template: &Path, options: &LibraryOptions) {
    pipeline
        .set_context(keys::PROJECT_ROOT, path_string(&options.project_root))
        .set_context(keys::LIB_NAME, options.lib_name.clone())
        .set_context(keys::SELECTED_SRC_FILES, options.src_files.clone())
        .set_context(keys::NEW_SRC_FILES, options.new_src_files.clone())
        .set_context(keys::SELECTED_HEADER_FILES, options.header_files.clone())
        .set_context(keys::NEW_HEADER_FILES, options.new_header_files.clone())
        .set_context(keys::COPY_TO_CLIPBOARD, options.copy_to_clipboard)
        .set_context(keys::PRINT_RESULT, options.print);
    if let Some(name) = &options.project_name {
        pipeline.set_context(keys::PROJECT_NAME, name.clone());
    }
    if let Some(output) = &options.output_file {
        pipeline.set_context(keys::OUTPUT_FILE, path_string(output));
    }

    let template = library_template.to_path_buf();
    pipeline
        .register(
            Step::check("Validate project root", validate_project_root)
                .description("Check that the project root exists and is a directory"),
        )
        .register(
            Step::check("Validate library name", validate_lib_name)
                .description("Check the library name is a valid CMake target name"),
        )
        .register(
            Step::new("Resolve project name", resolve_project_name)
                .description("Use the given name or read PACKAGE_NAME from CMakeLists.txt"),
        )
        .register(
            Step::new("Read library template", move |ctx| read_template(ctx, &template))
                .description("Load the add_library template"),
        )
        .register(
            Step::new("Prepare source files", prepare_sources)
                .description("Check selected sources and create new ones"),
        )
        .register(
            Step::new("Prepare header files", prepare_headers)
                .optional(true)
                .description("Check selected headers and create new ones"),
        )
        .register(
            Step::new("Render library fragment", render_fragment)
                .description("Fill the template placeholders"),
        )
        .register(
            Step::new("Emit library fragment", emit_fragment)
                .description("Print the fragment, copy it to the clipboard, write it out"),
        );
}

fn validate_lib_name(ctx: &Context) -> std::result::Result<(), String> {
    let name = ctx.get_str(keys::LIB_NAME).unwrap_or_default();
    project::validate_project_name(name).map_err(|e| format!("Invalid library name: {}", e))
}

fn resolve_project_name(ctx: &mut Context) -> Result<StepOutcome> {
    if ctx.get_str(keys::PROJECT_NAME).is_some_and(|name| !name.is_empty()) {
        return Ok(StepOutcome::Success);
    }

    let root = ctx.require_path(keys::PROJECT_ROOT)?;
    match project::detect_project_name(&root)? {
        Some(name) => {
            ctx.set(keys::PROJECT_NAME, name)?;
            Ok(StepOutcome::Success)
        }
        None => Ok(StepOutcome::failure(format!(
            "No PACKAGE_NAME found in {}; pass the project name explicitly",
            root.join(project::ROOT_BUILD_FILE).display()
        ))),
    }
}

fn read_template(ctx: &mut Context, template: &Path) -> Result<StepOutcome> {
    if !template.is_file() {
        return Ok(StepOutcome::failure(format!(
            "Library template not found: {}",
            template.display()
        )));
    }
    let content = std::fs::read_to_string(template)
        .with_context(|| format!("Failed to read {}", template.display()))?;
    ctx.set(keys::TEMPLATE_CONTENT, content)?;
    Ok(StepOutcome::Success)
}

/// Split `selected` into files present under `root` and missing ones
fn partition_existing(root: &Path, selected: &[String]) -> (Vec<PathBuf>, Vec<String>) {
    let (present, missing): (Vec<PathBuf>, Vec<PathBuf>) = selected
        .iter()
        .map(PathBuf::from)
        .partition(|file| root.join(file).is_file());
    let missing = missing.iter().map(|f| f.display().to_string()).collect();
    (present, missing)
}

/// Existing files plus new files, created as placeholders unless present.
/// Returns the list relative to the project root without duplicates, or
/// the new paths that would land outside the root.
fn collect_files(
    root: &Path,
    existing: &[PathBuf],
    new: &[String],
) -> Result<std::result::Result<Vec<String>, Vec<String>>> {
    let escaping: Vec<String> = new
        .iter()
        .filter(|file| !project::is_contained_path(Path::new(file)))
        .cloned()
        .collect();
    if !escaping.is_empty() {
        return Ok(Err(escaping));
    }

    let mut files = project::relative_to_root(existing, root);
    for file in new {
        let relative = Path::new(file);
        copier::create_placeholder_file(root, relative)?;
        files.push(project::to_slash(relative));
    }

    let mut seen = std::collections::HashSet::new();
    files.retain(|f| seen.insert(f.clone()));
    Ok(Ok(files))
}

fn outside_root_failure(kind: &str, files: &[String]) -> StepOutcome {
    StepOutcome::failure(format!(
        "New {} file(s) must stay inside the project root: {}",
        kind,
        files.join(", ")
    ))
}

fn prepare_sources(ctx: &mut Context) -> Result<StepOutcome> {
    let root = ctx.require_path(keys::PROJECT_ROOT)?;
    let selected = ctx.string_list(keys::SELECTED_SRC_FILES)?;
    let new = ctx.string_list(keys::NEW_SRC_FILES)?;

    let (existing, missing) = partition_existing(&root, &selected);
    if !missing.is_empty() {
        return Ok(StepOutcome::failure(format!(
            "Source file(s) not found: {}",
            missing.join(", ")
        )));
    }
    let files = match collect_files(&root, &existing, &new)? {
        Ok(files) => files,
        Err(escaping) => return Ok(outside_root_failure("source", &escaping)),
    };
    if files.is_empty() {
        return Ok(StepOutcome::failure("No source files selected"));
    }

    ctx.set(keys::SRC_FILES, files)?;
    Ok(StepOutcome::Success)
}

/// Missing selected headers are dropped with a warning; the rest are kept.
fn prepare_headers(ctx: &mut Context) -> Result<StepOutcome> {
    let root = ctx.require_path(keys::PROJECT_ROOT)?;
    let selected = ctx.string_list(keys::SELECTED_HEADER_FILES)?;
    let new = ctx.string_list(keys::NEW_HEADER_FILES)?;

    let (existing, missing) = partition_existing(&root, &selected);
    for file in &missing {
        eprintln!(
            "{} header file not found, leaving it out: {}",
            "Warning:".yellow(),
            file
        );
    }

    match collect_files(&root, &existing, &new)? {
        Ok(files) => {
            ctx.set(keys::HEADER_FILES, files)?;
            Ok(StepOutcome::Success)
        }
        Err(escaping) => Ok(outside_root_failure("header", &escaping)),
    }
}

fn render_fragment(ctx: &mut Context) -> Result<StepOutcome> {
    let template = ctx.require_str(keys::TEMPLATE_CONTENT)?;
    let fragment = LibraryFragment {
        lib_name: ctx.require_str(keys::LIB_NAME)?.to_string(),
        project_name: ctx.require_str(keys::PROJECT_NAME)?.to_string(),
        src_files: ctx.string_list(keys::SRC_FILES)?,
        header_files: ctx.string_list(keys::HEADER_FILES)?,
    };

    let result = render_library(template, &fragment);
    ctx.set(keys::RESULT, result)?;
    Ok(StepOutcome::Success)
}

fn emit_fragment(ctx: &mut Context) -> Result<StepOutcome> {
    let result = ctx.require_str(keys::RESULT)?.to_string();
    if result.trim().is_empty() {
        return Ok(StepOutcome::failure("Rendered fragment is empty"));
    }

    if ctx.get_bool(keys::PRINT_RESULT).unwrap_or(false) {
        println!("{}", result);
    }

    if ctx.get_bool(keys::COPY_TO_CLIPBOARD).unwrap_or(false) {
        let copied = match copy_to_clipboard(&result) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("{} could not copy to clipboard: {:#}", "Warning:".yellow(), e);
                false
            }
        };
        ctx.set(keys::CLIPBOARD_COPIED, copied)?;
    }

    if let Some(output) = ctx.get_str(keys::OUTPUT_FILE).map(PathBuf::from) {
        append_to_file(&output, &result)?;
    }

    Ok(StepOutcome::Success)
}

/// Append `text` to `path`, separated from existing content by a blank line
fn append_to_file(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        copier::ensure_directory(parent)?;
    }

    let has_content = path.metadata().map(|m| m.len() > 0).unwrap_or(false);
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let separator = if has_content { "\n" } else { "" };
    let newline = if text.ends_with('\n') { "" } else { "\n" };
    write!(file, "{}{}{}", separator, text, newline)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StepStatus;
    use std::fs;
    use tempfile::tempdir;

    const TEMPLATE: &str = "add_library(@LIB_NAME@
# @src_files@
)
add_library(@PROJECT_NAME@::@LIB_NAME@ ALIAS @LIB_NAME@)

foreach(header
# @install_headers@
  )
  install(FILES ${header} DESTINATION include)
endforeach()

install(TARGETS @LIB_NAME@ EXPORT @PROJECT_NAME@Targets)
";

    struct Fixture {
        project: tempfile::TempDir,
        template: PathBuf,
        _templates: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let project = tempdir().unwrap();
        let templates = tempdir().unwrap();
        let template = templates.path().join("add_library.cmake");
        fs::write(&template, TEMPLATE).unwrap();
        fs::write(
            project.path().join("CMakeLists.txt"),
            "set(PACKAGE_NAME \"tab_game\")\n",
        )
        .unwrap();
        Fixture {
            project,
            template,
            _templates: templates,
        }
    }

    fn options(fixture: &Fixture) -> LibraryOptions {
        LibraryOptions {
            project_root: fixture.project.path().to_path_buf(),
            lib_name: "net".to_string(),
            ..Default::default()
        }
    }

    fn run(fixture: &Fixture, options: &LibraryOptions) -> (bool, Pipeline) {
        let mut pipeline = Pipeline::silent();
        register_library_steps(&mut pipeline, &fixture.template, options);
        let ok = pipeline.execute(true);
        (ok, pipeline)
    }

    #[test]
    fn test_new_files_without_headers() {
        let fixture = fixture();
        let mut opts = options(&fixture);
        opts.new_src_files = vec!["src/net/socket.cc".to_string()];

        let (ok, pipeline) = run(&fixture, &opts);
        assert!(ok);
        assert!(fixture.project.path().join("src/net/socket.cc").is_file());

        let result = pipeline.context().get_str(keys::RESULT).unwrap();
        assert!(result.starts_with("add_library(net\n  src/net/socket.cc\n)"));
        assert!(result.contains("add_library(tab_game::net ALIAS net)"));
        assert!(!result.contains("foreach"));
        assert!(!result.contains("@install_headers@"));
        assert!(!result.contains("\n\n\n"));
    }

    #[test]
    fn test_selected_files_with_headers() {
        let fixture = fixture();
        let root = fixture.project.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("include")).unwrap();
        fs::write(root.join("src/a.cc"), "").unwrap();
        fs::write(root.join("include/a.h"), "").unwrap();

        let mut opts = options(&fixture);
        opts.project_name = Some("engine".to_string());
        opts.src_files = vec![root.join("src/a.cc").to_string_lossy().into_owned()];
        opts.header_files = vec!["include/a.h".to_string()];

        let (ok, pipeline) = run(&fixture, &opts);
        assert!(ok);
        let result = pipeline.context().get_str(keys::RESULT).unwrap();
        assert!(result.contains("  src/a.cc\n"));
        assert!(result.contains("foreach(header\n  include/a.h\n  )"));
        assert!(result.contains("EXPORT engineTargets"));
    }

    #[test]
    fn test_no_sources_fails() {
        let fixture = fixture();
        let (ok, pipeline) = run(&fixture, &options(&fixture));
        assert!(!ok);
        assert_eq!(pipeline.status("Prepare source files"), Some(StepStatus::Failed));
        assert_eq!(
            pipeline.failed_steps()[0].error_message(),
            Some("No source files selected")
        );
    }

    #[test]
    fn test_missing_selected_source_fails() {
        let fixture = fixture();
        let mut opts = options(&fixture);
        opts.src_files = vec!["src/missing.cc".to_string()];

        let (ok, pipeline) = run(&fixture, &opts);
        assert!(!ok);
        assert!(pipeline.failed_steps()[0]
            .error_message()
            .unwrap()
            .contains("src/missing.cc"));
    }

    #[test]
    fn test_missing_header_keeps_existing_ones() {
        let fixture = fixture();
        let root = fixture.project.path();
        fs::create_dir_all(root.join("include")).unwrap();
        fs::write(root.join("include/real.h"), "").unwrap();

        let mut opts = options(&fixture);
        opts.new_src_files = vec!["src/a.cc".to_string()];
        opts.header_files = vec!["include/real.h".to_string(), "include/typo.h".to_string()];

        let (ok, pipeline) = run(&fixture, &opts);
        assert!(ok);
        assert_eq!(pipeline.status("Prepare header files"), Some(StepStatus::Success));
        assert_eq!(
            pipeline.context().string_list(keys::HEADER_FILES).unwrap(),
            vec!["include/real.h"]
        );
        let result = pipeline.context().get_str(keys::RESULT).unwrap();
        assert!(result.contains("foreach(header\n  include/real.h\n  )"));
        assert!(!result.contains("typo.h"));
    }

    #[test]
    fn test_new_files_outside_root_are_rejected() {
        let fixture = fixture();
        let mut opts = options(&fixture);
        opts.new_src_files = vec!["../escape.cc".to_string()];

        let (ok, pipeline) = run(&fixture, &opts);
        assert!(!ok);
        assert_eq!(pipeline.status("Prepare source files"), Some(StepStatus::Failed));
        assert!(pipeline.failed_steps()[0]
            .error_message()
            .unwrap()
            .contains("../escape.cc"));
        assert!(!fixture.project.path().parent().unwrap().join("escape.cc").exists());

        let mut opts = options(&fixture);
        opts.new_src_files = vec!["src/a.cc".to_string()];
        opts.new_header_files = vec!["include/../../escape.h".to_string()];
        let (ok, pipeline) = run(&fixture, &opts);
        assert!(ok);
        assert_eq!(pipeline.status("Prepare header files"), Some(StepStatus::Skipped));
        assert!(!fixture.project.path().parent().unwrap().join("escape.h").exists());
    }

    #[test]
    fn test_project_name_not_detected() {
        let fixture = fixture();
        fs::write(fixture.project.path().join("CMakeLists.txt"), "project(x)\n").unwrap();
        let mut opts = options(&fixture);
        opts.new_src_files = vec!["src/a.cc".to_string()];

        let (ok, pipeline) = run(&fixture, &opts);
        assert!(!ok);
        assert_eq!(pipeline.status("Resolve project name"), Some(StepStatus::Failed));
    }

    #[test]
    fn test_invalid_library_name() {
        let fixture = fixture();
        let mut opts = options(&fixture);
        opts.lib_name = "my lib".to_string();

        let (ok, pipeline) = run(&fixture, &opts);
        assert!(!ok);
        assert_eq!(pipeline.status("Validate library name"), Some(StepStatus::Failed));
    }

    #[test]
    fn test_missing_template_fails() {
        let fixture = fixture();
        fs::remove_file(&fixture.template).unwrap();
        let mut opts = options(&fixture);
        opts.new_src_files = vec!["src/a.cc".to_string()];

        let (ok, pipeline) = run(&fixture, &opts);
        assert!(!ok);
        assert_eq!(pipeline.status("Read library template"), Some(StepStatus::Failed));
        assert!(!fixture.project.path().join("src/a.cc").exists());
    }

    #[test]
    fn test_output_file_appends() {
        let fixture = fixture();
        let output = fixture.project.path().join("cmake/libs.cmake");
        let mut opts = options(&fixture);
        opts.new_src_files = vec!["src/a.cc".to_string()];
        opts.output_file = Some(output.clone());

        assert!(run(&fixture, &opts).0);
        opts.lib_name = "io".to_string();
        assert!(run(&fixture, &opts).0);

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("add_library(net\n"));
        assert!(written.contains("\n\nadd_library(io\n"));
    }

    #[test]
    fn test_duplicate_files_listed_once() {
        let fixture = fixture();
        let root = fixture.project.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/a.cc"), "").unwrap();

        let mut opts = options(&fixture);
        opts.src_files = vec!["src/a.cc".to_string()];
        opts.new_src_files = vec!["src/a.cc".to_string()];

        let (ok, pipeline) = run(&fixture, &opts);
        assert!(ok);
        assert_eq!(
            pipeline.context().string_list(keys::SRC_FILES).unwrap(),
            vec!["src/a.cc"]
        );
        // existing file is left untouched
        assert_eq!(fs::read_to_string(root.join("src/a.cc")).unwrap(), "");
    }

    #[test]
    fn test_strict_context_run_succeeds() {
        let fixture = fixture();
        let mut opts = options(&fixture);
        opts.new_src_files = vec!["src/a.cc".to_string()];

        let mut pipeline = Pipeline::silent();
        pipeline.strict_context(true);
        register_library_steps(&mut pipeline, &fixture.template, &opts);
        assert!(pipeline.execute(true));
        assert_eq!(
            pipeline.context().get_str(keys::PROJECT_NAME),
            Some("tab_game")
        );
    }
}
