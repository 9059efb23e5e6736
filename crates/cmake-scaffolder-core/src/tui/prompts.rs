//! Charm-style CLI prompts using cliclack
//!
//! Prompts collect every answer up front; the step pipeline then runs
//! without further interaction.

use super::reporter::CliclackReporter;
use crate::components::{list_examples, Component};
use crate::config::resolve_templates_dir;
use crate::pipeline::Pipeline;
use crate::product::ProductConfig;
use crate::project;
use crate::runtime::check_ninja;
use crate::templates::copier::{is_header_file, is_source_file};
use crate::templates::{version, TemplateSet};
use crate::workflows::{
    keys, register_init_steps, register_library_steps, ExampleSelection, InitOptions,
    LibraryOptions,
};
use anyhow::Result;
use std::path::{Path, PathBuf};

/// CLI arguments for project initialization
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    /// Templates directory, overriding the lookup order
    pub templates_dir: Option<PathBuf>,

    /// Project root (defaults to the current directory)
    pub directory: Option<PathBuf>,

    /// Project name
    pub name: Option<String>,

    /// Components to wire in
    pub components: Option<Vec<String>>,

    /// Examples to install, as `component/example`
    pub examples: Option<Vec<String>>,

    /// Keep existing project files instead of replacing them
    pub no_overwrite: bool,

    /// Run remaining steps after a required step fails
    pub keep_going: bool,

    /// Refuse to overwrite context values
    pub strict_context: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// CLI arguments for library fragment generation
#[derive(Debug, Clone, Default)]
pub struct LibraryArgs {
    pub templates_dir: Option<PathBuf>,
    pub directory: Option<PathBuf>,

    /// Project name (detected from CMakeLists.txt when omitted)
    pub project_name: Option<String>,

    pub lib_name: Option<String>,

    /// Existing source files
    pub src: Option<Vec<String>>,

    /// Source files to create
    pub new_src: Option<Vec<String>>,

    /// Existing header files
    pub headers: Option<Vec<String>>,

    /// Header files to create
    pub new_headers: Option<Vec<String>>,

    /// Append the fragment to this file
    pub output: Option<PathBuf>,

    pub no_clipboard: bool,
    pub keep_going: bool,
    pub strict_context: bool,
    pub yes: bool,
}

/// Initialize a CMake project with interactive prompts.
///
/// Returns `Ok(false)` when a required step failed.
pub fn run_init<C: ProductConfig>(config: &C, args: InitArgs, cli_version: &str) -> Result<bool> {
    cliclack::intro(config.display_name())?;

    let templates = open_templates(config, args.templates_dir.as_deref(), cli_version)?;
    let project_root = select_directory(args.directory.as_deref())?;
    let project_name = select_project_name(&args, &project_root)?;

    let available = templates.registry().discover_sorted();
    let components = select_components(&available, &args)?;
    let examples = select_examples(&available, &components, &args)?;

    let overwrite = confirm_overwrite(&project_root, &args)?;
    report_tools()?;

    let mut options = InitOptions::new(&project_root, &project_name);
    options.components = components;
    options.examples = examples;
    options.overwrite = overwrite;

    let mut pipeline = Pipeline::with_reporter(CliclackReporter);
    pipeline.strict_context(args.strict_context);
    register_init_steps(&mut pipeline, &templates, &options);

    if !pipeline.execute(!args.keep_going) {
        cliclack::outro_cancel("Project initialization failed")?;
        return Ok(false);
    }

    print_next_steps(config, &project_root, &project_name)?;
    Ok(true)
}

/// Generate an `add_library` fragment with interactive prompts.
///
/// Returns `Ok(false)` when a required step failed.
pub fn run_add_library<C: ProductConfig>(
    config: &C,
    args: LibraryArgs,
    cli_version: &str,
) -> Result<bool> {
    cliclack::intro(config.display_name())?;

    let templates = open_templates(config, args.templates_dir.as_deref(), cli_version)?;
    let project_root = match &args.directory {
        Some(dir) => absolute(dir),
        None => current_dir(),
    };
    cliclack::log::info(format!("Project root: {}", project_root.display()))?;

    let project_name = match &args.project_name {
        Some(name) => Some(name.clone()),
        None => detect_or_ask_project_name(&project_root, args.yes)?,
    };
    let lib_name = match &args.lib_name {
        Some(name) => name.clone(),
        None if args.yes => anyhow::bail!("A library name is required in --yes mode."),
        None => prompt_name("Library name", None)?,
    };

    let (src_files, new_src_files) = select_files(
        &project_root,
        FileKind::Source,
        args.src.clone(),
        args.new_src.clone(),
        args.yes,
    )?;
    let (header_files, new_header_files) = select_files(
        &project_root,
        FileKind::Header,
        args.headers.clone(),
        args.new_headers.clone(),
        args.yes,
    )?;

    let options = LibraryOptions {
        project_root: project_root.clone(),
        project_name,
        lib_name,
        src_files,
        new_src_files,
        header_files,
        new_header_files,
        copy_to_clipboard: !args.no_clipboard,
        output_file: args.output.as_ref().map(|p| absolute(p)),
        print: false,
    };

    let mut pipeline = Pipeline::with_reporter(CliclackReporter);
    pipeline.strict_context(args.strict_context);
    register_library_steps(&mut pipeline, &templates.library_template(), &options);

    if !pipeline.execute(!args.keep_going) {
        cliclack::outro_cancel("Library generation failed")?;
        return Ok(false);
    }

    let context = pipeline.context();
    if let Some(result) = context.get_str(keys::RESULT) {
        cliclack::note("Generated CMake", result.trim_end())?;
    }
    match context.get_bool(keys::CLIPBOARD_COPIED) {
        Some(true) => cliclack::log::success("Copied to clipboard")?,
        Some(false) => cliclack::log::warning("Clipboard unavailable, copy the fragment above")?,
        None => {}
    }
    if let Some(output) = &options.output_file {
        cliclack::log::success(format!("Appended to {}", output.display()))?;
    }

    cliclack::outro("Paste the fragment into your CMakeLists.txt")?;
    Ok(true)
}

fn open_templates<C: ProductConfig>(
    config: &C,
    explicit: Option<&Path>,
    cli_version: &str,
) -> Result<TemplateSet> {
    let dir = resolve_templates_dir(config, explicit)?;
    cliclack::log::info(format!("Using templates from {}", dir.display()))?;

    let templates = TemplateSet::open(dir)?;
    if let Some(warning) = version::check_compatibility(
        cli_version,
        &templates.manifest().version,
        config.upgrade_command(),
    ) {
        cliclack::log::warning(format!("Version warning: {}", warning))?;
    }
    Ok(templates)
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        current_dir().join(path)
    }
}

fn select_directory(directory: Option<&Path>) -> Result<PathBuf> {
    let path = match directory {
        Some(dir) => absolute(dir),
        None => current_dir(),
    };
    cliclack::log::info(format!("Project root: {}", path.display()))?;

    if !path.is_dir() {
        anyhow::bail!("Project root is not a directory: {}", path.display());
    }
    Ok(path)
}

fn prompt_name(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input = cliclack::input(prompt)
        .validate(|input: &String| project::validate_project_name(input.trim()));
    if let Some(default) = default {
        input = input.placeholder(default).default_input(default);
    }
    let name: String = input.interact()?;
    Ok(name.trim().to_string())
}

fn select_project_name(args: &InitArgs, project_root: &Path) -> Result<String> {
    let dir_name = project_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| project::validate_project_name(n).is_ok());

    let name = match (&args.name, args.yes) {
        (Some(name), _) => name.clone(),
        (None, true) => dir_name.ok_or_else(|| {
            anyhow::anyhow!("Cannot derive a project name from the directory; pass --name")
        })?,
        (None, false) => prompt_name("Project name", dir_name.as_deref())?,
    };

    if let Err(e) = project::validate_project_name(&name) {
        anyhow::bail!("Invalid project name '{}': {}", name, e);
    }
    Ok(name)
}

fn detect_or_ask_project_name(project_root: &Path, yes: bool) -> Result<Option<String>> {
    if let Some(name) = project::detect_project_name(project_root)? {
        cliclack::log::info(format!("Project name: {}", name))?;
        return Ok(Some(name));
    }
    if yes {
        return Ok(None);
    }
    cliclack::log::warning(format!(
        "No PACKAGE_NAME found in {}",
        project_root.join(project::ROOT_BUILD_FILE).display()
    ))?;
    Ok(Some(prompt_name("Project name", None)?))
}

fn select_components(available: &[Component], args: &InitArgs) -> Result<Vec<String>> {
    if let Some(components) = &args.components {
        return Ok(components.clone());
    }
    if available.is_empty() || args.yes {
        return Ok(Vec::new());
    }

    let mut multi = cliclack::multiselect("Select components (optional)");
    for component in available {
        multi = multi.item(
            component.name.clone(),
            &component.display_name,
            &component.description,
        );
    }
    let selected: Vec<String> = multi.required(false).interact()?;

    if !selected.is_empty() {
        cliclack::log::success(format!("Components: {}", selected.join(", ")))?;
    }
    Ok(selected)
}

fn select_examples(
    available: &[Component],
    selected: &[String],
    args: &InitArgs,
) -> Result<Vec<ExampleSelection>> {
    if let Some(examples) = &args.examples {
        return examples
            .iter()
            .map(|text| {
                ExampleSelection::parse(text).ok_or_else(|| {
                    anyhow::anyhow!("Invalid example '{}', expected component/example", text)
                })
            })
            .collect();
    }

    let mut examples = Vec::new();
    for name in selected {
        let Some(component) = available.iter().find(|c| &c.name == name) else {
            continue;
        };
        let offered = list_examples(component);
        if offered.is_empty() {
            continue;
        }

        if args.yes {
            examples.extend(offered.iter().map(|e| ExampleSelection::new(name, &e.name)));
            continue;
        }

        let mut multi = cliclack::multiselect(format!(
            "Install {} examples? (optional)",
            component.display_name
        ));
        for example in offered {
            multi = multi.item(
                example.name.clone(),
                &example.display_name,
                format!("{}/{}", example.destination, example.name),
            );
        }
        let chosen: Vec<String> = multi.required(false).interact()?;
        examples.extend(chosen.into_iter().map(|e| ExampleSelection::new(name, e)));
    }
    Ok(examples)
}

fn confirm_overwrite(project_root: &Path, args: &InitArgs) -> Result<bool> {
    if args.no_overwrite {
        return Ok(false);
    }

    let existing = project_root.join(project::ROOT_BUILD_FILE);
    if !existing.exists() || args.yes {
        return Ok(true);
    }

    cliclack::log::warning(format!("{} already exists", existing.display()))?;
    let confirm: bool = cliclack::confirm("Replace existing project files?")
        .initial_value(false)
        .interact()?;
    if !confirm {
        anyhow::bail!("Setup cancelled.");
    }
    Ok(true)
}

fn report_tools() -> Result<()> {
    let ninja = check_ninja();
    if ninja.available {
        cliclack::log::info(format!("Detected {}", ninja.describe()))?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Source,
    Header,
}

impl FileKind {
    fn label(self) -> &'static str {
        match self {
            FileKind::Source => "source",
            FileKind::Header => "header",
        }
    }

    fn matches(self, path: &Path) -> bool {
        match self {
            FileKind::Source => is_source_file(path),
            FileKind::Header => is_header_file(path),
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            FileKind::Source => "src/foo.cc, src/bar.cc",
            FileKind::Header => "include/foo.h",
        }
    }
}

fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Existing and new files of one kind. Flags win; otherwise the user picks
/// existing files, names new ones, or (for headers) skips.
fn select_files(
    project_root: &Path,
    kind: FileKind,
    existing: Option<Vec<String>>,
    new: Option<Vec<String>>,
    yes: bool,
) -> Result<(Vec<String>, Vec<String>)> {
    if existing.is_some() || new.is_some() || yes {
        return Ok((existing.unwrap_or_default(), new.unwrap_or_default()));
    }

    let candidates = project::find_files(project_root, |p| kind.matches(p));

    let mut select = cliclack::select(format!("{} files", capitalize(kind.label())));
    if !candidates.is_empty() {
        select = select.item("existing", "Select existing files", format!("{} found", candidates.len()));
    }
    select = select.item("new", "Create new placeholder files", "");
    if kind == FileKind::Header {
        select = select.item("skip", "Skip (install no headers)", "");
    }
    let action: &str = select.interact()?;

    match action {
        "existing" => {
            let mut multi = cliclack::multiselect(format!("Select {} files", kind.label()));
            for file in &candidates {
                multi = multi.item(file.clone(), file, "");
            }
            let chosen: Vec<String> = multi.required(kind == FileKind::Source).interact()?;
            Ok((chosen, Vec::new()))
        }
        "new" => {
            let input: String = cliclack::input(format!(
                "New {} files, relative to the project root (comma-separated)",
                kind.label()
            ))
            .placeholder(kind.placeholder())
            .interact()?;
            Ok((Vec::new(), split_list(&input)))
        }
        _ => Ok((Vec::new(), Vec::new())),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn print_next_steps<C: ProductConfig>(
    config: &C,
    project_root: &Path,
    project_name: &str,
) -> Result<()> {
    let steps = config.next_steps(project_root, project_name);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }

    cliclack::outro("Happy building!")?;

    Ok(())
}
