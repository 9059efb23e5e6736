//! Project initialization workflow
//!
//! Materializes the root build files from a template set, installs selected
//! component examples and fills the component placeholders of the root
//! `CMakeLists.txt`.

use super::{keys, path_string, validate_project_root};
use crate::components::{self, Component, ComponentRegistry};
use crate::pipeline::{Context, Pipeline, Step, StepOutcome};
use crate::project;
use crate::runtime::{check_cmake, BuildTool};
use crate::templates::render::{self, PROJECT_NAME_TOKEN};
use crate::templates::{copier, ProjectFile, Replacement, TemplateSet};
use anyhow::{Context as _, Result};
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Directory inside the project receiving component `*.cmake` fragments
pub const CMAKE_MODULE_DIR: &str = "cmake";

/// One example of one component, selected for installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleSelection {
    pub component: String,
    pub example: String,
}

impl ExampleSelection {
    pub fn new(component: impl Into<String>, example: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            example: example.into(),
        }
    }

    /// Parse `component/example` (or `component:example`)
    pub fn parse(text: &str) -> Option<Self> {
        let (component, example) = text.split_once(['/', ':'])?;
        let (component, example) = (component.trim(), example.trim());
        if component.is_empty() || example.is_empty() {
            return None;
        }
        Some(Self::new(component, example))
    }
}

impl std::fmt::Display for ExampleSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.component, self.example)
    }
}

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub project_root: PathBuf,
    pub project_name: String,
    /// Component names, in wiring order
    pub components: Vec<String>,
    pub examples: Vec<ExampleSelection>,
    /// Replace project files that already exist
    pub overwrite: bool,
}

impl InitOptions {
    pub fn new(project_root: impl Into<PathBuf>, project_name: impl Into<String>) -> Self {
        Self {
            project_root: project_root.into(),
            project_name: project_name.into(),
            components: Vec::new(),
            examples: Vec::new(),
            overwrite: true,
        }
    }
}

/// Register the init steps on `pipeline` and seed its context.
///
/// Component steps are only registered when components were selected; the
/// wiring step always runs so unused component tokens are dropped.
pub fn register_init_steps(pipeline: &mut Pipeline, templates: &TemplateSet, options: &InitOptions) {
    pipeline
        .set_context(keys::PROJECT_ROOT, path_string(&options.project_root))
        .set_context(keys::TEMPLATES_DIR, path_string(templates.dir()))
        .set_context(keys::PROJECT_NAME, options.project_name.clone())
        .set_context(keys::COMPONENTS, options.components.clone());

    pipeline.register(
        Step::check("Validate project root", validate_project_root)
            .description("Check that the project root exists and is a directory"),
    );

    let set = templates.clone();
    pipeline.register(
        Step::check("Validate templates", move |_| validate_templates(&set))
            .description("Check the templates directory and its project files"),
    );

    let has_components = !options.components.is_empty();
    if has_components || !options.examples.is_empty() {
        let registry = templates.registry();
        let examples = options.examples.clone();
        pipeline.register(
            Step::new("Resolve components", move |ctx| {
                resolve_components(ctx, &registry, &examples)
            })
            .description("Check the selected components and examples exist"),
        );
    }

    pipeline.register(
        Step::new("Detect CMake", detect_cmake)
            .optional(true)
            .description("Look for cmake on PATH"),
    );

    for file in &templates.manifest().project_files {
        let name = format!(
            "Copy {} to {}",
            file.source,
            file.destination(&options.project_name)
        );
        let file = file.clone();
        let overwrite = options.overwrite;
        pipeline.register(
            Step::new(name, move |ctx| copy_project_file(ctx, &file, overwrite))
                .description("Copy a project file from the templates directory"),
        );
    }

    if has_components && !options.examples.is_empty() {
        let registry = templates.registry();
        let examples = options.examples.clone();
        pipeline.register(
            Step::new("Install component examples", move |ctx| {
                install_examples(ctx, &registry, &examples)
            })
            .optional(true)
            .description("Copy the selected example trees into the project"),
        );
    }

    let registry = templates.registry();
    let root_file = templates.manifest().root_build_file().cloned();
    pipeline.register(
        Step::new("Wire components", move |ctx| {
            wire_components(ctx, &registry, root_file.as_ref())
        })
        .description("Fill component placeholders in the root build file"),
    );

    if has_components {
        let registry = templates.registry();
        pipeline.register(
            Step::new("Install component CMake modules", move |ctx| {
                install_cmake_modules(ctx, &registry)
            })
            .description("Copy component *.cmake fragments into cmake/"),
        );
    }

    for file in &templates.manifest().project_files {
        let name = format!(
            "Set project name in {}",
            file.destination(&options.project_name)
        );
        let file = file.clone();
        pipeline.register(
            Step::new(name, move |ctx| substitute_project_name(ctx, &file))
                .description("Replace @PROJECT_NAME@ with the project name"),
        );
    }
}

fn validate_templates(templates: &TemplateSet) -> std::result::Result<(), String> {
    project::validate_directory(templates.dir(), "Templates directory")?;

    let missing = templates.missing_project_files();
    if !missing.is_empty() {
        let list = missing
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(format!("Missing template file(s): {}", list));
    }
    Ok(())
}

/// Selected components in selection order
fn selected_components(ctx: &Context, registry: &ComponentRegistry) -> Result<Vec<Component>> {
    let names = ctx.string_list(keys::COMPONENTS)?;
    let mut available = registry.discover();

    names
        .iter()
        .map(|name| {
            available
                .iter()
                .position(|c| &c.name == name)
                .map(|index| available.swap_remove(index))
                .with_context(|| format!("Component '{}' is no longer available", name))
        })
        .collect()
}

fn resolve_components(
    ctx: &mut Context,
    registry: &ComponentRegistry,
    examples: &[ExampleSelection],
) -> Result<StepOutcome> {
    let names = ctx.string_list(keys::COMPONENTS)?;
    let available = registry.discover();

    let unknown: Vec<&str> = names
        .iter()
        .filter(|name| !available.iter().any(|c| &c.name == *name))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        let mut known: Vec<&str> = available.iter().map(|c| c.name.as_str()).collect();
        known.sort();
        return Ok(StepOutcome::failure(format!(
            "Unknown component(s): {} (available: {})",
            unknown.join(", "),
            if known.is_empty() { "none".to_string() } else { known.join(", ") }
        )));
    }

    for selection in examples {
        if !names.contains(&selection.component) {
            return Ok(StepOutcome::failure(format!(
                "Example {} belongs to a component that was not selected",
                selection
            )));
        }
        let Some(component) = available.iter().find(|c| c.name == selection.component) else {
            continue;
        };
        if !components::list_examples(component)
            .iter()
            .any(|e| e.name == selection.example)
        {
            return Ok(StepOutcome::failure(format!(
                "Component '{}' has no example named '{}'",
                selection.component, selection.example
            )));
        }
        if components::example_files(component, Some(&selection.example)).is_empty() {
            return Ok(StepOutcome::failure(format!(
                "Example {} has no files to install",
                selection
            )));
        }
    }

    Ok(StepOutcome::Success)
}

fn detect_cmake(ctx: &mut Context) -> Result<StepOutcome> {
    let info = check_cmake();
    if !info.available {
        return Ok(StepOutcome::failure(format!(
            "CMake not found ({})",
            BuildTool::CMake.install_hint()
        )));
    }
    if let Some(version) = info.version {
        ctx.set(keys::CMAKE_VERSION, version)?;
    }
    Ok(StepOutcome::Success)
}

fn copy_project_file(ctx: &mut Context, file: &ProjectFile, overwrite: bool) -> Result<StepOutcome> {
    let templates_dir = ctx.require_path(keys::TEMPLATES_DIR)?;
    let root = ctx.require_path(keys::PROJECT_ROOT)?;
    let project_name = ctx.require_str(keys::PROJECT_NAME)?;

    let src = templates_dir.join(&file.source);
    if !src.is_file() {
        return Ok(StepOutcome::failure(format!(
            "Template file not found: {}",
            src.display()
        )));
    }

    let dst = root.join(file.destination(project_name));
    if dst.exists() && !overwrite {
        return Ok(StepOutcome::failure(format!(
            "{} already exists",
            dst.display()
        )));
    }

    copier::copy_file(&src, &dst, true)?;
    Ok(StepOutcome::Success)
}

fn install_examples(
    ctx: &mut Context,
    registry: &ComponentRegistry,
    examples: &[ExampleSelection],
) -> Result<StepOutcome> {
    let root = ctx.require_path(keys::PROJECT_ROOT)?;
    let selected = selected_components(ctx, registry)?;
    let mut subdirectories: BTreeMap<String, Vec<String>> = BTreeMap::new();

    let outcome = install_each(&root, &selected, examples, &mut subdirectories);

    // Examples already on disk are recorded even when a later one failed
    for (component, dirs) in subdirectories {
        ctx.set(format!("{}{}", keys::INSTALLED_EXAMPLES_PREFIX, component), dirs)?;
    }
    outcome
}

/// Install examples in order, collecting the example directories that carry
/// their own `CMakeLists.txt` into `subdirectories` as they land.
fn install_each(
    root: &Path,
    selected: &[Component],
    examples: &[ExampleSelection],
    subdirectories: &mut BTreeMap<String, Vec<String>>,
) -> Result<StepOutcome> {
    for selection in examples {
        let Some(component) = selected.iter().find(|c| c.name == selection.component) else {
            return Ok(StepOutcome::failure(format!(
                "Component '{}' was not selected",
                selection.component
            )));
        };

        components::install_example(component, root, &selection.example)?;

        let destination = components::example_destination(component, root, Some(&selection.example));
        if let Some(destination) = destination {
            if destination.join(project::ROOT_BUILD_FILE).is_file() {
                let relative = destination.strip_prefix(root).unwrap_or(&destination);
                subdirectories
                    .entry(component.name.clone())
                    .or_default()
                    .push(project::to_slash(relative));
            }
        }
    }
    Ok(StepOutcome::Success)
}

fn wire_components(
    ctx: &mut Context,
    registry: &ComponentRegistry,
    root_file: Option<&ProjectFile>,
) -> Result<StepOutcome> {
    let Some(root_file) = root_file else {
        return Ok(StepOutcome::failure("Template set declares no project files"));
    };
    let root = ctx.require_path(keys::PROJECT_ROOT)?;
    let project_name = ctx.require_str(keys::PROJECT_NAME)?;

    let path = root.join(root_file.destination(project_name));
    if !path.is_file() {
        return Ok(StepOutcome::failure(format!(
            "Root build file not found: {}",
            path.display()
        )));
    }

    let mut sections = Vec::new();
    for component in selected_components(ctx, registry)? {
        if let Some(config) = components::load_config_template(&component, project_name)? {
            sections.push((component.config_token(), config));
        }

        let key = format!("{}{}", keys::INSTALLED_EXAMPLES_PREFIX, component.name);
        let dirs = ctx.string_list(&key)?;
        if !dirs.is_empty() {
            let lines = dirs
                .iter()
                .map(|dir| format!("add_subdirectory({})", dir))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push((component.examples_token(), lines));
        }
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let wired = render::fill_component_tokens(&content, &sections);
    if wired != content {
        std::fs::write(&path, wired)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(StepOutcome::Success)
}

fn install_cmake_modules(ctx: &mut Context, registry: &ComponentRegistry) -> Result<StepOutcome> {
    let target_dir = ctx.require_path(keys::PROJECT_ROOT)?.join(CMAKE_MODULE_DIR);

    for component in selected_components(ctx, registry)? {
        for file in components::cmake_asset_files(&component) {
            let Some(file_name) = file.file_name() else {
                continue;
            };
            copier::copy_file(&file, &target_dir.join(file_name), true)?;
        }
    }
    Ok(StepOutcome::Success)
}

fn substitute_project_name(ctx: &mut Context, file: &ProjectFile) -> Result<StepOutcome> {
    let root = ctx.require_path(keys::PROJECT_ROOT)?;
    let project_name = ctx.require_str(keys::PROJECT_NAME)?;

    let path = root.join(file.destination(project_name));
    if !path.is_file() {
        return Ok(StepOutcome::failure(format!(
            "File not found: {}",
            path.display()
        )));
    }

    if copier::replace_in_file(&path, PROJECT_NAME_TOKEN, project_name)? == Replacement::NotFound {
        eprintln!(
            "{} {} not found in {}",
            "Warning:".yellow(),
            PROJECT_NAME_TOKEN,
            path.display()
        );
    }
    Ok(StepOutcome::Success)
}
