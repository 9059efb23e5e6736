//! Component discovery and per-component file lookups
//!
//! Nothing here is cached: every call reads the filesystem as it is now.

use super::descriptor::{Component, ExampleDescriptor};
use crate::templates::copier;
use crate::templates::render::substitute_project_name;
use anyhow::{Context as _, Result};
use colored::Colorize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the component's config template
pub const CONFIG_TEMPLATE_FILE: &str = "config.cmake.in";

/// Directory holding a component's example trees
pub const EXAMPLE_DIR: &str = "example";

/// Discovers components under one root directory
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    root: PathBuf,
}

impl ComponentRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Components in directory-iteration order
    pub fn discover(&self) -> Vec<Component> {
        discover(&self.root)
    }

    /// Components sorted by name
    pub fn discover_sorted(&self) -> Vec<Component> {
        let mut components = self.discover();
        components.sort_by(|a, b| a.name.cmp(&b.name));
        components
    }

    pub fn find(&self, name: &str) -> Option<Component> {
        self.discover().into_iter().find(|c| c.name == name)
    }
}

/// Scan `root` one level deep for component directories.
///
/// Directories without a descriptor are ignored. Unreadable or malformed
/// descriptors and duplicate names are skipped with a warning. A missing
/// root yields no components.
pub fn discover(root: &Path) -> Vec<Component> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut components = Vec::new();
    let mut seen = HashSet::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        match Component::load(&path) {
            Ok(Some(component)) => {
                if seen.insert(component.name.clone()) {
                    components.push(component);
                } else {
                    eprintln!(
                        "{} duplicate component '{}' in {}, skipping",
                        "Warning:".yellow(),
                        component.name,
                        path.display()
                    );
                }
            }
            Ok(None) => {}
            Err(e) => {
                eprintln!(
                    "{} could not load component {}: {}",
                    "Warning:".yellow(),
                    entry.file_name().to_string_lossy(),
                    e
                );
            }
        }
    }

    components
}

/// Read the component's config template with the project name filled in.
/// Returns `Ok(None)` when the component has no template.
pub fn load_config_template(component: &Component, project_name: &str) -> Result<Option<String>> {
    let path = component.dir.join(CONFIG_TEMPLATE_FILE);
    if !path.is_file() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config template: {}", path.display()))?;
    Ok(Some(substitute_project_name(&content, project_name)))
}

/// Examples the component offers (empty when it does not support examples)
pub fn list_examples(component: &Component) -> &[ExampleDescriptor] {
    if component.supports_example {
        &component.examples
    } else {
        &[]
    }
}

/// Files of one named example, or of every example when `example_name` is
/// `None`. Recursive, files only, sorted by path.
pub fn example_files(component: &Component, example_name: Option<&str>) -> Vec<PathBuf> {
    if !component.supports_example {
        return Vec::new();
    }

    let example_root = component.dir.join(EXAMPLE_DIR);
    let dir = match example_name {
        Some(name) => example_root.join(name),
        None => example_root,
    };
    if !dir.is_dir() {
        return Vec::new();
    }

    WalkDir::new(&dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect()
}

/// Install path of an example inside a project.
///
/// A named example resolves to `<project_root>/<destination>/<name>` using
/// its declared destination. Without a name, the legacy single example
/// resolves to `<project_root>/examples/<component>/<example>`.
pub fn example_destination(
    component: &Component,
    project_root: &Path,
    example_name: Option<&str>,
) -> Option<PathBuf> {
    if !component.supports_example {
        return None;
    }

    match example_name {
        Some(name) => component
            .find_example(name)
            .map(|example| project_root.join(&example.destination).join(&example.name)),
        None => component.legacy_example().map(|example| {
            project_root
                .join("examples")
                .join(&component.name)
                .join(&example.name)
        }),
    }
}

/// Build-system fragments shipped with the component: direct-child
/// `*.cmake` files, never the config template.
pub fn cmake_asset_files(component: &Component) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(&component.dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "cmake")
                && path.file_name().is_some_and(|n| n != CONFIG_TEMPLATE_FILE)
        })
        .collect();
    files.sort();
    files
}

/// Copy one example into the project, keeping its internal layout.
/// Returns the written paths.
pub fn install_example(
    component: &Component,
    project_root: &Path,
    example_name: &str,
) -> Result<Vec<PathBuf>> {
    let destination = example_destination(component, project_root, Some(example_name))
        .with_context(|| {
            format!(
                "Component '{}' has no example named '{}'",
                component.name, example_name
            )
        })?;

    let source_root = component.dir.join(EXAMPLE_DIR).join(example_name);
    let files = example_files(component, Some(example_name));
    if files.is_empty() {
        anyhow::bail!(
            "Example '{}' of component '{}' has no files in {}",
            example_name,
            component.name,
            source_root.display()
        );
    }

    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let relative = file
            .strip_prefix(&source_root)
            .with_context(|| format!("Example file outside its example: {}", file.display()))?;
        let target = destination.join(relative);
        copier::copy_file(&file, &target, true)?;
        written.push(target);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn gtest_fixture(root: &Path) -> Component {
        let dir = root.join("gtest");
        write(
            &dir.join("meta.json"),
            r#"{"name":"gtest","supports_example":true,"examples":[{"name":"basic","destination":"tests"}]}"#,
        );
        write(
            &dir.join("example/basic/CMakeLists.txt"),
            "add_executable(basic_test basic_test.cc)\n",
        );
        Component::load(&dir).unwrap().unwrap()
    }

    #[test]
    fn test_discover_skips_directories_without_descriptor() {
        let root = tempdir().unwrap();
        gtest_fixture(root.path());
        fs::create_dir_all(root.path().join("not-a-component/src")).unwrap();
        write(&root.path().join("README.md"), "components live here");

        let components = discover(root.path());
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].name, "gtest");
    }

    #[test]
    fn test_discover_survives_malformed_descriptor() {
        let root = tempdir().unwrap();
        gtest_fixture(root.path());
        write(&root.path().join("broken/meta.json"), "{ \"name\": ");

        let components = discover(root.path());
        assert_eq!(components.len(), 1);
    }

    #[test]
    fn test_discover_skips_duplicate_names() {
        let root = tempdir().unwrap();
        write(&root.path().join("a/meta.json"), r#"{"name":"grpc"}"#);
        write(&root.path().join("b/meta.json"), r#"{"name":"grpc"}"#);

        assert_eq!(discover(root.path()).len(), 1);
    }

    #[test]
    fn test_discover_missing_root_is_empty() {
        let root = tempdir().unwrap();
        assert!(discover(&root.path().join("nope")).is_empty());
    }

    #[test]
    fn test_registry_sorted_and_find() {
        let root = tempdir().unwrap();
        write(&root.path().join("zeta/meta.json"), "{}");
        write(&root.path().join("alpha/meta.json"), "{}");
        let registry = ComponentRegistry::new(root.path());

        let names: Vec<String> = registry.discover_sorted().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert!(registry.find("zeta").is_some());
        assert!(registry.find("missing").is_none());
    }

    #[test]
    fn test_registry_observes_changes_between_calls() {
        let root = tempdir().unwrap();
        let registry = ComponentRegistry::new(root.path());
        assert!(registry.discover().is_empty());

        write(&root.path().join("gtest/meta.json"), "{}");
        assert_eq!(registry.discover().len(), 1);
    }

    #[test]
    fn test_gtest_scenario() {
        let root = tempdir().unwrap();
        let gtest = gtest_fixture(root.path());

        assert_eq!(
            example_destination(&gtest, Path::new("/proj"), Some("basic")),
            Some(PathBuf::from("/proj/tests/basic"))
        );
        assert_eq!(
            example_files(&gtest, Some("basic")),
            vec![root.path().join("gtest/example/basic/CMakeLists.txt")]
        );
    }

    #[test]
    fn test_example_destination_unknown_or_unsupported() {
        let root = tempdir().unwrap();
        let mut gtest = gtest_fixture(root.path());

        assert!(example_destination(&gtest, Path::new("/proj"), Some("missing")).is_none());
        assert!(example_destination(&gtest, Path::new("/proj"), None).is_none());

        gtest.supports_example = false;
        assert!(example_destination(&gtest, Path::new("/proj"), Some("basic")).is_none());
        assert!(example_files(&gtest, Some("basic")).is_empty());
        assert!(list_examples(&gtest).is_empty());
    }

    #[test]
    fn test_legacy_destination_layout() {
        let root = tempdir().unwrap();
        write(
            &root.path().join("grpc/meta.json"),
            r#"{"supports_example": true, "example_name": "helloworld"}"#,
        );
        let grpc = Component::load(&root.path().join("grpc")).unwrap().unwrap();

        assert_eq!(
            example_destination(&grpc, Path::new("/proj"), None),
            Some(PathBuf::from("/proj/examples/grpc/helloworld"))
        );
        assert_eq!(
            example_destination(&grpc, Path::new("/proj"), Some("helloworld")),
            Some(PathBuf::from("/proj/examples/helloworld"))
        );
    }

    #[test]
    fn test_list_examples_two_entries() {
        let root = tempdir().unwrap();
        write(
            &root.path().join("gtest/meta.json"),
            r#"{"supports_example": true, "examples": [
                {"name": "gtest_example", "destination": "tests"},
                {"name": "gmock_example"}
            ]}"#,
        );
        let gtest = Component::load(&root.path().join("gtest")).unwrap().unwrap();

        let examples = list_examples(&gtest);
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].destination, "tests");
        assert_eq!(examples[1].destination, "examples");
    }

    #[test]
    fn test_example_files_all_examples_mode() {
        let root = tempdir().unwrap();
        let gtest = gtest_fixture(root.path());
        write(&root.path().join("gtest/example/mock/mock_test.cc"), "// mock");
        write(&root.path().join("gtest/example/basic/src/basic_test.cc"), "// basic");

        let all = example_files(&gtest, None);
        assert_eq!(all.len(), 3);
        assert_eq!(example_files(&gtest, Some("basic")).len(), 2);
    }

    #[test]
    fn test_load_config_template_replaces_project_name_only() {
        let root = tempdir().unwrap();
        let gtest = gtest_fixture(root.path());
        assert!(load_config_template(&gtest, "demo").unwrap().is_none());

        write(
            &gtest.dir.join(CONFIG_TEMPLATE_FILE),
            "# tests for @PROJECT_NAME@\ntarget_link_libraries(@PROJECT_NAME@_tests GTest::gtest)\n",
        );
        assert_eq!(
            load_config_template(&gtest, "demo").unwrap().unwrap(),
            "# tests for demo\ntarget_link_libraries(demo_tests GTest::gtest)\n"
        );
    }

    #[test]
    fn test_cmake_asset_files_exclude_config_template() {
        let root = tempdir().unwrap();
        let gtest = gtest_fixture(root.path());
        write(&gtest.dir.join(CONFIG_TEMPLATE_FILE), "");
        write(&gtest.dir.join("FindGTestHelpers.cmake"), "");
        write(&gtest.dir.join("notes.txt"), "");
        fs::create_dir_all(gtest.dir.join("nested.cmake")).unwrap();

        assert_eq!(
            cmake_asset_files(&gtest),
            vec![gtest.dir.join("FindGTestHelpers.cmake")]
        );
    }

    #[test]
    fn test_install_example_copies_tree() {
        let components = tempdir().unwrap();
        let project = tempdir().unwrap();
        let gtest = gtest_fixture(components.path());
        write(&gtest.dir.join("example/basic/src/basic_test.cc"), "// basic");

        let written = install_example(&gtest, project.path(), "basic").unwrap();
        assert_eq!(written.len(), 2);
        assert!(project.path().join("tests/basic/CMakeLists.txt").is_file());
        assert!(project.path().join("tests/basic/src/basic_test.cc").is_file());

        assert!(install_example(&gtest, project.path(), "missing").is_err());
    }
}
