//! Project-level helpers: name validation, name detection, file discovery

use anyhow::{Context, Result};
use colored::Colorize;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

pub const ROOT_BUILD_FILE: &str = "CMakeLists.txt";

/// Check a project or library name: non-empty, ASCII letters, digits, `_`
/// and `-` only, not starting with a digit
pub fn validate_project_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err("Name may only contain letters, digits, '_' and '-'".to_string());
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err("Name cannot start with a digit".to_string());
    }
    Ok(())
}

fn package_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"set\s*\(\s*PACKAGE_NAME\s+"([^"]+)"\s*\)"#).expect("Invalid regex pattern")
    })
}

/// Extract `set(PACKAGE_NAME "...")` from CMake text
pub fn parse_package_name(cmake_text: &str) -> Option<String> {
    package_name_re()
        .captures(cmake_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Project name declared in `<project_root>/CMakeLists.txt`.
/// `Ok(None)` when the file is missing or declares no `PACKAGE_NAME`.
pub fn detect_project_name(project_root: &Path) -> Result<Option<String>> {
    let path = project_root.join(ROOT_BUILD_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_package_name(&content))
}

/// Check that `path` names an existing directory
pub fn validate_directory(path: &Path, what: &str) -> std::result::Result<(), String> {
    if !path.exists() {
        return Err(format!("{} does not exist: {}", what, path.display()));
    }
    if !path.is_dir() {
        return Err(format!("{} is not a directory: {}", what, path.display()));
    }
    Ok(())
}

/// Paths relative to `project_root`, using `/` separators.
///
/// Files outside the root keep their original path and a warning is printed.
pub fn relative_to_root(files: &[PathBuf], project_root: &Path) -> Vec<String> {
    let root = project_root
        .canonicalize()
        .unwrap_or_else(|_| project_root.to_path_buf());

    files
        .iter()
        .map(|file| {
            let absolute = if file.is_absolute() {
                file.clone()
            } else {
                project_root.join(file)
            };
            let resolved = absolute.canonicalize().unwrap_or(absolute);
            match resolved.strip_prefix(&root) {
                Ok(relative) => to_slash(relative),
                Err(_) => {
                    eprintln!(
                        "{} file is outside the project root: {}",
                        "Warning:".yellow(),
                        file.display()
                    );
                    to_slash(file)
                }
            }
        })
        .collect()
}

/// A relative path that cannot leave the directory it is joined to: no root,
/// no prefix and no `..` segments
pub fn is_contained_path(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_) | std::path::Component::CurDir))
}

/// Path text with `/` separators on every platform
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
        .replace("//", "/")
}

/// Directory names never searched for candidate files
fn is_ignored_dir(name: &str) -> bool {
    name.starts_with('.')
        || name.starts_with("build")
        || name.starts_with("cmake-build-")
        || name == "third_party"
}

/// Files under `project_root` whose extension passes `filter`, relative and
/// sorted. Hidden and build directories are skipped.
pub fn find_files(project_root: &Path, filter: impl Fn(&Path) -> bool) -> Vec<String> {
    let files: Vec<PathBuf> = WalkDir::new(project_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !is_ignored_dir(&entry.file_name().to_string_lossy())
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && filter(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    relative_to_root(&files, project_root)
}
