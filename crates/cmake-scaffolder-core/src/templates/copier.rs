//! File copying and in-place text replacement for generated projects

use anyhow::{Context, Result};
use std::path::Path;

/// Result of an in-place replacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// The token occurred this many times and the file was rewritten
    Replaced(usize),
    /// The token was not present; the file was left untouched
    NotFound,
}

/// Create a directory and its parents
pub fn ensure_directory(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

/// Copy `src` to `dst`, creating parent directories.
///
/// Fails when `src` does not exist, or when `dst` exists and `overwrite` is
/// false.
pub fn copy_file(src: &Path, dst: &Path, overwrite: bool) -> Result<()> {
    if !src.is_file() {
        anyhow::bail!("Source file does not exist: {}", src.display());
    }
    if dst.exists() && !overwrite {
        anyhow::bail!("Destination already exists: {}", dst.display());
    }

    if let Some(parent) = dst.parent() {
        ensure_directory(parent)?;
    }

    std::fs::copy(src, dst)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;
    Ok(())
}

/// Replace every occurrence of `from` with `to` in the file at `path`
pub fn replace_in_file(path: &Path, from: &str, to: &str) -> Result<Replacement> {
    replace_all_in_file(path, &[(from, to)])
}

/// Apply several replacements in order and write the file once.
/// Reports the total number of occurrences replaced.
pub fn replace_all_in_file(path: &Path, replacements: &[(&str, &str)]) -> Result<Replacement> {
    if !path.is_file() {
        anyhow::bail!("File does not exist: {}", path.display());
    }

    let mut content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut count = 0;
    for (from, to) in replacements {
        if from.is_empty() {
            continue;
        }
        let found = content.matches(from).count();
        if found > 0 {
            content = content.replace(from, to);
            count += found;
        }
    }

    if count == 0 {
        return Ok(Replacement::NotFound);
    }

    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(Replacement::Replaced(count))
}

const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx"];
const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx"];

/// Skeleton text for a new C/C++ file at `relative_path`
pub fn placeholder_content(relative_path: &Path) -> String {
    let ext = relative_path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let display = relative_path.to_string_lossy().replace('\\', "/");

    if HEADER_EXTENSIONS.contains(&ext.as_str()) {
        let guard = include_guard(&display);
        format!(
            "// {display}\n\n#ifndef {guard}\n#define {guard}\n\n#endif  // {guard}\n"
        )
    } else if SOURCE_EXTENSIONS.contains(&ext.as_str()) {
        format!("// {display}\n")
    } else {
        String::new()
    }
}

/// `include/net/socket.h` -> `NET_SOCKET_H_`
fn include_guard(path: &str) -> String {
    let trimmed = path.strip_prefix("include/").unwrap_or(path);
    let mut guard: String = trimmed
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    if guard.starts_with(|c: char| c.is_ascii_digit()) {
        guard.insert(0, '_');
    }
    guard.push('_');
    guard
}

/// Create a placeholder file at `project_root/relative_path` unless it
/// already exists. Returns `true` when a file was created.
pub fn create_placeholder_file(project_root: &Path, relative_path: &Path) -> Result<bool> {
    let path = project_root.join(relative_path);
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    std::fs::write(&path, placeholder_content(relative_path))
        .with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(true)
}

pub fn is_source_file(path: &Path) -> bool {
    has_extension(path, SOURCE_EXTENSIONS)
}

pub fn is_header_file(path: &Path) -> bool {
    has_extension(path, HEADER_EXTENSIONS)
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|e| allowed.contains(&e.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_copy_file_creates_parents() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("project.cmake");
        fs::write(&src, "project(@PROJECT_NAME@)").unwrap();

        let dst = dir.path().join("out/cmake/CMakeLists.txt");
        copy_file(&src, &dst, false).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "project(@PROJECT_NAME@)");
    }

    #[test]
    fn test_copy_file_respects_overwrite() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old").unwrap();

        assert!(copy_file(&src, &dst, false).is_err());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "old");

        copy_file(&src, &dst, true).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let dir = tempdir().unwrap();
        let result = copy_file(&dir.path().join("missing"), &dir.path().join("dst"), true);
        assert!(result.is_err());
    }

    #[test]
    fn test_replace_in_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("CMakeLists.txt");
        fs::write(&path, "project(@PROJECT_NAME@)\ninstall(EXPORT @PROJECT_NAME@Targets)\n").unwrap();

        assert_eq!(
            replace_in_file(&path, "@PROJECT_NAME@", "demo").unwrap(),
            Replacement::Replaced(2)
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "project(demo)\ninstall(EXPORT demoTargets)\n"
        );
        assert_eq!(
            replace_in_file(&path, "@PROJECT_NAME@", "demo").unwrap(),
            Replacement::NotFound
        );
    }

    #[test]
    fn test_replace_in_missing_file_fails() {
        let dir = tempdir().unwrap();
        assert!(replace_in_file(&dir.path().join("nope"), "a", "b").is_err());
    }

    #[test]
    fn test_placeholder_files() {
        let dir = tempdir().unwrap();
        assert!(create_placeholder_file(dir.path(), Path::new("include/net/socket.h")).unwrap());
        assert!(create_placeholder_file(dir.path(), Path::new("src/net/socket.cc")).unwrap());
        assert!(!create_placeholder_file(dir.path(), Path::new("src/net/socket.cc")).unwrap());

        let header = fs::read_to_string(dir.path().join("include/net/socket.h")).unwrap();
        assert!(header.contains("#ifndef NET_SOCKET_H_"));
        assert!(header.contains("#endif  // NET_SOCKET_H_"));

        let source = fs::read_to_string(dir.path().join("src/net/socket.cc")).unwrap();
        assert_eq!(source, "// src/net/socket.cc\n");
    }

    #[test]
    fn test_extension_checks() {
        assert!(is_source_file(Path::new("a/b.CPP")));
        assert!(is_header_file(Path::new("a/b.hpp")));
        assert!(!is_source_file(Path::new("a/b.h")));
        assert!(!is_header_file(Path::new("Makefile")));
    }
}
