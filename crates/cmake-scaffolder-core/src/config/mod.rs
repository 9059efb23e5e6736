//! Templates directory resolution
//!
//! The templates directory is chosen explicitly, never from ambient state
//! other than the product's environment variable:
//!
//! 1. `--templates-dir` flag
//! 2. the product's templates environment variable
//! 3. `<exe dir>/templates`
//! 4. `<exe dir>/../share/cmake-scaffolder/templates`
//! 5. `./templates`

use crate::product::ProductConfig;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Candidate directories in lookup order
pub fn templates_dir_candidates(
    explicit: Option<&Path>,
    env_value: Option<&str>,
    exe_dir: Option<&Path>,
    current_dir: &Path,
) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(dir) = explicit {
        candidates.push(dir.to_path_buf());
    }
    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        candidates.push(PathBuf::from(value));
    }
    if let Some(exe_dir) = exe_dir {
        candidates.push(exe_dir.join("templates"));
        candidates.push(exe_dir.join("../share/cmake-scaffolder/templates"));
    }
    candidates.push(current_dir.join("templates"));

    candidates
}

/// Pick the templates directory for a product.
///
/// An explicit directory is authoritative: if it does not exist, resolution
/// fails instead of falling back.
pub fn resolve_templates_dir<C: ProductConfig>(config: &C, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        if dir.is_dir() {
            return Ok(dir.to_path_buf());
        }
        anyhow::bail!("Templates directory not found: {}", dir.display());
    }

    let env_value = std::env::var(config.templates_dir_env()).ok();
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let candidates =
        templates_dir_candidates(None, env_value.as_deref(), exe_dir.as_deref(), &current_dir);

    if let Some(found) = candidates.iter().find(|dir| dir.is_dir()) {
        return Ok(found.clone());
    }

    anyhow::bail!(
        "No templates directory found. Tried:\n{}\nSet {} or pass --templates-dir.",
        candidates
            .iter()
            .map(|c| format!("  - {}", c.display()))
            .collect::<Vec<_>>()
            .join("\n"),
        config.templates_dir_env()
    )
}
