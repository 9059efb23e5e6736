//! Template set handling
//!
//! This module provides:
//! - Template manifest types (`TemplateManifest`, `ProjectFile`)
//! - Placeholder substitution for project, library and component tokens
//! - File copying, in-place replacement and placeholder source files
//! - Version compatibility checking

pub mod copier;
pub mod manifest;
pub mod render;
pub mod version;

use crate::components::ComponentRegistry;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub use copier::{copy_file, create_placeholder_file, replace_in_file, Replacement};
pub use manifest::{ProjectFile, TemplateManifest};
pub use render::{render_library, substitute_project_name, LibraryFragment};
pub use version::check_compatibility;

/// A templates directory together with its manifest
#[derive(Debug, Clone)]
pub struct TemplateSet {
    dir: PathBuf,
    manifest: TemplateManifest,
}

impl TemplateSet {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let manifest = TemplateManifest::load(&dir)?;
        Ok(Self { dir, manifest })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest(&self) -> &TemplateManifest {
        &self.manifest
    }

    /// Absolute path of a file inside the templates directory
    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.join(relative)
    }

    pub fn components_dir(&self) -> PathBuf {
        self.dir.join(&self.manifest.components_dir)
    }

    pub fn registry(&self) -> ComponentRegistry {
        ComponentRegistry::new(self.components_dir())
    }

    pub fn library_template(&self) -> PathBuf {
        self.dir.join(&self.manifest.library_template)
    }

    /// Project files whose sources are missing from the directory
    pub fn missing_project_files(&self) -> Vec<PathBuf> {
        self.manifest
            .required_sources()
            .map(|source| self.dir.join(source))
            .filter(|path| !path.is_file())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::list_examples;

    fn shipped() -> TemplateSet {
        TemplateSet::open(concat!(env!("CARGO_MANIFEST_DIR"), "/../../templates")).unwrap()
    }

    #[test]
    fn test_shipped_template_set_is_complete() {
        let templates = shipped();
        assert!(templates.missing_project_files().is_empty());
        assert!(templates.library_template().is_file());
        assert!(version::parse_version(&templates.manifest().version).is_ok());
    }

    #[test]
    fn test_shipped_components() {
        let components = shipped().registry().discover_sorted();
        let names: Vec<&str> = components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["grpc", "gtest"]);

        assert_eq!(list_examples(&components[0]).len(), 1);
        assert_eq!(list_examples(&components[1]).len(), 2);
    }

    #[test]
    fn test_shipped_root_file_has_component_tokens() {
        let templates = shipped();
        let root = std::fs::read_to_string(templates.path("project.cmake")).unwrap();
        for component in templates.registry().discover() {
            assert!(root.contains(&component.config_token()));
            assert!(root.contains(&component.examples_token()));
        }
    }
}
