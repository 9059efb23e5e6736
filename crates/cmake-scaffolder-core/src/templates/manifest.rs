//! Template set manifest (`templates/template.yaml`) types and parsing

use super::render::PROJECT_NAME_TOKEN;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MANIFEST_FILE: &str = "template.yaml";

/// A file copied into the project root by the init workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    /// Source path relative to the templates directory
    pub source: String,

    /// Destination path relative to the project root (defaults to source).
    /// May contain `@PROJECT_NAME@`.
    #[serde(default)]
    pub dest: Option<String>,
}

impl ProjectFile {
    pub fn new(source: &str, dest: &str) -> Self {
        Self {
            source: source.to_string(),
            dest: Some(dest.to_string()),
        }
    }

    /// Destination with the project name filled in
    pub fn destination(&self, project_name: &str) -> String {
        self.dest
            .as_deref()
            .unwrap_or(&self.source)
            .replace(PROJECT_NAME_TOKEN, project_name)
    }
}

fn default_version() -> String {
    "0.0.0".to_string()
}

fn default_components_dir() -> String {
    "components".to_string()
}

fn default_library_template() -> String {
    "add_library.cmake".to_string()
}

fn default_project_files() -> Vec<ProjectFile> {
    vec![
        ProjectFile::new("project.cmake", "CMakeLists.txt"),
        ProjectFile::new(
            "pkg-config-template.pc.in",
            "cmake/pkg-config-template.pc.in",
        ),
        ProjectFile::new(
            "templateConfig.cmake.in",
            "cmake/@PROJECT_NAME@Config.cmake.in",
        ),
    ]
}

/// Root manifest of a template set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// Semver version of the template set, checked against the CLI version
    #[serde(default = "default_version")]
    pub version: String,

    /// Directory (relative to the templates dir) holding components
    #[serde(default = "default_components_dir")]
    pub components_dir: String,

    /// Template used by the add-library workflow
    #[serde(default = "default_library_template")]
    pub library_template: String,

    /// Files materialized by the init workflow, in copy order.
    /// The first entry is the root build file that receives component wiring.
    #[serde(default = "default_project_files")]
    pub project_files: Vec<ProjectFile>,
}

impl Default for TemplateManifest {
    fn default() -> Self {
        Self {
            version: default_version(),
            components_dir: default_components_dir(),
            library_template: default_library_template(),
            project_files: default_project_files(),
        }
    }
}

impl TemplateManifest {
    /// Read `template.yaml` from a templates directory, falling back to the
    /// built-in layout when the directory has no manifest
    pub fn load(templates_dir: &Path) -> Result<Self> {
        let path = templates_dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// The file that receives component configuration
    pub fn root_build_file(&self) -> Option<&ProjectFile> {
        self.project_files.first()
    }

    /// Source files that must exist for the init workflow
    pub fn required_sources(&self) -> impl Iterator<Item = &str> {
        self.project_files.iter().map(|f| f.source.as_str())
    }
}
