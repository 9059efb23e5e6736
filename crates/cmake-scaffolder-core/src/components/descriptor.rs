//! Component descriptor (`meta.json`) parsing and normalization

use crate::project::is_contained_path;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the descriptor inside a component directory
pub const DESCRIPTOR_FILE: &str = "meta.json";

/// Default install sub-path for examples
pub const DEFAULT_EXAMPLE_DESTINATION: &str = "examples";

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid component in {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Where an example entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleOrigin {
    /// Listed under `examples`
    Declared,
    /// Synthesized from the single `example_name` field
    Legacy,
}

/// One installable example project of a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleDescriptor {
    pub name: String,
    pub display_name: String,
    /// Sub-path of the project root the example is installed under
    pub destination: String,
    pub origin: ExampleOrigin,
}

/// A discovered third-party integration (gtest, grpc, ...)
#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
    pub supports_example: bool,
    pub examples: Vec<ExampleDescriptor>,
    /// Directory holding the descriptor, templates and example tree
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawExample {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    destination: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    supports_example: bool,
    #[serde(default)]
    examples: Vec<RawExample>,
    #[serde(default)]
    example_name: Option<String>,
}

impl Component {
    /// Load the component defined in `dir`. Returns `Ok(None)` when the
    /// directory has no descriptor.
    pub fn load(dir: &Path) -> Result<Option<Self>, DescriptorError> {
        let path = dir.join(DESCRIPTOR_FILE);
        if !path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|source| DescriptorError::Read {
            path: path.clone(),
            source,
        })?;
        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::parse(&content, &dir_name, dir).map(Some)
    }

    /// Parse descriptor text. `dir_name` is the fallback component name.
    pub fn parse(content: &str, dir_name: &str, dir: &Path) -> Result<Self, DescriptorError> {
        let descriptor_path = dir.join(DESCRIPTOR_FILE);
        let raw: RawDescriptor =
            serde_json::from_str(content).map_err(|source| DescriptorError::Parse {
                path: descriptor_path.clone(),
                source,
            })?;

        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| dir_name.to_string());
        if name.is_empty() {
            return Err(DescriptorError::Invalid {
                path: descriptor_path,
                reason: "component has no name".to_string(),
            });
        }

        let mut examples = Vec::with_capacity(raw.examples.len().max(1));
        for example in raw.examples {
            if !is_plain_name(&example.name) {
                return Err(DescriptorError::Invalid {
                    path: descriptor_path,
                    reason: format!("invalid example name '{}'", example.name),
                });
            }
            let destination = example
                .destination
                .unwrap_or_else(|| DEFAULT_EXAMPLE_DESTINATION.to_string());
            if !is_contained_path(Path::new(&destination)) {
                return Err(DescriptorError::Invalid {
                    path: descriptor_path,
                    reason: format!(
                        "example '{}' destination '{}' leaves the project root",
                        example.name, destination
                    ),
                });
            }
            examples.push(ExampleDescriptor {
                display_name: example.display_name.unwrap_or_else(|| example.name.clone()),
                destination,
                name: example.name,
                origin: ExampleOrigin::Declared,
            });
        }

        if examples.is_empty() {
            if let Some(legacy) = raw.example_name.filter(|n| !n.is_empty()) {
                examples.push(ExampleDescriptor {
                    name: legacy.clone(),
                    display_name: legacy,
                    destination: DEFAULT_EXAMPLE_DESTINATION.to_string(),
                    origin: ExampleOrigin::Legacy,
                });
            }
        }

        Ok(Self {
            display_name: raw.display_name.unwrap_or_else(|| name.clone()),
            name,
            description: raw.description,
            category: raw.category.unwrap_or_else(|| "other".to_string()),
            supports_example: raw.supports_example,
            examples,
            dir: dir.to_path_buf(),
        })
    }

    /// Token stem used in project templates, e.g. `grpc-web` -> `GRPC_WEB`
    pub fn placeholder_stem(&self) -> String {
        self.name.to_ascii_uppercase().replace(['-', '.', ' '], "_")
    }

    /// Token replaced with this component's config text
    pub fn config_token(&self) -> String {
        format!("# @{}_CONFIG@", self.placeholder_stem())
    }

    /// Token replaced with `add_subdirectory` lines for installed examples
    pub fn examples_token(&self) -> String {
        format!("# @{}_EXAMPLES@", self.placeholder_stem())
    }

    pub fn find_example(&self, name: &str) -> Option<&ExampleDescriptor> {
        self.examples.iter().find(|e| e.name == name)
    }

    pub fn legacy_example(&self) -> Option<&ExampleDescriptor> {
        self.examples
            .iter()
            .find(|e| e.origin == ExampleOrigin::Legacy)
    }
}

/// A single path segment: no separators, not `.` or `..`
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}
