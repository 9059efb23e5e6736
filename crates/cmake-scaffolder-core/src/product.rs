//! Product configuration trait for CLI binaries
//!
//! Each binary (`cmake-init`, `cmake-add-lib`) implements this trait to
//! configure how the shared workflows present themselves.

use std::path::Path;

/// Configuration trait for the scaffolding CLIs
///
/// Each product implements this trait to define:
/// - Product identity (name, display name)
/// - Where templates are looked up
/// - Upgrade hints for template version warnings
/// - Post-run instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (binary name)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Environment variable overriding the templates directory
    fn templates_dir_env(&self) -> &'static str;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// Upgrade/install command shown in version warnings
    fn upgrade_command(&self) -> &'static str;

    /// "Next steps" shown after a successful run
    fn next_steps(&self, project_root: &Path, project_name: &str) -> Vec<String>;
}
