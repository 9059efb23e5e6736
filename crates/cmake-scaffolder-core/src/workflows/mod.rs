//! Scaffolding workflows built on the step pipeline
//!
//! - `init`: materialize root build files from templates and wire components
//! - `add_library`: generate a library target fragment from selected files
//!
//! Both register their steps on a caller-provided [`Pipeline`], so the caller
//! chooses the reporter and the stop-on-error policy.
//!
//! [`Pipeline`]: crate::pipeline::Pipeline

pub mod add_library;
pub mod init;

pub use add_library::{register_library_steps, LibraryOptions};
pub use init::{register_init_steps, ExampleSelection, InitOptions};

use crate::pipeline::Context;
use crate::project;

/// Context keys shared by the workflow steps
pub mod keys {
    pub const PROJECT_ROOT: &str = "project_root";
    pub const TEMPLATES_DIR: &str = "templates_dir";
    pub const PROJECT_NAME: &str = "project_name";
    pub const CMAKE_VERSION: &str = "cmake_version";

    pub const COMPONENTS: &str = "components";
    /// Prefix of the per-component list of installed example directories
    pub const INSTALLED_EXAMPLES_PREFIX: &str = "installed_examples.";

    pub const LIB_NAME: &str = "lib_name";
    pub const SELECTED_SRC_FILES: &str = "selected_src_files";
    pub const NEW_SRC_FILES: &str = "new_src_files";
    pub const SRC_FILES: &str = "src_files";
    pub const SELECTED_HEADER_FILES: &str = "selected_header_files";
    pub const NEW_HEADER_FILES: &str = "new_header_files";
    pub const HEADER_FILES: &str = "header_files";
    pub const TEMPLATE_CONTENT: &str = "template_content";
    pub const RESULT: &str = "result";
    pub const COPY_TO_CLIPBOARD: &str = "copy_to_clipboard";
    pub const CLIPBOARD_COPIED: &str = "clipboard_copied";
    pub const OUTPUT_FILE: &str = "output_file";
    pub const PRINT_RESULT: &str = "print_result";
}

pub(crate) fn path_string(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Validator shared by both workflows
pub(crate) fn validate_project_root(ctx: &Context) -> Result<(), String> {
    let root = ctx
        .require_path(keys::PROJECT_ROOT)
        .map_err(|_| "Project root is not set".to_string())?;
    project::validate_directory(&root, "Project root")
}
