//! Pluggable third-party components (test frameworks, RPC frameworks, ...)
//!
//! Each component lives in its own directory under the components root:
//!
//! ```text
//! components/
//!   gtest/
//!     meta.json           descriptor
//!     config.cmake.in     config template (@PROJECT_NAME@ is substituted)
//!     *.cmake             fragments copied into the project's cmake/ dir
//!     example/<name>/...  example projects copied verbatim
//! ```

pub mod descriptor;
pub mod registry;

pub use descriptor::{Component, DescriptorError, ExampleDescriptor, ExampleOrigin};
pub use registry::{
    cmake_asset_files, discover, example_destination, example_files, install_example,
    list_examples, load_config_template, ComponentRegistry,
};
