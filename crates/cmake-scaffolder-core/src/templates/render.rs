//! Placeholder substitution for CMake templates
//!
//! Templates are opaque text: nothing here parses CMake. Tokens are literal
//! markers replaced with generated text.

use regex::Regex;
use std::sync::OnceLock;

pub const PROJECT_NAME_TOKEN: &str = "@PROJECT_NAME@";
pub const LIB_NAME_TOKEN: &str = "@LIB_NAME@";
pub const SRC_FILES_TOKEN: &str = "# @src_files@";
pub const INSTALL_HEADERS_TOKEN: &str = "# @install_headers@";

/// Inputs for the add-library template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryFragment {
    pub lib_name: String,
    pub project_name: String,
    pub src_files: Vec<String>,
    pub header_files: Vec<String>,
}

fn header_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\n?[ \t]*foreach\s*\([^)]*?# @install_headers@.*?endforeach\s*\(\s*\)[ \t]*")
            .expect("Invalid regex pattern")
    })
}

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("Invalid regex pattern"))
}

fn component_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*# @[A-Z0-9_]+_(?:CONFIG|EXAMPLES)@[ \t]*(?:\r?\n|$)")
            .expect("Invalid regex pattern")
    })
}

pub fn substitute_project_name(text: &str, project_name: &str) -> String {
    text.replace(PROJECT_NAME_TOKEN, project_name)
}

/// One path per line, indented two spaces
pub fn file_list(files: &[String]) -> String {
    files
        .iter()
        .map(|f| format!("  {}", f))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fill the add-library template.
///
/// With no headers, the `foreach(...)` ... `endforeach()` block containing
/// the header token is removed entirely.
pub fn render_library(template: &str, fragment: &LibraryFragment) -> String {
    let mut result = template
        .replace(LIB_NAME_TOKEN, &fragment.lib_name)
        .replace(PROJECT_NAME_TOKEN, &fragment.project_name)
        .replace(SRC_FILES_TOKEN, &file_list(&fragment.src_files));

    if fragment.header_files.is_empty() {
        result = header_block_re().replace_all(&result, "").into_owned();
        // also drop a token sitting outside any foreach block
        result = result.replace(INSTALL_HEADERS_TOKEN, "");
        result = blank_lines_re().replace_all(&result, "\n\n").into_owned();
    } else {
        result = result.replace(INSTALL_HEADERS_TOKEN, &file_list(&fragment.header_files));
    }

    result
}

/// Replace each `(token, text)` pair, then drop the lines of any component
/// token left unfilled
pub fn fill_component_tokens(template: &str, sections: &[(String, String)]) -> String {
    let mut result = template.to_string();
    for (token, text) in sections {
        result = result.replace(token.as_str(), text.trim_end_matches('\n'));
    }
    strip_component_tokens(&result)
}

/// Remove lines holding only an unfilled `# @NAME_CONFIG@` or
/// `# @NAME_EXAMPLES@` token
pub fn strip_component_tokens(text: &str) -> String {
    component_token_re().replace_all(text, "").into_owned()
}
