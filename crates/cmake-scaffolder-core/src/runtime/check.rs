//! Build tool detection for CMake and Ninja

use std::fmt;
use std::process::Command;

/// Build tools a generated project may need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildTool {
    CMake,
    Ninja,
}

impl BuildTool {
    pub fn display_name(&self) -> &'static str {
        match self {
            BuildTool::CMake => "CMake",
            BuildTool::Ninja => "Ninja",
        }
    }

    pub fn binary(&self) -> &'static str {
        match self {
            BuildTool::CMake => "cmake",
            BuildTool::Ninja => "ninja",
        }
    }

    pub fn install_hint(&self) -> &'static str {
        match self {
            BuildTool::CMake => "install from https://cmake.org/download",
            BuildTool::Ninja => "install from https://ninja-build.org",
        }
    }
}

impl fmt::Display for BuildTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub tool: BuildTool,
    pub version: Option<String>,
    pub available: bool,
}

impl ToolInfo {
    /// `CMake (3.28.1)` or `CMake (not installed)`
    pub fn describe(&self) -> String {
        match (&self.version, self.available) {
            (Some(version), true) => format!("{} ({})", self.tool, version),
            (None, true) => format!("{} (unknown version)", self.tool),
            (_, false) => format!("{} (not installed)", self.tool),
        }
    }
}

/// `cmake version 3.28.1` -> `3.28.1`; `1.11.1` -> `1.11.1`
pub fn parse_version_output(output: &str) -> Option<String> {
    let first = output.lines().next()?.trim();
    let version = first.rsplit(' ').next()?.trim();
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

/// Probe a tool by running `<binary> --version`
pub fn check_tool(tool: BuildTool) -> ToolInfo {
    let output = Command::new(tool.binary()).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => ToolInfo {
            tool,
            version: parse_version_output(&String::from_utf8_lossy(&out.stdout)),
            available: true,
        },
        _ => ToolInfo {
            tool,
            version: None,
            available: false,
        },
    }
}

pub fn check_cmake() -> ToolInfo {
    check_tool(BuildTool::CMake)
}

pub fn check_ninja() -> ToolInfo {
    check_tool(BuildTool::Ninja)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_output() {
        assert_eq!(
            parse_version_output("cmake version 3.28.1\n\nCMake suite maintained by Kitware\n"),
            Some("3.28.1".to_string())
        );
        assert_eq!(parse_version_output("1.11.1\n"), Some("1.11.1".to_string()));
        assert_eq!(parse_version_output(""), None);
    }

    #[test]
    fn test_describe() {
        let info = ToolInfo {
            tool: BuildTool::CMake,
            version: Some("3.28.1".to_string()),
            available: true,
        };
        assert_eq!(info.describe(), "CMake (3.28.1)");

        let missing = ToolInfo {
            tool: BuildTool::Ninja,
            version: None,
            available: false,
        };
        assert_eq!(missing.describe(), "Ninja (not installed)");
    }

    #[test]
    fn test_check_tool_reports_consistently() {
        let info = check_cmake();
        assert_eq!(info.tool, BuildTool::CMake);
        if !info.available {
            assert!(info.version.is_none());
        }
    }
}
