//! Version comparison between the CLI and the template set

use anyhow::Result;
use semver::Version;

/// Warn when the template set expects a newer CLI than the one running.
/// Unparsable versions never produce a warning.
pub fn check_compatibility(
    cli_version: &str,
    template_version: &str,
    upgrade_command: &str,
) -> Option<String> {
    let cli_ver = parse_version(cli_version).ok()?;
    let template_ver = parse_version(template_version).ok()?;

    if cli_ver < template_ver {
        Some(format!(
            "Templates require version {} or newer, running {}. Consider updating: {}",
            template_ver, cli_ver, upgrade_command
        ))
    } else {
        None
    }
}

/// Parse a version string, accepting a leading `v`
pub fn parse_version(version_str: &str) -> Result<Version> {
    let cleaned = version_str.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    Version::parse(cleaned).map_err(|e| anyhow::anyhow!("Invalid version '{}': {}", version_str, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPGRADE: &str = "cargo install cmake-init --force";

    #[test]
    fn test_cli_older_than_templates() {
        let warning = check_compatibility("0.1.0", "0.2.0", UPGRADE).unwrap();
        assert!(warning.contains("0.2.0"));
        assert!(warning.contains(UPGRADE));
    }

    #[test]
    fn test_cli_same_or_newer() {
        assert!(check_compatibility("0.2.0", "0.2.0", UPGRADE).is_none());
        assert!(check_compatibility("0.3.1", "v0.2.0", UPGRADE).is_none());
    }

    #[test]
    fn test_invalid_versions_never_warn() {
        assert!(check_compatibility("invalid", "0.1.0", UPGRADE).is_none());
        assert!(check_compatibility("0.1.0", "latest", UPGRADE).is_none());
    }

    #[test]
    fn test_parse_version_strips_prefix() {
        assert_eq!(parse_version("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert!(parse_version("1.2").is_err());
    }
}
