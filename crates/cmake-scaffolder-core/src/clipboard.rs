//! System clipboard access for generated snippets

use anyhow::{Context, Result};

/// Copy text to the system clipboard
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Clipboard is not available")?;
    clipboard
        .set_text(text.to_string())
        .context("Failed to copy to clipboard")?;
    Ok(())
}
