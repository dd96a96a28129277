use anyhow::{Context, Result};

use crate::config::CheckConfig;

/// Printed when the board script decides between PNG and SVG pieces at runtime.
pub const GUIDANCE: &str = "\
IMPORTANT: Make sure your board is using the CCBridge style
If your pieces aren't showing, check if the board has 'ccbridge' in its background URL
You can force PNG mode by adding this line before the drawBoard function:
  let isCCBridge = true;  // Force PNG mode";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    MarkerFound,
    MarkerAbsent,
    /// The script does not exist; nothing to check.
    Missing,
}

/// Look for `config.marker` in `config.script`. Never modifies the file.
pub fn check_script(config: &CheckConfig) -> Result<CheckOutcome> {
    if !config.script.exists() {
        return Ok(CheckOutcome::Missing);
    }

    let content = std::fs::read_to_string(&config.script)
        .with_context(|| format!("failed to read {}", config.script.display()))?;

    if content.contains(&config.marker) {
        Ok(CheckOutcome::MarkerFound)
    } else {
        Ok(CheckOutcome::MarkerAbsent)
    }
}
