//! Newline-delimited identifier lists (SKUs or product URLs).

use std::path::Path;

use crate::ConfigError;

/// Read identifiers from a text file, one per line.
///
/// # Errors
///
/// Returns [`ConfigError::IdentifiersFileIo`] if the file cannot be read.
pub fn load_identifiers(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IdentifiersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(parse_identifiers(&content))
}

/// Split text into identifiers. Surrounding whitespace is trimmed, blank
/// lines and `#` comments are skipped. Order and duplicates are preserved.
#[must_use]
pub fn parse_identifiers(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}
