use std::fs;
use std::io;
use std::path::Path;

pub const DEFAULT_TARGETS_FILE: &str = "targets.yaml";

/// Load targets from a newline-delimited file.
///
/// Lines are trimmed and blank ones dropped. There is no comment syntax and
/// no deduplication; order is file order. An empty file yields an empty list.
pub fn load_targets_from_file(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(parse_targets(&content))
}

pub fn parse_targets(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
