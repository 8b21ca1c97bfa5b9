// Tests for target list loading

use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use torcrawl_core::targets::{load_targets_from_file, parse_targets};

#[test]
fn test_load_targets_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut temp_file = NamedTempFile::new()?;
    writeln!(temp_file, "https://example.com")?;
    writeln!(temp_file, "  exampleonion.onion  ")?;
    writeln!(temp_file)?; // Empty line
    writeln!(temp_file, "http://api.example.com/status")?;

    let targets = load_targets_from_file(temp_file.path())?;

    assert_eq!(
        targets,
        vec![
            "https://example.com",
            "exampleonion.onion",
            "http://api.example.com/status",
        ]
    );
    Ok(())
}

#[test]
fn test_load_targets_keeps_duplicates_and_order() {
    let targets = parse_targets("b.com\na.com\nb.com\n");
    assert_eq!(targets, vec!["b.com", "a.com", "b.com"]);
}

#[test]
fn test_load_targets_has_no_comment_syntax() {
    let targets = parse_targets("# not a comment\nexample.com");
    assert_eq!(targets, vec!["# not a comment", "example.com"]);
}

#[test]
fn test_load_targets_blank_file_is_empty() {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(temp_file).unwrap();
    writeln!(temp_file, "   ").unwrap();
    writeln!(temp_file, "\t").unwrap();

    let targets = load_targets_from_file(temp_file.path()).unwrap();
    assert!(targets.is_empty());
}

#[test]
fn test_load_targets_crlf_lines() {
    let targets = parse_targets("a.com\r\nb.com\r\n");
    assert_eq!(targets, vec!["a.com", "b.com"]);
}

#[test]
fn test_load_targets_missing_file() {
    let result = load_targets_from_file(&PathBuf::from("/nonexistent/targets.yaml"));
    assert!(result.is_err());
}
