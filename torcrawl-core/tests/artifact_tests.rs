// Tests for artifact naming and the on-disk layout

use std::fs;
use tempfile::TempDir;
use torcrawl_core::artifact::{ArtifactStore, artifact_name};

// ============================================================================
// Artifact Name Tests
// ============================================================================

#[test]
fn test_artifact_name_https() {
    assert_eq!(artifact_name("https://example.com"), "_example_com");
}

#[test]
fn test_artifact_name_http() {
    assert_eq!(artifact_name("http://example.com"), "_example_com");
}

#[test]
fn test_artifact_name_with_path() {
    assert_eq!(
        artifact_name("http://example.com/news/index.php"),
        "_example_com_news_index_php"
    );
}

#[test]
fn test_artifact_name_with_port() {
    assert_eq!(artifact_name("http://127.0.0.1:8080/"), "_127_0_0_1_8080_");
}

#[test]
fn test_artifact_name_onion() {
    assert_eq!(
        artifact_name("http://duckduckgogg42xjoc72x3sjasowoarfbgcmvfimaftt6twagswzczad.onion"),
        "_duckduckgogg42xjoc72x3sjasowoarfbgcmvfimaftt6twagswzczad_onion"
    );
}

#[test]
fn test_artifact_name_strips_scheme_tokens_anywhere() {
    // The scheme tokens are removed after punctuation is mangled, so an
    // embedded URL loses its scheme too.
    assert_eq!(
        artifact_name("http://a.com/?next=https://b.com"),
        "_a_com_?next=_b_com"
    );
}

#[test]
fn test_artifact_name_without_scheme() {
    assert_eq!(artifact_name("example.com"), "example_com");
}

#[test]
fn test_artifact_name_empty() {
    assert_eq!(artifact_name(""), "");
}

#[test]
fn test_artifact_name_is_deterministic() {
    let url = "https://news.example.org/2024/01/story.html";
    let first = artifact_name(url);
    for _ in 0..10 {
        assert_eq!(artifact_name(url), first);
    }
}

#[test]
fn test_artifact_name_collisions_are_possible() {
    assert_eq!(
        artifact_name("http://a.b/c"),
        artifact_name("https://a/b.c")
    );
}

#[test]
fn test_artifact_name_has_no_path_separators() {
    for url in [
        "https://example.com/a/b/c",
        "http://[::1]:8080/x",
        "ftp://files.example.com/pub",
    ] {
        let name = artifact_name(url);
        assert!(!name.contains('/'), "{} -> {}", url, name);
        assert!(!name.contains(':'), "{} -> {}", url, name);
        assert!(!name.contains('.'), "{} -> {}", url, name);
    }
}

// ============================================================================
// Artifact Store Tests
// ============================================================================

#[test]
fn test_store_paths() {
    let store = ArtifactStore::new("results");
    assert_eq!(
        store.html_path("_example_com"),
        std::path::Path::new("results/_example_com.html")
    );
    assert_eq!(
        store.screenshot_path("_example_com"),
        std::path::Path::new("results/photos/_example_com.png")
    );
}

#[test]
fn test_store_creates_directories_on_write() {
    let tmp = TempDir::new().unwrap();
    let store = ArtifactStore::new(tmp.path().join("results"));

    let html = store.write_html("_example_com", b"<html></html>");
    let png = store.write_screenshot("_example_com", b"\x89PNG");

    assert_eq!(fs::read(html).unwrap(), b"<html></html>");
    assert_eq!(fs::read(png).unwrap(), b"\x89PNG");
}

#[test]
fn test_store_overwrites_on_repeat() {
    let tmp = TempDir::new().unwrap();
    let store = ArtifactStore::new(tmp.path());

    store.write_html("page", b"first");
    let path = store.write_html("page", b"second");

    assert_eq!(fs::read_to_string(path).unwrap(), "second");
}

#[test]
fn test_store_write_failure_is_swallowed() {
    let tmp = TempDir::new().unwrap();
    // A regular file where the output directory should be
    let blocker = tmp.path().join("results");
    fs::write(&blocker, "not a directory").unwrap();

    let store = ArtifactStore::new(&blocker);
    let path = store.write_html("page", b"body");

    assert!(!path.exists());
}
