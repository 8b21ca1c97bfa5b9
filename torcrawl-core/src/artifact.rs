use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_OUTPUT_DIR: &str = "results";
const PHOTO_DIR: &str = "photos";

/// Turn a URL into the stem used for its `.html` and `.png` artifacts.
///
/// Passes run in a fixed order: `/`, `:` and `.` become `_`, then the
/// mangled scheme tokens `https__` and `http__` are removed wherever they
/// appear. Distinct URLs can share a name; the later write wins.
pub fn artifact_name(url: &str) -> String {
    url.replace('/', "_")
        .replace(':', "_")
        .replace('.', "_")
        .replace("https__", "")
        .replace("http__", "")
}

/// Directory layout for captured pages: `<root>/<name>.html` and
/// `<root>/photos/<name>.png`.
///
/// Writes are best-effort. A failed write is logged and the run carries on.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn html_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.html", name))
    }

    pub fn screenshot_path(&self, name: &str) -> PathBuf {
        self.root.join(PHOTO_DIR).join(format!("{}.png", name))
    }

    pub fn write_html(&self, name: &str, body: &[u8]) -> PathBuf {
        let path = self.html_path(name);
        write_best_effort(&self.root, &path, body);
        path
    }

    pub fn write_screenshot(&self, name: &str, png: &[u8]) -> PathBuf {
        let path = self.screenshot_path(name);
        write_best_effort(&self.root.join(PHOTO_DIR), &path, png);
        path
    }
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

fn write_best_effort(dir: &Path, path: &Path, contents: &[u8]) {
    if let Err(e) = fs::create_dir_all(dir) {
        warn!("Could not create {}: {}", dir.display(), e);
        return;
    }
    match fs::write(path, contents) {
        Ok(()) => debug!("Wrote {} ({} bytes)", path.display(), contents.len()),
        Err(e) => warn!("Could not write {}: {}", path.display(), e),
    }
}
