use chrono::Local;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_AUDIT_LOG: &str = "scan_report.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Reachability outcome for one target, as written to the audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent {
    Failed { url: String },
    Inactive { url: String, status: u16 },
    Active { url: String },
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEvent::Failed { url } => write!(f, "FAILED: {}", url),
            AuditEvent::Inactive { url, status } => {
                write!(f, "INACTIVE: {} (Status: {})", url, status)
            }
            AuditEvent::Active { url } => write!(f, "ACTIVE: {}", url),
        }
    }
}

/// Append-only log of `[YYYY-MM-DD HH:MM:SS] message` lines.
///
/// The file is opened for each entry and closed again before `append`
/// returns. Nothing is ever rewritten.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Best-effort: an I/O failure is logged and swallowed.
    pub fn append(&self, message: &str) {
        let line = format!("[{}] {}\n", Local::now().format(TIMESTAMP_FORMAT), message);

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = result {
            warn!("Could not append to audit log {}: {}", self.path.display(), e);
        }
    }

    pub fn record(&self, event: &AuditEvent) {
        self.append(&event.to_string());
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_LOG)
    }
}
