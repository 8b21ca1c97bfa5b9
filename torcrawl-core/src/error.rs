use std::path::PathBuf;
use thiserror::Error;
use torcrawl_scanner::ScanError;

/// Errors that end a run before any target is contacted.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Failed to read target list {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    ProxySetup(#[from] ScanError),

    #[error("Leak detected! IP: {observed_ip}")]
    SecurityAbort { observed_ip: String },
}

pub type Result<T> = std::result::Result<T, CrawlError>;
