use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Proxy setup failed: {0}")]
    ProxySetup(String),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("status {status}")]
    Status { url: String, status: u16 },

    #[error("Render of {url} failed: {message}")]
    Render { url: String, message: String },
}

impl ScanError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ScanError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
