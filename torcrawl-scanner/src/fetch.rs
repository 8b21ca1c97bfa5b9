use crate::egress::VerifiedClient;
use crate::error::{Result, ScanError};
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// A page that answered 200.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub response_time: Duration,
}

/// Give a bare host an `http://` scheme.
///
/// This is a plain prefix test on "http", so `httpbin.org` and `httpfoo.com`
/// are left alone even though they carry no scheme.
pub fn normalize_target(target: &str) -> String {
    if target.starts_with("http") {
        target.to_string()
    } else {
        format!("http://{}", target)
    }
}

impl VerifiedClient {
    /// GET `url` through the verified proxy.
    ///
    /// Connection problems come back as [`ScanError::Transport`] and any
    /// status other than 200 as [`ScanError::Status`]. A body that breaks off
    /// mid-read is kept as empty rather than failing the fetch.
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self
            .proxy_client()
            .inner()
            .get(url)
            .send()
            .await
            .map_err(|source| ScanError::Transport {
                url: url.to_string(),
                source,
            })?;
        let response_time = start.elapsed();

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScanError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                warn!("Body of {} could not be read, keeping it empty: {}", url, e);
                Vec::new()
            }
        };

        Ok(FetchedPage {
            url: url.to_string(),
            status_code: status.as_u16(),
            content_type,
            body,
            response_time,
        })
    }
}
