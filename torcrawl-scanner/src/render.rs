use crate::error::{Result, ScanError};
use crate::proxy::ProxyConfig;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use futures::StreamExt;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

pub const DEFAULT_SETTLE: Duration = Duration::from_secs(5);
pub const DEFAULT_QUALITY: u8 = 90;

/// Something that can turn a URL into a full-page PNG.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn capture(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Passed verbatim to `--proxy-server`.
    pub proxy_server: String,
    /// Time given to scripts and late resources after navigation.
    pub settle: Duration,
    pub quality: u8,
    /// Upper bound on every CDP request, navigation included.
    pub timeout: Duration,
    pub chrome_executable: Option<PathBuf>,
    /// Parent directory for throwaway profiles; the system temp dir when unset.
    pub profile_root: Option<PathBuf>,
}

impl RenderConfig {
    pub fn from_proxy(proxy: &ProxyConfig) -> Self {
        Self {
            proxy_server: proxy.browser_proxy_server(),
            settle: DEFAULT_SETTLE,
            quality: DEFAULT_QUALITY,
            timeout: proxy.timeout,
            chrome_executable: None,
            profile_root: None,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.min(100);
        self
    }

    pub fn with_chrome_executable(mut self, path: PathBuf) -> Self {
        self.chrome_executable = Some(path);
        self
    }

    pub fn with_profile_root(mut self, root: PathBuf) -> Self {
        self.profile_root = Some(root);
        self
    }
}

/// Headless Chromium renderer.
///
/// Every capture launches its own browser on a throwaway profile and tears
/// the whole thing down before returning, whatever the outcome.
pub struct ChromiumRenderer {
    config: RenderConfig,
}

impl ChromiumRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn browser_config(&self, url: &str, profile: &Path) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .headless_mode(HeadlessMode::default())
            .no_sandbox()
            .user_data_dir(profile)
            .request_timeout(self.config.timeout)
            .arg(format!("--proxy-server={}", self.config.proxy_server))
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync");

        if let Some(ref chrome) = self.config.chrome_executable {
            builder = builder.chrome_executable(chrome);
        }

        builder.build().map_err(|e| render_error(url, e))
    }

    fn profile_dir(&self, url: &str) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("torcrawl-profile-");
        match self.config.profile_root {
            Some(ref root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| render_error(url, e))
    }

    async fn launch(&self, url: &str, profile: &Path) -> Result<(Browser, JoinHandle<()>)> {
        let config = self.browser_config(url, profile)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| render_error(url, e))?;

        // The handler must keep draining: if it stops, every later CDP call
        // hangs until the request timeout.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    let message = e.to_string();
                    if is_benign_handler_error(&message) {
                        trace!("Ignoring unparsed CDP message: {}", message);
                    } else {
                        warn!("Browser handler error: {}", message);
                    }
                }
            }
            debug!("Browser handler finished");
        });

        Ok((browser, handler_task))
    }

    async fn shoot(&self, browser: &Browser, url: &str) -> Result<Vec<u8>> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| render_error(url, e))?;

        page.goto(url).await.map_err(|e| render_error(url, e))?;
        debug!("Navigated to {}, settling for {:?}", url, self.config.settle);
        tokio::time::sleep(self.config.settle).await;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .quality(i64::from(self.config.quality))
            .full_page(true)
            .build();

        page.screenshot(params)
            .await
            .map_err(|e| render_error(url, e))
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn capture(&self, url: &str) -> Result<Vec<u8>> {
        let profile = self.profile_dir(url)?;

        info!("Launching headless browser for {}", url);
        let (mut browser, handler_task) = self.launch(url, profile.path()).await?;

        let shot = self.shoot(&browser, url).await;

        if let Err(e) = browser.close().await {
            debug!("Browser close for {} failed: {}", url, e);
        }
        if let Err(e) = browser.wait().await {
            debug!("Waiting on browser process for {} failed: {}", url, e);
        }
        handler_task.abort();
        drop(profile);

        shot
    }
}

/// Chrome emits events chromiumoxide has no type for; decoding them fails
/// without affecting the session.
fn is_benign_handler_error(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}

fn render_error(url: &str, e: impl Display) -> ScanError {
    ScanError::Render {
        url: url.to_string(),
        message: e.to_string(),
    }
}
