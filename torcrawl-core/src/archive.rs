use crate::artifact::{ArtifactStore, artifact_name};
use crate::audit::{AuditEvent, AuditLog};
use std::path::PathBuf;
use torcrawl_scanner::error::Result;
use torcrawl_scanner::{Renderer, ScanError, VerifiedClient, normalize_target};
use tracing::{debug, info};

/// Artifacts produced for a target that answered 200 and rendered.
#[derive(Debug, Clone)]
pub struct ArchivedPage {
    pub url: String,
    pub name: String,
    pub status_code: u16,
    pub html_path: PathBuf,
    pub screenshot_path: PathBuf,
}

/// Fetches a target through a verified client, keeps its HTML, records the
/// outcome in the audit log and takes a screenshot.
pub struct PageArchiver<'a, R: Renderer> {
    client: &'a VerifiedClient,
    renderer: &'a R,
    store: &'a ArtifactStore,
    audit: &'a AuditLog,
}

impl<'a, R: Renderer> PageArchiver<'a, R> {
    pub fn new(
        client: &'a VerifiedClient,
        renderer: &'a R,
        store: &'a ArtifactStore,
        audit: &'a AuditLog,
    ) -> Self {
        Self {
            client,
            renderer,
            store,
            audit,
        }
    }

    /// Archive one raw target string.
    ///
    /// Transport and status failures are audited and returned before anything
    /// touches the disk or the browser. Once the HTML is saved, a render
    /// failure is still returned but the HTML stays.
    pub async fn archive(&self, target: &str) -> Result<ArchivedPage> {
        let url = normalize_target(target);

        let page = match self.client.fetch_page(&url).await {
            Ok(page) => page,
            Err(e) => {
                let event = match e {
                    ScanError::Status { status, .. } => AuditEvent::Inactive {
                        url: url.clone(),
                        status,
                    },
                    _ => AuditEvent::Failed { url: url.clone() },
                };
                self.audit.record(&event);
                return Err(e);
            }
        };

        let name = artifact_name(&url);
        let html_path = self.store.write_html(&name, &page.body);
        self.audit.record(&AuditEvent::Active { url: url.clone() });
        debug!(
            "{} answered in {:?}, saved as {}",
            url,
            page.response_time,
            html_path.display()
        );

        info!("Taking screenshot of {}", url);
        let png = self.renderer.capture(&url).await?;
        let screenshot_path = self.store.write_screenshot(&name, &png);

        Ok(ArchivedPage {
            url,
            name,
            status_code: page.status_code,
            html_path,
            screenshot_path,
        })
    }
}
