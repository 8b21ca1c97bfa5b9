use crate::archive::{ArchivedPage, PageArchiver};
use crate::artifact::ArtifactStore;
use crate::audit::AuditLog;
use crate::error::{CrawlError, Result};
use crate::targets::load_targets_from_file;
use std::path::PathBuf;
use std::sync::Arc;
use torcrawl_scanner::{
    EgressStatus, EgressVerifier, ProxyClient, Renderer, ScanError, Verification, VerifiedClient,
    normalize_target,
};
use tracing::{info, warn};

/// Options for configuring a crawl run
pub struct CrawlOptions {
    pub targets_file: PathBuf,
    pub store: ArtifactStore,
    pub audit: AuditLog,
    pub verifier: EgressVerifier,
}

/// Callback for reporting crawl progress, one line per call
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// What happened to a single target.
#[derive(Debug)]
pub struct TargetOutcome {
    pub target: String,
    pub url: String,
    pub result: std::result::Result<ArchivedPage, ScanError>,
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub struct CrawlReport {
    pub egress: EgressStatus,
    pub outcomes: Vec<TargetOutcome>,
}

/// Run lifecycle. Targets are only reachable from `Running`, and `Running`
/// only holds a client that passed verification.
enum CrawlState {
    Init {
        client: ProxyClient,
    },
    Verifying {
        client: ProxyClient,
        targets: Vec<String>,
    },
    Aborted {
        status: EgressStatus,
    },
    Running {
        client: VerifiedClient,
        targets: Vec<String>,
    },
    Done(CrawlReport),
}

/// Drives a whole run: load targets, verify egress once, then archive each
/// target in file order.
pub struct CrawlOrchestrator<R: Renderer> {
    options: CrawlOptions,
    renderer: R,
    progress: Option<CrawlProgressCallback>,
}

impl<R: Renderer> CrawlOrchestrator<R> {
    pub fn new(options: CrawlOptions, renderer: R) -> Self {
        Self {
            options,
            renderer,
            progress: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: CrawlProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub async fn run(&self, client: ProxyClient) -> Result<CrawlReport> {
        let mut state = CrawlState::Init { client };

        loop {
            state = match state {
                CrawlState::Init { client } => {
                    let path = &self.options.targets_file;
                    let targets = load_targets_from_file(path).map_err(|source| {
                        CrawlError::Config {
                            path: path.clone(),
                            source,
                        }
                    })?;
                    info!("Loaded {} target(s) from {}", targets.len(), path.display());
                    CrawlState::Verifying { client, targets }
                }
                CrawlState::Verifying { client, targets } => {
                    self.report("Security check...".to_string());
                    match self.options.verifier.verify(client).await {
                        Verification::Anonymized(client) => {
                            self.report(format!("SECURE (IP: {})", client.egress().observed_ip));
                            CrawlState::Running { client, targets }
                        }
                        Verification::Exposed(status) => CrawlState::Aborted { status },
                    }
                }
                CrawlState::Aborted { status } => {
                    warn!("Egress not anonymized, observed IP {}", status.observed_ip);
                    return Err(CrawlError::SecurityAbort {
                        observed_ip: status.observed_ip,
                    });
                }
                CrawlState::Running { client, targets } => {
                    let outcomes = self.process_targets(&client, targets).await;
                    CrawlState::Done(CrawlReport {
                        egress: client.egress().clone(),
                        outcomes,
                    })
                }
                CrawlState::Done(report) => return Ok(report),
            };
        }
    }

    async fn process_targets(
        &self,
        client: &VerifiedClient,
        targets: Vec<String>,
    ) -> Vec<TargetOutcome> {
        let archiver = PageArchiver::new(
            client,
            &self.renderer,
            &self.options.store,
            &self.options.audit,
        );

        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            self.report(format!("Processing: {}", target));

            let result = archiver.archive(&target).await;
            self.report(outcome_line(&result));

            outcomes.push(TargetOutcome {
                url: normalize_target(&target),
                target,
                result,
            });
        }

        outcomes
    }

    fn report(&self, message: String) {
        if let Some(ref callback) = self.progress {
            callback(message);
        }
    }
}

fn outcome_line(result: &std::result::Result<ArchivedPage, ScanError>) -> String {
    match result {
        Ok(page) => format!("[Status: {}] -> SUCCESS.", page.status_code),
        Err(e) => match e.status() {
            Some(status) => format!("[Status: {}] -> ERROR: {}", status, e),
            None => format!("-> ERROR: {}", e),
        },
    }
}
