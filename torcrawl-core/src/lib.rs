use colored::Colorize;

pub mod archive;
pub mod artifact;
pub mod audit;
pub mod crawl;
pub mod error;
pub mod targets;

pub use archive::{ArchivedPage, PageArchiver};
pub use artifact::{ArtifactStore, artifact_name};
pub use audit::{AuditEvent, AuditLog};
pub use crawl::{CrawlOptions, CrawlOrchestrator, CrawlProgressCallback, CrawlReport, TargetOutcome};
pub use error::CrawlError;

pub fn print_banner() {
    println!(
        "{} {}",
        "torcrawl".bright_magenta().bold(),
        env!("CARGO_PKG_VERSION").bright_black()
    );
    println!("{}", "archive pages through a verified Tor circuit".bright_black());
    println!();
}
