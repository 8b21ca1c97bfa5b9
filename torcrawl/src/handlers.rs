use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use torcrawl_core::crawl::{CrawlOptions, CrawlOrchestrator, CrawlReport};
use torcrawl_core::{ArtifactStore, AuditLog, CrawlError};
use torcrawl_scanner::{
    ChromiumRenderer, EgressStatus, EgressVerifier, ProxyClient, ProxyConfig, RenderConfig,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Everything `scan` needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub proxy: ProxyConfig,
    pub check_url: String,
    pub targets_file: PathBuf,
    pub output_dir: PathBuf,
    pub log_file: PathBuf,
    pub render: RenderConfig,
}

/// Diagnostics go to stderr so they never mix into the progress on stdout.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub fn proxy_config_from_args(args: &ArgMatches) -> ProxyConfig {
    let addr = args.get_one::<String>("proxy").unwrap();
    let timeout = *args.get_one::<u64>("timeout").unwrap();
    ProxyConfig::new(addr.as_str()).with_timeout(Duration::from_secs(timeout))
}

pub fn check_url_from_args(args: &ArgMatches) -> String {
    args.get_one::<Url>("check-url").unwrap().to_string()
}

pub fn scan_settings_from_args(args: &ArgMatches) -> ScanSettings {
    let proxy = proxy_config_from_args(args);
    let settle = *args.get_one::<u64>("settle").unwrap();
    let quality = *args.get_one::<u8>("quality").unwrap();

    let mut render = RenderConfig::from_proxy(&proxy)
        .with_settle(Duration::from_secs(settle))
        .with_quality(quality);
    if let Some(chrome) = args.get_one::<PathBuf>("chrome") {
        render = render.with_chrome_executable(chrome.clone());
    }

    ScanSettings {
        check_url: check_url_from_args(args),
        targets_file: expand_path(args.get_one::<String>("targets").unwrap()),
        output_dir: expand_path(args.get_one::<String>("output").unwrap()),
        log_file: expand_path(args.get_one::<String>("log-file").unwrap()),
        proxy,
        render,
    }
}

/// Colour a progress line from the orchestrator for the terminal.
pub fn format_progress_line(msg: &str) -> String {
    if msg.starts_with("Processing: ") {
        msg.bold().to_string()
    } else if msg.ends_with("-> SUCCESS.") {
        msg.green().to_string()
    } else if msg.contains("-> ERROR: ") {
        msg.red().to_string()
    } else if msg.starts_with("SECURE") {
        format!("{}\n", msg.green().bold())
    } else {
        msg.to_string()
    }
}

/// Write one progress line. Output errors are logged, never raised, so a
/// closed stdout cannot stop a crawl.
pub fn write_progress<W: Write>(out: &mut W, msg: &str) {
    let line = format_progress_line(msg);
    // "Processing" and the check banner share a line with what follows
    let written = if msg.starts_with("Processing: ") || msg == "Security check..." {
        write!(out, "{} ", line)
    } else {
        writeln!(out, "{}", line)
    };
    if let Err(e) = written {
        debug!("Failed to write progress line: {}", e);
    }
    if let Err(e) = out.flush() {
        debug!("Failed to flush progress line: {}", e);
    }
}

fn print_progress(msg: String) {
    write_progress(&mut io::stdout().lock(), &msg);
}

pub async fn handle_scan(sub_matches: &ArgMatches) -> Result<CrawlReport, CrawlError> {
    let settings = scan_settings_from_args(sub_matches);
    debug!("Resolved scan settings: {:?}", settings);

    let client = ProxyClient::new(&settings.proxy)?;
    let renderer = ChromiumRenderer::new(settings.render.clone());

    let options = CrawlOptions {
        targets_file: settings.targets_file.clone(),
        store: ArtifactStore::new(&settings.output_dir),
        audit: AuditLog::new(&settings.log_file),
        verifier: EgressVerifier::new(settings.check_url.clone()),
    };

    CrawlOrchestrator::new(options, renderer)
        .with_progress_callback(Arc::new(print_progress))
        .run(client)
        .await
}

pub async fn handle_check(sub_matches: &ArgMatches) -> Result<EgressStatus, CrawlError> {
    let proxy = proxy_config_from_args(sub_matches);
    let client = ProxyClient::new(&proxy)?;
    let verifier = EgressVerifier::new(check_url_from_args(sub_matches));

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!(
        "Checking egress via {} through {}",
        verifier.check_url(),
        proxy.socks_addr
    ));

    let status = verifier.check(&client).await;
    spinner.finish_and_clear();

    if status.is_anonymized {
        println!(
            "{} SECURE (IP: {})",
            "✓".green().bold(),
            status.observed_ip.bright_white()
        );
    } else {
        println!(
            "{} NOT ANONYMIZED (IP: {})",
            "✗".red().bold(),
            status.observed_ip.bright_white()
        );
    }

    Ok(status)
}
