use clap::{arg, command};
use std::path::PathBuf;
use torcrawl_core::artifact::DEFAULT_OUTPUT_DIR;
use torcrawl_core::audit::DEFAULT_AUDIT_LOG;
use torcrawl_core::targets::DEFAULT_TARGETS_FILE;
use torcrawl_scanner::egress::DEFAULT_CHECK_URL;
use torcrawl_scanner::proxy::DEFAULT_SOCKS_ADDR;
use url::Url;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

fn proxy_args() -> [clap::Arg; 3] {
    [
        arg!(--"proxy" <ADDR>)
            .required(false)
            .help("Local SOCKS5 endpoint (host:port) that every request is routed through")
            .env("TORCRAWL_PROXY")
            .default_value(DEFAULT_SOCKS_ADDR),
        arg!(--"check-url" <URL>)
            .required(false)
            .help("Identity-check endpoint returning {\"IsTor\": bool, \"IP\": string}")
            .env("TORCRAWL_CHECK_URL")
            .value_parser(clap::value_parser!(Url))
            .default_value(DEFAULT_CHECK_URL),
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Request timeout in seconds")
            .value_parser(clap::value_parser!(u64).range(1..))
            .default_value("60"),
    ]
}

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("torcrawl")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("torcrawl")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("scan")
                .about(
                    "Verify the Tor circuit, then archive the HTML and a screenshot of every \
                target in the list.",
                )
                .arg(
                    arg!(-t --"targets" <PATH>)
                        .required(false)
                        .help("Newline-delimited list of URLs or hosts to capture")
                        .default_value(DEFAULT_TARGETS_FILE),
                )
                .arg(
                    arg!(-o --"output" <DIR>)
                        .required(false)
                        .help("Directory for <name>.html and photos/<name>.png")
                        .default_value(DEFAULT_OUTPUT_DIR),
                )
                .arg(
                    arg!(-l --"log-file" <PATH>)
                        .required(false)
                        .help("Append-only audit log of per-target outcomes")
                        .default_value(DEFAULT_AUDIT_LOG),
                )
                .args(proxy_args())
                .arg(
                    arg!(--"settle" <SECONDS>)
                        .required(false)
                        .help("Seconds to let a page render before the screenshot")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("5"),
                )
                .arg(
                    arg!(--"quality" <QUALITY>)
                        .required(false)
                        .help("Screenshot quality, 0-100 (forwarded to Chromium, which ignores it for PNG output)")
                        .value_parser(clap::value_parser!(u8).range(0..=100))
                        .default_value("90"),
                )
                .arg(
                    arg!(--"chrome" <PATH>)
                        .required(false)
                        .help("Chrome/Chromium executable (default: auto-detect)")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            command!("check")
                .about("Only run the egress check and report whether traffic leaves through Tor")
                .args(proxy_args()),
        )
}
