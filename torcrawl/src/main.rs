use colored::Colorize;
use torcrawl::command_argument_builder;
use torcrawl::handlers::{handle_check, handle_scan, init_tracing};
use torcrawl_core::{CrawlError, print_banner};

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    init_tracing();

    match chosen_command.subcommand() {
        Some(("scan", primary_command)) => match handle_scan(primary_command).await {
            Ok(_) => {}
            Err(CrawlError::SecurityAbort { observed_ip }) => {
                println!(
                    "\n{} Leak detected! IP: {}",
                    "[CRITICAL]".red().bold(),
                    observed_ip
                );
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("{} {}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        },
        Some(("check", primary_command)) => match handle_check(primary_command).await {
            Ok(status) if status.is_anonymized => {}
            Ok(_) => std::process::exit(1),
            Err(e) => {
                eprintln!("{} {}", "✗".red().bold(), e);
                std::process::exit(1);
            }
        },
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
