use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{alias, domain, hosts, site};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "sitehost")]
#[command(version = VERSION)]
#[command(about = "Derive site hostnames and generate WP-CLI aliases for remote environments")]
struct Cli {
    /// Project directory (defaults to searching upward from the current directory)
    #[arg(long, global = true, value_name = "PATH")]
    project_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate WP-CLI aliases for remote environments
    Alias(alias::AliasArgs),
    /// Show the canonical and redirect hosts derived from a domain
    Domain(domain::DomainArgs),
    /// List every host configured for an environment
    Hosts(hosts::HostsArgs),
    /// Provision site entries
    Site(site::SiteArgs),
}

fn main() -> std::process::ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                return std::process::ExitCode::from(1);
            }
        },
    };

    let global = GlobalArgs {
        project_dir: cli.project_dir,
    };

    let (json_result, exit_code) = commands::run_json(cli.command, &global);
    output::print_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
