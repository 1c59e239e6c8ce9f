use clap::{Args, Subcommand};
use serde::Serialize;

use sitehost::site::SiteHost;

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct SiteArgs {
    #[command(subcommand)]
    command: SiteCommand,
}

#[derive(Subcommand)]
enum SiteCommand {
    /// Rename the default site and derive its hosts in every environment
    Init {
        /// New site key (e.g. mysite.com)
        name: String,

        /// Domain the site is served from (defaults to the site key)
        host: Option<String>,
    },
}

#[derive(Serialize)]
pub struct SiteOutput {
    pub command: String,
    pub name: String,
    pub environments: Vec<SiteEnvironmentOutput>,
}

#[derive(Serialize)]
pub struct SiteEnvironmentOutput {
    pub env: String,
    pub path: String,
    pub site_hosts: Vec<SiteHost>,
}

pub fn run(args: SiteArgs, global: &GlobalArgs) -> CmdResult<SiteOutput> {
    match args.command {
        SiteCommand::Init { name, host } => init(global, name, host),
    }
}

fn init(global: &GlobalArgs, name: String, host: Option<String>) -> CmdResult<SiteOutput> {
    let project = global.project()?;
    let host = host.unwrap_or_else(|| name.clone());

    let results = project
        .init_site(&name, &host)?
        .into_iter()
        .map(|(env, config)| SiteEnvironmentOutput {
            site_hosts: config
                .wordpress_sites
                .get(&name)
                .map(|s| s.site_hosts.clone())
                .unwrap_or_default(),
            path: project.sites_path(&env).display().to_string(),
            env,
        })
        .collect();

    Ok((
        SiteOutput {
            command: "site.init".to_string(),
            name,
            environments: results,
        },
        0,
    ))
}
