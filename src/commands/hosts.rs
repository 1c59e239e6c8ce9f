use clap::Args;
use serde::Serialize;

use sitehost::defaults;

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct HostsArgs {
    /// Environment whose site config is read (defaults to the local environment)
    #[arg(long, short = 'e')]
    pub env: Option<String>,
}

#[derive(Serialize)]
pub struct HostsOutput {
    pub env: String,
    pub sites: Vec<String>,
    pub urls: Vec<String>,
    pub hosts: Vec<String>,
}

pub fn run(args: HostsArgs, global: &GlobalArgs) -> CmdResult<HostsOutput> {
    let project = global.project()?;
    let env = args
        .env
        .unwrap_or_else(|| defaults::load_defaults().alias.local_environment);

    let config = project.load_config(&env)?;

    Ok((
        HostsOutput {
            sites: config.wordpress_sites.keys().cloned().collect(),
            urls: config
                .wordpress_sites
                .values()
                .filter_map(|site| site.main_url())
                .collect(),
            hosts: config.all_hosts(),
            env,
        },
        0,
    ))
}
