use clap::Args;
use serde::Serialize;

use sitehost::domain::{self, DerivedHosts, DEVELOPMENT};

use super::CmdResult;

#[derive(Args)]
pub struct DomainArgs {
    /// Domain to derive hosts from (e.g. example.com, www.example.co.uk)
    pub domain: String,

    /// Environment the hosts are for
    #[arg(long, short = 'e', default_value = DEVELOPMENT)]
    pub env: String,
}

#[derive(Serialize)]
pub struct DomainOutput {
    pub domain: String,
    pub env: String,
    #[serde(flatten)]
    pub hosts: DerivedHosts,
}

pub fn run_json(args: DomainArgs) -> CmdResult<DomainOutput> {
    let hosts = domain::derive_hosts(&args.domain, &args.env)?;

    Ok((
        DomainOutput {
            domain: args.domain,
            env: args.env,
            hosts,
        },
        0,
    ))
}
