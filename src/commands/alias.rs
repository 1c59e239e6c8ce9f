use clap::Args;
use serde::Serialize;

use sitehost::alias::{self, AliasOptions, AliasReport};
use sitehost::defaults;

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct AliasArgs {
    /// Local environment name (default: development)
    #[arg(long)]
    pub local: Option<String>,

    /// Remote environments to generate concurrently
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,
}

#[derive(Serialize)]
pub struct AliasOutput {
    pub command: String,
    #[serde(flatten)]
    pub report: AliasReport,
    pub file_name: String,
    pub next_steps: Vec<String>,
}

pub fn run(args: AliasArgs, global: &GlobalArgs) -> CmdResult<AliasOutput> {
    let project = global.project()?;
    let defaults = defaults::load_defaults();

    let local = args.local.unwrap_or(defaults.alias.local_environment);
    let jobs = args.jobs.unwrap_or(defaults.alias.jobs);
    if jobs == 0 {
        return Err(sitehost::Error::validation_invalid_argument(
            "jobs",
            "Must be at least 1",
            Some("0".to_string()),
            None,
        ));
    }

    let options = AliasOptions::new(local).with_jobs(jobs);
    let report = alias::generate_in_project(
        &project,
        &defaults.playbook,
        &defaults.alias.file_name,
        &options,
    )?;

    sitehost::log_status!("alias", "{} generated", defaults.alias.file_name);

    Ok((
        AliasOutput {
            command: "alias".to_string(),
            next_steps: vec![format!(
                "Add to wp-cli.yml or wp-cli.local.yml:\n_:\n  inherit: {}",
                defaults.alias.file_name
            )],
            file_name: defaults.alias.file_name,
            report,
        },
        0,
    ))
}
