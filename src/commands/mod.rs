use std::path::PathBuf;

use sitehost::project::Project;

pub type CmdResult<T> = sitehost::Result<(T, i32)>;

pub(crate) struct GlobalArgs {
    pub project_dir: Option<PathBuf>,
}

impl GlobalArgs {
    /// Project found from `--project-dir` or the current directory.
    pub fn project(&self) -> sitehost::Result<Project> {
        let start = match &self.project_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(|e| {
                sitehost::Error::internal_io(
                    e.to_string(),
                    Some("read current directory".to_string()),
                )
            })?,
        };
        Project::discover(&start)
    }
}

pub mod alias;
pub mod domain;
pub mod hosts;
pub mod site;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run_json($args))
    };
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (sitehost::Result<serde_json::Value>, i32) {
    crate::tty::status("sitehost is working...");

    match command {
        // Commands without project context
        crate::Commands::Domain(args) => dispatch!(args, domain),

        // Commands with project context
        crate::Commands::Alias(args) => dispatch!(args, global, alias),
        crate::Commands::Hosts(args) => dispatch!(args, global, hosts),
        crate::Commands::Site(args) => dispatch!(args, global, site),
    }
}
