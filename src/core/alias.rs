//! WP-CLI alias aggregation.
//!
//! Every remote environment renders its own `@<env>` fragment into a scratch
//! directory; the fragments are concatenated in environment order and the
//! combined file is delivered once through the local environment.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use crate::defaults::PlaybookConfig;
use crate::error::{Error, Result};
use crate::playbook::{
    AnsiblePlaybook, PlaybookRunner, ALIAS_COPY_FILES, ALIAS_COPY_PLAYBOOK, ALIAS_FILES,
    ALIAS_PLAYBOOK, ALIAS_TEMPLATE,
};
use crate::project::Project;

pub const PART_SUFFIX: &str = ".yml.part";
pub const COMBINED_FILE: &str = "combined.yml";
const TEMP_PREFIX: &str = "sitehost-alias-";

/// The two external steps of an alias run.
pub trait AliasBackend: Sync {
    /// Must leave `<temp_dir>/<environment>.yml.part` behind on success.
    fn generate(&self, environment: &str, template: &str, temp_dir: &Path) -> Result<()>;

    /// Places the combined file at its durable destination.
    fn deliver(&self, local_environment: &str, combined: &Path) -> Result<()>;
}

/// Backend that runs the embedded alias playbooks.
pub struct PlaybookAliasBackend<G, D> {
    pub generator: G,
    pub delivery: D,
    pub file_name: String,
}

impl<G: PlaybookRunner, D: PlaybookRunner> AliasBackend for PlaybookAliasBackend<G, D> {
    fn generate(&self, environment: &str, template: &str, temp_dir: &Path) -> Result<()> {
        self.generator.run(
            ALIAS_PLAYBOOK,
            &[
                ("env".to_string(), environment.to_string()),
                ("alias_template".to_string(), template.to_string()),
                ("alias_temp_dir".to_string(), temp_dir.display().to_string()),
            ],
        )
    }

    fn deliver(&self, local_environment: &str, combined: &Path) -> Result<()> {
        self.delivery.run(
            ALIAS_COPY_PLAYBOOK,
            &[
                ("env".to_string(), local_environment.to_string()),
                ("alias_combined".to_string(), combined.display().to_string()),
                ("alias_file_name".to_string(), self.file_name.clone()),
            ],
        )
    }
}

#[derive(Debug, Clone)]
pub struct AliasOptions {
    pub local_environment: String,
    /// Remote environments generated at once.
    ///
    /// After a failure no new environment is started, but calls already
    /// running are not interrupted. They are waited for before the scratch
    /// directory is removed.
    pub jobs: usize,
    pub template: String,
}

impl AliasOptions {
    pub fn new(local_environment: impl Into<String>) -> Self {
        Self {
            local_environment: local_environment.into(),
            jobs: 1,
            template: ALIAS_TEMPLATE.to_string(),
        }
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AliasReport {
    pub local_environment: String,
    pub remote_environments: Vec<String>,
    pub combined_bytes: usize,
}

/// Every environment except `local`, keeping the given order.
pub fn remote_environments(environments: &[String], local: &str) -> Vec<String> {
    environments
        .iter()
        .filter(|env| env.as_str() != local)
        .cloned()
        .collect()
}

/// Remote environments to generate for `local`, in the given order.
///
/// Rejects an unknown `local` and a project with nothing but `local`.
pub fn plan(environments: &[String], local: &str) -> Result<Vec<String>> {
    if !environments.iter().any(|env| env == local) {
        return Err(Error::validation_invalid_argument(
            "local",
            format!("Unknown local environment '{}'", local),
            Some(local.to_string()),
            Some(environments.to_vec()),
        ));
    }

    let remotes = remote_environments(environments, local);
    if remotes.is_empty() {
        return Err(Error::validation_invalid_argument(
            "local",
            format!("No remote environments besides '{}'", local),
            Some(local.to_string()),
            None,
        ));
    }
    Ok(remotes)
}

/// Run [`generate`] for `project` through the embedded playbooks.
///
/// Arguments are validated before any playbook is installed into the project.
pub fn generate_in_project(
    project: &Project,
    playbook: &PlaybookConfig,
    file_name: &str,
    options: &AliasOptions,
) -> Result<AliasReport> {
    let environments = project.environment_names()?;
    plan(&environments, &options.local_environment)?;

    let backend = PlaybookAliasBackend {
        generator: AnsiblePlaybook::adhoc(&project.root, playbook, ALIAS_FILES)?,
        delivery: AnsiblePlaybook::adhoc(&project.root, playbook, ALIAS_COPY_FILES)?,
        file_name: file_name.to_string(),
    };
    generate(&environments, options, &backend)
}

/// Generate, merge, and deliver aliases for every remote environment.
///
/// Fails fast: the first generation failure stops further fan-out and skips
/// delivery. The scratch directory is removed on every exit path.
pub fn generate(
    environments: &[String],
    options: &AliasOptions,
    backend: &dyn AliasBackend,
) -> Result<AliasReport> {
    let local = options.local_environment.as_str();
    let remotes = plan(environments, local)?;

    let temp_dir = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempdir()
        .map_err(|e| Error::temp_resource("create scratch directory", None, e.to_string()))?;

    fan_out(&remotes, options, backend, temp_dir.path())?;

    let combined = combine_parts(temp_dir.path(), &remotes)?;
    let combined_path = temp_dir.path().join(COMBINED_FILE);
    fs::write(&combined_path, &combined).map_err(|e| {
        Error::temp_resource(
            "write combined aliases",
            Some(combined_path.display().to_string()),
            e.to_string(),
        )
    })?;

    log_status!("alias", "Delivering aliases via {}", local);
    backend
        .deliver(local, &combined_path)
        .map_err(|e| Error::delivery_failed(local, combined_path.display().to_string(), &e))?;

    Ok(AliasReport {
        local_environment: local.to_string(),
        remote_environments: remotes,
        combined_bytes: combined.len(),
    })
}

fn fan_out(
    remotes: &[String],
    options: &AliasOptions,
    backend: &dyn AliasBackend,
    temp_dir: &Path,
) -> Result<()> {
    if options.jobs <= 1 || remotes.len() <= 1 {
        for environment in remotes {
            generate_one(environment, options, backend, temp_dir)?;
        }
        return Ok(());
    }

    let next = AtomicUsize::new(0);
    let failed = AtomicBool::new(false);
    let (next, failed) = (&next, &failed);
    let workers = options.jobs.min(remotes.len());

    // Scope exit joins every worker before any part file is read.
    let mut outcomes: Vec<(usize, Error)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut errors = Vec::new();
                    while !failed.load(Ordering::SeqCst) {
                        let index = next.fetch_add(1, Ordering::SeqCst);
                        let Some(environment) = remotes.get(index) else {
                            break;
                        };
                        if let Err(err) = generate_one(environment, options, backend, temp_dir) {
                            failed.store(true, Ordering::SeqCst);
                            errors.push((index, err));
                        }
                    }
                    errors
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| {
                handle.join().unwrap_or_else(|_| {
                    vec![(
                        usize::MAX,
                        Error::internal_unexpected("Alias worker thread panicked"),
                    )]
                })
            })
            .collect()
    });

    outcomes.sort_by_key(|(index, _)| *index);
    match outcomes.into_iter().next() {
        Some((_, err)) => Err(err),
        None => Ok(()),
    }
}

fn generate_one(
    environment: &str,
    options: &AliasOptions,
    backend: &dyn AliasBackend,
    temp_dir: &Path,
) -> Result<()> {
    log_status!("alias", "Generating aliases for {}", environment);
    backend
        .generate(environment, &options.template, temp_dir)
        .map_err(|e| Error::remote_generate_failed(environment, &e))
}

pub fn part_path(temp_dir: &Path, environment: &str) -> PathBuf {
    temp_dir.join(format!("{}{}", environment, PART_SUFFIX))
}

/// Concatenate the part files in `environments` order, byte for byte.
pub fn combine_parts(temp_dir: &Path, environments: &[String]) -> Result<String> {
    let mut combined = String::new();

    for environment in environments {
        let path = part_path(temp_dir, environment);
        let part = fs::read_to_string(&path).map_err(|e| {
            Error::temp_resource(
                format!("read alias fragment for {}", environment),
                Some(path.display().to_string()),
                e.to_string(),
            )
        })?;

        if !part.is_empty() && !part.ends_with('\n') {
            log_status!(
                "alias",
                "Warning: fragment for {} does not end with a newline",
                environment
            );
        }

        combined.push_str(&part);
    }

    Ok(combined)
}
