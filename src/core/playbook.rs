//! Playbook execution.
//!
//! The tool ships its playbooks embedded in the binary. An [`AnsiblePlaybook`]
//! writes them into the project root for its lifetime and removes them on drop.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::defaults::PlaybookConfig;
use crate::error::{Error, Result};
use crate::utils::command;

/// Runs a named playbook with `key=value` extra vars.
///
/// `Sync` so one runner can serve parallel fan-out workers.
pub trait PlaybookRunner: Sync {
    fn run(&self, playbook: &str, vars: &[(String, String)]) -> Result<()>;
}

/// A file written into the project root next to the playbooks that use it.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedFile {
    pub name: &'static str,
    pub content: &'static str,
}

pub const ALIAS_PLAYBOOK: &str = ".sitehost-alias.yml";
pub const ALIAS_TEMPLATE: &str = ".sitehost-alias.yml.j2";
pub const ALIAS_COPY_PLAYBOOK: &str = ".sitehost-alias-copy.yml";

pub const ALIAS_FILES: &[EmbeddedFile] = &[
    EmbeddedFile {
        name: ALIAS_PLAYBOOK,
        content: include_str!("../../assets/playbooks/alias.yml"),
    },
    EmbeddedFile {
        name: ALIAS_TEMPLATE,
        content: include_str!("../../assets/playbooks/alias.yml.j2"),
    },
];

pub const ALIAS_COPY_FILES: &[EmbeddedFile] = &[EmbeddedFile {
    name: ALIAS_COPY_PLAYBOOK,
    content: include_str!("../../assets/playbooks/alias-copy.yml"),
}];

#[derive(Debug)]
pub struct AnsiblePlaybook {
    root: PathBuf,
    program: String,
    verbosity: Option<String>,
    installed: Vec<PathBuf>,
}

impl AnsiblePlaybook {
    /// Install `files` into `root` and return a runner bound to it.
    ///
    /// Fails without touching an existing file of the same name.
    pub fn adhoc(root: &Path, config: &PlaybookConfig, files: &[EmbeddedFile]) -> Result<Self> {
        let mut playbook = Self {
            root: root.to_path_buf(),
            program: config.program.clone(),
            verbosity: config.verbosity.clone().filter(|v| !v.is_empty()),
            installed: Vec::with_capacity(files.len()),
        };

        // Files installed so far are removed by Drop if a later write fails.
        for file in files {
            let path = root.join(file.name);
            install(&path, file.content)?;
            playbook.installed.push(path);
        }

        Ok(playbook)
    }

    pub fn args(&self, playbook: &str, vars: &[(String, String)]) -> Vec<String> {
        let mut args = Vec::with_capacity(2 + vars.len() * 2);
        if let Some(verbosity) = &self.verbosity {
            args.push(verbosity.clone());
        }
        args.push(playbook.to_string());
        for (key, value) in vars {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }
        args
    }
}

fn install(path: &Path, content: &str) -> Result<()> {
    let mut handle = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(handle) => handle,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(Error::temp_resource(
                "install playbook",
                Some(path.display().to_string()),
                "file already exists",
            )
            .with_hint(format!(
                "Move {} out of the way and run the command again",
                path.display()
            )));
        }
        Err(e) => {
            return Err(Error::internal_io(
                e.to_string(),
                Some(format!("install {}", path.display())),
            ))
        }
    };

    if let Err(e) = handle.write_all(content.as_bytes()) {
        let _ = fs::remove_file(path);
        return Err(Error::internal_io(
            e.to_string(),
            Some(format!("install {}", path.display())),
        ));
    }
    Ok(())
}

impl PlaybookRunner for AnsiblePlaybook {
    fn run(&self, playbook: &str, vars: &[(String, String)]) -> Result<()> {
        command::run_in(&self.root, &self.program, &self.args(playbook, vars)).map(|_| ())
    }
}

impl Drop for AnsiblePlaybook {
    fn drop(&mut self) {
        for path in &self.installed {
            let _ = fs::remove_file(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(program: &str, verbosity: Option<&str>) -> PlaybookConfig {
        PlaybookConfig {
            program: program.to_string(),
            verbosity: verbosity.map(str::to_string),
        }
    }

    #[test]
    fn installs_files_and_removes_them_on_drop() {
        let dir = TempDir::new().unwrap();

        let playbook =
            AnsiblePlaybook::adhoc(dir.path(), &config("true", None), ALIAS_FILES).unwrap();
        assert!(dir.path().join(ALIAS_PLAYBOOK).is_file());
        assert!(dir.path().join(ALIAS_TEMPLATE).is_file());

        drop(playbook);
        assert!(!dir.path().join(ALIAS_PLAYBOOK).exists());
        assert!(!dir.path().join(ALIAS_TEMPLATE).exists());
    }

    #[test]
    fn existing_file_is_never_replaced_or_removed() {
        let dir = TempDir::new().unwrap();
        let user_file = dir.path().join(ALIAS_TEMPLATE);
        fs::write(&user_file, "mine").unwrap();

        let err = AnsiblePlaybook::adhoc(dir.path(), &config("true", None), ALIAS_FILES)
            .unwrap_err();

        assert_eq!(err.code.as_str(), "temp.resource_failed");
        assert_eq!(fs::read_to_string(&user_file).unwrap(), "mine");
        // The playbook installed before the conflict is cleaned up.
        assert!(!dir.path().join(ALIAS_PLAYBOOK).exists());
    }

    #[test]
    fn args_put_verbosity_first_and_vars_as_extra_vars() {
        let dir = TempDir::new().unwrap();
        let config = config("ansible-playbook", Some("-vvv"));
        let playbook = AnsiblePlaybook::adhoc(dir.path(), &config, &[]).unwrap();

        let args = playbook.args(
            "alias.yml",
            &[
                ("env".to_string(), "production".to_string()),
                ("alias_temp_dir".to_string(), "/tmp/x".to_string()),
            ],
        );

        assert_eq!(
            args,
            vec!["-vvv", "alias.yml", "-e", "env=production", "-e", "alias_temp_dir=/tmp/x"]
        );
    }

    #[test]
    fn empty_verbosity_is_ignored() {
        let dir = TempDir::new().unwrap();
        let config = config("ansible-playbook", Some(""));
        let playbook = AnsiblePlaybook::adhoc(dir.path(), &config, &[]).unwrap();
        assert_eq!(playbook.args("p.yml", &[]), vec!["p.yml"]);
    }

    #[test]
    fn run_surfaces_failed_exit() {
        let dir = TempDir::new().unwrap();
        let playbook = AnsiblePlaybook::adhoc(dir.path(), &config("false", None), &[]).unwrap();

        let err = playbook.run("alias.yml", &[]).unwrap_err();
        assert_eq!(err.code.as_str(), "remote.command_failed");
    }

    #[test]
    fn embedded_template_renders_alias_label() {
        assert!(ALIAS_FILES[1].content.starts_with("@{{ env }}:"));
        assert!(ALIAS_FILES[0].content.contains(".yml.part"));
    }

    #[test]
    fn alias_playbook_picks_first_site_by_name() {
        assert!(ALIAS_FILES[0]
            .content
            .contains("dict2items | sort(attribute='key') | first"));
    }
}
