use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::domain::DEVELOPMENT;
use crate::paths;

/// Root configuration structure for sitehost.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SitehostConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// All configurable defaults that can be overridden via sitehost.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Defaults {
    #[serde(default)]
    pub playbook: PlaybookConfig,

    #[serde(default)]
    pub alias: AliasConfig,
}

/// How playbooks are launched
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybookConfig {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_verbosity")]
    pub verbosity: Option<String>,
}

impl Default for PlaybookConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            verbosity: default_verbosity(),
        }
    }
}

/// Alias generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasConfig {
    #[serde(default = "default_local_environment")]
    pub local_environment: String,

    #[serde(default = "default_jobs")]
    pub jobs: usize,

    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            local_environment: default_local_environment(),
            jobs: default_jobs(),
            file_name: default_file_name(),
        }
    }
}

fn default_program() -> String {
    "ansible-playbook".to_string()
}

fn default_verbosity() -> Option<String> {
    Some("-vvv".to_string())
}

fn default_local_environment() -> String {
    DEVELOPMENT.to_string()
}

fn default_jobs() -> usize {
    1
}

fn default_file_name() -> String {
    "wp-cli.alias.yml".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load defaults, merging file config with built-in defaults.
/// If sitehost.json is missing or invalid, silently returns built-in defaults.
pub fn load_defaults() -> Defaults {
    load_config().defaults
}

/// Load the full sitehost.json config, falling back to defaults on any error.
pub fn load_config() -> SitehostConfig {
    paths::sitehost_json()
        .and_then(|path| load_config_from(&path))
        .unwrap_or_default()
}

fn load_config_from(path: &Path) -> crate::Result<SitehostConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        crate::Error::internal_json(e.to_string(), Some("parse sitehost.json".to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_builtin_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sitehost.json");
        fs::write(&path, r#"{"defaults":{"alias":{"jobs":4}}}"#).unwrap();

        let config = load_config_from(&path).unwrap();

        assert_eq!(config.defaults.alias.jobs, 4);
        assert_eq!(config.defaults.alias.local_environment, "development");
        assert_eq!(config.defaults.alias.file_name, "wp-cli.alias.yml");
        assert_eq!(config.defaults.playbook.program, "ansible-playbook");
        assert_eq!(config.defaults.playbook.verbosity.as_deref(), Some("-vvv"));
    }

    #[test]
    fn verbosity_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sitehost.json");
        fs::write(&path, r#"{"defaults":{"playbook":{"verbosity":null}}}"#).unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.defaults.playbook.verbosity, None);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sitehost.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(load_config_from(&path).is_err());
    }
}
