//! Project discovery and per-environment site configuration files.
//!
//! A project root holds `ansible.cfg` and a `group_vars/` directory with
//! one subdirectory per environment plus the shared `all`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::site::{self, Config};
use crate::utils::io;

const ANSIBLE_CFG: &str = "ansible.cfg";
const GROUP_VARS: &str = "group_vars";
const SHARED_GROUP: &str = "all";
const NESTED_DIR: &str = "trellis";
const SITES_FILE: &str = "wordpress_sites.yml";

#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
}

impl Project {
    /// Nearest project at or above `start`.
    pub fn discover(start: &Path) -> Result<Self> {
        for dir in start.ancestors() {
            if is_project_root(dir) {
                return Ok(Self::at(dir));
            }
            let nested = dir.join(NESTED_DIR);
            if is_project_root(&nested) {
                return Ok(Self::at(&nested));
            }
        }

        Err(Error::project_not_found(
            start.display().to_string(),
            vec![ANSIBLE_CFG.to_string(), format!("{}/", GROUP_VARS)],
        ))
    }

    pub fn at(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Environment names in sorted order, excluding the shared group.
    pub fn environment_names(&self) -> Result<Vec<String>> {
        let group_vars = self.root.join(GROUP_VARS);
        let entries = fs::read_dir(&group_vars).map_err(|e| {
            Error::internal_io(
                e.to_string(),
                Some(format!("list environments in {}", group_vars.display())),
            )
        })?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|name| name != SHARED_GROUP)
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn require_environment(&self, environment: &str) -> Result<()> {
        let names = self.environment_names()?;
        if names.iter().any(|name| name == environment) {
            Ok(())
        } else {
            Err(Error::config_missing_environment(environment, names))
        }
    }

    pub fn sites_path(&self, environment: &str) -> PathBuf {
        self.root.join(GROUP_VARS).join(environment).join(SITES_FILE)
    }

    pub fn load_config(&self, environment: &str) -> Result<Config> {
        self.require_environment(environment)?;
        let path = self.sites_path(environment);
        let content = io::read_file(&path, "read site config")?;
        Config::from_yaml(&content, &path.display().to_string())
    }

    pub fn save_config(&self, environment: &str, config: &Config) -> Result<()> {
        let path = self.sites_path(environment);
        io::write_file_atomic(&path, &config.to_yaml()?, "write site config")
    }

    /// Rename the default site to `name` in every environment, deriving its
    /// hosts from `host`. Nothing is written unless every environment loads
    /// and updates cleanly.
    pub fn init_site(&self, name: &str, host: &str) -> Result<Vec<(String, Config)>> {
        let mut updated = Vec::new();
        for env in self.environment_names()? {
            let mut config = self.load_config(&env)?;
            site::update_default_config(&mut config, name, host, &env)?;
            updated.push((env, config));
        }

        for (env, config) in &updated {
            self.save_config(env, config)?;
            log_status!("site", "Updated {}", self.sites_path(env).display());
        }
        Ok(updated)
    }
}

fn is_project_root(dir: &Path) -> bool {
    dir.join(ANSIBLE_CFG).is_file() && dir.join(GROUP_VARS).is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scaffold(root: &Path, environments: &[&str]) {
        fs::create_dir_all(root.join(GROUP_VARS).join(SHARED_GROUP)).unwrap();
        fs::write(root.join(ANSIBLE_CFG), "[defaults]\n").unwrap();
        for env in environments {
            let dir = root.join(GROUP_VARS).join(env);
            fs::create_dir_all(&dir).unwrap();
            fs::write(
                dir.join(SITES_FILE),
                "wordpress_sites:\n  example.com:\n    site_hosts:\n      - canonical: example.com\n    local_path: ../site\n",
            )
            .unwrap();
        }
    }

    #[test]
    fn discovers_from_nested_directory() {
        let dir = TempDir::new().unwrap();
        scaffold(dir.path(), &["production"]);
        let deep = dir.path().join("roles").join("common");
        fs::create_dir_all(&deep).unwrap();

        let project = Project::discover(&deep).unwrap();
        assert_eq!(project.root, dir.path());
    }

    #[test]
    fn discovers_trellis_subdirectory() {
        let dir = TempDir::new().unwrap();
        let trellis = dir.path().join(NESTED_DIR);
        scaffold(&trellis, &["production"]);

        let project = Project::discover(dir.path()).unwrap();
        assert_eq!(project.root, trellis);
    }

    #[test]
    fn missing_project_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = Project::discover(dir.path()).unwrap_err();
        assert_eq!(err.code.as_str(), "config.project_not_found");
    }

    #[test]
    fn environments_are_sorted_and_skip_all() {
        let dir = TempDir::new().unwrap();
        scaffold(dir.path(), &["staging", "development", "production"]);
        fs::write(dir.path().join(GROUP_VARS).join("README"), "").unwrap();

        let names = Project::at(dir.path()).environment_names().unwrap();
        assert_eq!(names, vec!["development", "production", "staging"]);
    }

    #[test]
    fn load_and_save_round_trip() {
        let dir = TempDir::new().unwrap();
        scaffold(dir.path(), &["production"]);
        let project = Project::at(dir.path());

        let mut config = project.load_config("production").unwrap();
        crate::site::update_default_config(&mut config, "mysite.com", "www.mysite.com", "production")
            .unwrap();
        project.save_config("production", &config).unwrap();

        let reloaded = project.load_config("production").unwrap();
        assert_eq!(reloaded.all_hosts(), vec!["www.mysite.com", "mysite.com"]);
    }

    fn sites_file(root: &Path, env: &str) -> String {
        fs::read_to_string(root.join(GROUP_VARS).join(env).join(SITES_FILE)).unwrap()
    }

    #[test]
    fn init_site_rewrites_every_environment() {
        let dir = TempDir::new().unwrap();
        scaffold(dir.path(), &["development", "production", "staging"]);
        let project = Project::at(dir.path());

        let updated = project.init_site("mysite.com", "mysite.com").unwrap();
        let envs: Vec<&str> = updated.iter().map(|(env, _)| env.as_str()).collect();
        assert_eq!(envs, vec!["development", "production", "staging"]);

        let dev = project.load_config("development").unwrap();
        let site = &dev.wordpress_sites["mysite.com"];
        assert!(!dev.wordpress_sites.contains_key("example.com"));
        assert_eq!(site.main_host(), Some("mysite.test"));
        assert_eq!(site.admin_email.as_deref(), Some("admin@mysite.test"));

        for env in ["production", "staging"] {
            let config = project.load_config(env).unwrap();
            let site = &config.wordpress_sites["mysite.com"];
            assert_eq!(site.main_host(), Some("mysite.com"));
            assert_eq!(site.site_hosts[0].redirects, vec!["www.mysite.com"]);
            assert_eq!(site.admin_email, None);
        }
    }

    #[test]
    fn init_site_writes_nothing_when_an_environment_is_broken() {
        let dir = TempDir::new().unwrap();
        scaffold(dir.path(), &["development", "production", "staging"]);
        fs::write(
            dir.path().join(GROUP_VARS).join("staging").join(SITES_FILE),
            "wordpress_sites: [unclosed\n",
        )
        .unwrap();
        let before: Vec<String> = ["development", "production", "staging"]
            .iter()
            .map(|env| sites_file(dir.path(), env))
            .collect();

        let err = Project::at(dir.path())
            .init_site("mysite.com", "mysite.com")
            .unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_yaml");

        let after: Vec<String> = ["development", "production", "staging"]
            .iter()
            .map(|env| sites_file(dir.path(), env))
            .collect();
        assert_eq!(after, before);
    }

    #[test]
    fn init_site_writes_nothing_when_host_is_invalid() {
        let dir = TempDir::new().unwrap();
        scaffold(dir.path(), &["development", "production"]);
        let before = sites_file(dir.path(), "development");

        let err = Project::at(dir.path())
            .init_site("mysite.com", "https://mysite.com")
            .unwrap_err();
        assert_eq!(err.code.as_str(), "domain.invalid");
        assert_eq!(sites_file(dir.path(), "development"), before);
        assert_eq!(sites_file(dir.path(), "production"), before);
    }

    #[test]
    fn unknown_environment_lists_available() {
        let dir = TempDir::new().unwrap();
        scaffold(dir.path(), &["production"]);

        let err = Project::at(dir.path()).load_config("qa").unwrap_err();
        assert_eq!(err.code.as_str(), "config.missing_environment");
        assert_eq!(err.details["available"][0], "production");
    }
}
