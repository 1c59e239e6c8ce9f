//! WordPress site entries and the mutations applied when provisioning them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{self, DEVELOPMENT};
use crate::error::{Error, Result};

/// Site key every fresh project ships with.
pub const DEFAULT_SITE_NAME: &str = "example.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SiteHost {
    pub canonical: String,
    #[serde(default)]
    pub redirects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Site {
    #[serde(default)]
    pub site_hosts: Vec<SiteHost>,

    #[serde(default)]
    pub local_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_subtree_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multisite: Option<serde_yml::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl: Option<serde_yml::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<serde_yml::Value>,

    /// Keys this tool does not interpret; kept so a save does not drop them.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yml::Value>,
}

impl Site {
    pub fn main_host(&self) -> Option<&str> {
        self.site_hosts.first().map(|h| h.canonical.as_str())
    }

    pub fn ssl_enabled(&self) -> bool {
        self.ssl
            .as_ref()
            .and_then(|ssl| ssl.get("enabled"))
            .and_then(serde_yml::Value::as_bool)
            .unwrap_or(false)
    }

    pub fn main_url(&self) -> Option<String> {
        let protocol = if self.ssl_enabled() { "https" } else { "http" };
        self.main_host().map(|host| format!("{}://{}", protocol, host))
    }
}

/// Sites keyed by name. Iteration is sorted by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub wordpress_sites: BTreeMap<String, Site>,
}

impl Config {
    pub fn from_yaml(content: &str, source: &str) -> Result<Self> {
        serde_yml::from_str(content).map_err(|e| Error::config_invalid_yaml(source, e))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self).map_err(|e| {
            Error::internal_unexpected(format!("Failed to serialize site config: {}", e))
        })
    }

    /// Every canonical and redirect host, sites in name order.
    pub fn all_hosts(&self) -> Vec<String> {
        self.wordpress_sites
            .values()
            .flat_map(|site| &site.site_hosts)
            .flat_map(|host| {
                std::iter::once(host.canonical.clone()).chain(host.redirects.iter().cloned())
            })
            .collect()
    }
}

/// Point `site` at the hosts derived from `host` for `env`.
pub fn generate_site(site: &mut Site, host: &str, env: &str) -> Result<()> {
    let derived = domain::derive_hosts(host, env)?;

    if env == DEVELOPMENT {
        site.admin_email = Some(format!("admin@{}", derived.canonical));
        site.branch = None;
        site.repo = None;
        site.repo_subtree_path = None;
    } else {
        site.admin_email = None;
    }

    site.site_hosts = vec![SiteHost {
        canonical: derived.canonical,
        redirects: derived.redirect.into_iter().collect(),
    }];

    Ok(())
}

/// Move the default site entry to `name` and regenerate its hosts.
///
/// Renames rather than copies: the default key is gone afterwards unless
/// `name` is the default key itself. The config is untouched on error.
pub fn update_default_config(config: &mut Config, name: &str, host: &str, env: &str) -> Result<()> {
    let mut site = config
        .wordpress_sites
        .get(DEFAULT_SITE_NAME)
        .cloned()
        .ok_or_else(|| {
            Error::config_missing_key(format!("wordpress_sites.{}", DEFAULT_SITE_NAME), None)
        })?;

    generate_site(&mut site, host, env)?;

    config.wordpress_sites.remove(DEFAULT_SITE_NAME);
    config.wordpress_sites.insert(name.to_string(), site);
    Ok(())
}
