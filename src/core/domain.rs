//! Per-environment hostname derivation.
//!
//! Hostnames are split on the public suffix list, so `shop.example.co.uk`
//! parses as TRD `shop`, SLD `example`, TLD `co.uk`.

use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};

/// Environment whose hosts never resolve to the real public domain.
pub const DEVELOPMENT: &str = "development";

/// TLD substituted for development hosts.
pub const DEVELOPMENT_TLD: &str = "test";

const WWW: &str = "www";

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainName {
    pub tld: String,
    pub sld: String,
    pub trd: String,
}

impl DomainName {
    pub fn parse(domain: &str) -> Result<Self> {
        let normalized = domain.trim().trim_end_matches('.').to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(Error::domain_invalid(domain, "domain is empty"));
        }
        if normalized.len() > MAX_NAME_LEN {
            return Err(Error::domain_invalid(
                domain,
                format!("domain is longer than {} bytes", MAX_NAME_LEN),
            ));
        }
        for label in normalized.split('.') {
            check_label(label).map_err(|problem| Error::domain_invalid(domain, problem))?;
        }

        let suffix = psl::suffix_str(&normalized)
            .ok_or_else(|| Error::domain_invalid(domain, "no public suffix found"))?;
        let registrable = psl::domain_str(&normalized).ok_or_else(|| {
            Error::domain_invalid(domain, "domain is a public suffix with no registrable label")
        })?;

        // Both are label-aligned tails of `normalized`.
        let sld = registrable[..registrable.len() - suffix.len()].trim_end_matches('.');
        let trd = normalized[..normalized.len() - registrable.len()].trim_end_matches('.');

        Ok(Self {
            tld: suffix.to_string(),
            sld: sld.to_string(),
            trd: trd.to_string(),
        })
    }

    fn with_trd(&self, trd: &str) -> Self {
        Self {
            trd: trd.to_string(),
            ..self.clone()
        }
    }
}

/// Letters, digits, and inner hyphens only. Rules out schemes, ports,
/// paths, and whitespace.
fn check_label(label: &str) -> std::result::Result<(), String> {
    if label.is_empty() {
        return Err("domain contains an empty label".to_string());
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(format!(
            "label '{}' is longer than {} bytes",
            label, MAX_LABEL_LEN
        ));
    }
    if let Some(c) = label
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
    {
        return Err(format!("label '{}' contains invalid character {:?}", label, c));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(format!("label '{}' starts or ends with '-'", label));
    }
    Ok(())
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.trd.is_empty() {
            write!(f, "{}.", self.trd)?;
        }
        write!(f, "{}.{}", self.sld, self.tld)
    }
}

/// Canonical host plus the optional host that should redirect to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedHosts {
    pub canonical: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

/// Derive the canonical and redirect hosts for `domain` in `env`.
///
/// Bare domains redirect from `www`, `www` domains redirect from the bare
/// domain, and any other subdomain gets no redirect. Development swaps the
/// public suffix for `.test`.
pub fn derive_hosts(domain: &str, env: &str) -> Result<DerivedHosts> {
    let mut canonical = DomainName::parse(domain)?;

    if env == DEVELOPMENT {
        canonical.tld = DEVELOPMENT_TLD.to_string();
    }

    let redirect = match canonical.trd.as_str() {
        "" => Some(canonical.with_trd(WWW)),
        WWW => Some(canonical.with_trd("")),
        _ => None,
    };

    Ok(DerivedHosts {
        canonical: canonical.to_string(),
        redirect: redirect.map(|r| r.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(domain: &str, env: &str) -> (String, Option<String>) {
        let derived = derive_hosts(domain, env).unwrap();
        (derived.canonical, derived.redirect)
    }

    #[test]
    fn bare_domain_redirects_from_www() {
        assert_eq!(
            hosts("example.com", "production"),
            ("example.com".to_string(), Some("www.example.com".to_string()))
        );
    }

    #[test]
    fn development_uses_test_tld() {
        assert_eq!(
            hosts("example.com", "development"),
            ("example.test".to_string(), Some("www.example.test".to_string()))
        );
    }

    #[test]
    fn www_domain_redirects_from_bare() {
        assert_eq!(
            hosts("www.example.com", "production"),
            ("www.example.com".to_string(), Some("example.com".to_string()))
        );
    }

    #[test]
    fn custom_subdomain_has_no_redirect() {
        assert_eq!(
            hosts("shop.example.com", "production"),
            ("shop.example.com".to_string(), None)
        );
    }

    #[test]
    fn multi_label_suffix_is_kept_together() {
        let parsed = DomainName::parse("shop.example.co.uk").unwrap();
        assert_eq!(parsed.tld, "co.uk");
        assert_eq!(parsed.sld, "example");
        assert_eq!(parsed.trd, "shop");

        assert_eq!(
            hosts("example.co.uk", "staging"),
            ("example.co.uk".to_string(), Some("www.example.co.uk".to_string()))
        );
        assert_eq!(
            hosts("www.example.co.uk", "development"),
            ("www.example.test".to_string(), Some("example.test".to_string()))
        );
    }

    #[test]
    fn deep_subdomain_keeps_all_leading_labels() {
        let parsed = DomainName::parse("a.b.example.com").unwrap();
        assert_eq!(parsed.trd, "a.b");
        assert_eq!(hosts("a.b.example.com", "development").0, "a.b.example.test");
    }

    #[test]
    fn input_is_normalized() {
        assert_eq!(hosts(" Example.COM. ", "production").0, "example.com");
    }

    #[test]
    fn rejects_bare_suffix_and_empty_labels() {
        assert!(derive_hosts("co.uk", "production").is_err());
        assert!(derive_hosts("", "production").is_err());
        assert!(derive_hosts("example..com", "production").is_err());
    }

    #[test]
    fn rejects_schemes_ports_paths_and_whitespace() {
        for input in [
            "https://example.com",
            "example.com:8080",
            "example.com/blog",
            "exa mple.com",
            "example.com\twww",
        ] {
            let err = derive_hosts(input, "production").unwrap_err();
            assert_eq!(err.code.as_str(), "domain.invalid", "{}", input);
            assert!(derive_hosts(input, "development").is_err(), "{}", input);
        }
    }

    #[test]
    fn enforces_label_rules() {
        assert!(derive_hosts("-shop.example.com", "production").is_err());
        assert!(derive_hosts("shop-.example.com", "production").is_err());
        assert!(derive_hosts("my_site.example.com", "production").is_err());
        assert!(derive_hosts(&format!("{}.com", "a".repeat(64)), "production").is_err());
        assert!(derive_hosts(&format!("{}.com", "a".repeat(63)), "production").is_ok());

        let long = format!("{}.example.com", vec!["a".repeat(60); 4].join("."));
        assert!(long.len() > 253);
        assert!(derive_hosts(&long, "production").is_err());

        assert_eq!(hosts("my-shop.example.com", "production").0, "my-shop.example.com");
        assert_eq!(hosts("xn--bcher-kva.de", "production").0, "xn--bcher-kva.de");
    }

    #[test]
    fn derivation_is_deterministic() {
        assert_eq!(
            derive_hosts("www.example.org", "staging").unwrap(),
            derive_hosts("www.example.org", "staging").unwrap()
        );
    }
}
