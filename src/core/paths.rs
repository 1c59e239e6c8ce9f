use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Base sitehost config directory (~/.config/sitehost/, %APPDATA%\sitehost on Windows)
pub fn sitehost() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("sitehost"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("sitehost"))
    }
}

/// Global sitehost.json config file path
pub fn sitehost_json() -> Result<PathBuf> {
    Ok(sitehost()?.join("sitehost.json"))
}
