//! Version command implementation.

use serde::Serialize;

use crate::error::Result;
use crate::fetch::DEFAULT_API_URL;

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
    profile: &'static str,
    default_api_url: &'static str,
}

impl VersionInfo {
    fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            profile: if cfg!(debug_assertions) { "dev" } else { "release" },
            default_api_url: DEFAULT_API_URL,
        }
    }
}

/// Print version information.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let info = VersionInfo::current();

    if json {
        println!("{}", serde_json::to_string(&info)?);
    } else {
        println!("trello-sync version {} ({})", info.version, info.profile);
    }
    Ok(())
}
