//! Host timezone lookup for the timezone option (Option 101, RFC 4833).

use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};

const ZONEINFO_PREFIXES: [&str; 2] = ["/usr/share/zoneinfo/", "../usr/share/zoneinfo/"];

/// Returns true if `name` looks like a tz database name such as `Europe/Berlin`.
pub fn is_valid_timezone(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('/')
        && !name.ends_with('/')
        && name.split('/').all(|part| !part.is_empty())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-' | '/'))
}

/// Determines the host timezone from the `localtime` symlink.
///
/// A missing symlink means UTC.
pub fn host_timezone(localtime: &Path) -> Result<String> {
    let target = match std::fs::read_link(localtime) {
        Ok(target) => target,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok("UTC".to_string()),
        Err(error) => {
            return Err(Error::Timezone(format!(
                "{}: {}",
                localtime.display(),
                error
            )));
        }
    };

    let target = target.to_string_lossy();
    let name = ZONEINFO_PREFIXES
        .iter()
        .find_map(|prefix| target.strip_prefix(prefix))
        .ok_or_else(|| Error::Timezone(format!("{} does not point into zoneinfo", target)))?;

    if !is_valid_timezone(name) {
        return Err(Error::Timezone(format!("invalid timezone '{}'", name)));
    }

    Ok(name.to_string())
}
