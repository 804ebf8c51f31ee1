//! Auth file parsing.
//!
//! A service-principal auth file comes in one of two shapes:
//!
//! - a single JSON object, detected when the first non-blank line starts
//!   with `{`:
//!
//!   ```text
//!   {"clientId": "abc", "clientSecret": "xyz", "tenantId": "t1"}
//!   ```
//!
//! - line-oriented `key=value` pairs with `#` comments:
//!
//!   ```text
//!   # service principal
//!   clientId=abc
//!   clientSecret=xyz
//!   ```
//!
//! Both produce a [`CredentialMap`]. Nothing here looks at the environment;
//! the caller supplies the path.

use crate::{Result, VaultwireError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Field name to value mapping read from an auth file.
pub type CredentialMap = HashMap<String, String>;

/// Reads and parses the auth file at `path`.
///
/// # Errors
///
/// - [`VaultwireError::FileNotFound`] if the file is missing or unreadable
/// - [`VaultwireError::Parse`] if the file is detected as JSON but is not a
///   well-formed JSON object
///
/// # Example
///
/// ```no_run
/// use vaultwire::auth_file::parse_auth_file;
///
/// let map = parse_auth_file("/home/me/.azure/my.azureauth")?;
/// println!("client: {:?}", map.get("clientId"));
/// # Ok::<(), vaultwire::VaultwireError>(())
/// ```
pub fn parse_auth_file(path: impl AsRef<Path>) -> Result<CredentialMap> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| VaultwireError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;

    let map = parse_auth_str(&content)?;
    debug!(path = %path.display(), keys = map.len(), "parsed auth file");
    Ok(map)
}

/// Parses auth file content that is already in memory.
///
/// Format detection, comment skipping and the first-`=` split rule are the
/// same as [`parse_auth_file`]. A leading byte order mark is ignored. In the
/// line format a repeated key keeps the last value seen.
///
/// # Example
///
/// ```
/// use vaultwire::auth_file::parse_auth_str;
///
/// let map = parse_auth_str("# sp\nclientId=abc\nclientSecret=se=cret\n")?;
/// assert_eq!(map["clientSecret"], "se=cret");
/// # Ok::<(), vaultwire::VaultwireError>(())
/// ```
pub fn parse_auth_str(content: &str) -> Result<CredentialMap> {
    let content = content.trim_start_matches('\u{feff}');
    if is_json(content) {
        parse_json(content)
    } else {
        Ok(parse_lines(content))
    }
}

fn is_json(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .is_some_and(|line| line.starts_with('{'))
}

fn parse_json(content: &str) -> Result<CredentialMap> {
    let object: Map<String, Value> = serde_json::from_str(content).map_err(VaultwireError::Parse)?;

    let mut map = CredentialMap::with_capacity(object.len());
    for (key, value) in object {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s,
            other => other.to_string(),
        };
        map.insert(key, value);
    }

    debug!(format = "json", keys = map.len(), "auth content parsed");
    Ok(map)
}

fn parse_lines(content: &str) -> CredentialMap {
    let mut map = CredentialMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        map.insert(key.to_string(), value.to_string());
    }

    debug!(format = "properties", keys = map.len(), "auth content parsed");
    map
}
