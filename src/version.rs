// SPDX-License-Identifier: MIT
//! `version.json` loading for the `/__version__` endpoint.
//!
//! Deployment pipelines drop a `version.json` into the application root
//! describing the running build. By convention it carries `source`,
//! `version`, `commit`, and `build` keys, but the contents are not enforced
//! — whatever the file holds is served as-is.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Failure to load an existing version file.
#[derive(Debug, Error)]
pub enum VersionError {
    #[error("failed to read version file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse version file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Load and return the contents of `<root>/version.json`.
///
/// Returns `Ok(None)` when the file does not exist; an unreadable or
/// malformed file is an error.
pub fn get_version(root: &Path) -> Result<Option<Value>, VersionError> {
    let path = root.join("version.json");
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&path).map_err(|source| VersionError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|source| VersionError::Parse { path, source })
}
