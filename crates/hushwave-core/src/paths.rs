//! Path utilities for hushwave data directories.
//!
//! Resolution order for the data root:
//! 1. `HUSHWAVE_DATA_DIR` environment variable (highest priority)
//! 2. System data directory (e.g., `~/.local/share/hushwave`)
//!
//! Everything else (settings file, speech models) lives below the data root
//! unless the settings override it.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "HUSHWAVE_DATA_DIR";

/// Name of the settings file inside the data root.
pub const SETTINGS_FILE: &str = "settings.json";

/// Name of the speech model directory inside the data root.
pub const MODELS_DIR: &str = "models";

/// Errors that can occur during path resolution.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Could not determine the system data directory.
    #[error("Cannot determine system data directory")]
    NoDataDir,

    /// Failed to create a directory.
    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    /// An empty path was provided.
    #[error("Path cannot be empty")]
    EmptyPath,
}

/// Get the root directory for application data, creating it if needed.
pub fn data_root() -> Result<PathBuf, PathError> {
    let override_dir = env::var(DATA_DIR_ENV).ok();
    let root = resolve_data_root(override_dir.as_deref(), dirs::data_local_dir())?;
    ensure_dir(&root)?;
    Ok(root)
}

/// Pure resolver behind [`data_root`].
///
/// Takes the environment override and the platform data directory as
/// arguments so it can be tested without touching the process environment.
pub fn resolve_data_root(
    override_dir: Option<&str>,
    system_data_dir: Option<PathBuf>,
) -> Result<PathBuf, PathError> {
    if let Some(raw) = override_dir {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PathError::EmptyPath);
        }
        return Ok(PathBuf::from(trimmed));
    }

    system_data_dir
        .map(|dir| dir.join("hushwave"))
        .ok_or(PathError::NoDataDir)
}

/// Path of the persisted settings file.
pub fn settings_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(SETTINGS_FILE))
}

/// Default directory for downloaded speech models.
pub fn default_models_dir() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(MODELS_DIR))
}

/// Create `path` (and parents) if it does not exist yet.
pub fn ensure_dir(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "Created data directory");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_system_dir() {
        let root = resolve_data_root(Some("/tmp/hw"), Some(PathBuf::from("/data"))).unwrap();
        assert_eq!(root, PathBuf::from("/tmp/hw"));
    }

    #[test]
    fn system_dir_gets_app_suffix() {
        let root = resolve_data_root(None, Some(PathBuf::from("/data"))).unwrap();
        assert_eq!(root, PathBuf::from("/data/hushwave"));
    }

    #[test]
    fn blank_override_is_rejected() {
        let err = resolve_data_root(Some("   "), None).unwrap_err();
        assert!(matches!(err, PathError::EmptyPath));
    }

    #[test]
    fn missing_system_dir_is_an_error() {
        assert!(matches!(
            resolve_data_root(None, None),
            Err(PathError::NoDataDir)
        ));
    }

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // second call is a no-op
        ensure_dir(&nested).unwrap();
    }
}
