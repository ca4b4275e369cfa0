//! Platform-specific path resolution.

use std::env;
use std::path::{Path, PathBuf};

use super::error::PathError;

/// Environment variable that overrides the data root.
pub const DATA_DIR_ENV: &str = "VOCALIS_DATA_DIR";

const APP_DIR_NAME: &str = "vocalis";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Get the root directory for application data (settings, exports).
///
/// Resolution order:
/// 1. `VOCALIS_DATA_DIR` environment variable (highest priority)
/// 2. System configuration directory (e.g., `~/.config/vocalis`)
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if dir.trim().is_empty() {
            return Err(PathError::EmptyPath);
        }
        return Ok(PathBuf::from(dir));
    }

    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or(PathError::NoConfigDir)
}

/// Location of the persisted settings file.
pub fn settings_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(SETTINGS_FILE_NAME))
}

/// Create `dir` (and its parents) if missing, returning it.
pub fn ensure_dir(dir: &Path) -> Result<PathBuf, PathError> {
    if dir.as_os_str().is_empty() {
        return Err(PathError::EmptyPath);
    }
    std::fs::create_dir_all(dir).map_err(|e| PathError::CreateFailed {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::test_utils::{ENV_LOCK, EnvVarGuard};

    #[test]
    fn data_root_honours_env_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set(DATA_DIR_ENV, "/tmp/vocalis-test");

        assert_eq!(data_root().unwrap(), PathBuf::from("/tmp/vocalis-test"));
        assert_eq!(
            settings_path().unwrap(),
            PathBuf::from("/tmp/vocalis-test/settings.json")
        );
    }

    #[test]
    fn blank_env_override_is_rejected() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set(DATA_DIR_ENV, "  ");

        assert!(matches!(data_root(), Err(PathError::EmptyPath)));
    }

    #[test]
    fn ensure_dir_creates_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("a/b/c");

        assert_eq!(ensure_dir(&target).unwrap(), target);
        assert!(target.is_dir());
        assert!(matches!(ensure_dir(Path::new("")), Err(PathError::EmptyPath)));
    }
}
