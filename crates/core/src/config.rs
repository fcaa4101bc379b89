//! Path utilities and defaults for snowrun.
//!
//! This module resolves the settings file and SQL template directory paths,
//! expanding shell variables like `~`, and holds the defaults shared by the
//! CLI and the dashboard.

use std::env;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Error, Result};

/// Default executable for the external SQL tool
pub const DEFAULT_EXECUTABLE: &str = "snow";

/// Name of the SQL template directory searched under the working directory
/// and next to the installed executable
pub const SQL_DIR_NAME: &str = "sql";

/// Setting that names the `snow` connection to use
pub const DEFAULT_CONNECTION_SETTING: &str = "SNOWFLAKE_DEFAULT_CONNECTION_NAME";

/// Expands `~` in a user supplied path.
///
/// # Examples
///
/// ```
/// use snowrun_core::config::expand_path;
///
/// let expanded = expand_path("~/project/.env");
/// assert!(!expanded.starts_with("~"));
/// ```
#[must_use]
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Resolves the settings file path, if one was given.
#[must_use]
pub fn get_env_file_path(env_file_arg: Option<&str>) -> Option<PathBuf> {
    env_file_arg.map(expand_path)
}

/// Resolves the SQL template directory.
///
/// Priority:
/// 1. The explicit directory (from `--sql-dir`), which must exist
/// 2. `sql/` under the current working directory
/// 3. `sql/` next to the installed executable
///
/// # Errors
///
/// Returns [`Error::SqlDirNotFound`] if an explicit directory was given but is
/// not a directory.
pub fn get_sql_dir(sql_dir_arg: Option<&str>) -> Result<PathBuf> {
    let cwd = env::current_dir()
        .map_err(|e| Error::io_error("working directory".to_string(), ".".to_string(), e))?;
    resolve_sql_dir(sql_dir_arg, &cwd, &install_sql_dir())
}

/// [`get_sql_dir`] with the working and install directories made explicit.
///
/// # Errors
///
/// Returns [`Error::SqlDirNotFound`] if an explicit directory was given but is
/// not a directory.
pub fn resolve_sql_dir(sql_dir_arg: Option<&str>, cwd: &Path, install_dir: &Path) -> Result<PathBuf> {
    if let Some(sql_dir_arg) = sql_dir_arg {
        let explicit = expand_path(sql_dir_arg);
        let explicit = if explicit.is_absolute() {
            explicit
        } else {
            cwd.join(explicit)
        };

        if explicit.is_dir() {
            debug!("Using explicit SQL directory `{}`", explicit.display());
            return Ok(explicit);
        }

        return Err(Error::SqlDirNotFound(explicit));
    }

    let cwd_sql = cwd.join(SQL_DIR_NAME);
    if cwd_sql.is_dir() {
        debug!("Using SQL directory under working directory `{}`", cwd_sql.display());
        return Ok(cwd_sql);
    }

    debug!("Falling back to install SQL directory `{}`", install_dir.display());
    Ok(install_dir.to_path_buf())
}

/// Looks up a SQL template file inside the resolved directory.
///
/// # Errors
///
/// Returns [`Error::SqlFileNotFound`] with the full path if the file is absent.
pub fn locate_sql_file(sql_dir: &Path, sql_file: &str) -> Result<PathBuf> {
    let sql_path = sql_dir.join(sql_file);

    if sql_path.is_file() {
        Ok(sql_path)
    } else {
        Err(Error::SqlFileNotFound(sql_path))
    }
}

fn install_sql_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|parent| parent.join(SQL_DIR_NAME)))
        .unwrap_or_else(|| PathBuf::from(SQL_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_expand_path_with_tilde() {
        let result = expand_path("~/my-project/.env");
        assert!(!result.starts_with("~"));
        assert!(result.ends_with("my-project/.env"));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        assert_eq!(expand_path("/absolute/.env"), PathBuf::from("/absolute/.env"));
    }

    #[test]
    fn test_get_env_file_path_with_none() {
        assert!(get_env_file_path(None).is_none());
    }

    #[test]
    fn test_explicit_sql_dir_must_exist() {
        let cwd = tempfile::tempdir().unwrap();
        let result = resolve_sql_dir(Some("/this/path/does/not/exist"), cwd.path(), Path::new("/install/sql"));
        assert!(matches!(result, Err(Error::SqlDirNotFound(_))));
    }

    #[test]
    fn test_explicit_sql_dir_must_be_a_directory() {
        let cwd = tempfile::tempdir().unwrap();
        let file = cwd.path().join("not_a_dir.sql");
        fs::write(&file, "select 1;").unwrap();

        let result = resolve_sql_dir(file.to_str(), cwd.path(), Path::new("/install/sql"));
        assert!(matches!(result, Err(Error::SqlDirNotFound(_))));
    }

    #[test]
    fn test_explicit_sql_dir_wins_over_cwd() {
        let cwd = tempfile::tempdir().unwrap();
        fs::create_dir(cwd.path().join(SQL_DIR_NAME)).unwrap();
        let explicit = tempfile::tempdir().unwrap();

        let result = resolve_sql_dir(explicit.path().to_str(), cwd.path(), Path::new("/install/sql")).unwrap();
        assert_eq!(result, explicit.path());
    }

    #[test]
    fn test_relative_explicit_sql_dir_is_resolved_against_cwd() {
        let cwd = tempfile::tempdir().unwrap();
        fs::create_dir(cwd.path().join("templates")).unwrap();

        let result = resolve_sql_dir(Some("templates"), cwd.path(), Path::new("/install/sql")).unwrap();
        assert_eq!(result, cwd.path().join("templates"));
    }

    #[test]
    fn test_cwd_sql_dir_preferred_over_install_dir() {
        let cwd = tempfile::tempdir().unwrap();
        fs::create_dir(cwd.path().join(SQL_DIR_NAME)).unwrap();

        let result = resolve_sql_dir(None, cwd.path(), Path::new("/install/sql")).unwrap();
        assert_eq!(result, cwd.path().join(SQL_DIR_NAME));
    }

    #[test]
    fn test_install_dir_fallback() {
        let cwd = tempfile::tempdir().unwrap();

        let result = resolve_sql_dir(None, cwd.path(), Path::new("/install/sql")).unwrap();
        assert_eq!(result, PathBuf::from("/install/sql"));
    }

    #[test]
    fn test_locate_sql_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("setup.sql"), "select 1;").unwrap();

        assert_eq!(locate_sql_file(dir.path(), "setup.sql").unwrap(), dir.path().join("setup.sql"));

        match locate_sql_file(dir.path(), "cleanup.sql") {
            Err(Error::SqlFileNotFound(path)) => assert_eq!(path, dir.path().join("cleanup.sql")),
            other => panic!("Expected SqlFileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_EXECUTABLE, "snow");
        assert_eq!(DEFAULT_CONNECTION_SETTING, "SNOWFLAKE_DEFAULT_CONNECTION_NAME");
    }
}
