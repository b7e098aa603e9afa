//! Shared startup helpers for the CLI and TUI: database location and logging.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::Level;

/// Environment variable overriding the database location.
pub const DB_PATH_ENV: &str = "GETEM_DB";

/// Environment variable selecting the log level (`error` through `trace`).
pub const LOG_LEVEL_ENV: &str = "GETEM_LOG";

/// Gets the cross-platform database path.
///
/// `GETEM_DB` wins when set and non-empty. Otherwise the path is
/// `{data_dir}/getem/getem.db` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn get_database_path() -> Result<PathBuf> {
    database_path_from(std::env::var_os(DB_PATH_ENV).map(PathBuf::from))
}

fn database_path_from(override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path
        && !path.as_os_str().is_empty()
    {
        return Ok(path);
    }

    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("getem").join("getem.db"))
}

/// Ensures the parent directory of the database file exists.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }
    Ok(())
}

/// Picks the log level: `-v` flags first, then `GETEM_LOG`, then `warn`.
pub fn log_level(verbosity: u8, env_level: Option<&str>) -> Level {
    match verbosity {
        0 => env_level
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(Level::WARN),
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the stderr log subscriber. Call once, at startup.
pub fn init_logging(verbosity: u8) {
    let env_level = std::env::var(LOG_LEVEL_ENV).ok();
    let level = log_level(verbosity, env_level.as_deref());

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_database_path_is_under_data_dir() {
        let path = database_path_from(None).expect("data dir should resolve");
        assert!(path.ends_with("getem/getem.db"));
    }

    #[test]
    fn override_path_wins_unless_empty() {
        let path = database_path_from(Some(PathBuf::from("/tmp/custom.db"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.db"));

        let path = database_path_from(Some(PathBuf::new())).unwrap();
        assert!(path.ends_with("getem/getem.db"));
    }

    #[test]
    fn ensure_database_directory_creates_parents() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("deeper").join("getem.db");

        ensure_database_directory(&db_path).expect("failed to create directories");

        assert!(db_path.parent().unwrap().is_dir());
    }

    #[test]
    fn log_level_prefers_flags_over_environment() {
        assert_eq!(log_level(0, None), Level::WARN);
        assert_eq!(log_level(0, Some("debug")), Level::DEBUG);
        assert_eq!(log_level(0, Some("nonsense")), Level::WARN);
        assert_eq!(log_level(1, Some("error")), Level::INFO);
        assert_eq!(log_level(2, None), Level::DEBUG);
        assert_eq!(log_level(5, None), Level::TRACE);
    }
}
