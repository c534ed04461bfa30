//! Tracing setup for the server binary.
//!
//! `RUST_LOG` wins when set. Otherwise `[logging] level` applies to this crate
//! and to the HTTP trace layer while dependencies stay at `warn`. Events go to
//! stdout and, when `[logging] file` is not empty, are appended to that file.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::{FilesysError, Result};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Filter directives for a configured level.
fn directives(level: &str) -> Result<String> {
    let level = level.trim().to_lowercase();
    let level = if level == "warning" { "warn".to_string() } else { level };
    if !LEVELS.contains(&level.as_str()) {
        return Err(FilesysError::Config(format!("unknown log level '{level}'")));
    }
    Ok(format!("warn,filesys={level},tower_http={level}"))
}

fn filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::new(directives(level)?)),
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Install the global subscriber described by `config`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = filter(&config.level)?;
    let console = fmt::layer().with_target(true);

    if config.file.trim().is_empty() {
        tracing_subscriber::registry()
            .with(console)
            .with(filter)
            .init();
        return Ok(());
    }

    let file = open_log_file(Path::new(&config.file))?;
    tracing_subscriber::registry()
        .with(console)
        .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
        .with(filter)
        .init();
    Ok(())
}

/// Stdout-only fallback when [`init`] failed.
pub fn init_console_only(level: &str) {
    let filter =
        filter(level).unwrap_or_else(|_| EnvFilter::new("warn,filesys=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_directives_scope_level_to_this_crate() {
        assert_eq!(
            directives("debug").unwrap(),
            "warn,filesys=debug,tower_http=debug"
        );
        assert_eq!(directives(" INFO ").unwrap(), "warn,filesys=info,tower_http=info");
        assert_eq!(directives("warning").unwrap(), "warn,filesys=warn,tower_http=warn");
    }

    #[test]
    fn test_unknown_level_is_a_config_error() {
        assert!(matches!(directives("verbose"), Err(FilesysError::Config(_))));
        assert!(matches!(directives(""), Err(FilesysError::Config(_))));
    }

    #[test]
    fn test_log_file_is_appended() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs/nested/filesys.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
