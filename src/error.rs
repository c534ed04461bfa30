//! Error types for filesys.

use thiserror::Error;

use crate::settings::SettingsError;

/// Common error type for filesys.
#[derive(Error, Debug)]
pub enum FilesysError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for user input (bad names, paths escaping the root).
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// The target of a create or rename already exists.
    #[error("{0} already exists")]
    Conflict(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Embed settings could not be read.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Result type alias for filesys operations.
pub type Result<T> = std::result::Result<T, FilesysError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = FilesysError::Validation("name is empty".to_string());
        assert_eq!(err.to_string(), "validation error: name is empty");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = FilesysError::NotFound("/docs/a.txt".to_string());
        assert_eq!(err.to_string(), "/docs/a.txt not found");
    }

    #[test]
    fn test_conflict_error_display() {
        let err = FilesysError::Conflict("/docs/b.txt".to_string());
        assert_eq!(err.to_string(), "/docs/b.txt already exists");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: FilesysError = io_err.into();
        assert!(matches!(err, FilesysError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_settings_error_conversion() {
        let err: FilesysError = SettingsError::MissingAttribute("data-files-url").into();
        assert!(matches!(err, FilesysError::Settings(_)));
        assert!(err.to_string().contains("data-files-url"));
    }
}
