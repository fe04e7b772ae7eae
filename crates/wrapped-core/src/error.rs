use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by Chat Wrapped.
#[derive(Error, Debug)]
pub enum WrappedError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or produced.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A timestamp string did not match the export format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// The transcript contained no parsable chat messages.
    #[error("No messages found in {0}")]
    NoMessages(PathBuf),

    /// The transcript contained no join events on or before the cutoff.
    #[error("No member join data found in {0}")]
    NoJoinEvents(PathBuf),

    /// The trend fitter was handed a growth series without any points.
    #[error("Cannot fit a trend to an empty growth series")]
    EmptySeries,

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl WrappedError {
    /// Whether this error is one of the "nothing to analyse" outcomes.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            WrappedError::NoMessages(_) | WrappedError::NoJoinEvents(_) | WrappedError::EmptySeries
        )
    }
}

/// Convenience alias used throughout the wrapped crates.
pub type Result<T> = std::result::Result<T, WrappedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = WrappedError::FileRead {
            path: PathBuf::from("/some/_chat.txt"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/_chat.txt"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_timestamp_parse() {
        let err = WrappedError::TimestampParse("32/13/2023, 25:00:00".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid timestamp format: 32/13/2023, 25:00:00"
        );
    }

    #[test]
    fn test_error_display_no_messages() {
        let err = WrappedError::NoMessages(PathBuf::from("/empty/_chat.txt"));
        assert_eq!(err.to_string(), "No messages found in /empty/_chat.txt");
    }

    #[test]
    fn test_error_display_no_join_events() {
        let err = WrappedError::NoJoinEvents(PathBuf::from("_chat.txt"));
        assert_eq!(err.to_string(), "No member join data found in _chat.txt");
    }

    #[test]
    fn test_error_display_config() {
        let err = WrappedError::Config("alias file is not an object".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: alias file is not an object"
        );
    }

    #[test]
    fn test_is_no_data() {
        assert!(WrappedError::NoMessages(PathBuf::from("a")).is_no_data());
        assert!(WrappedError::NoJoinEvents(PathBuf::from("a")).is_no_data());
        assert!(WrappedError::EmptySeries.is_no_data());
        assert!(!WrappedError::Config("x".to_string()).is_no_data());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: WrappedError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: WrappedError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
