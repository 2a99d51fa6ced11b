//! Error types for qualitree core.

use std::{error::Error, fmt, io};

/// Error type for qualitree core operations.
#[derive(Debug)]
pub enum QualitreeError {
    /// An underlying I/O error.
    Io(io::Error),
    /// A report could not be serialized or parsed.
    Json(serde_json::Error),
    /// The external judge failed to produce a response for a file.
    Judge(String),
    /// A catch-all error with a message.
    Other(String),
}

impl fmt::Display for QualitreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "invalid report: {err}"),
            Self::Judge(message) => write!(f, "judge failed: {message}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for QualitreeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Judge(_) | Self::Other(_) => None,
        }
    }
}

impl From<io::Error> for QualitreeError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for QualitreeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Convenience result type for qualitree core.
pub type Result<T> = std::result::Result<T, QualitreeError>;

#[cfg(test)]
mod tests {
    use super::QualitreeError;
    use std::error::Error;
    use std::io;

    #[test]
    fn io_error_formats_message() {
        let error = QualitreeError::Io(io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(format!("{error}"), "io error: boom");
        assert!(error.source().is_some());
    }

    #[test]
    fn judge_error_formats_message() {
        let error = QualitreeError::Judge("timed out after 5s".to_string());
        assert_eq!(format!("{error}"), "judge failed: timed out after 5s");
        assert!(error.source().is_none());
    }

    #[test]
    fn json_error_maps_variant() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: QualitreeError = parse.into();
        assert!(matches!(error, QualitreeError::Json(_)));
        assert!(format!("{error}").starts_with("invalid report:"));
    }

    #[test]
    fn from_io_error_maps_variant() {
        let error: QualitreeError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        match error {
            QualitreeError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("expected Io variant"),
        }
    }
}
