use thiserror::Error;

/// Main error type for the text segmenter
#[derive(Error, Debug)]
pub enum SegmenterError {
    /// An upstream contract was broken (bad metadata, out-of-order cue, input
    /// before initialization or after drain). The stream must be abandoned.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The feed delivered a stream data kind this stage does not handle
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// The downstream sink refused an output
    #[error("Sink error: {0}")]
    Sink(String),

    /// A standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A feed line could not be decoded
    #[error("Feed error at line {line}: {message}")]
    Feed { line: usize, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SegmenterError {
    /// Whether the error came from a broken stream invariant rather than
    /// from the surrounding I/O.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, SegmenterError::InvalidState(_))
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SegmenterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SegmenterError::Feed {
            line: 3,
            message: "expected value".to_string(),
        };
        assert_eq!(err.to_string(), "Feed error at line 3: expected value");

        let err = SegmenterError::InvalidState("time scale is 0".to_string());
        assert_eq!(err.to_string(), "Invalid state: time scale is 0");
    }

    #[test]
    fn test_is_contract_violation() {
        assert!(SegmenterError::InvalidState("x".into()).is_contract_violation());
        assert!(!SegmenterError::UnsupportedInput("x".into()).is_contract_violation());
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert!(!SegmenterError::from(io).is_contract_violation());
    }
}
