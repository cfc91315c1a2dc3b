use thiserror::Error;

/// Failure classes for the remote execution call. The wire contract is a
/// single attempt; the cause tells the caller which stage broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionCause {
    Network,
    BadStatus,
    MalformedResponse,
}

impl ExecutionCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionCause::Network => "network",
            ExecutionCause::BadStatus => "bad-status",
            ExecutionCause::MalformedResponse => "malformed-response",
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ScribeError {
    #[error("capture failed: {0}")]
    Capture(String),

    #[error("recognition failed: {0}")]
    Recognition(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("execution failed ({}): {}", .cause.as_str(), .message)]
    Execution {
        cause: ExecutionCause,
        message: String,
    },

    #[error("i/o error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ScribeError {
    pub(crate) fn execution(cause: ExecutionCause, message: impl Into<String>) -> Self {
        ScribeError::Execution {
            cause,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ScribeError {
    fn from(err: std::io::Error) -> Self {
        ScribeError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ScribeError {
    fn from(err: serde_json::Error) -> Self {
        ScribeError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScribeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execution_display_includes_cause() {
        let err = ScribeError::execution(ExecutionCause::BadStatus, "endpoint returned 500");
        assert_eq!(
            err.to_string(),
            "execution failed (bad-status): endpoint returned 500"
        );
    }

    #[test]
    fn cause_strings_are_stable() {
        assert_eq!(ExecutionCause::Network.as_str(), "network");
        assert_eq!(ExecutionCause::BadStatus.as_str(), "bad-status");
        assert_eq!(
            ExecutionCause::MalformedResponse.as_str(),
            "malformed-response"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ScribeError::from(io);
        assert!(matches!(err, ScribeError::Io(_)));
        assert!(err.to_string().contains("missing"));
    }
}
