// shared/src/lib.rs

/// Errors produced while talking to the users API.
///
/// `Clone` because one in-flight fetch may be awaited by several callers and
/// each of them receives the same outcome.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("request failed{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn request_failed(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::RequestFailed {
            status,
            message: message.into(),
        }
    }

    /// HTTP status carried by a `RequestFailed`, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_display() {
        let err = Error::request_failed(Some(503), "service unavailable");
        assert_eq!(err.to_string(), "request failed (503): service unavailable");
        assert_eq!(err.status(), Some(503));

        let err = Error::request_failed(None, "connection refused");
        assert_eq!(err.to_string(), "request failed: connection refused");
        assert_eq!(err.status(), None);
    }
}
