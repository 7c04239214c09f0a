use crate::retry::{Cancelled, Classify, FailureClass};

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum QiibraryError {
    /// No response was received: connection failure or client-side timeout.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
    /// The request descriptor could not be turned into a URL.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Environment configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
    /// The caller's cancellation token fired before the call resolved.
    #[error("request cancelled")]
    Cancelled,
}

/// Coarse error code, mirroring what a browser HTTP client reports.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    Timeout,
    Connect,
    Network,
    Status,
    Decode,
    InvalidRequest,
    Config,
    Cancelled,
}

impl QiibraryError {
    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Raw body of the failed response, if one was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Transport(err) if err.is_timeout() => ErrorCode::Timeout,
            Self::Transport(err) if err.is_connect() => ErrorCode::Connect,
            Self::Transport(_) => ErrorCode::Network,
            Self::Http { .. } => ErrorCode::Status,
            Self::Decode(_) => ErrorCode::Decode,
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::Config(_) => ErrorCode::Config,
            Self::Cancelled => ErrorCode::Cancelled,
        }
    }

    /// Display text for the page layer.
    ///
    /// Rate limiting and server faults ask the reader to wait, timeouts point
    /// at the network, and 404/403 get their own wording. Anything else falls
    /// back to the error's own message.
    pub fn user_message(&self) -> String {
        let message = match self.status() {
            Some(429) => "Too many requests right now. Please wait a moment and try again.",
            Some(500) => "A server error occurred. Please wait a moment and try again.",
            _ if self.is_timeout() => {
                "The connection timed out. Please check your network connection."
            }
            Some(404) => "No data was found.",
            Some(403) => "Access was denied.",
            _ => return self.to_string(),
        };
        message.to_owned()
    }
}

impl Classify for QiibraryError {
    fn classify(&self) -> FailureClass {
        match self {
            Self::Transport(err) if err.is_builder() => FailureClass::Terminal,
            Self::Transport(err) if err.is_timeout() || err.is_connect() => FailureClass::Retryable,
            Self::Transport(err) if err.is_request() || err.is_body() => FailureClass::Retryable,
            Self::Http { status, .. } if (500..=599).contains(status) => FailureClass::Retryable,
            _ => FailureClass::Terminal,
        }
    }
}

impl From<Cancelled> for QiibraryError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, QiibraryError};
    use crate::retry::{Classify, FailureClass};

    fn http(status: u16) -> QiibraryError {
        QiibraryError::Http {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn server_faults_are_retryable() {
        for status in [500, 502, 503, 504, 599] {
            assert_eq!(http(status).classify(), FailureClass::Retryable, "{status}");
        }
    }

    #[test]
    fn client_faults_are_terminal() {
        for status in [400, 401, 403, 404, 429, 499] {
            assert_eq!(http(status).classify(), FailureClass::Terminal, "{status}");
        }
    }

    #[test]
    fn non_http_errors_are_terminal() {
        assert_eq!(
            QiibraryError::Decode("bad".to_owned()).classify(),
            FailureClass::Terminal
        );
        assert_eq!(QiibraryError::Cancelled.classify(), FailureClass::Terminal);
        assert_eq!(
            QiibraryError::InvalidRequest("x".to_owned()).classify(),
            FailureClass::Terminal
        );
    }

    #[test]
    fn http_error_exposes_status_and_body() {
        let err = QiibraryError::Http {
            status: 404,
            body: "{\"detail\":\"missing\"}".to_owned(),
        };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body(), Some("{\"detail\":\"missing\"}"));
        assert_eq!(err.code(), ErrorCode::Status);
        assert!(!err.is_timeout());
    }

    #[test]
    fn user_message_maps_known_statuses() {
        assert!(http(429).user_message().contains("Too many requests"));
        assert!(http(500).user_message().contains("server error"));
        assert_eq!(http(404).user_message(), "No data was found.");
        assert_eq!(http(403).user_message(), "Access was denied.");
        assert_eq!(http(418).user_message(), "http error 418: ");
        assert_eq!(QiibraryError::Cancelled.user_message(), "request cancelled");
    }
}
