use thiserror::Error;

/// Top-level error type for the `upcloud-api` crate.
///
/// Covers every failure mode of the client: transport, provider-reported
/// API errors, envelope decoding, and state polling. Callers branch on the
/// variant (or on [`Error::kind`]), never on type names.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The API rejected the credentials (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to build the underlying HTTP client.
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),

    // ── Provider ────────────────────────────────────────────────────
    /// Structured error from the API (`{"error": {"error_code", "error_message"}}`).
    #[error("UpCloud API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed. The original parse error is kept as
    /// the source, the raw body is kept for debugging.
    #[error("Deserialization error: {source}")]
    Deserialization {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// A request body could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    // ── Polling ─────────────────────────────────────────────────────
    /// The resource did not reach (or leave) the requested state in time.
    #[error(
        "Timed out after {timeout_secs}s waiting for {resource} to {target} (last state: {})",
        .last_state.as_deref().unwrap_or("unknown")
    )]
    WaitTimeout {
        resource: String,
        target: String,
        last_state: Option<String>,
        timeout_secs: u64,
    },

    /// A wait request named neither or both of desired/undesired state.
    #[error("Invalid wait request: {0}")]
    InvalidWaitRequest(&'static str),
}

/// Coarse classification of [`Error`] for callers that only care about
/// the failure family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Transport,
    Api,
    Decode,
    Timeout,
    Usage,
}

impl Error {
    /// The failure family of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Transport(_) | Self::InvalidUrl(_) | Self::ClientSetup(_) => ErrorKind::Transport,
            Self::Api { .. } => ErrorKind::Api,
            Self::Deserialization { .. } | Self::Serialization(_) => ErrorKind::Decode,
            Self::WaitTimeout { .. } => ErrorKind::Timeout,
            Self::InvalidWaitRequest(_) => ErrorKind::Usage,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Extract the API error code (e.g. `SERVER_NOT_FOUND`), if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_classify_by_status() {
        let not_found = Error::Api {
            status: 404,
            code: Some("SERVER_NOT_FOUND".into()),
            message: "The server does not exist.".into(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_transient());
        assert_eq!(not_found.api_error_code(), Some("SERVER_NOT_FOUND"));
        assert_eq!(not_found.kind(), ErrorKind::Api);

        let unavailable = Error::Api {
            status: 503,
            code: None,
            message: "try again".into(),
        };
        assert!(unavailable.is_transient());
        assert!(!unavailable.is_not_found());
    }

    #[test]
    fn decode_error_keeps_parse_failure_as_source() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let expected = parse.to_string();
        let err = Error::Deserialization {
            source: parse,
            body: "{".into(),
        };

        assert_eq!(err.kind(), ErrorKind::Decode);
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn timeout_message_names_resource_and_last_state() {
        let err = Error::WaitTimeout {
            resource: "server 00798b85".into(),
            target: "reach state started".into(),
            last_state: Some("maintenance".into()),
            timeout_secs: 300,
        };
        let msg = err.to_string();
        assert!(msg.contains("server 00798b85"), "{msg}");
        assert!(msg.contains("maintenance"), "{msg}");
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }
}
