//! CLI error types with miette diagnostics.
//!
//! Maps `upcloud_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use upcloud_api::ErrorKind;
use upcloud_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the UpCloud API")]
    #[diagnostic(
        code(upcloud::connection_failed),
        help("Check your network connection and the profile's api_url.")
    )]
    ConnectionFailed {
        #[source]
        source: upcloud_api::Error,
    },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(upcloud::auth_failed),
        help(
            "Verify the API username and password.\n\
             API access must be enabled for the account in the UpCloud control panel."
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(upcloud::no_credentials),
        help(
            "Set UPCLOUD_USERNAME and UPCLOUD_PASSWORD, or add username/password_env\n\
             to the profile in your config file."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(upcloud::not_found),
        help("Run: upcloud {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({code}, HTTP {status}): {message}")]
    #[diagnostic(code(upcloud::api_error))]
    ApiError {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Unexpected response from the API")]
    #[diagnostic(
        code(upcloud::decode),
        help("Run with -vvv to log the raw response body.")
    )]
    Decode {
        #[source]
        source: upcloud_api::Error,
    },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Timed out after {seconds}s waiting for {resource} to {target}")]
    #[diagnostic(
        code(upcloud::timeout),
        help("Last observed state: {last_state}. Increase the limit with --wait-timeout.")
    )]
    Timeout {
        resource: String,
        target: String,
        last_state: String,
        seconds: u64,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(upcloud::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(upcloud::profile_not_found),
        help("Available profiles: {available}\nConfig file: {path}")
    )]
    ProfileNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error(transparent)]
    #[diagnostic(code(upcloud::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(upcloud::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. }
            | Self::NoCredentials { .. }
            | Self::Config(ConfigError::NoCredentials { .. }) => exit_code::AUTH,
            Self::NotFound { .. } | Self::ApiError { status: 404, .. } => exit_code::NOT_FOUND,
            Self::ApiError { status: 403, .. } => exit_code::PERMISSION,
            Self::ApiError { status: 409, .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Library errors → CliError ────────────────────────────────────────

impl From<upcloud_api::Error> for CliError {
    fn from(err: upcloud_api::Error) -> Self {
        use upcloud_api::Error as E;

        match err {
            E::Authentication { message } => CliError::AuthFailed { message },

            E::Api {
                status,
                code,
                message,
            } => CliError::ApiError {
                status,
                code: code.unwrap_or_default(),
                message,
            },

            E::WaitTimeout {
                resource,
                target,
                last_state,
                timeout_secs,
            } => CliError::Timeout {
                resource,
                target,
                last_state: last_state.unwrap_or_else(|| "unknown".into()),
                seconds: timeout_secs,
            },

            E::InvalidWaitRequest(reason) => CliError::Validation {
                field: "state".into(),
                reason: reason.into(),
            },

            other => match other.kind() {
                ErrorKind::Decode => CliError::Decode { source: other },
                _ => CliError::ConnectionFailed { source: other },
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}

/// Turn a provider 404 into a `NotFound` naming the resource.
pub fn not_found(
    err: upcloud_api::Error,
    resource_type: &str,
    identifier: &str,
    list_command: &str,
) -> CliError {
    if err.is_not_found() {
        CliError::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
            list_command: list_command.into(),
        }
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_map_to_exit_codes() {
        let auth: CliError = upcloud_api::Error::Authentication {
            message: "bad password".into(),
        }
        .into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let timeout: CliError = upcloud_api::Error::WaitTimeout {
            resource: "server abc".into(),
            target: "reach state started".into(),
            last_state: None,
            timeout_secs: 300,
        }
        .into();
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let missing = not_found(
            upcloud_api::Error::Api {
                status: 404,
                code: Some("SERVER_NOT_FOUND".into()),
                message: "The server abc does not exist.".into(),
            },
            "server",
            "abc",
            "servers list",
        );
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
        assert!(missing.to_string().contains("'abc'"));
    }

    #[test]
    fn missing_credentials_exit_as_auth() {
        let err: CliError = ConfigError::NoCredentials {
            profile: "default".into(),
        }
        .into();
        assert!(matches!(err, CliError::NoCredentials { .. }));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
