use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigFileNotFound,
    ConfigInvalidJson,

    ValidationMissingArgument,
    ValidationInvalidArgument,
    ValidationInvalidJson,

    SshAuthNotConfigured,
    SshIdentityFileNotFound,
    SshAuthFailed,
    SshConnectFailed,
    SshNotConnected,

    RemoteCommandFailed,
    RemoteCommandTimeout,

    TransferLocalPathMissing,
    TransferFailed,

    HealthRequestFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigFileNotFound => "config.file_not_found",
            ErrorCode::ConfigInvalidJson => "config.invalid_json",

            ErrorCode::ValidationMissingArgument => "validation.missing_argument",
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidJson => "validation.invalid_json",

            ErrorCode::SshAuthNotConfigured => "ssh.auth_not_configured",
            ErrorCode::SshIdentityFileNotFound => "ssh.identity_file_not_found",
            ErrorCode::SshAuthFailed => "ssh.auth_failed",
            ErrorCode::SshConnectFailed => "ssh.connect_failed",
            ErrorCode::SshNotConnected => "ssh.not_connected",

            ErrorCode::RemoteCommandFailed => "remote.command_failed",
            ErrorCode::RemoteCommandTimeout => "remote.command_timeout",

            ErrorCode::TransferLocalPathMissing => "transfer.local_path_missing",
            ErrorCode::TransferFailed => "transfer.failed",

            ErrorCode::HealthRequestFailed => "health.request_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SshTargetDetails {
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCommandFailedDetails {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub target: SshTargetDetails,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferFailedDetails {
    pub local_path: String,
    pub remote_path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingArgumentDetails {
    pub args: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_missing_argument(args: Vec<String>) -> Self {
        let details = serde_json::to_value(MissingArgumentDetails { args })
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        Self::new(
            ErrorCode::ValidationMissingArgument,
            "Missing required argument",
            details,
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        let details = serde_json::to_value(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            value,
        })
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn validation_invalid_json(err: serde_json::Error, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": err.to_string(),
            "context": context,
        });

        Self::new(ErrorCode::ValidationInvalidJson, "Invalid JSON", details)
    }

    pub fn config_file_not_found(path: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ConfigFileNotFound,
            "Configuration file not found",
            serde_json::json!({ "path": path.into() }),
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration file",
            serde_json::json!({ "path": path.into(), "error": err.to_string() }),
        )
    }

    pub fn ssh_auth_not_configured() -> Self {
        Self::new(
            ErrorCode::SshAuthNotConfigured,
            "Neither a password nor a private key is configured",
            Value::Object(serde_json::Map::new()),
        )
        .with_hint("Provide --password or --key to authenticate")
    }

    pub fn ssh_identity_file_not_found(path: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::SshIdentityFileNotFound,
            "SSH identity file not found",
            serde_json::json!({ "identityFile": path.into() }),
        )
    }

    pub fn ssh_auth_failed(target: SshTargetDetails, detail: impl Into<String>) -> Self {
        let mut details = serde_json::to_value(target)
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        if let Value::Object(ref mut map) = details {
            map.insert("error".to_string(), Value::String(detail.into()));
        }
        Self::new(ErrorCode::SshAuthFailed, "SSH authentication failed", details)
    }

    pub fn ssh_connect_failed(target: SshTargetDetails, detail: impl Into<String>) -> Self {
        let mut details = serde_json::to_value(target)
            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
        if let Value::Object(ref mut map) = details {
            map.insert("error".to_string(), Value::String(detail.into()));
        }
        Self::new(ErrorCode::SshConnectFailed, "SSH connection failed", details)
    }

    pub fn ssh_not_connected(host: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::SshNotConnected,
            "Session is not connected",
            serde_json::json!({ "host": host.into() }),
        )
    }

    pub fn remote_command_failed(details: RemoteCommandFailedDetails) -> Self {
        let details =
            serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(
            ErrorCode::RemoteCommandFailed,
            "Remote command failed",
            details,
        )
    }

    pub fn remote_command_timeout(command: impl Into<String>, timeout_secs: u64) -> Self {
        Self::new(
            ErrorCode::RemoteCommandTimeout,
            "Remote command timed out",
            serde_json::json!({ "command": command.into(), "timeoutSeconds": timeout_secs }),
        )
    }

    pub fn transfer_local_path_missing(path: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::TransferLocalPathMissing,
            "Local path does not exist",
            serde_json::json!({ "localPath": path.into() }),
        )
    }

    pub fn transfer_failed(details: TransferFailedDetails) -> Self {
        let details =
            serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

        Self::new(ErrorCode::TransferFailed, "File transfer failed", details)
    }

    pub fn health_request_failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::HealthRequestFailed,
            "Health check request failed",
            serde_json::json!({ "url": url.into(), "error": error.into() }),
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalIoError,
            "IO error",
            serde_json::json!({ "error": error.into(), "context": context }),
        )
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalJsonError,
            "JSON error",
            serde_json::json!({ "error": error.into(), "context": context }),
        )
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}
