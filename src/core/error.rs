use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidValue,

    ValidationMissingArgument,
    ValidationInvalidArgument,
    ValidationInvalidJson,

    AuthLoginFailed,

    ToolTargetMissing,
    ToolSpawnFailed,
    ToolCommandFailed,

    TransportRequestFailed,
    TransportBadStatus,

    PipelineNotFound,

    InternalIoError,
    InternalJsonError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationMissingArgument => "validation.missing_argument",
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidJson => "validation.invalid_json",

            ErrorCode::AuthLoginFailed => "auth.login_failed",

            ErrorCode::ToolTargetMissing => "tool.target_missing",
            ErrorCode::ToolSpawnFailed => "tool.spawn_failed",
            ErrorCode::ToolCommandFailed => "tool.command_failed",

            ErrorCode::TransportRequestFailed => "transport.request_failed",
            ErrorCode::TransportBadStatus => "transport.bad_status",

            ErrorCode::PipelineNotFound => "pipeline.not_found",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
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

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingArgumentDetails {
    pub field: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Captured state of a fly invocation that exited unsuccessfully.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCommandFailedDetails {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpawnFailedDetails {
    pub binary: String,
    pub action: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportBadStatusDetails {
    pub url: String,
    pub status: u16,
    pub body: String,
}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

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

    /// A required request field is empty or absent. The message names the field.
    pub fn validation_missing_argument(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{} must be provided", field);
        Self::new(
            ErrorCode::ValidationMissingArgument,
            message,
            to_details(MissingArgumentDetails { field }),
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
    ) -> Self {
        let field = field.into();
        let problem = problem.into();
        let message = format!("Invalid {}: {}", field, problem);

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            message,
            to_details(InvalidArgumentDetails { field, problem, id }),
        )
    }

    pub fn validation_invalid_json(err: serde_json::Error, context: Option<String>) -> Self {
        let details = serde_json::json!({
            "error": err.to_string(),
            "context": context,
        });

        Self::new(
            ErrorCode::ValidationInvalidJson,
            format!("Invalid JSON: {}", err),
            details,
        )
    }

    pub fn tool_target_missing() -> Self {
        Self::new(
            ErrorCode::ToolTargetMissing,
            "target cannot be empty when running fly",
            Value::Object(serde_json::Map::new()),
        )
        .with_hint("Set 'targetAlias' in the config file or pass --target-alias")
    }

    pub fn tool_spawn_failed(
        binary: impl Into<String>,
        action: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let binary = binary.into();
        let action = action.into();
        let error = error.into();
        let message = format!("fly {} failed to start ({}): {}", action, binary, error);

        Self::new(
            ErrorCode::ToolSpawnFailed,
            message,
            to_details(ToolSpawnFailedDetails {
                binary,
                action,
                error,
            }),
        )
    }

    pub fn tool_command_failed(message: impl Into<String>, details: ToolCommandFailedDetails) -> Self {
        Self::new(ErrorCode::ToolCommandFailed, message, to_details(details))
    }

    pub fn transport_request_failed(url: &str, error: impl Into<String>) -> Self {
        let error = error.into();
        Self::new(
            ErrorCode::TransportRequestFailed,
            format!("HTTP request to {} failed: {}", url, error),
            serde_json::json!({ "url": url, "error": error }),
        )
    }

    pub fn transport_bad_status(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        let url = url.into();
        let message = format!("Unexpected HTTP {} from {}", status, url);

        Self::new(
            ErrorCode::TransportBadStatus,
            message,
            to_details(TransportBadStatusDetails {
                url,
                status,
                body: body.into(),
            }),
        )
    }

    pub fn pipeline_not_found(name: impl Into<String>, team: &str) -> Self {
        let name = name.into();
        Self::new(
            ErrorCode::PipelineNotFound,
            format!("Pipeline '{}' not found in team '{}' after apply", name, team),
            serde_json::json!({ "id": name, "team": team }),
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let problem = problem.into();
        let details = serde_json::json!({
            "key": key,
            "value": value,
            "problem": problem,
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            format!("Invalid configuration value for {}: {}", key, problem),
            details,
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let error = error.into();
        let message = match &context {
            Some(ctx) => format!("IO error ({}): {}", ctx, error),
            None => format!("IO error: {}", error),
        };

        Self::new(
            ErrorCode::InternalIoError,
            message,
            to_details(InternalIoErrorDetails { error, context }),
        )
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let error = error.into();
        let message = match &context {
            Some(ctx) => format!("JSON error ({}): {}", ctx, error),
            None => format!("JSON error: {}", error),
        };

        Self::new(
            ErrorCode::InternalJsonError,
            message,
            to_details(InternalJsonErrorDetails { error, context }),
        )
    }

    /// Re-code a login or sync failure, keeping its message and captured output.
    pub fn into_auth_failure(self) -> Self {
        Self {
            code: ErrorCode::AuthLoginFailed,
            ..self
        }
        .with_hint("Check the source target, team, username and password")
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}
