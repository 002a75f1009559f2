//! CLI response formatting and output.
//!
//! Two shapes: the `{success, data | error}` envelope for single-shot
//! commands, and the bare resource-protocol response for `out`/`check`,
//! where errors go to stderr instead.

use pipeline_deploy::error::Hint;
use pipeline_deploy::utils::sanitize::Sanitizer;
use pipeline_deploy::{Error, ErrorCode, Result};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Debug, Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CliError>,
}

#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<Hint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl<T: Serialize> CliResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn to_json(&self) -> Result<String> {
        to_pretty_json(self)
    }
}

impl CliResponse<()> {
    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(CliError {
                code: err.code.as_str().to_string(),
                message: err.message.clone(),
                details: err.details.clone(),
                hints: if err.hints.is_empty() {
                    None
                } else {
                    Some(err.hints.clone())
                },
                retryable: err.retryable,
            }),
        }
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| Error::internal_json(e.to_string(), Some("serialize response".to_string())))
}

fn write_stdout(payload: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", payload) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(()); // Exit gracefully on SIGPIPE
        }
        return Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        ));
    }
    Ok(())
}

fn print_response<T: Serialize>(response: &CliResponse<T>) -> Result<()> {
    write_stdout(&response.to_json()?)
}

pub fn print_json_result(result: Result<serde_json::Value>) -> Result<()> {
    match result {
        Ok(data) => print_response(&CliResponse::success(data)),
        Err(err) => print_response(&CliResponse::<()>::from_error(&err)),
    }
}

/// Print a protocol response to stdout, or the error to stderr through the
/// sanitizer. Returns the process exit code.
pub fn print_protocol_result<T: Serialize>(result: Result<T>, sanitizer: &Sanitizer) -> i32 {
    let outcome = result.and_then(|data| write_stdout(&to_pretty_json(&data)?));

    match outcome {
        Ok(()) => 0,
        Err(err) => {
            let mut stderr = sanitizer.writer(io::stderr());
            let _ = stderr.write_all(render_error(&err).as_bytes());
            exit_code_for_error(err.code)
        }
    }
}

fn render_error(err: &Error) -> String {
    let mut text = format!("error [{}]: {}\n", err.code.as_str(), err.message);
    for hint in &err.hints {
        text.push_str(&format!("hint: {}\n", hint.message));
    }
    if let Some(stderr) = err.details.get("stderr").and_then(|v| v.as_str()) {
        if !stderr.trim().is_empty() {
            text.push_str(&format!("fly stderr:\n{}\n", stderr.trim_end()));
        }
    }
    text
}

pub fn map_cmd_result_to_json<T: Serialize>(
    result: Result<(T, i32)>,
) -> (Result<serde_json::Value>, i32) {
    match result {
        Ok((data, exit_code)) => match serde_json::to_value(data) {
            Ok(value) => (Ok(value), exit_code),
            Err(err) => (
                Err(Error::internal_json(
                    err.to_string(),
                    Some("serialize response".to_string()),
                )),
                1,
            ),
        },
        Err(err) => {
            let exit_code = exit_code_for_error(err.code);
            (Err(err), exit_code)
        }
    }
}

fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ConfigInvalidValue
        | ErrorCode::ValidationMissingArgument
        | ErrorCode::ValidationInvalidArgument
        | ErrorCode::ValidationInvalidJson => 2,

        ErrorCode::PipelineNotFound => 4,

        ErrorCode::AuthLoginFailed => 10,

        ErrorCode::ToolTargetMissing
        | ErrorCode::ToolSpawnFailed
        | ErrorCode::ToolCommandFailed
        | ErrorCode::TransportRequestFailed
        | ErrorCode::TransportBadStatus => 20,

        ErrorCode::InternalIoError | ErrorCode::InternalJsonError => 1,
    }
}
