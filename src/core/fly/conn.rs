//! Subprocess execution of the fly binary.

use std::process::{Command, Stdio};

use crate::error::{Error, Result, ToolCommandFailedDetails};
use crate::utils::sanitize::Sanitizer;
use crate::utils::shell;

/// Capability to run one fly action and get its stdout back.
///
/// `args` start with the action name (`login`, `set-pipeline`, ...). The
/// target selection flag is the implementation's concern.
pub trait FlyConn {
    fn run(&self, args: &[String]) -> Result<Vec<u8>>;
}

impl<C: FlyConn + ?Sized> FlyConn for &C {
    fn run(&self, args: &[String]) -> Result<Vec<u8>> {
        (**self).run(args)
    }
}

/// Runs `<binary> -t <target> <args...>` as a child process per call.
#[derive(Debug, Clone)]
pub struct BinaryConn {
    binary_path: String,
    target: String,
    sanitizer: Sanitizer,
}

impl BinaryConn {
    pub fn new(binary_path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            binary_path: shellexpand::tilde(&binary_path.into()).to_string(),
            target: target.into(),
            sanitizer: Sanitizer::new(),
        }
    }

    /// Redact secrets from logged command lines and captured output.
    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }
}

impl FlyConn for BinaryConn {
    fn run(&self, args: &[String]) -> Result<Vec<u8>> {
        if self.target.is_empty() {
            return Err(Error::tool_target_missing());
        }

        let action = args.first().map(String::as_str).unwrap_or_default();
        let mut all_args = vec!["-t".to_string(), self.target.clone()];
        all_args.extend(args.iter().cloned());

        let display = self
            .sanitizer
            .sanitize(&shell::command_line(&self.binary_path, &all_args));

        log_status!("fly", "Starting: {}", display);
        let child = Command::new(&self.binary_path)
            .args(&all_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            // Nothing was captured if the process never started.
            .map_err(|e| Error::tool_spawn_failed(&self.binary_path, action, e.to_string()))?;

        log_status!("fly", "Waiting: {}", display);
        let output = child
            .wait_with_output()
            .map_err(|e| Error::internal_io(e.to_string(), Some(format!("wait for {}", display))))?;

        if !output.status.success() {
            let stdout = self.sanitizer.sanitize(&String::from_utf8_lossy(&output.stdout));
            let stderr = self.sanitizer.sanitize(&String::from_utf8_lossy(&output.stderr));

            return Err(Error::tool_command_failed(
                failure_message(action, &output.status.to_string(), &stderr),
                ToolCommandFailedDetails {
                    command: display,
                    exit_code: output.status.code().unwrap_or(-1),
                    stdout,
                    stderr,
                },
            ));
        }

        Ok(output.stdout)
    }
}

/// `fly <action> failed: <status>`, plus ` - <stderr>` when anything was written there.
pub(crate) fn failure_message(action: &str, status: &str, stderr: &str) -> String {
    let stderr = stderr.trim_end();
    if stderr.is_empty() {
        format!("fly {} failed: {}", action, status)
    } else {
        format!("fly {} failed: {} - {}", action, status, stderr)
    }
}
