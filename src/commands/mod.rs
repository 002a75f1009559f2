use clap::Args;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;

use pipeline_deploy::defaults::{self, Defaults};
use pipeline_deploy::fly::{BinaryConn, Fly};
use pipeline_deploy::request::Source;
use pipeline_deploy::utils::sanitize::Sanitizer;

pub type CmdResult<T> = pipeline_deploy::Result<(T, i32)>;

pub const PASSWORD_PLACEHOLDER: &str = "***REDACTED-PASSWORD***";

/// Flags shared by every subcommand.
#[derive(Args, Debug, Default)]
pub(crate) struct GlobalArgs {
    /// JSON config file with a `defaults` object
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Path to the fly binary (overrides the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub fly: Option<String>,

    /// Local fly target name (overrides the config file)
    #[arg(long, global = true, value_name = "ALIAS")]
    pub target_alias: Option<String>,
}

impl GlobalArgs {
    /// Built-ins, then the config file, then flags.
    pub fn defaults(&self) -> pipeline_deploy::Result<Defaults> {
        let mut defaults = defaults::load_defaults(self.config.as_deref())?;

        if let Some(fly) = &self.fly {
            defaults.fly_binary_path = fly.clone();
        }
        if let Some(alias) = &self.target_alias {
            defaults.target_alias = alias.clone();
        }

        Ok(defaults)
    }

    /// A fly adapter bound to the configured binary and target alias.
    pub fn fly(&self, sanitizer: &Sanitizer) -> pipeline_deploy::Result<Fly<BinaryConn>> {
        let defaults = self.defaults()?;
        let conn = BinaryConn::new(defaults.fly_binary_path, defaults.target_alias)
            .with_sanitizer(sanitizer.clone());
        Ok(Fly::new(conn))
    }
}

/// Redacts the source password from everything written for this run.
pub fn sanitizer_for(source: &Source) -> Sanitizer {
    Sanitizer::new().with_secret(source.password.clone(), PASSWORD_PLACEHOLDER)
}

// ============================================================================
// JSON Input Parsing (CLI layer)
// ============================================================================

/// Read JSON spec from string, file (@path), or stdin (-).
fn read_json_spec_to_string(spec: &str) -> pipeline_deploy::Result<String> {
    if spec.trim() == "-" {
        let mut buf = String::new();
        if crate::tty::is_stdin_tty() {
            return Err(pipeline_deploy::Error::validation_invalid_argument(
                "request",
                "Cannot read request JSON from stdin when stdin is a TTY",
                None,
            ));
        }
        std::io::stdin().read_to_string(&mut buf).map_err(|e| {
            pipeline_deploy::Error::internal_io(e.to_string(), Some("read stdin".to_string()))
        })?;
        return Ok(buf);
    }

    if let Some(path) = spec.strip_prefix('@') {
        if path.trim().is_empty() {
            return Err(pipeline_deploy::Error::validation_invalid_argument(
                "request",
                "Invalid request spec '@' (missing file path)",
                None,
            ));
        }
        return std::fs::read_to_string(Path::new(path)).map_err(|e| {
            pipeline_deploy::Error::internal_io(e.to_string(), Some(format!("read {}", path)))
        });
    }

    Ok(spec.to_string())
}

/// Parse a request from inline JSON, `@file`, or `-` (stdin).
pub fn read_request<T: DeserializeOwned>(spec: &str) -> pipeline_deploy::Result<T> {
    let raw = read_json_spec_to_string(spec)?;
    serde_json::from_str(&raw).map_err(|e| {
        pipeline_deploy::Error::validation_invalid_json(e, Some("parse request".to_string()))
    })
}

pub mod check;
pub mod out;
pub mod pipelines;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident, $handler:ident) => {
        crate::output::map_cmd_result_to_json($module::$handler($args, $global))
    };
}

/// Run a command and print its response. Returns the process exit code.
///
/// `out` and `check` print the bare protocol response themselves; everything
/// else is wrapped in the JSON envelope.
pub(crate) fn run(command: crate::Commands, global: &GlobalArgs) -> i32 {
    let (json_result, exit_code) = match command {
        crate::Commands::Out(args) => return out::run(args, global),
        crate::Commands::Check(args) => return check::run(args, global),

        crate::Commands::List(args) => dispatch!(args, global, pipelines, list),
        crate::Commands::Get(args) => dispatch!(args, global, pipelines, get),
        crate::Commands::Destroy(args) => dispatch!(args, global, pipelines, destroy),
    };

    let _ = crate::output::print_json_result(json_result);
    exit_code
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline_deploy::request::OutRequest;

    #[test]
    fn inline_request_is_parsed() {
        let request: OutRequest = read_request(
            r#"{"source": {"target": "https://ci", "username": "u", "password": "p"}}"#,
        )
        .unwrap();
        assert_eq!(request.source.target, "https://ci");
        assert!(request.params.pipelines.is_none());
    }

    #[test]
    fn request_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(&path, r#"{"source": {"target": "https://ci"}}"#).unwrap();

        let request: OutRequest = read_request(&format!("@{}", path.display())).unwrap();
        assert_eq!(request.source.target, "https://ci");
    }

    #[test]
    fn invalid_request_json_is_validation_error() {
        let err = read_request::<OutRequest>("{").unwrap_err();
        assert_eq!(err.code, pipeline_deploy::ErrorCode::ValidationInvalidJson);
    }

    #[test]
    fn flags_override_defaults() {
        let global = GlobalArgs {
            config: None,
            fly: Some("/opt/resource/fly".to_string()),
            target_alias: None,
        };
        let defaults = global.defaults().unwrap();
        assert_eq!(defaults.fly_binary_path, "/opt/resource/fly");
        assert_eq!(defaults.target_alias, "pipeline-deploy-target");
    }

    #[test]
    fn envelope_command_with_bad_request_exits_2() {
        let command = crate::Commands::List(pipelines::ListArgs {
            request: "{".to_string(),
        });
        assert_eq!(run(command, &GlobalArgs::default()), 2);
    }

    #[test]
    fn protocol_command_with_bad_request_exits_2() {
        let command = crate::Commands::Out(out::OutArgs {
            sources_dir: std::path::PathBuf::from("."),
            request: "{".to_string(),
        });
        assert_eq!(run(command, &GlobalArgs::default()), 2);
    }

    #[test]
    fn protocol_command_validates_before_fly() {
        let global = GlobalArgs {
            fly: Some("/nonexistent/fly".to_string()),
            ..GlobalArgs::default()
        };
        let command = crate::Commands::Check(check::CheckArgs {
            request: r#"{"source": {"target": "https://ci", "username": "u"}}"#.to_string(),
        });
        assert_eq!(run(command, &global), 2);
    }

    #[test]
    fn sanitizer_redacts_source_password() {
        let source = Source {
            password: "hunter2".to_string(),
            ..Source::default()
        };
        assert_eq!(
            sanitizer_for(&source).sanitize("-p hunter2"),
            format!("-p {}", PASSWORD_PLACEHOLDER)
        );
    }
}
