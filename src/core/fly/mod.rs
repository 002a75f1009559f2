//! Pipeline operations driven through the fly CLI.
//!
//! [`FlyCommand`] is the operation set the orchestrator depends on. [`Fly`]
//! implements it by translating each operation into an argument vector for a
//! [`FlyConn`], which owns process execution.

pub mod conn;
pub mod listing;

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub use conn::{BinaryConn, FlyConn};

/// One operation per supported fly action.
pub trait FlyCommand {
    /// `login`, then `sync`. Returns both outputs concatenated.
    fn login(
        &self,
        url: &str,
        team: &str,
        username: &str,
        password: &str,
        insecure: bool,
    ) -> Result<Vec<u8>>;

    /// Names from `fly pipelines`, one per output line (trailing empty entry included).
    fn pipelines(&self) -> Result<Vec<String>>;

    fn get_pipeline(&self, name: &str) -> Result<Vec<u8>>;

    fn set_pipeline(&self, name: &str, config_path: &Path, vars_paths: &[PathBuf])
        -> Result<Vec<u8>>;

    fn unpause_pipeline(&self, name: &str) -> Result<Vec<u8>>;

    fn destroy_pipeline(&self, name: &str) -> Result<Vec<u8>>;
}

pub struct Fly<C: FlyConn> {
    conn: C,
}

impl<C: FlyConn> Fly<C> {
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    fn run(&self, args: Vec<String>) -> Result<Vec<u8>> {
        self.conn.run(&args)
    }
}

impl<C: FlyConn> FlyCommand for Fly<C> {
    fn login(
        &self,
        url: &str,
        team: &str,
        username: &str,
        password: &str,
        insecure: bool,
    ) -> Result<Vec<u8>> {
        let args = login_args(url, team, username, password, insecure);

        let mut output = self.run(args).map_err(|e| e.into_auth_failure())?;
        let sync_output = self
            .run(vec!["sync".to_string()])
            .map_err(|e| e.into_auth_failure())?;

        output.extend(sync_output);
        Ok(output)
    }

    fn pipelines(&self) -> Result<Vec<String>> {
        let output = self.run(vec!["pipelines".to_string()])?;
        Ok(listing::parse_pipeline_names(&String::from_utf8_lossy(
            &output,
        )))
    }

    fn get_pipeline(&self, name: &str) -> Result<Vec<u8>> {
        self.run(vec![
            "get-pipeline".to_string(),
            "-p".to_string(),
            name.to_string(),
        ])
    }

    fn set_pipeline(
        &self,
        name: &str,
        config_path: &Path,
        vars_paths: &[PathBuf],
    ) -> Result<Vec<u8>> {
        let mut args = vec![
            "set-pipeline".to_string(),
            "-n".to_string(),
            "-p".to_string(),
            name.to_string(),
            "-c".to_string(),
            path_arg(config_path)?,
        ];

        for vars_path in vars_paths {
            args.push("-l".to_string());
            args.push(path_arg(vars_path)?);
        }

        self.run(args)
    }

    fn unpause_pipeline(&self, name: &str) -> Result<Vec<u8>> {
        self.run(vec![
            "unpause-pipeline".to_string(),
            "-p".to_string(),
            name.to_string(),
        ])
    }

    fn destroy_pipeline(&self, name: &str) -> Result<Vec<u8>> {
        self.run(vec![
            "destroy-pipeline".to_string(),
            "-n".to_string(),
            "-p".to_string(),
            name.to_string(),
        ])
    }
}

/// Credentials are only passed when both are present; otherwise fly falls
/// back to the team's default auth.
fn login_args(url: &str, team: &str, username: &str, password: &str, insecure: bool) -> Vec<String> {
    let mut args = vec![
        "login".to_string(),
        "-c".to_string(),
        url.to_string(),
        "-n".to_string(),
        team.to_string(),
    ];

    if !username.is_empty() && !password.is_empty() {
        args.extend([
            "-u".to_string(),
            username.to_string(),
            "-p".to_string(),
            password.to_string(),
        ]);
    }

    if insecure {
        args.push("-k".to_string());
    }

    args
}

/// Fly takes paths as UTF-8 arguments; anything else is rejected rather than mangled.
fn path_arg(path: &Path) -> Result<String> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        Error::validation_invalid_argument(
            "path",
            "Path is not valid UTF-8",
            Some(path.to_string_lossy().into_owned()),
        )
    })
}
