//! Single-shot pipeline operations: log in, run one fly action, report.

use clap::Args;
use serde::{Deserialize, Serialize};

use pipeline_deploy::request::Source;
use pipeline_deploy::session::{PipelineConfig, Session};

use super::{CmdResult, GlobalArgs};

#[derive(Args)]
pub struct ListArgs {
    /// Request JSON with a `source` object: inline, @file, or - for stdin
    #[arg(long, value_name = "SPEC", default_value = "-")]
    pub request: String,
}

#[derive(Args)]
pub struct GetArgs {
    /// Pipeline name
    pub name: String,

    /// Request JSON with a `source` object: inline, @file, or - for stdin
    #[arg(long, value_name = "SPEC", default_value = "-")]
    pub request: String,
}

#[derive(Args)]
pub struct DestroyArgs {
    /// Pipeline name
    pub name: String,

    /// Request JSON with a `source` object: inline, @file, or - for stdin
    #[arg(long, value_name = "SPEC", default_value = "-")]
    pub request: String,
}

#[derive(Deserialize)]
struct SourceRequest {
    source: Source,
}

#[derive(Serialize)]
pub struct ListOutput {
    pub team: String,
    pub pipelines: Vec<String>,
}

#[derive(Serialize)]
pub struct DestroyOutput {
    pub name: String,
    pub destroyed: bool,
    pub output: String,
}

/// Parse the request and run `f` on a logged-in session.
fn with_session<T>(
    spec: &str,
    global: &GlobalArgs,
    f: impl FnOnce(&Session) -> pipeline_deploy::Result<T>,
) -> pipeline_deploy::Result<T> {
    crate::tty::status("pipeline-deploy is working...");

    let defaults = global.defaults()?;
    let request: SourceRequest = super::read_request(spec)?;
    let source = request.source.with_default_team(&defaults.team);

    let fly = global.fly(&super::sanitizer_for(&source))?;
    let session = Session::open(&fly, &source)?;
    f(&session)
}

pub fn list(args: ListArgs, global: &GlobalArgs) -> CmdResult<ListOutput> {
    let output = with_session(&args.request, global, |session| {
        Ok(ListOutput {
            team: session.team().to_string(),
            pipelines: session.list()?,
        })
    })?;

    Ok((output, 0))
}

pub fn get(args: GetArgs, global: &GlobalArgs) -> CmdResult<PipelineConfig> {
    let config = with_session(&args.request, global, |session| session.get(&args.name))?;
    Ok((config, 0))
}

pub fn destroy(args: DestroyArgs, global: &GlobalArgs) -> CmdResult<DestroyOutput> {
    let output = with_session(&args.request, global, |session| session.destroy(&args.name))?;

    Ok((
        DestroyOutput {
            name: args.name,
            destroyed: true,
            output,
        },
        0,
    ))
}
