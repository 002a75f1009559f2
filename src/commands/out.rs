use clap::Args;
use std::io::Write;
use std::path::PathBuf;

use pipeline_deploy::api::ApiClient;
use pipeline_deploy::deploy::Deployer;
use pipeline_deploy::request::{OutRequest, OutResponse};
use pipeline_deploy::utils::sanitize::Sanitizer;

use super::GlobalArgs;

#[derive(Args)]
pub struct OutArgs {
    /// Directory that pipeline config and vars paths are relative to
    pub sources_dir: PathBuf,

    /// Request JSON: inline, @file, or - for stdin
    #[arg(long, value_name = "SPEC", default_value = "-")]
    pub request: String,
}

pub fn run(args: OutArgs, global: &GlobalArgs) -> i32 {
    let request: OutRequest = match super::read_request(&args.request) {
        Ok(request) => request,
        Err(err) => {
            return crate::output::print_protocol_result::<OutResponse>(Err(err), &Sanitizer::new())
        }
    };

    let sanitizer = super::sanitizer_for(&request.source);
    let result = deploy(&args, request, global, &sanitizer);
    crate::output::print_protocol_result(result, &sanitizer)
}

fn deploy(
    args: &OutArgs,
    request: OutRequest,
    global: &GlobalArgs,
    sanitizer: &Sanitizer,
) -> pipeline_deploy::Result<OutResponse> {
    let defaults = global.defaults()?;
    let request = OutRequest {
        source: request.source.with_default_team(&defaults.team),
        ..request
    };
    let pipelines = request.validate()?;

    let mut log = sanitizer.writer(std::io::stderr());
    let _ = writeln!(
        log,
        "Deploying {} pipeline(s) to {} (team {})",
        pipelines.len(),
        request.source.target,
        request.source.team_name()
    );

    let fly = global.fly(sanitizer)?;
    let lister = ApiClient::from_source(&request.source)?;
    let response = Deployer::new(&fly, &args.sources_dir).run(&request, &lister)?;

    let _ = writeln!(log, "Pipelines checksum: {}", response.version.pipelines_checksum);
    Ok(response)
}
