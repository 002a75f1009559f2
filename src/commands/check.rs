use clap::Args;

use pipeline_deploy::check;
use pipeline_deploy::request::{CheckRequest, Version};
use pipeline_deploy::utils::sanitize::Sanitizer;

use super::GlobalArgs;

#[derive(Args)]
pub struct CheckArgs {
    /// Request JSON: inline, @file, or - for stdin
    #[arg(long, value_name = "SPEC", default_value = "-")]
    pub request: String,
}

pub fn run(args: CheckArgs, global: &GlobalArgs) -> i32 {
    let request: CheckRequest = match super::read_request(&args.request) {
        Ok(request) => request,
        Err(err) => {
            return crate::output::print_protocol_result::<Vec<Version>>(Err(err), &Sanitizer::new())
        }
    };

    let sanitizer = super::sanitizer_for(&request.source);
    let result = current(request, global, &sanitizer);
    crate::output::print_protocol_result(result, &sanitizer)
}

fn current(
    request: CheckRequest,
    global: &GlobalArgs,
    sanitizer: &Sanitizer,
) -> pipeline_deploy::Result<Vec<Version>> {
    let defaults = global.defaults()?;
    let source = request.source.with_default_team(&defaults.team);
    let fly = global.fly(sanitizer)?;

    check::current_version(&fly, &source)
}
