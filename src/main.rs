use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{check, out, pipelines};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "pipeline-deploy")]
#[command(version = VERSION)]
#[command(about = "Apply CI pipelines through fly and fingerprint the applied state")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pipelines from a sources directory and print the resulting version
    Out(out::OutArgs),
    /// Print the version of the pipelines currently on the server
    Check(check::CheckArgs),
    /// List pipeline names on the server
    List(pipelines::ListArgs),
    /// Print a pipeline's configuration
    Get(pipelines::GetArgs),
    /// Destroy a pipeline
    Destroy(pipelines::DestroyArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let exit_code = commands::run(cli.command, &cli.global);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
