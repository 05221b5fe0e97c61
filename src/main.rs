use bundlerpack::cli::commands::{CliArgs, Commands};
use bundlerpack::cli::handlers::{handle_build, handle_detect, handle_shim};
use bundlerpack::util::logging::{init_from_env, init_logging, parse_level, LoggingConfig};
use bundlerpack::VERSION;

use clap::Parser;
use tracing::{debug, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("bundlerpack v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Detect(detect_args) => handle_detect(detect_args),
        Commands::Build(build_args) => handle_build(build_args),
        Commands::Shim(shim_args) => handle_shim(shim_args),
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        init_from_env();
        return;
    };

    init_logging(LoggingConfig::with_level(level));
}
