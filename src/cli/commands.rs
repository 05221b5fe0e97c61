use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Bundler buildpack: pick the Bundler version an application needs
#[derive(Parser, Debug)]
#[command(
    name = "bundlerpack",
    about = "Bundler buildpack: pick the Bundler version an application needs",
    version,
    author,
    long_about = "bundlerpack reads buildpack.yml and Gemfile.lock, ranks the Bundler \
                  versions they request, and turns the winner into a version the \
                  installer can consume."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "List the Bundler versions an application requests",
        long_about = "Reads buildpack.yml and Gemfile.lock and prints the resulting build plan.\n\n\
                      Examples:\n  \
                      bundlerpack detect\n  \
                      bundlerpack detect /path/to/app --format json"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Resolve and shim the Bundler version, then dry-run the install",
        long_about = "Runs detection, resolves the requested versions by source priority, \
                      shims the winner and reports the install and environment it would \
                      produce.\n\n\
                      Examples:\n  \
                      bundlerpack build\n  \
                      bundlerpack build /path/to/app --layers-dir /layers"
    )]
    Build(BuildArgs),

    #[command(
        about = "Shim a single version string",
        long_about = "Prints the installer-ready form of a version.\n\n\
                      Examples:\n  \
                      bundlerpack shim 2.1\n  \
                      bundlerpack shim '2.*'"
    )]
    Shim(ShimArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the application (defaults to current directory)"
    )]
    pub app_path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the application (defaults to current directory)"
    )]
    pub app_path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, value_name = "DIR", help = "Directory layers are created in")]
    pub layers_dir: Option<PathBuf>,

    #[arg(
        long,
        value_name = "VERSION",
        help = "Version to install when nothing requests one"
    )]
    pub default_version: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ShimArgs {
    #[arg(value_name = "VERSION", help = "Version to shim")]
    pub version: String,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
