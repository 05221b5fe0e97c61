pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, DetectArgs, ShimArgs};
pub use output::{OutputFormat, OutputFormatter, ShimReport};
