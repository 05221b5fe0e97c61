//! Command handlers; each returns the process exit code

use super::commands::{BuildArgs, DetectArgs, OutputFormatArg, ShimArgs};
use super::output::{OutputFormat, OutputFormatter, ShimReport};
use crate::build::{Build, BuildRequest, DryRunInstaller};
use crate::config::BundlerpackConfig;
use crate::detect::Detector;
use crate::fs::RealFileSystem;
use crate::log_emitter::LogEmitter;
use crate::plan::BuildPlan;
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

pub const BUILDPACK_NAME: &str = "Bundler Buildpack";

pub fn handle_detect(args: &DetectArgs) -> i32 {
    let app_path = match app_path(args.app_path.as_deref()) {
        Ok(path) => path,
        Err(code) => return code,
    };

    let plan = match detect(&app_path) {
        Ok(plan) => plan,
        Err(code) => return code,
    };

    print_output(
        OutputFormatter::new(args.format.into()).format_plan(&plan),
    )
}

pub fn handle_build(args: &BuildArgs) -> i32 {
    let config = BundlerpackConfig::default();
    let config = BundlerpackConfig {
        default_version: args
            .default_version
            .clone()
            .unwrap_or(config.default_version),
        layers_dir: args.layers_dir.clone().unwrap_or(config.layers_dir),
        ..config
    };
    if let Err(e) = config.validate() {
        error!("{}", e);
        return 1;
    }
    debug!("{}", config);

    let shimmer = match config.shimmer() {
        Ok(shimmer) => shimmer,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    let app_path = match app_path(args.app_path.as_deref()) {
        Ok(path) => path,
        Err(code) => return code,
    };

    let plan = match detect(&app_path) {
        Ok(plan) => plan,
        Err(code) => return code,
    };

    // keep stdout parseable when a machine format is requested
    let emitter = match args.format {
        OutputFormatArg::Human => LogEmitter::stdout(),
        _ => LogEmitter::new(io::stderr()),
    };

    let build = Build::new(shimmer, DryRunInstaller, emitter);
    let request = BuildRequest {
        entries: plan.requires,
        layers_dir: config.layers_dir,
        default_version: config.default_version,
        buildpack_name: BUILDPACK_NAME.to_string(),
        buildpack_version: crate::VERSION.to_string(),
    };

    match build.run(&request) {
        Ok(result) => print_output(OutputFormatter::new(args.format.into()).format_build(&result)),
        Err(e) => {
            error!("Build failed: {}", e);
            1
        }
    }
}

pub fn handle_shim(args: &ShimArgs) -> i32 {
    let shimmer = match BundlerpackConfig::default().shimmer() {
        Ok(shimmer) => shimmer,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    match shimmer.shim(&args.version) {
        Ok(shimmed) => {
            let report = ShimReport {
                requested: args.version.clone(),
                shimmed,
            };
            print_output(OutputFormatter::new(OutputFormat::from(args.format)).format_shim(&report))
        }
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

fn app_path(arg: Option<&Path>) -> Result<PathBuf, i32> {
    let path = match arg {
        Some(path) => path.to_path_buf(),
        None => env::current_dir().map_err(|e| {
            error!("Failed to get current directory: {}", e);
            1
        })?,
    };
    debug!("Application path: {}", path.display());
    Ok(path)
}

fn detect(app_path: &Path) -> Result<BuildPlan, i32> {
    let fs = RealFileSystem::new();
    Detector::new(&fs).detect(app_path).map_err(|e| {
        error!("Detection failed: {}", e);
        1
    })
}

fn print_output(output: anyhow::Result<String>) -> i32 {
    match output {
        Ok(text) => {
            println!("{}", text.trim_end());
            0
        }
        Err(e) => {
            error!("Failed to format output: {:#}", e);
            1
        }
    }
}
