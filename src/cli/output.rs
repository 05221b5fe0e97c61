//! Output formatting for CLI results
//!
//! JSON and YAML are the serde renderings of the result types; the human
//! format is a short summary meant for a terminal.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Write as _;

use crate::build::BuildResult;
use crate::plan::BuildPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Result of shimming a single version from the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShimReport {
    pub requested: String,
    pub shimmed: String,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_plan(&self, plan: &BuildPlan) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(plan, "build plan"),
            OutputFormat::Yaml => to_yaml(plan, "build plan"),
            OutputFormat::Human => Ok(human_plan(plan)),
        }
    }

    pub fn format_build(&self, result: &BuildResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(result, "build result"),
            OutputFormat::Yaml => to_yaml(result, "build result"),
            OutputFormat::Human => Ok(human_build(result)),
        }
    }

    pub fn format_shim(&self, report: &ShimReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "shim result"),
            OutputFormat::Yaml => to_yaml(report, "shim result"),
            OutputFormat::Human => Ok(report.shimmed.clone()),
        }
    }
}

fn to_json<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value).with_context(|| format!("Failed to serialize {} to JSON", what))
}

fn to_yaml<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
}

fn human_plan(plan: &BuildPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Provides: {}", plan.provides.join(", "));

    if plan.requires.is_empty() {
        let _ = writeln!(out, "Requires: (no version requested)");
        return out;
    }

    let _ = writeln!(out, "Requires:");
    for entry in &plan.requires {
        let _ = writeln!(
            out,
            "  {} {} (from {})",
            entry.name,
            entry.version().unwrap_or("*"),
            entry.source()
        );
    }
    out
}

fn human_build(result: &BuildResult) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Installed {} {} into {}",
        result.dependency.name,
        result.dependency.version,
        result.layer.path.display()
    );
    let _ = writeln!(
        out,
        "Layer flags: build={} launch={} cache={}",
        result.layer.build, result.layer.launch, result.layer.cache
    );
    out
}
