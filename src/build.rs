//! Build: resolve the plan, shim the version, install, export environment
//!
//! Installing is delegated to a [`DependencyInstaller`]; this module only
//! decides what to install and where, and reports it through the
//! [`LogEmitter`].

use crate::log_emitter::{display_name, LogEmitter};
use crate::plan::{PlanEntryResolver, ResolvedEntry, VersionRequest, VersionSource};
use crate::shim::{ShimError, VersionShimmer};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info};

pub const GEM_PATH: &str = "GEM_PATH";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Shim(#[from] ShimError),

    #[error("Failed to install {name} {version}: {source}")]
    Install {
        name: String,
        version: String,
        #[source]
        source: anyhow::Error,
    },
}

/// What the installer is asked to put into the layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallRequest {
    pub name: String,
    pub version: String,
    pub layer_path: PathBuf,
}

/// What ended up in the layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledDependency {
    pub name: String,
    pub version: String,
    pub path: PathBuf,
}

/// External collaborator that fetches and installs a dependency.
pub trait DependencyInstaller {
    fn install(&self, request: &InstallRequest) -> anyhow::Result<InstalledDependency>;
}

/// Reports the install it would perform without touching the file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunInstaller;

impl DependencyInstaller for DryRunInstaller {
    fn install(&self, request: &InstallRequest) -> anyhow::Result<InstalledDependency> {
        info!(
            dependency = %request.name,
            version = %request.version,
            layer = %request.layer_path.display(),
            "Dry run: skipping install"
        );
        Ok(InstalledDependency {
            name: request.name.clone(),
            version: request.version.clone(),
            path: request.layer_path.clone(),
        })
    }
}

/// Layer the dependency is installed into, with its visibility flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerInfo {
    pub path: PathBuf,
    pub build: bool,
    pub launch: bool,
    pub cache: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    pub resolved: ResolvedEntry,
    pub dependency: InstalledDependency,
    pub layer: LayerInfo,
    pub env: BTreeMap<String, String>,
}

/// Inputs for one build invocation.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub entries: Vec<VersionRequest>,
    pub layers_dir: PathBuf,
    /// Unlabelled request that loses to any entry naming a version
    pub default_version: String,
    pub buildpack_name: String,
    pub buildpack_version: String,
}

pub struct Build<I: DependencyInstaller> {
    resolver: PlanEntryResolver,
    shimmer: VersionShimmer,
    installer: I,
    emitter: LogEmitter,
}

impl<I: DependencyInstaller> Build<I> {
    pub fn new(shimmer: VersionShimmer, installer: I, emitter: LogEmitter) -> Self {
        Self {
            resolver: PlanEntryResolver::new(emitter.clone()),
            shimmer,
            installer,
            emitter,
        }
    }

    pub fn run(&self, request: &BuildRequest) -> Result<BuildResult, BuildError> {
        self.emitter
            .title(&request.buildpack_name, &request.buildpack_version);
        self.emitter.process("Resolving Bundler version");

        // the default competes as an unlabelled request, so it only wins
        // when no labelled source names a version
        let mut entries = request.entries.clone();
        entries.push(VersionRequest::new(
            VersionSource::Unknown,
            request.default_version.as_str(),
        ));
        debug!(
            default = %request.default_version,
            requested = request.entries.len(),
            "Added default version request"
        );

        let resolved = self.resolver.resolve(&entries);
        let raw_version = resolved.version.clone().unwrap_or_default();

        let version = self.shimmer.shim(&raw_version).map_err(|e| {
            error!(source = %resolved.source, version = %raw_version, "Cannot shim requested version");
            e
        })?;

        self.emitter
            .selected_dependency(&resolved.name, &resolved.source, &version);

        let layer_path = request.layers_dir.join(&resolved.name);
        let install = InstallRequest {
            name: resolved.name.clone(),
            version: version.clone(),
            layer_path: layer_path.clone(),
        };

        self.emitter.process("Executing build process");
        self.emitter
            .subprocess(&format!("Installing {} {}", display_name(&resolved.name), version));

        let started = Instant::now();
        let dependency = self
            .installer
            .install(&install)
            .map_err(|source| BuildError::Install {
                name: install.name.clone(),
                version: install.version.clone(),
                source,
            })?;
        self.emitter.elapsed(started.elapsed());

        let env = environment_exports(&dependency.path);
        self.emitter.environment(&env);

        let layer = LayerInfo {
            path: layer_path,
            build: resolved.flags.build,
            launch: resolved.flags.launch,
            cache: resolved.flags.build,
        };

        info!(
            dependency = %dependency.name,
            version = %dependency.version,
            build = layer.build,
            launch = layer.launch,
            "Build complete"
        );

        Ok(BuildResult {
            resolved,
            dependency,
            layer,
            env,
        })
    }
}

/// Environment variables exported for later buildpacks and the app.
///
/// The layer is appended to `GEM_PATH`, after whatever earlier layers set.
pub fn environment_exports(layer_path: &Path) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert(
        GEM_PATH.to_string(),
        format!("${}:{}", GEM_PATH, layer_path.display()),
    );
    env
}
