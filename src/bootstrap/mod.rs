//! Runtime bootstrapper: brings an engine to a ready state and reports
//! progress along the way.
//!
//! The stages run strictly in order. Loader and initializer failures are
//! always fatal; core package failures are fatal only under
//! [`CorePolicy::Strict`]; best-effort installs never are.

use thiserror::Error;
use tokio::sync::watch;

use crate::engine::{Engine, EngineError, Loader};
use crate::execution::ExecutionSession;

pub mod progress;

pub use progress::{LoadProgress, ProgressReporter};

const PCT_FETCHED: u8 = 10;
const PCT_INITIALIZED: u8 = 20;
const PCT_CORE: u8 = 40;
const PCT_INSTALLER: u8 = 50;
const PCT_INSTALLED: u8 = 90;

/// Packages to bring into the runtime, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageList {
    /// Loaded as one batch before the installer.
    pub core: Vec<String>,
    /// Installed one by one; failures are logged and skipped.
    pub best_effort: Vec<String>,
    /// Module whose import is checked once everything is installed.
    pub verify: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorePolicy {
    /// A failed core load aborts the bootstrap.
    #[default]
    Strict,
    /// A failed core load is logged and the bootstrap continues.
    BestEffort,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("{0}")]
    Load(#[source] EngineError),
    #[error("{0}")]
    Initialize(#[source] EngineError),
    #[error("{0}")]
    CorePackages(#[source] EngineError),
    #[error("{0}")]
    Installer(#[source] EngineError),
}

/// Outcome of a successful bootstrap.
pub struct Ready<E: Engine> {
    pub session: ExecutionSession<E>,
    pub version: String,
    /// Packages whose install failed and were skipped.
    pub skipped: Vec<String>,
    /// Set when the verification import failed.
    pub warning: Option<String>,
}

pub struct Bootstrapper {
    packages: PackageList,
    policy: CorePolicy,
    reporter: ProgressReporter,
}

impl Bootstrapper {
    pub fn new(packages: PackageList, policy: CorePolicy) -> (Self, watch::Receiver<LoadProgress>) {
        let (reporter, rx) = ProgressReporter::new();
        (
            Self {
                packages,
                policy,
                reporter,
            },
            rx,
        )
    }

    /// Run every stage. On a fatal error the status line shows `Error: ...`
    /// and progress stays where it stopped.
    pub async fn run<L: Loader>(mut self, loader: L) -> Result<Ready<L::Engine>, BootstrapError> {
        let result = self.stages(loader).await;
        if let Err(e) = &result {
            tracing::error!("bootstrap failed: {e}");
            self.reporter.status(format!("Error: {e}"));
        }
        result
    }

    async fn stages<L: Loader>(&mut self, mut loader: L) -> Result<Ready<L::Engine>, BootstrapError> {
        self.reporter
            .status("Loading Python runtime (this may take a moment)...");
        loader.fetch().await.map_err(BootstrapError::Load)?;
        self.reporter.advance(PCT_FETCHED, "Initializing Python...");

        let (mut engine, version) = loader.initialize().await.map_err(BootstrapError::Initialize)?;
        tracing::info!(%version, "interpreter initialized");
        self.reporter.advance(PCT_INITIALIZED, "Loading core packages...");

        if !self.packages.core.is_empty() {
            match engine.load_packages(&self.packages.core).await {
                Ok(()) => tracing::info!(packages = ?self.packages.core, "core packages loaded"),
                Err(e) => match self.policy {
                    CorePolicy::Strict => return Err(BootstrapError::CorePackages(e)),
                    CorePolicy::BestEffort => tracing::warn!("core packages failed to load: {e}"),
                },
            }
        }
        self.reporter.advance(PCT_CORE, "Setting up pip...");

        let skipped = if self.packages.best_effort.is_empty() {
            Vec::new()
        } else {
            engine.load_installer().await.map_err(BootstrapError::Installer)?;
            self.reporter.advance(PCT_INSTALLER, "Installing packages via pip...");
            self.install_all(&mut engine).await
        };
        self.reporter.advance(PCT_INSTALLED, "Packages installed");

        let mut warning = None;
        if let Some(module) = self.packages.verify.clone() {
            self.reporter
                .status(format!("Verifying {module} installation..."));
            match engine.verify_import(&module).await {
                Ok(v) => tracing::info!(%module, version = %v, "verification import succeeded"),
                Err(e) => {
                    tracing::error!(%module, "verification import failed: {e}");
                    let msg = format!("Error importing {module}: {e}");
                    self.reporter.status(msg.clone());
                    warning = Some(msg);
                }
            }
        }

        let session = ExecutionSession::new(engine);
        let status = match &warning {
            Some(w) => format!("Python {version} ready ({w})"),
            None => format!("Python {version} ready"),
        };
        self.reporter.ready(status);
        tracing::info!(skipped = ?skipped, "python environment ready");

        Ok(Ready {
            session,
            version,
            skipped,
            warning,
        })
    }

    /// Install every best-effort package, moving progress from 50 to 90.
    async fn install_all<E: Engine>(&mut self, engine: &mut E) -> Vec<String> {
        let total = self.packages.best_effort.len();
        let mut skipped = Vec::new();
        for (i, pkg) in self.packages.best_effort.iter().enumerate() {
            self.reporter
                .status(format!("Installing {pkg} ({}/{total})...", i + 1));
            match engine.install(pkg).await {
                Ok(()) => tracing::info!(package = %pkg, "installed"),
                Err(e) => {
                    tracing::warn!(package = %pkg, "could not install: {e}");
                    skipped.push(pkg.clone());
                }
            }
            let span = u32::from(PCT_INSTALLED - PCT_INSTALLER);
            let done = PCT_INSTALLER as u32 + span * (i as u32 + 1) / total as u32;
            self.reporter.advance_to(done as u8);
        }
        skipped
    }
}
