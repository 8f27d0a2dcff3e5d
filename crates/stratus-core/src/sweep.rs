//! Sweeper framework
//!
//! Acceptance-test runs leave orphaned resources behind when they fail
//! mid-flight. A sweeper scans one service in one region and destroys
//! objects whose identifying field starts with a known test prefix.
//! Sweepers are registered explicitly at process start, declare their
//! dependencies on other sweepers (a listener sweep must run before the
//! accelerator sweep that owns it), and run in topological order.
//!
//! The default execution is single-threaded per region; when sweeper
//! functions fan out in parallel, their shared accumulator must be guarded.

use crate::error::{ApiError, is_skippable_sweep_error};
use crate::registry::ProviderContext;
use futures_util::future::BoxFuture;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Name prefixes identifying disposable test resources
pub const DEFAULT_TEST_PREFIXES: &[&str] = &["tf-acc-test", "tf_acc_test"];

/// Whether an object's identifying field marks it as sweepable
///
/// Sweepers must call this before deleting anything; the prefix guard is
/// the only thing standing between a sweep and production resources.
pub fn is_sweepable(name: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| name.starts_with(p))
}

/// Accumulator for per-object sweep failures
///
/// A single failed object never aborts the sweep; failures are collected
/// and reported together at the end.
#[derive(Debug, Default)]
pub struct SweepErrors {
    errors: Vec<String>,
}

impl SweepErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, object: &str, err: &ApiError) {
        self.errors.push(format!("{object}: {err}"));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Empty accumulator becomes success
    pub fn into_result(self) -> Result<(), SweepError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(SweepError::Objects(self))
        }
    }
}

impl fmt::Display for SweepErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} object(s) failed to sweep: {}",
            self.errors.len(),
            self.errors.join("; ")
        )
    }
}

impl std::error::Error for SweepErrors {}

/// Sweep failures
#[derive(Error, Debug)]
pub enum SweepError {
    #[error("sweeper already registered: {0}")]
    Duplicate(String),

    #[error("sweeper {sweeper} depends on unknown sweeper {dependency}")]
    UnknownDependency { sweeper: String, dependency: String },

    #[error("dependency cycle among sweepers: {0:?}")]
    Cycle(Vec<String>),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Provider(#[from] crate::error::ProviderError),

    #[error(transparent)]
    Objects(SweepErrors),
}

type SweepFn =
    Arc<dyn Fn(String, Arc<ProviderContext>) -> BoxFuture<'static, Result<(), SweepError>> + Send + Sync>;

/// A named region-scoped cleanup function with declared dependencies
#[derive(Clone)]
pub struct Sweeper {
    name: &'static str,
    dependencies: Vec<&'static str>,
    run: SweepFn,
}

impl Sweeper {
    pub fn new<F, Fut>(name: &'static str, dependencies: &[&'static str], f: F) -> Self
    where
        F: Fn(String, Arc<ProviderContext>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<(), SweepError>> + Send + 'static,
    {
        Self {
            name,
            dependencies: dependencies.to_vec(),
            run: Arc::new(move |region, ctx| Box::pin(f(region, ctx))),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn dependencies(&self) -> &[&'static str] {
        &self.dependencies
    }
}

/// Outcome of one region's sweep run
#[derive(Debug, Default)]
pub struct SweepReport {
    pub swept: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
    pub failed: Vec<(&'static str, String)>,
}

impl SweepReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Explicit registry of sweepers, populated at process start
#[derive(Default)]
pub struct SweeperRegistry {
    sweepers: BTreeMap<&'static str, Sweeper>,
}

impl SweeperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, sweeper: Sweeper) -> Result<(), SweepError> {
        if self.sweepers.contains_key(sweeper.name) {
            return Err(SweepError::Duplicate(sweeper.name.to_string()));
        }
        self.sweepers.insert(sweeper.name, sweeper);
        Ok(())
    }

    /// Topological order over declared dependencies (dependencies first)
    pub fn run_order(&self) -> Result<Vec<&'static str>, SweepError> {
        let mut order = Vec::with_capacity(self.sweepers.len());
        let mut done = BTreeSet::new();
        let mut in_progress = BTreeSet::new();

        fn visit(
            name: &'static str,
            sweepers: &BTreeMap<&'static str, Sweeper>,
            done: &mut BTreeSet<&'static str>,
            in_progress: &mut BTreeSet<&'static str>,
            order: &mut Vec<&'static str>,
        ) -> Result<(), SweepError> {
            if done.contains(name) {
                return Ok(());
            }
            if !in_progress.insert(name) {
                let mut cycle: Vec<String> =
                    in_progress.iter().map(|s| s.to_string()).collect();
                cycle.push(name.to_string());
                return Err(SweepError::Cycle(cycle));
            }
            let sweeper = &sweepers[name];
            for dep in &sweeper.dependencies {
                if !sweepers.contains_key(dep) {
                    return Err(SweepError::UnknownDependency {
                        sweeper: name.to_string(),
                        dependency: dep.to_string(),
                    });
                }
                visit(dep, sweepers, done, in_progress, order)?;
            }
            in_progress.remove(name);
            done.insert(name);
            order.push(name);
            Ok(())
        }

        for name in self.sweepers.keys() {
            visit(name, &self.sweepers, &mut done, &mut in_progress, &mut order)?;
        }
        Ok(order)
    }

    /// Run every sweeper for one region, dependencies first
    ///
    /// Region-level skippable errors (service unsupported there) become
    /// logged skips; other failures are recorded per sweeper without
    /// stopping the run.
    pub async fn run_all(
        &self,
        region: &str,
        ctx: Arc<ProviderContext>,
    ) -> Result<SweepReport, SweepError> {
        let order = self.run_order()?;
        let mut report = SweepReport::default();

        for name in order {
            let sweeper = &self.sweepers[name];
            tracing::debug!(sweeper = name, region, "sweeping");
            match (sweeper.run)(region.to_string(), ctx.clone()).await {
                Ok(()) => report.swept.push(name),
                Err(SweepError::Api(err)) if is_skippable_sweep_error(&err) => {
                    tracing::warn!(sweeper = name, region, error = %err, "skipping region");
                    report.skipped.push(name);
                }
                Err(err) => {
                    tracing::warn!(sweeper = name, region, error = %err, "sweep failed");
                    report.failed.push((name, err.to_string()));
                }
            }
        }
        Ok(report)
    }
}
