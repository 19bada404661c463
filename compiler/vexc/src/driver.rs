//! Building a package.
//!
//! The import graph is compiled wave by wave. Units in one wave do not
//! depend on each other, so they compile in parallel, each in its own
//! [`CompilationContext`]. A unit sees the interfaces of all its
//! dependencies (direct or not), loaded from artifacts or produced
//! earlier in the same build.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info_span};
use vex_ir::ModulePath;
use vex_lower::{compile_unit, CompilationContext, IrModule, ModuleInterface};

use crate::artifact::{artifact_path, is_stale, ModuleArtifact, LISTING_EXTENSION};
use crate::graph::{DependencyGraph, PackageLayout};
use crate::lock::LockGuard;
use crate::{BuildError, BuildOptions};

/// What happened to one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnitStatus {
    Compiled,
    UpToDate,
    /// Errors in the unit, or around it (lock, I/O, artifact).
    Failed,
    /// Not attempted because this dependency did not build.
    Skipped { dependency: ModulePath },
}

#[derive(Clone, Debug)]
pub struct UnitReport {
    pub module: ModulePath,
    pub source: PathBuf,
    pub artifact: PathBuf,
    pub status: UnitStatus,
    pub errors: usize,
    pub warnings: usize,
    /// Rendered diagnostics, summary line included. Empty when the unit
    /// was not compiled.
    pub diagnostics: String,
}

impl UnitReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, UnitStatus::Compiled | UnitStatus::UpToDate)
    }
}

/// Outcome of a build, one report per unit in compilation order.
#[derive(Clone, Debug, Default)]
pub struct BuildReport {
    pub units: Vec<UnitReport>,
}

impl BuildReport {
    pub fn succeeded(&self) -> bool {
        self.units.iter().all(UnitReport::succeeded)
    }

    pub fn unit(&self, module: &ModulePath) -> Option<&UnitReport> {
        self.units.iter().find(|u| &u.module == module)
    }

    pub fn error_count(&self) -> usize {
        self.units.iter().map(|u| u.errors).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.units.iter().map(|u| u.warnings).sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} error(s), {} warning(s)",
            self.error_count(),
            self.warning_count()
        )
    }
}

/// A unit after its wave.
struct Finished {
    report: UnitReport,
    interface: Option<ModuleInterface>,
}

/// Lower one unit against the interfaces of its dependencies.
///
/// The unit's module is set before parsing, so a `module` declaration
/// naming the same path is redundant.
pub fn compile_module(
    module: &ModulePath,
    file: &str,
    source: &str,
    imports: &[&ModuleInterface],
    options: &BuildOptions,
) -> (IrModule, CompilationContext) {
    let mut ctx =
        CompilationContext::with_config(file, options.package.clone(), options.diagnostic_config());
    ctx.resolver.set_current(module.clone());
    for interface in imports {
        if let Err(err) = ctx.import_interface(interface) {
            ctx.diagnostics.emit_error(err);
        }
    }
    let ir = compile_unit(&mut ctx, source, &module.to_string());
    (ir, ctx)
}

pub struct Driver {
    options: BuildOptions,
}

impl Driver {
    pub fn new(options: BuildOptions) -> Self {
        Driver { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Package layout for `entry`: `--root`, else the entry's directory.
    pub fn layout(&self, entry: &Path) -> PackageLayout {
        let root = self.options.root.clone().unwrap_or_else(|| {
            entry
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        });
        PackageLayout::new(root, self.options.package.clone())
    }

    /// Build everything `entry` imports, then `entry`.
    ///
    /// Errors that prevent scheduling (unreadable files, import cycles)
    /// are returned; failures of individual units are in the report.
    pub fn build(&self, entry: &Path) -> Result<BuildReport, BuildError> {
        let layout = self.layout(entry);
        let graph = DependencyGraph::discover(entry, &layout)?;
        let waves = graph.waves()?;

        let mut pool = rayon::ThreadPoolBuilder::new();
        if let Some(jobs) = self.options.jobs {
            pool = pool.num_threads(jobs);
        }
        let pool = pool.build()?;

        let mut finished: Vec<Option<Finished>> = (0..graph.len()).map(|_| None).collect();
        let mut order = Vec::with_capacity(graph.len());
        for (n, wave) in waves.iter().enumerate() {
            debug!(wave = n, units = wave.len(), "compile wave");
            let done: Vec<(usize, Finished)> = pool.install(|| {
                wave.par_iter()
                    .map(|&id| (id, self.build_unit(&graph, id, &finished)))
                    .collect()
            });
            for (id, unit) in done {
                finished[id] = Some(unit);
                order.push(id);
            }
        }

        let mut units = Vec::with_capacity(order.len());
        for id in order {
            if let Some(unit) = finished[id].take() {
                units.push(unit.report);
            }
        }
        Ok(BuildReport { units })
    }

    fn build_unit(&self, graph: &DependencyGraph, id: usize, finished: &[Option<Finished>]) -> Finished {
        let unit = graph.unit(id);
        let _span = info_span!("unit", module = %unit.module).entered();
        let artifact = artifact_path(&self.options.out_dir, &unit.module);
        let mut report = UnitReport {
            module: unit.module.clone(),
            source: unit.source.clone(),
            artifact: artifact.clone(),
            status: UnitStatus::Compiled,
            errors: 0,
            warnings: 0,
            diagnostics: String::new(),
        };

        let deps: Vec<&Finished> = graph
            .transitive_dependencies(id)
            .into_iter()
            .filter_map(|dep| finished[dep].as_ref())
            .collect();
        if let Some(failed) = deps.iter().find(|d| !d.report.succeeded()) {
            let err = BuildError::FailedDependency {
                module: unit.module.clone(),
                dependency: failed.report.module.clone(),
            };
            debug!(%err, "skipped");
            report.status = UnitStatus::Skipped {
                dependency: failed.report.module.clone(),
            };
            return Finished {
                report,
                interface: None,
            };
        }

        let dep_artifacts: Vec<PathBuf> = deps.iter().map(|d| d.report.artifact.clone()).collect();
        if !self.options.force && !is_stale(&artifact, &unit.source, &dep_artifacts) {
            match ModuleArtifact::read(&artifact) {
                Ok(cached) => {
                    debug!("up to date");
                    report.status = UnitStatus::UpToDate;
                    return Finished {
                        report,
                        interface: Some(cached.interface),
                    };
                }
                Err(err) => debug!(%err, "unusable artifact, rebuilding"),
            }
        }

        let imports: Vec<&ModuleInterface> =
            deps.iter().filter_map(|d| d.interface.as_ref()).collect();
        match self.compile(&unit.module, &unit.source, &artifact, &imports, &mut report) {
            Ok(interface) => Finished {
                report,
                interface,
            },
            Err(err) => {
                report.status = UnitStatus::Failed;
                report.errors += 1;
                let _ = writeln!(
                    report.diagnostics,
                    "{}: {}: {err}",
                    unit.source.display(),
                    err.kind()
                );
                Finished {
                    report,
                    interface: None,
                }
            }
        }
    }

    /// Compile under a lock marker; write the artifact when clean.
    fn compile(
        &self,
        module: &ModulePath,
        source_path: &Path,
        artifact: &Path,
        imports: &[&ModuleInterface],
        report: &mut UnitReport,
    ) -> Result<Option<ModuleInterface>, BuildError> {
        let _lock = LockGuard::acquire(artifact, module)?;
        let source =
            fs::read_to_string(source_path).map_err(|e| BuildError::io(source_path, e))?;
        let file = source_path.display().to_string();
        let (ir, ctx) = compile_module(module, &file, &source, imports, &self.options);

        report.errors = ctx.diagnostics.error_count();
        report.warnings = ctx.diagnostics.warning_count();
        report.diagnostics = ctx.diagnostics.render_to_string();
        if ctx.diagnostics.finish().is_err() {
            report.status = UnitStatus::Failed;
            return Ok(None);
        }

        let interface = ctx.interface(module.clone());
        let listing = self.options.emit_ir.then(|| ir.to_string());
        ModuleArtifact::new(module.clone(), interface.clone(), ir).write(artifact)?;
        if let Some(listing) = listing {
            let path = artifact.with_extension(LISTING_EXTENSION);
            fs::write(&path, listing).map_err(|e| BuildError::io(&path, e))?;
        }
        debug!(errors = report.errors, warnings = report.warnings, "compiled");
        Ok(Some(interface))
    }
}
