//! The import graph of a package.
//!
//! Starting from the entry file, every `import` is mapped to a source file
//! (`<root>/<segments>.vx`, relative to the package prefix) and scanned in
//! turn. Cycles are a property of the graph: they are found before any
//! unit is compiled. Units are then scheduled in waves, each wave holding
//! units whose dependencies all sit in earlier waves.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use vex_ir::ModulePath;
use vex_parse::scan_imports;
use vex_resolve::ModuleResolver;

use crate::BuildError;

/// Source file extension.
pub const SOURCE_EXTENSION: &str = "vx";

/// Maps between module paths and files under the package root.
#[derive(Clone, Debug)]
pub struct PackageLayout {
    root: PathBuf,
    package: ModulePath,
}

impl PackageLayout {
    pub fn new(root: impl Into<PathBuf>, package: ModulePath) -> Self {
        PackageLayout {
            root: root.into(),
            package,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn package(&self) -> &ModulePath {
        &self.package
    }

    /// `<root>/a/b.vx` is module `<package>::a::b`.
    pub fn module_of(&self, file: &Path) -> Result<ModulePath, BuildError> {
        let outside = || BuildError::OutsideRoot {
            path: file.to_path_buf(),
            root: self.root.clone(),
        };
        let relative = file.strip_prefix(&self.root).map_err(|_| outside())?;
        let segments: Vec<String> = relative
            .with_extension("")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if segments.is_empty() {
            return Err(outside());
        }
        Ok(self.package.join(&segments))
    }

    /// Where the source of `module` lives, if it is inside the package.
    pub fn source_of(&self, module: &ModulePath) -> Option<PathBuf> {
        let segments = module.segments();
        let local = segments.strip_prefix(self.package.segments())?;
        if local.is_empty() {
            return None;
        }
        let mut path = self.root.clone();
        path.extend(local);
        path.set_extension(SOURCE_EXTENSION);
        Some(path)
    }
}

/// One source file of the package.
#[derive(Clone, Debug)]
pub struct Unit {
    pub module: ModulePath,
    pub source: PathBuf,
    /// Direct dependencies, as unit ids.
    pub imports: Vec<usize>,
}

#[derive(Debug, Default)]
pub struct DependencyGraph {
    units: Vec<Unit>,
    index: FxHashMap<ModulePath, usize>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the package reachable from `entry`.
    ///
    /// Imports that name no file in the package are left out of the graph;
    /// they may be modules declared inside a unit, and otherwise lowering
    /// reports them.
    pub fn discover(entry: &Path, layout: &PackageLayout) -> Result<Self, BuildError> {
        let mut graph = DependencyGraph::new();
        let root = graph.add_unit(layout.module_of(entry)?, entry.to_path_buf());
        let mut queue = VecDeque::from([root]);

        while let Some(id) = queue.pop_front() {
            let source_path = graph.units[id].source.clone();
            let source = std::fs::read_to_string(&source_path)
                .map_err(|e| BuildError::io(&source_path, e))?;

            let mut resolver = ModuleResolver::new(layout.package().clone());
            resolver.set_current(graph.units[id].module.clone());

            for import in scan_imports(&source).imports {
                let path = import.path;
                let found = resolver.import_candidates(&path).into_iter().find_map(|m| {
                    let file = layout.source_of(&m)?;
                    file.is_file().then_some((m, file))
                });
                let Some((module, file)) = found else {
                    trace!(import = %path.join("::"), "import has no source file");
                    continue;
                };
                let dep = match graph.id_of(&module) {
                    Some(dep) => dep,
                    None => {
                        let dep = graph.add_unit(module, file);
                        queue.push_back(dep);
                        dep
                    }
                };
                graph.add_edge(id, dep);
            }
        }

        debug!(units = graph.len(), "import graph");
        Ok(graph)
    }

    pub fn add_unit(&mut self, module: ModulePath, source: PathBuf) -> usize {
        if let Some(&id) = self.index.get(&module) {
            return id;
        }
        let id = self.units.len();
        self.index.insert(module.clone(), id);
        self.units.push(Unit {
            module,
            source,
            imports: Vec::new(),
        });
        id
    }

    /// Record that `from` imports `to`.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        let imports = &mut self.units[from].imports;
        if !imports.contains(&to) {
            imports.push(to);
        }
    }

    pub fn id_of(&self, module: &ModulePath) -> Option<usize> {
        self.index.get(module).copied()
    }

    pub fn unit(&self, id: usize) -> &Unit {
        &self.units[id]
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// An import cycle, first unit repeated at the end, if there is one.
    pub fn find_cycle(&self) -> Option<Vec<usize>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            New,
            OnPath,
            Done,
        }
        let mut marks = vec![Mark::New; self.units.len()];

        for start in 0..self.units.len() {
            if marks[start] != Mark::New {
                continue;
            }
            // Explicit stack of (unit, next import to visit).
            let mut path: Vec<(usize, usize)> = vec![(start, 0)];
            marks[start] = Mark::OnPath;
            while let Some(top) = path.len().checked_sub(1) {
                let (id, next) = path[top];
                let Some(&dep) = self.units[id].imports.get(next) else {
                    marks[id] = Mark::Done;
                    path.pop();
                    continue;
                };
                path[top].1 += 1;
                match marks[dep] {
                    Mark::New => {
                        marks[dep] = Mark::OnPath;
                        path.push((dep, 0));
                    }
                    Mark::OnPath => {
                        let from = path.iter().position(|&(u, _)| u == dep).unwrap_or(0);
                        let mut cycle: Vec<usize> = path[from..].iter().map(|&(u, _)| u).collect();
                        cycle.push(dep);
                        return Some(cycle);
                    }
                    Mark::Done => {}
                }
            }
        }
        None
    }

    /// Compilation waves, dependencies first.
    pub fn waves(&self) -> Result<Vec<Vec<usize>>, BuildError> {
        let mut pending: Vec<usize> = self.units.iter().map(|u| u.imports.len()).collect();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.units.len()];
        for (id, unit) in self.units.iter().enumerate() {
            for &dep in &unit.imports {
                dependents[dep].push(id);
            }
        }

        let mut wave: Vec<usize> = (0..self.units.len()).filter(|&id| pending[id] == 0).collect();
        let mut waves = Vec::new();
        let mut scheduled = 0;
        while !wave.is_empty() {
            scheduled += wave.len();
            let mut next = Vec::new();
            for &id in &wave {
                for &user in &dependents[id] {
                    pending[user] -= 1;
                    if pending[user] == 0 {
                        next.push(user);
                    }
                }
            }
            waves.push(wave);
            wave = next;
        }

        if scheduled < self.units.len() {
            let cycle = self.find_cycle().unwrap_or_default();
            return Err(BuildError::CircularDependency {
                cycle: cycle.into_iter().map(|id| self.units[id].module.clone()).collect(),
            });
        }
        Ok(waves)
    }

    /// Every unit `id` depends on, directly or not, dependencies first.
    pub fn transitive_dependencies(&self, id: usize) -> Vec<usize> {
        let mut seen = vec![false; self.units.len()];
        let mut order = Vec::new();
        // Post-order walk; an explicit stack keeps deep chains off the
        // call stack.
        let mut stack: Vec<(usize, usize)> = vec![(id, 0)];
        seen[id] = true;
        while let Some(top) = stack.len().checked_sub(1) {
            let (unit, next) = stack[top];
            if let Some(&dep) = self.units[unit].imports.get(next) {
                stack[top].1 += 1;
                if !seen[dep] {
                    seen[dep] = true;
                    stack.push((dep, 0));
                }
            } else {
                stack.pop();
                if unit != id {
                    order.push(unit);
                }
            }
        }
        order
    }
}
