//! Build configuration and its command-line flags.

use std::path::PathBuf;

use vex_diagnostic::DiagnosticConfig;
use vex_ir::ModulePath;

/// Options for `vexc build`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Where artifacts go (--out-dir)
    pub out_dir: PathBuf,
    /// Package root; defaults to the entry file's directory (--root)
    pub root: Option<PathBuf>,
    /// Module path prefix that `root::` stands for (--package)
    pub package: ModulePath,
    /// Parallel compilation jobs; `None` uses every core (--jobs)
    pub jobs: Option<usize>,
    /// Errors printed per unit, 0 for no limit (--error-limit)
    pub error_limit: usize,
    /// Also write each unit's IR listing next to its artifact (--emit-ir)
    pub emit_ir: bool,
    /// Rebuild every unit regardless of timestamps (--force)
    pub force: bool,
    /// Report every unit, not only failures (-v, --verbose)
    pub verbose: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            out_dir: PathBuf::from("build"),
            root: None,
            package: ModulePath::global(),
            jobs: None,
            error_limit: DiagnosticConfig::default().error_limit,
            emit_ir: false,
            force: false,
            verbose: false,
        }
    }
}

impl BuildOptions {
    pub fn diagnostic_config(&self) -> DiagnosticConfig {
        DiagnosticConfig {
            error_limit: self.error_limit,
            ..DiagnosticConfig::default()
        }
    }
}

/// Parse build flags. Unknown flags and malformed values are warned about
/// and ignored; anything not starting with `-` is returned as a
/// positional argument.
pub fn parse_build_options(args: &[String]) -> (BuildOptions, Vec<String>) {
    let mut options = BuildOptions::default();
    let mut positional = Vec::new();

    for arg in args {
        if let Some(dir) = arg.strip_prefix("--out-dir=") {
            options.out_dir = PathBuf::from(dir);
        } else if let Some(root) = arg.strip_prefix("--root=") {
            options.root = Some(PathBuf::from(root));
        } else if let Some(package) = arg.strip_prefix("--package=") {
            options.package = ModulePath::parse(package);
        } else if let Some(jobs) = arg.strip_prefix("--jobs=") {
            if jobs == "auto" {
                options.jobs = None;
            } else if let Some(n) = jobs.parse().ok().filter(|&n: &usize| n > 0) {
                options.jobs = Some(n);
            } else {
                eprintln!("warning: invalid job count '{jobs}', using all cores");
            }
        } else if let Some(limit) = arg.strip_prefix("--error-limit=") {
            if let Ok(n) = limit.parse() {
                options.error_limit = n;
            } else {
                eprintln!(
                    "warning: invalid error limit '{limit}', using {}",
                    options.error_limit
                );
            }
        } else if arg == "--emit-ir" {
            options.emit_ir = true;
        } else if arg == "--force" {
            options.force = true;
        } else if arg == "-v" || arg == "--verbose" {
            options.verbose = true;
        } else if arg.starts_with('-') {
            eprintln!("warning: unknown option '{arg}'");
        } else {
            positional.push(arg.clone());
        }
    }

    (options, positional)
}
