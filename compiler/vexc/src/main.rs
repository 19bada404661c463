//! Vex Compiler CLI

use std::path::Path;
use std::process::ExitCode;

use vex_resolve::demangle;
use vexc::{parse_build_options, Driver, UnitStatus};

fn main() -> ExitCode {
    vexc::init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    match args[1].as_str() {
        "build" => {
            let (options, positional) = parse_build_options(&args[2..]);
            let [entry] = positional.as_slice() else {
                eprintln!("Usage: vexc build <file.vx> [options]");
                return ExitCode::FAILURE;
            };
            build(Path::new(entry), Driver::new(options))
        }
        "demangle" => {
            let Some(symbol) = args.get(2) else {
                eprintln!("Usage: vexc demangle <symbol>");
                eprintln!("Example: vexc demangle _ZN3geo4normE");
                return ExitCode::FAILURE;
            };
            match demangle(symbol) {
                Some(name) => {
                    println!("{name}");
                    ExitCode::SUCCESS
                }
                None => {
                    eprintln!("error: `{symbol}` is not a valid Vex symbol");
                    ExitCode::FAILURE
                }
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("Vex Compiler {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        command => {
            // A bare source path builds it with default options.
            if Path::new(command)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("vx"))
            {
                let (options, _) = parse_build_options(&args[2..]);
                build(Path::new(command), Driver::new(options))
            } else {
                eprintln!("Unknown command: {command}");
                eprintln!();
                print_usage();
                ExitCode::FAILURE
            }
        }
    }
}

fn build(entry: &Path, driver: Driver) -> ExitCode {
    let report = match driver.build(entry) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("{}: {}: {err}", entry.display(), err.kind());
            return ExitCode::FAILURE;
        }
    };

    let verbose = driver.options().verbose;
    for unit in &report.units {
        match &unit.status {
            UnitStatus::Compiled | UnitStatus::UpToDate if !verbose && unit.warnings == 0 => {}
            UnitStatus::UpToDate => eprintln!("{}: up to date", unit.module),
            UnitStatus::Skipped { dependency } => {
                eprintln!("{}: skipped, dependency `{dependency}` failed", unit.module);
            }
            UnitStatus::Compiled | UnitStatus::Failed => eprint!("{}", unit.diagnostics),
        }
    }
    eprintln!("{}", report.summary());

    if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_usage() {
    println!("Vex Compiler");
    println!();
    println!("Usage: vexc <command> [options]");
    println!();
    println!("Commands:");
    println!("  build <file.vx>      Compile a package from its entry file");
    println!("  demangle <symbol>    Decode a mangled symbol name");
    println!("  help                 Show this help message");
    println!("  version              Show version information");
    println!();
    println!("Build options:");
    println!("  --out-dir=<dir>      Artifact directory (default: build)");
    println!("  --root=<dir>         Package root (default: the entry file's directory)");
    println!("  --package=<a::b>     Module prefix that `root::` stands for");
    println!("  --jobs=<n|auto>      Parallel compilation jobs");
    println!("  --error-limit=<n>    Errors printed per unit, 0 for all (default: 20)");
    println!("  --emit-ir            Write an IR listing next to each artifact");
    println!("  --force              Rebuild every unit");
    println!("  -v, --verbose        Report every unit");
    println!();
    println!("Environment:");
    println!("  VEX_LOG=<filter>     Enable tracing (e.g. vex_lower=debug)");
    println!("  VEX_LOG_TREE=1       Print tracing spans as a tree");
    println!();
    println!("Examples:");
    println!("  vexc build main.vx");
    println!("  vexc build src/main.vx --out-dir=target/vx --jobs=4");
    println!("  vexc demangle _ZN3geo4normE");
}
