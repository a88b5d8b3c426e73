use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use json_path_assert::{parse_checks, JsonTester, Registry};
use tracing::{debug, Level};

/// Assert values in a JSON document against a check file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// JSON document under test (`-` reads stdin).
    #[arg(required_unless_present = "list_functions")]
    document: Option<PathBuf>,
    /// Check file: a JSON object mapping path expressions to expected values.
    #[arg(required_unless_present = "list_functions")]
    checks: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Print the registered pipe functions and exit.
    #[arg(long)]
    list_functions: bool,
}

fn read_input(path: &Path) -> std::io::Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read(path)
    }
}

fn main() -> ExitCode {
    // Parse CLI arguments.
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let tester = JsonTester::new(Registry::with_builtins());
    if args.list_functions {
        for name in tester.registry().names() {
            println!("{name}");
        }
        return ExitCode::SUCCESS;
    }

    let (Some(document_path), Some(checks_path)) = (args.document, args.checks) else {
        eprintln!("both DOCUMENT and CHECKS are required");
        return ExitCode::from(2);
    };

    let document = match read_input(&document_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("cannot read {}: {e}", document_path.display());
            return ExitCode::from(2);
        }
    };
    let checks = match std::fs::read_to_string(&checks_path)
        .map_err(|e| e.to_string())
        .and_then(|text| parse_checks(&text).map_err(|e| e.to_string()))
    {
        Ok(checks) => checks,
        Err(e) => {
            eprintln!("cannot load {}: {e}", checks_path.display());
            return ExitCode::from(2);
        }
    };
    debug!(checks = checks.len(), document = %document_path.display(), "loaded");

    match tester.test_json(&document, &checks) {
        Ok(()) => {
            println!("{} check(s) passed", checks.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
