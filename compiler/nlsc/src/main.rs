//! nameless lambda runtime CLI.

use std::io::Read;

use nls_eval::{stdout_handler, RuntimeConfig};
use nlsc::{init_tracing, run_source};

fn print_usage() {
    eprintln!("Usage: nls [options] [file]");
    eprintln!();
    eprintln!("Reads the program from <file>, or from stdin when no file is given.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --max-depth=<n>     Reduction depth limit (default: 10000)");
    eprintln!("  --unlimited-depth   Disable the reduction depth limit");
    eprintln!("  --max-nodes=<n>     Limit on live heap nodes");
    eprintln!("  -h, --help          Show this message");
}

fn parse_count(flag: &str, value: &str) -> usize {
    match value.parse() {
        Ok(count) => count,
        Err(_) => {
            eprintln!("error: {flag} expects a non-negative integer, got '{value}'");
            std::process::exit(1);
        }
    }
}

fn read_source(path: Option<&str>) -> String {
    let Some(path) = path else {
        let mut source = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut source) {
            eprintln!("error reading stdin: {e}");
            std::process::exit(1);
        }
        return source;
    };
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let mut config = RuntimeConfig::default();
    let mut path: Option<&str> = None;

    for arg in args.iter().skip(1) {
        if arg == "-h" || arg == "--help" {
            print_usage();
            return;
        } else if let Some(value) = arg.strip_prefix("--max-depth=") {
            config.max_depth = Some(parse_count("--max-depth", value));
        } else if arg == "--unlimited-depth" {
            config.max_depth = None;
        } else if let Some(value) = arg.strip_prefix("--max-nodes=") {
            config.max_nodes = Some(parse_count("--max-nodes", value));
        } else if arg.starts_with('-') {
            eprintln!("error: unknown option '{arg}'");
            print_usage();
            std::process::exit(1);
        } else if path.is_none() {
            path = Some(arg.as_str());
        } else {
            eprintln!("error: more than one input file");
            std::process::exit(1);
        }
    }

    let source = read_source(path);
    let label = path.unwrap_or("<stdin>");
    let handler = stdout_handler();

    let outcome = match run_source(&source, config, &handler) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("{label}:{err}");
            std::process::exit(1);
        }
    };

    for (index, err) in &outcome.errors {
        eprintln!("{label}: expression {}: {err}", index + 1);
    }
    for leak in &outcome.leaks.leaks {
        eprintln!(
            "leak: {:?} ({}) with {} references",
            leak.id, leak.label, leak.refs
        );
    }
    if !outcome.is_ok() {
        std::process::exit(1);
    }
}
