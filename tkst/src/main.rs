//! tkst - Command-line driver for the TokenScript interpreter.
//!
//! `tkst resolve` batch-resolves a token document (flat or DTCG) and
//! prints per-token results as JSON; `tkst eval` evaluates a single
//! expression. Extension specs (colors, units, functions) register from
//! JSON files before anything runs.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{run_eval, run_resolve, SpecFiles};
use error::{Result, TkstError};

/// Tkst - resolve design-token documents written in TokenScript.
#[derive(Parser, Debug)]
#[command(name = "tkst")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "TokenScript resolver and evaluator", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, env = "TKST_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve every token in a document
    ///
    /// Accepts a flat `name → expression` JSON object or a nested DTCG
    /// document with `$value` leaves.
    Resolve(ResolveCommand),

    /// Evaluate a single expression
    Eval(EvalCommand),
}

#[derive(Parser, Debug)]
struct ResolveCommand {
    /// Token document to resolve
    input: PathBuf,

    /// Color spec file: {"uri": "...", "spec": {...}} (repeatable)
    #[arg(long = "color-spec")]
    color_specs: Vec<PathBuf>,

    /// Unit spec file (repeatable)
    #[arg(long = "unit-spec")]
    unit_specs: Vec<PathBuf>,

    /// Function spec file (repeatable)
    #[arg(long = "function-spec")]
    function_specs: Vec<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct EvalCommand {
    /// The expression to evaluate
    expression: String,

    /// Reference binding name=value (repeatable); values parse as JSON
    /// and fall back to plain strings
    #[arg(short = 'r', long = "ref")]
    references: Vec<String>,

    /// Color spec file: {"uri": "...", "spec": {...}} (repeatable)
    #[arg(long = "color-spec")]
    color_specs: Vec<PathBuf>,

    /// Unit spec file (repeatable)
    #[arg(long = "unit-spec")]
    unit_specs: Vec<PathBuf>,

    /// Function spec file (repeatable)
    #[arg(long = "function-spec")]
    function_specs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Resolve(args) => {
            let specs = SpecFiles {
                colors: args.color_specs,
                units: args.unit_specs,
                functions: args.function_specs,
            };
            run_resolve(&args.input, &specs, args.pretty)
        }
        Commands::Eval(args) => {
            let specs = SpecFiles {
                colors: args.color_specs,
                units: args.unit_specs,
                functions: args.function_specs,
            };
            run_eval(&args.expression, &args.references, &specs)
        }
    }
}

/// Initialize the logging system.
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| TkstError::Config(format!("Failed to initialize logging: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_resolve() {
        let cli = Cli::parse_from(["tkst", "resolve", "tokens.json"]);
        assert!(matches!(cli.command, Commands::Resolve(_)));
    }

    #[test]
    fn test_cli_parse_resolve_with_specs() {
        let cli = Cli::parse_from([
            "tkst",
            "resolve",
            "tokens.json",
            "--color-spec",
            "rgb.json",
            "--color-spec",
            "hsl.json",
            "--unit-spec",
            "gu.json",
            "--pretty",
        ]);
        if let Commands::Resolve(args) = cli.command {
            assert_eq!(args.color_specs.len(), 2);
            assert_eq!(args.unit_specs.len(), 1);
            assert!(args.pretty);
        } else {
            panic!("expected resolve command");
        }
    }

    #[test]
    fn test_cli_parse_eval_with_refs() {
        let cli = Cli::parse_from([
            "tkst",
            "eval",
            "{base} * 2px",
            "--ref",
            "base=16",
            "-r",
            "scale=1.5",
        ]);
        if let Commands::Eval(args) = cli.command {
            assert_eq!(args.expression, "{base} * 2px");
            assert_eq!(args.references.len(), 2);
        } else {
            panic!("expected eval command");
        }
    }

    #[test]
    fn test_cli_parse_global_verbose() {
        let cli = Cli::parse_from(["tkst", "--verbose", "eval", "1"]);
        assert!(cli.verbose);
    }
}
