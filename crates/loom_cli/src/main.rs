//! The `loom` debug driver for the Loom hardware IR.
//!
//! Assembles one of the built-in sample designs and then prints it
//! (`loom print`), checks it against the IR invariants and lints
//! (`loom verify`), or reduces its processes to entities (`loom reduce`).

#![warn(missing_docs)]

mod check;
mod demo;
mod pipeline;
mod print;
mod reduce;
mod verify;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::demo::Design;

/// Command-line arguments of `loom`.
#[derive(Parser, Debug)]
#[command(name = "loom", version, about = "Loom hardware IR driver")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored diagnostics.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `loom.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a sample design as assembly or JSON.
    Print(PrintArgs),
    /// Check a sample design against the IR invariants and lints.
    Verify(VerifyArgs),
    /// Reduce the processes of a sample design to entities.
    Reduce(ReduceArgs),
}

/// Arguments for `loom print`.
#[derive(Parser, Debug)]
pub struct PrintArgs {
    /// The design to build.
    #[arg(short, long, value_enum, default_value_t = Design::Lagce)]
    pub design: Design,

    /// Output format; defaults to `[output] format` from `loom.toml`.
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,
}

/// Arguments for `loom verify`.
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// The design to build.
    #[arg(short, long, value_enum, default_value_t = Design::Lagce)]
    pub design: Design,

    /// Lints to suppress (e.g., `--allow unused-value`).
    #[arg(long, num_args = 1..)]
    pub allow: Vec<String>,

    /// Lints to promote to errors (e.g., `--deny undriven-output`).
    #[arg(long, num_args = 1..)]
    pub deny: Vec<String>,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,
}

/// Arguments for `loom reduce`.
#[derive(Parser, Debug)]
pub struct ReduceArgs {
    /// The design to build.
    #[arg(short, long, value_enum, default_value_t = Design::Lagce)]
    pub design: Design,

    /// Reduce only this process (default: every process).
    #[arg(short, long)]
    pub unit: Option<String>,

    /// Output format for the resulting module.
    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal and `loom.toml` allows it.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to log at debug level.
    pub verbose: bool,
    /// The `--color` choice.
    pub color: ColorChoice,
    /// Optional path to a config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color: cli.color,
        config: cli.config,
    };

    let config = match pipeline::load_config(&global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };
    pipeline::init_logging(&global, &config);

    let result = match cli.command {
        Command::Print(ref args) => print::run(args, &global, &config),
        Command::Verify(ref args) => verify::run(args, &global, &config),
        Command::Reduce(ref args) => reduce::run(args, &global, &config),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_print_default() {
        let cli = Cli::parse_from(["loom", "print"]);
        match cli.command {
            Command::Print(ref args) => {
                assert_eq!(args.design, Design::Lagce);
                assert!(args.format.is_none());
            }
            _ => panic!("expected Print command"),
        }
    }

    #[test]
    fn parse_verify_with_args() {
        let cli = Cli::parse_from([
            "loom",
            "verify",
            "--design",
            "lagce-orphan",
            "--allow",
            "unused-value",
            "--deny",
            "undriven-output",
            "--format",
            "json",
        ]);
        match cli.command {
            Command::Verify(ref args) => {
                assert_eq!(args.design, Design::LagceOrphan);
                assert_eq!(args.allow, vec!["unused-value"]);
                assert_eq!(args.deny, vec!["undriven-output"]);
                assert_eq!(args.format, Some(ReportFormat::Json));
            }
            _ => panic!("expected Verify command"),
        }
    }

    #[test]
    fn parse_reduce_unit() {
        let cli = Cli::parse_from(["loom", "reduce", "-d", "inverter", "--unit", "inv"]);
        match cli.command {
            Command::Reduce(ref args) => {
                assert_eq!(args.design, Design::Inverter);
                assert_eq!(args.unit.as_deref(), Some("inv"));
            }
            _ => panic!("expected Reduce command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["loom", "--quiet", "--color", "never", "verify"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn parse_config_after_subcommand() {
        let cli = Cli::parse_from(["loom", "print", "-v", "--config", "/tmp/loom.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("/tmp/loom.toml"));
    }

    #[test]
    fn unknown_design_rejected() {
        assert!(Cli::try_parse_from(["loom", "print", "--design", "cpu"]).is_err());
    }
}
