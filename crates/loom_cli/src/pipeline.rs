//! Shared setup for every command: configuration, logging, and output settings.

use std::io::IsTerminal;
use std::path::Path;

use loom_config::{LoomConfig, OutputFormat};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::{ColorChoice, GlobalArgs, ReportFormat};

/// Loads `--config` if given, otherwise `loom.toml` from the working
/// directory if present, otherwise the defaults.
pub fn load_config(global: &GlobalArgs) -> Result<LoomConfig, loom_config::ConfigError> {
    match &global.config {
        Some(path) => loom_config::load_config(Path::new(path)),
        None => loom_config::discover_config(&std::env::current_dir()?),
    }
}

/// Picks the log filter directive. Flags win over `RUST_LOG`, which wins over
/// the `[log] filter` setting.
pub fn log_filter(
    verbose: bool,
    quiet: bool,
    env: Option<&str>,
    configured: Option<&str>,
) -> String {
    if verbose {
        "debug".to_string()
    } else if quiet {
        "error".to_string()
    } else {
        env.or(configured).unwrap_or("warn").to_string()
    }
}

/// Installs the stderr log subscriber.
pub fn init_logging(global: &GlobalArgs, config: &LoomConfig) {
    let env = std::env::var("RUST_LOG").ok();
    let directive = log_filter(
        global.verbose,
        global.quiet,
        env.as_deref(),
        config.log.filter.as_deref(),
    );
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

/// How a command prints its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSettings {
    /// Text or JSON.
    pub format: ReportFormat,
    /// ANSI colors in terminal diagnostics.
    pub color: bool,
    /// Wrap column for diagnostic notes.
    pub width: u16,
}

/// Merges the `--format` and `--color` flags with the `[output]` section.
pub fn output_settings(
    global: &GlobalArgs,
    format: Option<ReportFormat>,
    config: &LoomConfig,
) -> OutputSettings {
    let format = format.unwrap_or(match config.output.format() {
        OutputFormat::Text => ReportFormat::Text,
        OutputFormat::Json => ReportFormat::Json,
    });
    let color = match global.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => config.output.color && std::io::stderr().is_terminal(),
    };
    OutputSettings {
        format,
        color,
        width: config.output.width,
    }
}
