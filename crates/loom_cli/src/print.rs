//! `loom print`: build a sample design and print it.

use loom_config::LoomConfig;
use loom_ir::{Context, ModuleId};

use crate::demo;
use crate::pipeline::output_settings;
use crate::{GlobalArgs, PrintArgs, ReportFormat};

/// Runs the `loom print` command.
pub fn run(
    args: &PrintArgs,
    global: &GlobalArgs,
    config: &LoomConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    let settings = output_settings(global, args.format, config);
    let mut ctx = Context::new();
    let module = demo::build(&mut ctx, args.design)?;
    print!("{}", render(&ctx, module, settings.format)?);
    Ok(0)
}

/// Renders a module as assembly text or as a JSON snapshot.
pub fn render(
    ctx: &Context,
    module: ModuleId,
    format: ReportFormat,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(loom_asm::module_to_string(ctx, module)),
        ReportFormat::Json => {
            let snapshot = loom_asm::snapshot_module(ctx, module);
            Ok(loom_asm::snapshot_to_json(&snapshot)? + "\n")
        }
    }
}
