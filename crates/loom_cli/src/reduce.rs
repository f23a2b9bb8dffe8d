//! `loom reduce`: turn the processes of a sample design into entities.
//!
//! Every selected process goes through [`run_reduction`] with the
//! straight-line pass. Reduced entities are appended to the module as
//! `<process>.ent`; a declining pass is reported as a note and the process is
//! kept as it was.

use loom_config::LoomConfig;
use loom_diagnostics::{DiagnosticSink, Severity};
use loom_ir::{run_reduction, Context, IrError, IrResult, ModuleId, StraightLineReduction, UnitId};

use crate::check::ir_diagnostic;
use crate::pipeline::output_settings;
use crate::verify::report;
use crate::{demo, print, GlobalArgs, ReduceArgs, ReportFormat};

/// Runs the `loom reduce` command.
pub fn run(
    args: &ReduceArgs,
    global: &GlobalArgs,
    config: &LoomConfig,
) -> Result<i32, Box<dyn std::error::Error>> {
    let settings = output_settings(global, args.format, config);

    let mut ctx = Context::new();
    let module = demo::build(&mut ctx, args.design)?;
    let targets = select_processes(&ctx, module, args.unit.as_deref())?;

    let mut sink = DiagnosticSink::new();
    let reduced = reduce_all(&mut ctx, module, &targets, &mut sink)?;
    report(sink.diagnostics(), settings);
    if !global.quiet && settings.format == ReportFormat::Text {
        eprintln!(
            "   Reduced {} of {} process(es)",
            reduced.len(),
            targets.len()
        );
    }
    print!("{}", print::render(&ctx, module, settings.format)?);
    Ok(if sink.has_errors() { 1 } else { 0 })
}

/// Returns the processes to reduce: the named unit, or every process.
pub fn select_processes(
    ctx: &Context,
    module: ModuleId,
    unit: Option<&str>,
) -> Result<Vec<UnitId>, String> {
    match unit {
        Some(name) => match ctx.unit_by_name(module, name) {
            Some(id) => Ok(vec![id]),
            None => Err(format!(
                "no unit named @{name} in module {}",
                ctx.module_name(module)
            )),
        },
        None => Ok(ctx
            .module(module)
            .units()
            .iter()
            .copied()
            .filter(|&u| ctx.unit(u).is_process())
            .collect()),
    }
}

/// Reduces each target, appending the new entities to `module`. Declines are
/// recorded as notes, other failures as errors.
pub fn reduce_all(
    ctx: &mut Context,
    module: ModuleId,
    targets: &[UnitId],
    sink: &mut DiagnosticSink,
) -> IrResult<Vec<UnitId>> {
    let mut pass = StraightLineReduction;
    let mut reduced = Vec::new();
    for &process in targets {
        let name = ctx.unit_name(process).to_string();
        match run_reduction(&mut pass, ctx, process) {
            Ok(entity) => {
                ctx.append_unit(module, entity)?;
                tracing::info!(process = %name, entity = %ctx.unit_name(entity), "reduced");
                reduced.push(entity);
            }
            Err(err @ IrError::NotReducible { .. }) => {
                sink.emit(ir_diagnostic(&err, &name).with_severity(Severity::Note));
            }
            Err(err) => sink.emit(ir_diagnostic(&err, &name)),
        }
    }
    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::Design;

    #[test]
    fn inverter_reduces() {
        let mut ctx = Context::new();
        let m = demo::build(&mut ctx, Design::Inverter).unwrap();
        let targets = select_processes(&ctx, m, None).unwrap();
        let mut sink = DiagnosticSink::new();
        let reduced = reduce_all(&mut ctx, m, &targets, &mut sink).unwrap();
        assert_eq!(reduced.len(), 1);
        assert_eq!(ctx.unit_name(reduced[0]), "inv.ent");
        assert!(ctx.unit(reduced[0]).is_entity());
        assert_eq!(ctx.module(m).units().len(), 2);
        assert_eq!(ctx.validate_module(m), Ok(()));
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn lagce_declines_with_a_note() {
        let mut ctx = Context::new();
        let m = demo::build(&mut ctx, Design::Lagce).unwrap();
        let targets = select_processes(&ctx, m, Some("LAGCE_proc")).unwrap();
        let mut sink = DiagnosticSink::new();
        let reduced = reduce_all(&mut ctx, m, &targets, &mut sink).unwrap();
        assert!(reduced.is_empty());
        assert!(!sink.has_errors());
        assert_eq!(sink.diagnostics()[0].severity, Severity::Note);
        assert_eq!(sink.diagnostics()[0].code.to_string(), "E318");
    }

    #[test]
    fn invalid_process_is_an_error() {
        let mut ctx = Context::new();
        let m = demo::build(&mut ctx, Design::LagceOrphan).unwrap();
        let targets = select_processes(&ctx, m, None).unwrap();
        let mut sink = DiagnosticSink::new();
        reduce_all(&mut ctx, m, &targets, &mut sink).unwrap();
        assert!(sink.has_errors());
    }

    #[test]
    fn unknown_unit() {
        let mut ctx = Context::new();
        let m = demo::build(&mut ctx, Design::Lagce).unwrap();
        assert!(select_processes(&ctx, m, Some("nope")).is_err());
    }
}
