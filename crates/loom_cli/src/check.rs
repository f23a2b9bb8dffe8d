//! Verification and lint findings as diagnostics.
//!
//! Invariant violations from [`Context::verify_unit`] become `E3xx` errors.
//! Two lints run on top of that, each reported as a `W1xx` warning unless the
//! `[verify]` section of `loom.toml` (or `--allow`/`--deny`) says otherwise:
//!
//! | code | rule              | finding                                          |
//! |------|-------------------|--------------------------------------------------|
//! | W101 | `unused-value`    | a const, sig, or cmp result nobody uses          |
//! | W102 | `undriven-output` | an output no drive targets and no instance binds |

use loom_config::{RuleLevel, VerifyConfig};
use loom_diagnostics::{Diagnostic, DiagnosticCode, Severity};
use loom_ir::{Context, InstKind, IrError, ModuleId, UnitId, UnitKind, ValueId};

/// `unused-value`
pub const UNUSED_VALUE: DiagnosticCode = DiagnosticCode::warning(101);
/// `undriven-output`
pub const UNDRIVEN_OUTPUT: DiagnosticCode = DiagnosticCode::warning(102);

/// Returns the stable code for an IR error.
pub fn error_code(err: &IrError) -> DiagnosticCode {
    let number = match err {
        IrError::InvalidWidth { .. } => 300,
        IrError::LiteralOutOfRange { .. } => 301,
        IrError::DuplicateName { .. } => 302,
        IrError::TypeMismatch(_) => 303,
        IrError::SignatureMismatch(_) => 304,
        IrError::OrphanBlock { .. } => 305,
        IrError::MissingTerminator { .. } => 306,
        IrError::BlockAlreadyTerminated { .. } => 307,
        IrError::MissingEntry { .. } => 308,
        IrError::EntryAlreadySet { .. } => 309,
        IrError::DanglingReference { .. } => 310,
        IrError::InvalidPlacement(_) => 311,
        IrError::ForeignValue { .. } => 312,
        IrError::AlreadyAttached(_) => 313,
        IrError::NotAttached(_) => 314,
        IrError::DataflowCycle { .. } => 315,
        IrError::CorruptUseList { .. } => 316,
        IrError::OwnedByUnit { .. } => 317,
        IrError::NotReducible { .. } => 318,
        IrError::ContractViolation { .. } => 319,
    };
    DiagnosticCode::error(number)
}

/// Converts an IR error found in `unit` into an error diagnostic.
pub fn ir_diagnostic(err: &IrError, unit: &str) -> Diagnostic {
    let location = match err {
        IrError::OrphanBlock { unit, block } => format!("@{unit} %{block}"),
        IrError::MissingTerminator { block } | IrError::BlockAlreadyTerminated { block } => {
            format!("@{unit} %{block}")
        }
        IrError::ForeignValue { user, .. } => format!("@{user}"),
        _ => format!("@{unit}"),
    };
    let diag = Diagnostic::error(error_code(err), err.to_string()).at(location);
    match err {
        IrError::OrphanBlock { .. } => diag.with_help("branch to the block or remove it"),
        IrError::MissingTerminator { .. } => {
            diag.with_help("end the block with br, br.cond, ret, or halt")
        }
        IrError::MissingEntry { .. } => diag.with_help("mark one block as the entry block"),
        IrError::DataflowCycle { .. } => {
            diag.with_note("entities describe combinational logic and cannot feed back")
        }
        _ => diag,
    }
}

/// Verifies every unit of `module` and runs the lints.
pub fn check_module(ctx: &Context, module: ModuleId, rules: &VerifyConfig) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    for &unit in ctx.module(module).units() {
        let name = ctx.unit_name(unit);
        diags.extend(
            ctx.verify_unit(unit)
                .iter()
                .map(|err| ir_diagnostic(err, name)),
        );
        diags.extend(lint_unit(ctx, unit, rules));
    }
    diags
}

/// Runs the lints on one unit, applying the configured levels.
pub fn lint_unit(ctx: &Context, unit: UnitId, rules: &VerifyConfig) -> Vec<Diagnostic> {
    let mut findings = Vec::new();
    if rules.level("unused-value") != RuleLevel::Allow {
        findings.extend(unused_values(ctx, unit));
    }
    if rules.level("undriven-output") != RuleLevel::Allow {
        findings.extend(undriven_outputs(ctx, unit));
    }
    findings
        .into_iter()
        .map(|diag| {
            let rule = if diag.code == UNUSED_VALUE {
                "unused-value"
            } else {
                "undriven-output"
            };
            match rules.level(rule) {
                RuleLevel::Deny => diag.with_severity(Severity::Error),
                _ => diag,
            }
        })
        .collect()
}

fn unused_values(ctx: &Context, unit: UnitId) -> Vec<Diagnostic> {
    let name = ctx.unit_name(unit);
    ctx.unit_insts(unit)
        .into_iter()
        .filter(|&inst| {
            matches!(
                ctx.inst(inst).kind(),
                InstKind::Const(_) | InstKind::Sig { .. } | InstKind::Cmp(_)
            )
        })
        .flat_map(|inst| ctx.inst(inst).results().to_vec())
        .filter(|&value| !ctx.value(value).has_uses())
        .map(|value| {
            Diagnostic::warning(
                UNUSED_VALUE,
                format!("{} is never used", ctx.describe_value(value)),
            )
            .at(format!("@{name}"))
            .with_help("remove the instruction")
        })
        .collect()
}

fn undriven_outputs(ctx: &Context, unit: UnitId) -> Vec<Diagnostic> {
    let name = ctx.unit_name(unit);
    let kind = match ctx.unit(unit).kind() {
        UnitKind::Entity => "entity",
        UnitKind::Process => "process",
    };
    ctx.unit(unit)
        .outputs()
        .iter()
        .copied()
        .filter(|&out| !is_driven(ctx, out))
        .map(|out| {
            Diagnostic::warning(
                UNDRIVEN_OUTPUT,
                format!("{} of {kind} @{name} is never driven", ctx.describe_value(out)),
            )
            .at(format!("@{name}"))
        })
        .collect()
}

/// An output counts as driven when it is the target of a `drv` or an output
/// binding of an instance.
fn is_driven(ctx: &Context, value: ValueId) -> bool {
    ctx.uses(value).iter().any(|u| {
        let inst = ctx.inst(u.inst);
        match inst.kind() {
            InstKind::Drv => u.operand == 0,
            InstKind::Inst { inputs, .. } => u.operand >= *inputs,
            _ => false,
        }
    })
}
