//! Behavioral reduction: turning processes into entities.
//!
//! A reduction pass receives a valid process and either returns a new valid
//! entity with the same signature type, or declines with
//! [`IrError::NotReducible`] and leaves the process exactly as it was.
//! [`run_reduction`] enforces both halves of that contract around any pass.

use crate::context::Context;
use crate::error::{IrError, IrResult};
use crate::ids::{UnitId, ValueId};
use crate::inst::InstKind;
use crate::unit::UnitKind;
use std::collections::HashMap;

/// A pass that reduces a process to an equivalent entity.
pub trait ReductionPass {
    /// The name used in diagnostics and logs.
    fn name(&self) -> &str;

    /// Reduces `process`, returning the new entity.
    ///
    /// Implementations must not modify `process` when they decline.
    fn reduce(&mut self, ctx: &mut Context, process: UnitId) -> IrResult<UnitId>;
}

/// Runs `pass` on `process`, checking the reduction contract.
///
/// The process is validated first and any violation is returned as is.
/// A declining pass that changed the process, or a succeeding pass whose
/// result is not a valid entity with the process's signature, yields
/// [`IrError::ContractViolation`].
pub fn run_reduction(
    pass: &mut dyn ReductionPass,
    ctx: &mut Context,
    process: UnitId,
) -> IrResult<UnitId> {
    let unit_name = ctx.unit_name(process).to_string();
    if ctx.unit(process).kind() != UnitKind::Process {
        return Err(IrError::NotReducible {
            unit: unit_name,
            reason: "only processes can be reduced".to_string(),
        });
    }
    ctx.validate_unit(process)?;
    let revision = ctx.unit(process).revision();
    let sig = ctx.unit(process).sig();
    let pass_name = pass.name().to_string();
    let violation = |reason: String| IrError::ContractViolation {
        pass: pass_name.clone(),
        reason,
    };

    let outcome = pass.reduce(ctx, process);
    let unchanged = ctx
        .try_unit(process)
        .is_some_and(|u| u.revision() == revision);

    let entity = match outcome {
        Ok(entity) => entity,
        Err(err) => {
            if !unchanged {
                return Err(violation(format!(
                    "declined @{unit_name} after modifying it"
                )));
            }
            tracing::warn!(
                pass = %pass_name,
                unit = %unit_name,
                reason = %err,
                "reduction declined"
            );
            return Err(err);
        }
    };

    let Some(result) = ctx.try_unit(entity) else {
        return Err(violation("returned a destroyed unit".to_string()));
    };
    if result.kind() != UnitKind::Entity {
        return Err(violation(format!(
            "reduced @{unit_name} to a process instead of an entity"
        )));
    }
    if result.sig() != sig {
        return Err(violation(format!(
            "reduced @{unit_name} to signature {}, expected {}",
            ctx.types().display(result.sig()),
            ctx.types().display(sig)
        )));
    }
    if let Err(err) = ctx.validate_unit(entity) {
        return Err(violation(format!("produced an invalid entity: {err}")));
    }
    tracing::debug!(
        pass = %pass_name,
        unit = %unit_name,
        entity = %ctx.unit_name(entity),
        "reduced process"
    );
    Ok(entity)
}

/// Reduces single-block processes that only compute and drive values.
///
/// The block may hold constants, comparisons, and drives, and must end in
/// `ret`. Each target may be driven at most once. A `halt` drives its targets
/// only once, so the pass declines it along with any control flow or repeated
/// drive. The entity is named after the process with an `.ent` suffix and is
/// left standalone.
#[derive(Debug, Default)]
pub struct StraightLineReduction;

impl StraightLineReduction {
    fn check(&self, ctx: &Context, process: UnitId) -> Result<(), String> {
        let data = ctx.unit(process);
        let [block] = data.blocks() else {
            return Err(format!("control flow across {} blocks", data.blocks().len()));
        };
        let mut driven: Vec<ValueId> = Vec::new();
        for &inst in ctx.block(*block).insts() {
            let inst = ctx.inst(inst);
            match inst.kind() {
                InstKind::Const(_) | InstKind::Cmp(_) => {}
                InstKind::Ret => {}
                InstKind::Halt => return Err("halt runs the block only once".to_string()),
                InstKind::Drv => {
                    let target = inst.operands()[0];
                    if driven.contains(&target) {
                        return Err(format!(
                            "{} is driven more than once",
                            ctx.describe_value(target)
                        ));
                    }
                    driven.push(target);
                }
                other => return Err(format!("{} is not straight-line", other.mnemonic())),
            }
        }
        Ok(())
    }

    fn build(&self, ctx: &mut Context, process: UnitId, entity: UnitId) -> IrResult<()> {
        let mut map: HashMap<ValueId, ValueId> = HashMap::new();
        let (inputs, outputs) = {
            let data = ctx.unit(process);
            (data.inputs().to_vec(), data.outputs().to_vec())
        };
        for (i, &arg) in inputs.iter().enumerate() {
            map.insert(arg, ctx.input(entity, i));
        }
        for (i, &arg) in outputs.iter().enumerate() {
            map.insert(arg, ctx.output(entity, i));
        }
        for (&old, &new) in &map.clone() {
            if let Some(name) = ctx.value_name(old).map(str::to_string) {
                ctx.set_name(new, Some(name.as_str()))?;
            }
        }

        let block = ctx.unit(process).blocks()[0];
        for inst in ctx.block(block).insts().to_vec() {
            let data = ctx.inst(inst);
            if data.kind().is_terminator() {
                continue;
            }
            let kind = data.kind().clone();
            let operands = data
                .operands()
                .iter()
                .map(|v| map.get(v).copied().unwrap_or(*v))
                .collect();
            let old_results = data.results().to_vec();
            let new_inst = ctx.append_inst(entity, kind, operands)?;
            let new_results = ctx.inst(new_inst).results().to_vec();
            for (old, new) in old_results.into_iter().zip(new_results) {
                if let Some(name) = ctx.value_name(old).map(str::to_string) {
                    ctx.set_name(new, Some(name.as_str()))?;
                }
                map.insert(old, new);
            }
        }
        Ok(())
    }
}

impl ReductionPass for StraightLineReduction {
    fn name(&self) -> &str {
        "straight-line"
    }

    fn reduce(&mut self, ctx: &mut Context, process: UnitId) -> IrResult<UnitId> {
        let unit_name = ctx.unit_name(process).to_string();
        if let Err(reason) = self.check(ctx, process) {
            return Err(IrError::NotReducible {
                unit: unit_name,
                reason,
            });
        }
        let sig = ctx.unit(process).sig();
        let entity = ctx.new_entity(sig, &format!("{unit_name}.ent"))?;
        if let Err(err) = self.build(ctx, process, entity) {
            ctx.destroy_unit(entity)?;
            return Err(err);
        }
        Ok(entity)
    }
}
