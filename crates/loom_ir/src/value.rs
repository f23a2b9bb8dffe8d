//! Values and their use-lists.
//!
//! Every named, typed, usable thing in the IR is a value: pooled constants,
//! block references, instruction results, and unit arguments. A value records
//! each operand slot that currently references it, so replacing or destroying
//! it is an edit proportional to its number of uses.

use crate::const_value::ConstInt;
use crate::context::Context;
use crate::error::{IrError, IrResult};
use crate::ids::{BlockId, InstId, TypeId, UnitId, ValueId};
use loom_common::Ident;
use serde::{Deserialize, Serialize};

/// Whether a unit argument is an input or an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArgDirection {
    /// Data flows into the unit.
    Input,
    /// Data flows out of the unit.
    Output,
}

/// What a value is, and who owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    /// A pooled constant owned by the context.
    Const(ConstInt),
    /// The reference to a basic block, owned by the block.
    Block(BlockId),
    /// The `index`-th result of an instruction, owned by the instruction.
    InstResult {
        /// The producing instruction.
        inst: InstId,
        /// Result position.
        index: u32,
    },
    /// An input or output of a unit, owned by the unit.
    Argument {
        /// The owning unit.
        unit: UnitId,
        /// Position within the inputs or outputs.
        index: u32,
        /// Which list the argument belongs to.
        dir: ArgDirection,
    },
}

/// One operand slot referencing a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Use {
    /// The instruction holding the operand.
    pub inst: InstId,
    /// The operand position within that instruction.
    pub operand: u32,
}

/// A value node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueData {
    pub(crate) ty: TypeId,
    pub(crate) name: Option<Ident>,
    pub(crate) kind: ValueKind,
    pub(crate) uses: Vec<Use>,
}

impl ValueData {
    pub(crate) fn new(ty: TypeId, kind: ValueKind) -> Self {
        Self {
            ty,
            name: None,
            kind,
            uses: Vec::new(),
        }
    }

    /// The type of the value.
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    /// The interned name, if any.
    pub fn name(&self) -> Option<Ident> {
        self.name
    }

    /// What the value is.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// The operand slots currently referencing this value.
    pub fn uses(&self) -> &[Use] {
        &self.uses
    }

    /// Returns `true` if any operand references this value.
    pub fn has_uses(&self) -> bool {
        !self.uses.is_empty()
    }

    /// Returns the instruction producing this value, if it is a result.
    pub fn defining_inst(&self) -> Option<InstId> {
        match self.kind {
            ValueKind::InstResult { inst, .. } => Some(inst),
            _ => None,
        }
    }
}

/// Who holds a name inside a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameOwner {
    Value(ValueId),
    Label(InstId),
}

/// Which names a new name must not collide with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NameScope {
    /// Other inputs and all locals.
    Inputs,
    /// Other outputs and all locals.
    Outputs,
    /// Everything in the unit.
    Locals,
}

impl Context {
    /// Returns the operand slots currently referencing `value`.
    pub fn uses(&self, value: ValueId) -> &[Use] {
        &self.values[value].uses
    }

    /// Assigns or clears the name of a value.
    ///
    /// Fails with [`IrError::DuplicateName`] if another value in the same
    /// scope already carries the name. Blocks cannot be made anonymous.
    pub fn set_name(&mut self, value: ValueId, name: Option<&str>) -> IrResult<()> {
        let ident = name.map(|n| self.intern(n));
        match self.values[value].kind {
            ValueKind::Const(_) => {}
            ValueKind::Block(block) => {
                let Some(ident) = ident else {
                    return Err(IrError::InvalidPlacement(
                        "basic blocks must be named".to_string(),
                    ));
                };
                if let Some(process) = self.blocks[block].parent {
                    self.check_block_name(process, ident, Some(block))?;
                }
            }
            ValueKind::InstResult { inst, .. } => {
                if let (Some(ident), Some(unit)) = (ident, self.inst_unit(inst)) {
                    self.check_unit_name(unit, ident, NameScope::Locals, NameOwner::Value(value))?;
                }
            }
            ValueKind::Argument { unit, dir, .. } => {
                if let Some(ident) = ident {
                    let scope = match dir {
                        ArgDirection::Input => NameScope::Inputs,
                        ArgDirection::Output => NameScope::Outputs,
                    };
                    self.check_unit_name(unit, ident, scope, NameOwner::Value(value))?;
                }
            }
        }
        self.values[value].name = ident;
        if let Some(unit) = self.value_unit(value) {
            self.touch(unit);
        }
        Ok(())
    }

    /// Collects every named local (instruction results and labels) of a unit.
    pub(crate) fn unit_locals(&self, unit: UnitId) -> Vec<(NameOwner, Ident)> {
        let mut names = Vec::new();
        for inst in self.unit_insts(unit) {
            let data = &self.insts[inst];
            if let Some(label) = data.label {
                names.push((NameOwner::Label(inst), label));
            }
            for &result in &data.results {
                if let Some(name) = self.values[result].name {
                    names.push((NameOwner::Value(result), name));
                }
            }
        }
        names
    }

    /// Checks that `name` is free in the given scope of `unit`, ignoring `owner`.
    pub(crate) fn check_unit_name(
        &self,
        unit: UnitId,
        name: Ident,
        scope: NameScope,
        owner: NameOwner,
    ) -> IrResult<()> {
        let data = &self.units[unit];
        let mut taken = self.unit_locals(unit);
        let args = |list: &[ValueId]| {
            list.iter()
                .filter_map(|&v| self.values[v].name.map(|n| (NameOwner::Value(v), n)))
                .collect::<Vec<_>>()
        };
        if scope != NameScope::Outputs {
            taken.extend(args(&data.inputs));
        }
        if scope != NameScope::Inputs {
            taken.extend(args(&data.outputs));
        }
        if taken.iter().any(|&(o, n)| n == name && o != owner) {
            let unit_name = self.unit_name(unit);
            let scope = match scope {
                NameScope::Inputs => format!("inputs of @{unit_name}"),
                NameScope::Outputs => format!("outputs of @{unit_name}"),
                NameScope::Locals => format!("@{unit_name}"),
            };
            return Err(IrError::DuplicateName {
                name: self.resolve(name).to_string(),
                scope,
            });
        }
        Ok(())
    }

    /// Replaces every use of `old` with `new`, returning the number of operand
    /// slots rewritten.
    ///
    /// All affected instructions are checked before anything changes: if `new`
    /// is not acceptable in any one of the slots, the call fails and the graph
    /// is left untouched.
    pub fn replace_all_uses(&mut self, old: ValueId, new: ValueId) -> IrResult<usize> {
        if old == new {
            return Ok(0);
        }
        let uses = self.values[old].uses.clone();

        let mut rewrites: Vec<(InstId, Vec<ValueId>)> = Vec::new();
        for u in &uses {
            if rewrites.iter().any(|(inst, _)| *inst == u.inst) {
                continue;
            }
            let operands = self.insts[u.inst]
                .operands
                .iter()
                .map(|&op| if op == old { new } else { op })
                .collect();
            rewrites.push((u.inst, operands));
        }
        for (inst, operands) in &rewrites {
            self.check_rewrite(*inst, operands)?;
        }

        for (inst, operands) in rewrites {
            self.insts[inst].operands = operands;
            if let Some(unit) = self.inst_unit(inst) {
                self.touch(unit);
            }
        }
        self.values[old].uses.clear();
        self.values[new].uses.extend_from_slice(&uses);
        tracing::debug!(
            old = %self.describe_value(old),
            new = %self.describe_value(new),
            uses = uses.len(),
            "replaced all uses"
        );
        Ok(uses.len())
    }

    /// Destroys a value through its owner.
    ///
    /// Constants are released from the pool, instruction results remove their
    /// instruction, and block references remove their block. All of these fail
    /// with [`IrError::DanglingReference`] while uses remain. Unit arguments
    /// live as long as their unit.
    pub fn destroy_value(&mut self, value: ValueId) -> IrResult<()> {
        match self.values[value].kind {
            ValueKind::Const(_) => self.release_constant(value),
            ValueKind::InstResult { inst, .. } => self.remove_inst(inst),
            ValueKind::Block(block) => self.remove_block(block),
            ValueKind::Argument { unit, .. } => Err(IrError::OwnedByUnit {
                value: self.describe_value(value),
                unit: self.unit_name(unit).to_string(),
            }),
        }
    }

    /// Removes one use record from a value, if both still exist.
    pub(crate) fn unuse(&mut self, value: ValueId, slot: Use) {
        if let Some(data) = self.values.try_get_mut(value) {
            if let Some(pos) = data.uses.iter().position(|u| *u == slot) {
                data.uses.swap_remove(pos);
            }
        }
    }
}
