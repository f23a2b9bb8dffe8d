//! Instructions: kinds, type rules, placement, and in-place editing.
//!
//! An instruction lives either directly in an entity body or in a basic block
//! of a process. Its operands are value IDs; each operand slot is mirrored by a
//! [`Use`] record on the referenced value, and every operation here keeps the
//! two in sync.

use crate::const_value::ConstInt;
use crate::context::Context;
use crate::error::{IrError, IrResult};
use crate::ids::{BlockId, InstId, TypeId, UnitId, ValueId};
use crate::types::Type;
use crate::unit::UnitKind;
use crate::value::{ArgDirection, NameOwner, NameScope, Use, ValueData, ValueKind};
use loom_common::Ident;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Unsigned integer comparison predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Unsigned less than.
    Lt,
    /// Unsigned less than or equal.
    Le,
    /// Unsigned greater than.
    Gt,
    /// Unsigned greater than or equal.
    Ge,
}

impl CompareOp {
    /// All predicates in a fixed order.
    pub const ALL: [CompareOp; 6] = [
        CompareOp::Eq,
        CompareOp::Ne,
        CompareOp::Lt,
        CompareOp::Le,
        CompareOp::Gt,
        CompareOp::Ge,
    ];

    /// The assembly mnemonic of the predicate.
    pub fn mnemonic(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "neq",
            CompareOp::Lt => "ult",
            CompareOp::Le => "ule",
            CompareOp::Gt => "ugt",
            CompareOp::Ge => "uge",
        }
    }

    /// Parses a mnemonic produced by [`mnemonic`](Self::mnemonic).
    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == s)
    }

    /// Applies the predicate to two unsigned literals.
    pub fn evaluate(self, lhs: u64, rhs: u64) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ne => lhs != rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// The operation an instruction performs.
///
/// Operand layouts:
///
/// | kind      | operands                         | results            |
/// |-----------|----------------------------------|--------------------|
/// | `Const`   | none                             | `iN`               |
/// | `Sig`     | optional initial value of `ty`   | `ty$`              |
/// | `Cmp`     | two integers of equal type       | `i1`               |
/// | `Drv`     | target signal or output, value   | none               |
/// | `Inst`    | input bindings, output bindings  | one per output     |
/// | `Br`      | target block                     | none               |
/// | `BrCond`  | `i1` condition, then, else block | none               |
/// | `Ret`     | none                             | none               |
/// | `Halt`    | none                             | none               |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstKind {
    /// Materializes an integer constant.
    Const(ConstInt),
    /// Declares a signal carrying `ty`.
    Sig {
        /// The carried integer type.
        ty: TypeId,
    },
    /// Compares two integers.
    Cmp(CompareOp),
    /// Drives a value onto a signal or output.
    Drv,
    /// Instantiates another unit.
    Inst {
        /// The instantiated unit.
        callee: UnitId,
        /// How many leading operands are input bindings.
        inputs: u32,
    },
    /// Unconditional branch.
    Br,
    /// Conditional branch.
    BrCond,
    /// Returns from a process.
    Ret,
    /// Suspends a process forever.
    Halt,
}

impl InstKind {
    /// Returns `true` for instructions that end a basic block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            InstKind::Br | InstKind::BrCond | InstKind::Ret | InstKind::Halt
        )
    }

    /// The assembly mnemonic of the instruction.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            InstKind::Const(_) => "const",
            InstKind::Sig { .. } => "sig",
            InstKind::Cmp(_) => "cmp",
            InstKind::Drv => "drv",
            InstKind::Inst { .. } => "inst",
            InstKind::Br => "br",
            InstKind::BrCond => "br.cond",
            InstKind::Ret => "ret",
            InstKind::Halt => "halt",
        }
    }
}

/// Where an instruction lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstParent {
    /// Directly in the body of an entity.
    Entity(UnitId),
    /// In a basic block.
    Block(BlockId),
}

impl From<UnitId> for InstParent {
    fn from(unit: UnitId) -> Self {
        InstParent::Entity(unit)
    }
}

impl From<BlockId> for InstParent {
    fn from(block: BlockId) -> Self {
        InstParent::Block(block)
    }
}

/// An instruction node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstData {
    pub(crate) kind: InstKind,
    pub(crate) operands: Vec<ValueId>,
    pub(crate) results: Vec<ValueId>,
    pub(crate) parent: InstParent,
    pub(crate) label: Option<Ident>,
}

impl InstData {
    /// The operation.
    pub fn kind(&self) -> &InstKind {
        &self.kind
    }

    /// Operands in slot order.
    pub fn operands(&self) -> &[ValueId] {
        &self.operands
    }

    /// Result values in order.
    pub fn results(&self) -> &[ValueId] {
        &self.results
    }

    /// The first result, if the instruction produces one.
    pub fn result(&self) -> Option<ValueId> {
        self.results.first().copied()
    }

    /// The entity or block holding the instruction.
    pub fn parent(&self) -> InstParent {
        self.parent
    }

    /// The instance label, if any.
    pub fn label(&self) -> Option<Ident> {
        self.label
    }

    /// For instances, the input bindings.
    pub fn instance_inputs(&self) -> &[ValueId] {
        match self.kind {
            InstKind::Inst { inputs, .. } => &self.operands[..inputs as usize],
            _ => &[],
        }
    }

    /// For instances, the output bindings.
    pub fn instance_outputs(&self) -> &[ValueId] {
        match self.kind {
            InstKind::Inst { inputs, .. } => &self.operands[inputs as usize..],
            _ => &[],
        }
    }
}

impl Context {
    /// Appends an instruction to an entity body or a block.
    ///
    /// Operands are checked against the type rules of `kind`, the placement
    /// rules of the target unit, and ownership: each operand must be a pooled
    /// constant or belong to the same unit. On success the instruction and its
    /// result values are linked into the graph.
    pub fn append_inst(
        &mut self,
        parent: impl Into<InstParent>,
        kind: InstKind,
        operands: Vec<ValueId>,
    ) -> IrResult<InstId> {
        self.insert_inst(parent.into(), None, kind, operands)
    }

    /// Inserts an instruction immediately before `anchor`.
    pub fn insert_inst_before(
        &mut self,
        anchor: InstId,
        kind: InstKind,
        operands: Vec<ValueId>,
    ) -> IrResult<InstId> {
        let (parent, pos) = self.inst_position(anchor);
        self.insert_inst(parent, Some(pos), kind, operands)
    }

    /// Inserts an instruction immediately after `anchor`.
    pub fn insert_inst_after(
        &mut self,
        anchor: InstId,
        kind: InstKind,
        operands: Vec<ValueId>,
    ) -> IrResult<InstId> {
        let (parent, pos) = self.inst_position(anchor);
        self.insert_inst(parent, Some(pos + 1), kind, operands)
    }

    fn inst_position(&self, inst: InstId) -> (InstParent, usize) {
        let parent = self.insts[inst].parent;
        let pos = self
            .parent_insts(parent)
            .iter()
            .position(|&i| i == inst)
            .unwrap_or(0);
        (parent, pos)
    }

    fn insert_inst(
        &mut self,
        parent: InstParent,
        pos: Option<usize>,
        kind: InstKind,
        operands: Vec<ValueId>,
    ) -> IrResult<InstId> {
        let unit = self.resolve_parent(parent)?;
        self.check_placement(unit, &kind)?;
        let pos = pos.unwrap_or_else(|| self.parent_insts(parent).len());
        if let InstParent::Block(block) = parent {
            self.check_terminator_slot(block, pos, &kind)?;
        }
        for &op in &operands {
            self.check_operand_scope(unit, op)?;
        }
        let result_tys = self.infer_results(&kind, &operands, unit)?;

        let id = self.insts.next_id();
        let mut results = Vec::with_capacity(result_tys.len());
        for (index, ty) in result_tys.into_iter().enumerate() {
            let ty = self.types.intern(ty);
            let kind = ValueKind::InstResult {
                inst: id,
                index: index as u32,
            };
            results.push(self.values.alloc(ValueData::new(ty, kind)));
        }
        for (slot, &op) in operands.iter().enumerate() {
            self.values[op].uses.push(Use {
                inst: id,
                operand: slot as u32,
            });
        }
        if let InstKind::Inst { callee, .. } = kind {
            self.units[callee].instances.push(id);
        }
        let mnemonic = kind.mnemonic();
        let allocated = self.insts.alloc(InstData {
            kind,
            operands,
            results,
            parent,
            label: None,
        });
        debug_assert_eq!(allocated, id);
        self.parent_insts_mut(parent).insert(pos, id);
        self.touch(unit);
        tracing::debug!(
            unit = %self.unit_name(unit),
            inst = id.as_raw(),
            kind = mnemonic,
            "inserted instruction"
        );
        Ok(id)
    }

    /// Removes an instruction whose results are unused.
    ///
    /// Fails with [`IrError::DanglingReference`] if any result still has uses.
    /// The instruction's own operand uses are unlinked.
    pub fn remove_inst(&mut self, inst: InstId) -> IrResult<()> {
        let data = &self.insts[inst];
        for &result in &data.results {
            let count = self.values[result].uses.len();
            if count > 0 {
                return Err(IrError::DanglingReference {
                    what: self.describe_value(result),
                    count,
                });
            }
        }
        let parent = data.parent;
        let unit = self.inst_unit(inst);
        self.parent_insts_mut(parent).retain(|&i| i != inst);
        self.free_inst(inst);
        if let Some(unit) = unit {
            self.touch(unit);
            tracing::debug!(
                unit = %self.unit_name(unit),
                inst = inst.as_raw(),
                "removed instruction"
            );
        }
        Ok(())
    }

    /// Replaces operand `index` of `inst` with `value`.
    ///
    /// The instruction is re-checked with the new operand list and must keep
    /// its result types. In entities, a substitution that would close a
    /// dataflow cycle is rejected with [`IrError::DataflowCycle`].
    pub fn set_operand(&mut self, inst: InstId, index: usize, value: ValueId) -> IrResult<()> {
        let data = &self.insts[inst];
        let Some(&old) = data.operands.get(index) else {
            return Err(IrError::InvalidPlacement(format!(
                "{} has no operand #{index}",
                data.kind.mnemonic()
            )));
        };
        if old == value {
            return Ok(());
        }
        let mut operands = data.operands.clone();
        operands[index] = value;
        self.check_rewrite(inst, &operands)?;

        let slot = Use {
            inst,
            operand: index as u32,
        };
        self.unuse(old, slot);
        self.values[value].uses.push(slot);
        self.insts[inst].operands = operands;
        if let Some(unit) = self.inst_unit(inst) {
            self.touch(unit);
            tracing::debug!(
                unit = %self.unit_name(unit),
                inst = inst.as_raw(),
                operand = index,
                "rewrote operand"
            );
        }
        Ok(())
    }

    /// Sets or clears the label of an instruction, typically an instance name.
    ///
    /// Labels share the local namespace of the unit.
    pub fn set_inst_label(&mut self, inst: InstId, label: Option<&str>) -> IrResult<()> {
        let ident = label.map(|l| self.intern(l));
        if let (Some(ident), Some(unit)) = (ident, self.inst_unit(inst)) {
            self.check_unit_name(unit, ident, NameScope::Locals, NameOwner::Label(inst))?;
        }
        self.insts[inst].label = ident;
        if let Some(unit) = self.inst_unit(inst) {
            self.touch(unit);
        }
        Ok(())
    }

    /// Returns the label of an instruction.
    pub fn inst_label(&self, inst: InstId) -> Option<&str> {
        self.insts[inst].label.map(|l| self.resolve(l))
    }

    /// Checks that `inst` would be well-formed with `operands` in place of its
    /// current operand list.
    pub(crate) fn check_rewrite(&self, inst: InstId, operands: &[ValueId]) -> IrResult<()> {
        let data = &self.insts[inst];
        let Some(unit) = self.inst_unit(inst) else {
            return Err(IrError::NotAttached(format!(
                "block holding {}",
                data.kind.mnemonic()
            )));
        };
        for &op in operands {
            self.check_operand_scope(unit, op)?;
        }
        let tys = self.infer_results(&data.kind, operands, unit)?;
        for (ty, &result) in tys.iter().zip(&data.results) {
            if self.types.get(self.values[result].ty) != ty {
                return Err(IrError::TypeMismatch(format!(
                    "rewriting {} would change the type of {}",
                    data.kind.mnemonic(),
                    self.describe_value(result)
                )));
            }
        }
        if self.units[unit].kind == UnitKind::Entity && self.creates_cycle(inst, operands) {
            let value = data
                .result()
                .map(|r| self.describe_value(r))
                .unwrap_or_else(|| data.kind.mnemonic().to_string());
            return Err(IrError::DataflowCycle {
                unit: self.unit_name(unit).to_string(),
                value,
            });
        }
        Ok(())
    }

    /// Returns `true` if `user` would transitively depend on itself when
    /// given `operands`.
    pub(crate) fn creates_cycle(&self, user: InstId, operands: &[ValueId]) -> bool {
        let mut stack: Vec<InstId> = operands
            .iter()
            .filter_map(|&v| self.values[v].defining_inst())
            .collect();
        let mut seen = HashSet::new();
        while let Some(inst) = stack.pop() {
            if inst == user {
                return true;
            }
            if !seen.insert(inst) {
                continue;
            }
            for &op in &self.insts[inst].operands {
                if let Some(def) = self.values[op].defining_inst() {
                    stack.push(def);
                }
            }
        }
        false
    }

    /// Unlinks and deallocates an instruction and its results without
    /// checking for remaining uses. The caller detaches it from its parent.
    pub(crate) fn free_inst(&mut self, inst: InstId) {
        let Some(data) = self.insts.remove(inst) else {
            return;
        };
        for (slot, &op) in data.operands.iter().enumerate() {
            self.unuse(
                op,
                Use {
                    inst,
                    operand: slot as u32,
                },
            );
        }
        for &result in &data.results {
            self.values.remove(result);
        }
        if let InstKind::Inst { callee, .. } = data.kind {
            if let Some(callee) = self.units.try_get_mut(callee) {
                callee.instances.retain(|&i| i != inst);
            }
        }
    }

    pub(crate) fn parent_insts(&self, parent: InstParent) -> &[InstId] {
        match parent {
            InstParent::Entity(unit) => &self.units[unit].insts,
            InstParent::Block(block) => &self.blocks[block].insts,
        }
    }

    fn parent_insts_mut(&mut self, parent: InstParent) -> &mut Vec<InstId> {
        match parent {
            InstParent::Entity(unit) => &mut self.units[unit].insts,
            InstParent::Block(block) => &mut self.blocks[block].insts,
        }
    }

    fn resolve_parent(&self, parent: InstParent) -> IrResult<UnitId> {
        match parent {
            InstParent::Entity(unit) => {
                if self.units[unit].kind != UnitKind::Entity {
                    return Err(IrError::InvalidPlacement(format!(
                        "process @{} holds instructions in blocks",
                        self.unit_name(unit)
                    )));
                }
                Ok(unit)
            }
            InstParent::Block(block) => self.blocks[block].parent.ok_or_else(|| {
                IrError::NotAttached(format!("block %{}", self.block_name(block)))
            }),
        }
    }

    fn check_placement(&self, unit: UnitId, kind: &InstKind) -> IrResult<()> {
        let name = self.unit_name(unit);
        match (self.units[unit].kind, kind) {
            (UnitKind::Entity, k) if k.is_terminator() => Err(IrError::InvalidPlacement(format!(
                "{} is a terminator and entity @{name} has no control flow",
                k.mnemonic()
            ))),
            (UnitKind::Process, InstKind::Sig { .. }) => Err(IrError::InvalidPlacement(format!(
                "signals can only be declared in entities, not in process @{name}"
            ))),
            (UnitKind::Process, InstKind::Inst { .. }) => Err(IrError::InvalidPlacement(format!(
                "units can only be instantiated in entities, not in process @{name}"
            ))),
            _ => Ok(()),
        }
    }

    fn check_terminator_slot(&self, block: BlockId, pos: usize, kind: &InstKind) -> IrResult<()> {
        let insts = &self.blocks[block].insts;
        let terminated = insts
            .last()
            .is_some_and(|&i| self.insts[i].kind.is_terminator());
        let at_end = pos >= insts.len();
        if terminated && at_end {
            return Err(IrError::BlockAlreadyTerminated {
                block: self.block_name(block).to_string(),
            });
        }
        if kind.is_terminator() && (terminated || !at_end) {
            return Err(IrError::InvalidPlacement(format!(
                "{} must be the last instruction of %{}",
                kind.mnemonic(),
                self.block_name(block)
            )));
        }
        Ok(())
    }

    fn check_operand_scope(&self, unit: UnitId, op: ValueId) -> IrResult<()> {
        match self.value_unit(op) {
            Some(owner) if owner == unit => Ok(()),
            Some(owner) => Err(IrError::ForeignValue {
                value: self.describe_value(op),
                owner: self.unit_name(owner).to_string(),
                user: self.unit_name(unit).to_string(),
            }),
            None => match self.values[op].kind {
                ValueKind::Block(block) => Err(IrError::NotAttached(format!(
                    "block %{}",
                    self.block_name(block)
                ))),
                _ => Ok(()),
            },
        }
    }

    /// Returns the type carried by a drivable value: the inner type of a
    /// signal, or the type of a unit output.
    pub fn drive_inner(&self, value: ValueId) -> Option<TypeId> {
        let data = &self.values[value];
        if let Some(inner) = self.types.signal_inner(data.ty) {
            return Some(inner);
        }
        match data.kind {
            ValueKind::Argument {
                dir: ArgDirection::Output,
                ..
            } => Some(data.ty),
            _ => None,
        }
    }

    fn expect_ty(&self, value: ValueId, ty: TypeId, what: &str) -> IrResult<()> {
        let actual = self.values[value].ty;
        if actual == ty {
            return Ok(());
        }
        Err(IrError::TypeMismatch(format!(
            "{what} {} has type {}, expected {}",
            self.describe_value(value),
            self.types.display(actual),
            self.types.display(ty)
        )))
    }

    fn expect_block(&self, value: ValueId) -> IrResult<()> {
        match self.values[value].kind {
            ValueKind::Block(_) => Ok(()),
            _ => Err(IrError::TypeMismatch(format!(
                "branch target {} is not a block",
                self.describe_value(value)
            ))),
        }
    }

    /// Applies the type rules of `kind` to `operands`, returning the result
    /// types the instruction would have.
    pub(crate) fn infer_results(
        &self,
        kind: &InstKind,
        operands: &[ValueId],
        unit: UnitId,
    ) -> IrResult<Vec<Type>> {
        let arity = |n: usize| {
            if operands.len() == n {
                Ok(())
            } else {
                Err(IrError::TypeMismatch(format!(
                    "{} expects {n} operand(s), got {}",
                    kind.mnemonic(),
                    operands.len()
                )))
            }
        };
        match kind {
            InstKind::Const(konst) => {
                arity(0)?;
                Ok(vec![Type::Int(konst.width)])
            }
            InstKind::Sig { ty } => {
                if self.types.int_width(*ty).is_none() {
                    return Err(IrError::TypeMismatch(format!(
                        "signals carry integer types, not {}",
                        self.types.display(*ty)
                    )));
                }
                if operands.len() > 1 {
                    return Err(IrError::TypeMismatch(format!(
                        "sig takes at most one initial value, got {}",
                        operands.len()
                    )));
                }
                if let Some(&init) = operands.first() {
                    self.expect_ty(init, *ty, "initial value")?;
                }
                Ok(vec![Type::Signal(*ty)])
            }
            InstKind::Cmp(op) => {
                arity(2)?;
                let lhs = self.values[operands[0]].ty;
                if self.types.int_width(lhs).is_none() {
                    return Err(IrError::TypeMismatch(format!(
                        "cmp {op} operands must be integers, got {}",
                        self.types.display(lhs)
                    )));
                }
                self.expect_ty(operands[1], lhs, "right-hand side")?;
                Ok(vec![Type::Int(1)])
            }
            InstKind::Drv => {
                arity(2)?;
                let target = operands[0];
                let Some(inner) = self.drive_inner(target) else {
                    return Err(IrError::TypeMismatch(format!(
                        "drive target {} of type {} is neither a signal nor an output",
                        self.describe_value(target),
                        self.types.display(self.values[target].ty)
                    )));
                };
                self.expect_ty(operands[1], inner, "driven value")?;
                Ok(vec![])
            }
            InstKind::Inst { callee, inputs } => {
                self.infer_instance(*callee, *inputs as usize, operands, unit)
            }
            InstKind::Br => {
                arity(1)?;
                self.expect_block(operands[0])?;
                Ok(vec![])
            }
            InstKind::BrCond => {
                arity(3)?;
                let cond = operands[0];
                if self.types.int_width(self.values[cond].ty) != Some(1) {
                    return Err(IrError::TypeMismatch(format!(
                        "branch condition {} must be i1, got {}",
                        self.describe_value(cond),
                        self.types.display(self.values[cond].ty)
                    )));
                }
                self.expect_block(operands[1])?;
                self.expect_block(operands[2])?;
                Ok(vec![])
            }
            InstKind::Ret | InstKind::Halt => {
                arity(0)?;
                Ok(vec![])
            }
        }
    }

    /// Returns `true` if `ancestor` instantiates `unit`, directly or through
    /// other instances.
    fn instantiated_within(&self, unit: UnitId, ancestor: UnitId) -> bool {
        let mut stack = vec![unit];
        let mut seen: Vec<UnitId> = Vec::new();
        while let Some(current) = stack.pop() {
            if current == ancestor {
                return true;
            }
            if seen.contains(&current) {
                continue;
            }
            seen.push(current);
            stack.extend(
                self.units[current]
                    .instances
                    .iter()
                    .filter_map(|&inst| self.inst_unit(inst)),
            );
        }
        false
    }

    fn infer_instance(
        &self,
        callee: UnitId,
        inputs: usize,
        operands: &[ValueId],
        unit: UnitId,
    ) -> IrResult<Vec<Type>> {
        let Some(callee_data) = self.units.try_get(callee) else {
            return Err(IrError::SignatureMismatch(
                "instantiated unit no longer exists".to_string(),
            ));
        };
        let callee_name = self.resolve(callee_data.name);
        if callee == unit {
            return Err(IrError::InvalidPlacement(format!(
                "@{callee_name} cannot instantiate itself"
            )));
        }
        if self.instantiated_within(unit, callee) {
            return Err(IrError::InvalidPlacement(format!(
                "@{callee_name} already instantiates @{} and would recurse",
                self.unit_name(unit)
            )));
        }
        let Some((ins, outs)) = self.types.unit_ports(callee_data.sig) else {
            return Err(IrError::SignatureMismatch(format!(
                "@{callee_name} has no unit signature"
            )));
        };
        let bound_inputs = inputs.min(operands.len());
        let bound_outputs = operands.len() - bound_inputs;
        if inputs != ins.len() || bound_inputs != ins.len() || bound_outputs != outs.len() {
            return Err(IrError::SignatureMismatch(format!(
                "@{callee_name} expects {} input(s) and {} output(s), got {} and {}",
                ins.len(),
                outs.len(),
                inputs,
                bound_outputs
            )));
        }
        for (i, (&op, &port)) in operands[..inputs].iter().zip(ins).enumerate() {
            let ty = self.values[op].ty;
            if ty != port && self.types.signal_inner(ty) != Some(port) {
                return Err(IrError::SignatureMismatch(format!(
                    "input #{i} of @{callee_name} expects {}, got {} of type {}",
                    self.types.display(port),
                    self.describe_value(op),
                    self.types.display(ty)
                )));
            }
        }
        for (i, (&op, &port)) in operands[inputs..].iter().zip(outs).enumerate() {
            let ty = self.values[op].ty;
            if ty != port && self.drive_inner(op) != Some(port) {
                return Err(IrError::SignatureMismatch(format!(
                    "output #{i} of @{callee_name} expects a drivable {}, got {} of type {}",
                    self.types.display(port),
                    self.describe_value(op),
                    self.types.display(ty)
                )));
            }
        }
        Ok(outs.iter().map(|&t| self.types.get(t).clone()).collect())
    }
}
