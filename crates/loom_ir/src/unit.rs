//! Units: entities and processes.
//!
//! A unit has a name, a signature type, and one argument value per port. An
//! entity holds a flat list of dataflow instructions; a process holds a list
//! of basic blocks and an entry block designation.

use crate::context::Context;
use crate::error::{IrError, IrResult};
use crate::ids::{BlockId, InstId, ModuleId, TypeId, UnitId, ValueId};
use crate::value::{ArgDirection, NameOwner, ValueData, ValueKind};
use loom_common::Ident;
use serde::{Deserialize, Serialize};

/// The two flavors of unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// Pure dataflow: signals, comparisons, drives, and instances.
    Entity,
    /// Sequential control flow over basic blocks.
    Process,
}

impl UnitKind {
    /// The keyword used in the text format.
    pub fn keyword(self) -> &'static str {
        match self {
            UnitKind::Entity => "entity",
            UnitKind::Process => "proc",
        }
    }
}

/// A unit node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitData {
    pub(crate) name: Ident,
    pub(crate) kind: UnitKind,
    pub(crate) sig: TypeId,
    pub(crate) inputs: Vec<ValueId>,
    pub(crate) outputs: Vec<ValueId>,
    /// Entity body; always empty for processes.
    pub(crate) insts: Vec<InstId>,
    /// Process blocks; always empty for entities.
    pub(crate) blocks: Vec<BlockId>,
    pub(crate) entry: Option<BlockId>,
    pub(crate) module: Option<ModuleId>,
    /// Instances elsewhere that name this unit as callee.
    pub(crate) instances: Vec<InstId>,
    pub(crate) revision: u64,
}

impl UnitData {
    /// The interned name.
    pub fn name(&self) -> Ident {
        self.name
    }

    /// Entity or process.
    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// Returns `true` for entities.
    pub fn is_entity(&self) -> bool {
        self.kind == UnitKind::Entity
    }

    /// Returns `true` for processes.
    pub fn is_process(&self) -> bool {
        self.kind == UnitKind::Process
    }

    /// The signature type.
    pub fn sig(&self) -> TypeId {
        self.sig
    }

    /// Input argument values in port order.
    pub fn inputs(&self) -> &[ValueId] {
        &self.inputs
    }

    /// Output argument values in port order.
    pub fn outputs(&self) -> &[ValueId] {
        &self.outputs
    }

    /// The instructions of an entity body.
    pub fn insts(&self) -> &[InstId] {
        &self.insts
    }

    /// The blocks of a process.
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// The entry block of a process.
    pub fn entry(&self) -> Option<BlockId> {
        self.entry
    }

    /// The module the unit is attached to.
    pub fn module(&self) -> Option<ModuleId> {
        self.module
    }

    /// Instance instructions that reference this unit.
    pub fn instances(&self) -> &[InstId] {
        &self.instances
    }

    /// How many instances reference this unit.
    pub fn ref_count(&self) -> usize {
        self.instances.len()
    }

    /// Monotonic mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Context {
    /// Creates a standalone entity with the given signature.
    pub fn new_entity(&mut self, sig: TypeId, name: &str) -> IrResult<UnitId> {
        self.new_unit(UnitKind::Entity, sig, name)
    }

    /// Creates a standalone process with the given signature.
    pub fn new_process(&mut self, sig: TypeId, name: &str) -> IrResult<UnitId> {
        self.new_unit(UnitKind::Process, sig, name)
    }

    fn new_unit(&mut self, kind: UnitKind, sig: TypeId, name: &str) -> IrResult<UnitId> {
        let Some((ins, outs)) = self.types.unit_ports(sig) else {
            return Err(IrError::TypeMismatch(format!(
                "unit @{name} needs a signature type, got {}",
                self.types.display(sig)
            )));
        };
        let (ins, outs) = (ins.to_vec(), outs.to_vec());
        let id = self.units.next_id();
        let mut args = |tys: Vec<TypeId>, dir: ArgDirection| -> Vec<ValueId> {
            tys.into_iter()
                .enumerate()
                .map(|(index, ty)| {
                    let kind = ValueKind::Argument {
                        unit: id,
                        index: index as u32,
                        dir,
                    };
                    self.values.alloc(ValueData::new(ty, kind))
                })
                .collect()
        };
        let inputs = args(ins, ArgDirection::Input);
        let outputs = args(outs, ArgDirection::Output);
        let allocated = self.units.alloc(UnitData {
            name: self.interner.get_or_intern(name),
            kind,
            sig,
            inputs,
            outputs,
            insts: Vec::new(),
            blocks: Vec::new(),
            entry: None,
            module: None,
            instances: Vec::new(),
            revision: 0,
        });
        debug_assert_eq!(allocated, id);
        tracing::debug!(unit = name, kind = kind.keyword(), "created unit");
        Ok(id)
    }

    /// Returns the `index`-th input argument of a unit.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn input(&self, unit: UnitId, index: usize) -> ValueId {
        self.units[unit].inputs[index]
    }

    /// Returns the `index`-th output argument of a unit.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn output(&self, unit: UnitId, index: usize) -> ValueId {
        self.units[unit].outputs[index]
    }

    /// Renames a unit. The name must be unique within its module.
    pub fn set_unit_name(&mut self, unit: UnitId, name: &str) -> IrResult<()> {
        let ident = self.intern(name);
        if let Some(module) = self.units[unit].module {
            self.check_module_name(module, ident, Some(unit))?;
        }
        self.units[unit].name = ident;
        self.touch(unit);
        Ok(())
    }

    /// Names a unit's arguments in order, inputs first.
    pub fn name_args(&mut self, unit: UnitId, inputs: &[&str], outputs: &[&str]) -> IrResult<()> {
        for (i, name) in inputs.iter().enumerate() {
            let value = self.input(unit, i);
            self.set_name(value, Some(*name))?;
        }
        for (i, name) in outputs.iter().enumerate() {
            let value = self.output(unit, i);
            self.set_name(value, Some(*name))?;
        }
        Ok(())
    }

    /// Returns every instruction of a unit in program order.
    pub fn unit_insts(&self, unit: UnitId) -> Vec<InstId> {
        let data = &self.units[unit];
        let mut insts = data.insts.clone();
        for &block in &data.blocks {
            insts.extend_from_slice(&self.blocks[block].insts);
        }
        insts
    }

    /// Looks up an argument or local value of a unit by name.
    pub fn value_by_name(&self, unit: UnitId, name: &str) -> Option<ValueId> {
        let ident = self.interner.get(name)?;
        let data = &self.units[unit];
        data.inputs
            .iter()
            .chain(&data.outputs)
            .copied()
            .find(|&v| self.values[v].name == Some(ident))
            .or_else(|| {
                self.unit_locals(unit).into_iter().find_map(|(owner, n)| match owner {
                    NameOwner::Value(v) if n == ident => Some(v),
                    _ => None,
                })
            })
    }

    /// Destroys a unit and everything it owns.
    ///
    /// Fails with [`IrError::DanglingReference`] while any instance elsewhere
    /// still references the unit. Instances held by this unit release their
    /// callees.
    pub fn destroy_unit(&mut self, unit: UnitId) -> IrResult<()> {
        let data = &self.units[unit];
        if !data.instances.is_empty() {
            return Err(IrError::DanglingReference {
                what: format!("unit @{}", self.unit_name(unit)),
                count: data.instances.len(),
            });
        }
        if let Some(module) = data.module {
            self.modules[module].units.retain(|&u| u != unit);
        }
        for inst in self.unit_insts(unit) {
            self.free_inst(inst);
        }
        let name = self.unit_name(unit).to_string();
        let Some(data) = self.units.remove(unit) else {
            return Ok(());
        };
        for block in data.blocks {
            if let Some(block) = self.blocks.remove(block) {
                self.values.remove(block.value);
            }
        }
        for value in data.inputs.into_iter().chain(data.outputs) {
            self.values.remove(value);
        }
        tracing::debug!(unit = %name, "destroyed unit");
        Ok(())
    }
}
