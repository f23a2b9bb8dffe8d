//! The IR context: the single owner of every node in the graph.
//!
//! A [`Context`] holds the type database, the name interner, the constant
//! pool, and one arena per node kind. Nodes refer to each other only through
//! copyable IDs, so shared references (operands, successor edges, instance
//! callees) never own anything; ownership is the tree Module → Unit →
//! Block → Instruction → result value, plus the context-wide constant pool.
//!
//! There is no global state. Independent contexts can coexist, and a context
//! may be moved to another thread, but all mutation goes through `&mut self`.

use crate::arena::Arena;
use crate::block::BlockData;
use crate::const_value::ConstInt;
use crate::error::{IrError, IrResult};
use crate::ids::{BlockId, InstId, ModuleId, TypeId, UnitId, ValueId};
use crate::inst::{InstData, InstParent};
use crate::module::ModuleData;
use crate::types::TypeDb;
use crate::unit::UnitData;
use crate::value::{ArgDirection, ValueData, ValueKind};
use loom_common::{Ident, Interner};
use std::collections::HashMap;
use std::fmt;

/// Owner of an IR graph.
#[derive(Default)]
pub struct Context {
    pub(crate) interner: Interner,
    pub(crate) types: TypeDb,
    pub(crate) values: Arena<ValueId, ValueData>,
    pub(crate) insts: Arena<InstId, InstData>,
    pub(crate) blocks: Arena<BlockId, BlockData>,
    pub(crate) units: Arena<UnitId, UnitData>,
    pub(crate) modules: Arena<ModuleId, ModuleData>,
    pub(crate) consts: HashMap<ConstInt, ValueId>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Types ---

    /// Returns the type database.
    pub fn types(&self) -> &TypeDb {
        &self.types
    }

    /// Returns the type database for constructing types.
    pub fn types_mut(&mut self) -> &mut TypeDb {
        &mut self.types
    }

    /// Returns the void type.
    pub fn void_ty(&mut self) -> TypeId {
        self.types.void()
    }

    /// Returns the integer type of the given width.
    pub fn int_ty(&mut self, width: u32) -> IrResult<TypeId> {
        self.types.int(width)
    }

    /// Returns the signal type carrying `inner`.
    pub fn signal_ty(&mut self, inner: TypeId) -> IrResult<TypeId> {
        self.types.signal(inner)
    }

    /// Returns the unit signature type with the given ports.
    pub fn unit_ty(&mut self, inputs: &[TypeId], outputs: &[TypeId]) -> IrResult<TypeId> {
        self.types.unit_sig(inputs, outputs)
    }

    // --- Names ---

    /// Interns a name.
    pub fn intern(&self, name: &str) -> Ident {
        self.interner.get_or_intern(name)
    }

    /// Resolves an interned name.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.interner.resolve(ident)
    }

    // --- Lookups ---

    /// Returns the value with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the value was destroyed.
    pub fn value(&self, id: ValueId) -> &ValueData {
        &self.values[id]
    }

    /// Returns the value with the given ID, or `None` if it was destroyed.
    pub fn try_value(&self, id: ValueId) -> Option<&ValueData> {
        self.values.try_get(id)
    }

    /// Returns the instruction with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the instruction was removed.
    pub fn inst(&self, id: InstId) -> &InstData {
        &self.insts[id]
    }

    /// Returns the instruction with the given ID, or `None` if it was removed.
    pub fn try_inst(&self, id: InstId) -> Option<&InstData> {
        self.insts.try_get(id)
    }

    /// Returns the block with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the block was removed.
    pub fn block(&self, id: BlockId) -> &BlockData {
        &self.blocks[id]
    }

    /// Returns the block with the given ID, or `None` if it was removed.
    pub fn try_block(&self, id: BlockId) -> Option<&BlockData> {
        self.blocks.try_get(id)
    }

    /// Returns the unit with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the unit was destroyed.
    pub fn unit(&self, id: UnitId) -> &UnitData {
        &self.units[id]
    }

    /// Returns the unit with the given ID, or `None` if it was destroyed.
    pub fn try_unit(&self, id: UnitId) -> Option<&UnitData> {
        self.units.try_get(id)
    }

    /// Returns the module with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if the module was destroyed.
    pub fn module(&self, id: ModuleId) -> &ModuleData {
        &self.modules[id]
    }

    /// Returns the module with the given ID, or `None` if it was destroyed.
    pub fn try_module(&self, id: ModuleId) -> Option<&ModuleData> {
        self.modules.try_get(id)
    }

    /// Iterates over all live units, attached or standalone, in creation order.
    pub fn units(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.iter().map(|(id, _)| id)
    }

    /// Iterates over all live modules in creation order.
    pub fn modules(&self) -> impl Iterator<Item = ModuleId> + '_ {
        self.modules.iter().map(|(id, _)| id)
    }

    // --- Derived queries ---

    /// Returns the type of a value.
    pub fn value_ty(&self, id: ValueId) -> TypeId {
        self.values[id].ty
    }

    /// Returns the name of a value, if it has one.
    pub fn value_name(&self, id: ValueId) -> Option<&str> {
        self.values[id].name.map(|n| self.resolve(n))
    }

    /// Returns the name of a unit.
    pub fn unit_name(&self, id: UnitId) -> &str {
        self.resolve(self.units[id].name)
    }

    /// Returns the name of a block.
    pub fn block_name(&self, id: BlockId) -> &str {
        self.value_name(self.blocks[id].value).unwrap_or("?")
    }

    /// Returns the name of a module.
    pub fn module_name(&self, id: ModuleId) -> &str {
        self.resolve(self.modules[id].name)
    }

    /// Returns the unit owning a value, or `None` for constants and
    /// standalone blocks.
    pub fn value_unit(&self, id: ValueId) -> Option<UnitId> {
        match self.values[id].kind {
            ValueKind::Const(_) => None,
            ValueKind::Block(block) => self.blocks[block].parent,
            ValueKind::InstResult { inst, .. } => self.inst_unit(inst),
            ValueKind::Argument { unit, .. } => Some(unit),
        }
    }

    /// Returns the unit an instruction belongs to.
    pub fn inst_unit(&self, id: InstId) -> Option<UnitId> {
        match self.insts[id].parent {
            InstParent::Entity(unit) => Some(unit),
            InstParent::Block(block) => self.blocks[block].parent,
        }
    }

    /// Renders a value for error messages: `%name`, `i1 0`, or a positional
    /// description for unnamed values.
    pub fn describe_value(&self, id: ValueId) -> String {
        let data = &self.values[id];
        if let Some(name) = data.name {
            return format!("%{}", self.resolve(name));
        }
        match data.kind {
            ValueKind::Const(c) => c.to_string(),
            ValueKind::Block(_) => "unnamed block".to_string(),
            ValueKind::InstResult { inst, index } => format!(
                "result #{index} of {}",
                self.insts[inst].kind.mnemonic()
            ),
            ValueKind::Argument { unit, index, dir } => {
                let dir = match dir {
                    ArgDirection::Input => "input",
                    ArgDirection::Output => "output",
                };
                format!("{dir} #{index} of @{}", self.unit_name(unit))
            }
        }
    }

    /// Records a mutation of `unit`.
    pub(crate) fn touch(&mut self, unit: UnitId) {
        if let Some(data) = self.units.try_get(unit) {
            let next = data.revision + 1;
            self.units[unit].revision = next;
        }
    }

    // --- Constant pool ---

    /// Returns the pooled constant of the given width and literal, creating it
    /// on first use.
    ///
    /// Pooled constants belong to the context, not to any unit, and may be used
    /// as operands anywhere.
    pub fn const_int(&mut self, width: u32, value: u64) -> IrResult<ValueId> {
        let konst = ConstInt::new(width, value)?;
        if let Some(&id) = self.consts.get(&konst) {
            return Ok(id);
        }
        let ty = self.types.int(width)?;
        let id = self.values.alloc(ValueData::new(ty, ValueKind::Const(konst)));
        self.consts.insert(konst, id);
        tracing::trace!(constant = %konst, "pooled constant");
        Ok(id)
    }

    /// Removes an unused constant from the pool.
    pub fn release_constant(&mut self, id: ValueId) -> IrResult<()> {
        let data = &self.values[id];
        let ValueKind::Const(konst) = data.kind else {
            return Err(IrError::InvalidPlacement(format!(
                "{} is not a pooled constant",
                self.describe_value(id)
            )));
        };
        if data.has_uses() {
            return Err(IrError::DanglingReference {
                what: format!("constant {konst}"),
                count: data.uses.len(),
            });
        }
        self.consts.remove(&konst);
        self.values.remove(id);
        Ok(())
    }

    /// Iterates over the pooled constants.
    pub fn constants(&self) -> impl Iterator<Item = ValueId> + '_ {
        self.consts.values().copied()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("types", &self.types.len())
            .field("values", &self.values.len())
            .field("insts", &self.insts.len())
            .field("blocks", &self.blocks.len())
            .field("units", &self.units.len())
            .field("modules", &self.modules.len())
            .finish()
    }
}
