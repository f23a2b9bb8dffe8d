//! Basic blocks of processes.

use crate::context::Context;
use crate::error::{IrError, IrResult};
use crate::ids::{BlockId, InstId, UnitId, ValueId};
use crate::inst::InstParent;
use crate::unit::UnitKind;
use crate::value::{ValueData, ValueKind};
use loom_common::Ident;
use serde::{Deserialize, Serialize};

/// A basic block: a named, ordered list of instructions ending in a terminator.
///
/// The block is referenced from branch operands through its block value, which
/// has void type and carries the block's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockData {
    pub(crate) value: ValueId,
    pub(crate) insts: Vec<InstId>,
    pub(crate) parent: Option<UnitId>,
}

impl BlockData {
    /// The value standing for this block in branch operands.
    pub fn value(&self) -> ValueId {
        self.value
    }

    /// Instructions in order.
    pub fn insts(&self) -> &[InstId] {
        &self.insts
    }

    /// The owning process, or `None` while standalone.
    pub fn parent(&self) -> Option<UnitId> {
        self.parent
    }

    /// Returns `true` if the block holds no instructions.
    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }
}

impl Context {
    /// Creates a standalone block with the given name.
    pub fn new_block(&mut self, name: &str) -> BlockId {
        let void = self.types.void();
        let id = self.blocks.next_id();
        let mut value = ValueData::new(void, ValueKind::Block(id));
        value.name = Some(self.intern(name));
        let value = self.values.alloc(value);
        let id = self.blocks.alloc(BlockData {
            value,
            insts: Vec::new(),
            parent: None,
        });
        tracing::debug!(block = %name, "created block");
        id
    }

    /// Appends a standalone block to a process.
    pub fn append_block(&mut self, process: UnitId, block: BlockId) -> IrResult<()> {
        let unit = &self.units[process];
        if unit.kind != UnitKind::Process {
            return Err(IrError::InvalidPlacement(format!(
                "entity @{} has no basic blocks",
                self.unit_name(process)
            )));
        }
        if let Some(owner) = self.blocks[block].parent {
            return Err(IrError::AlreadyAttached(format!(
                "block %{} (in @{})",
                self.block_name(block),
                self.unit_name(owner)
            )));
        }
        let name = self.block_ident(block);
        self.check_block_name(process, name, None)?;
        self.units[process].blocks.push(block);
        self.blocks[block].parent = Some(process);
        self.touch(process);
        tracing::debug!(
            unit = %self.unit_name(process),
            block = %self.block_name(block),
            "appended block"
        );
        Ok(())
    }

    /// Removes a block and all its instructions.
    ///
    /// Fails with [`IrError::DanglingReference`] while a branch outside the
    /// block targets it, while it is the entry block, or while a value it
    /// defines is used outside the block.
    pub fn remove_block(&mut self, block: BlockId) -> IrResult<()> {
        let data = &self.blocks[block];
        let count = self.values[data.value]
            .uses
            .iter()
            .filter(|u| self.insts[u.inst].parent != InstParent::Block(block))
            .count();
        if count > 0 {
            return Err(IrError::DanglingReference {
                what: format!("block %{}", self.block_name(block)),
                count,
            });
        }
        if let Some(process) = data.parent {
            if self.units[process].entry == Some(block) {
                return Err(IrError::DanglingReference {
                    what: format!(
                        "entry block %{} of @{}",
                        self.block_name(block),
                        self.unit_name(process)
                    ),
                    count: 1,
                });
            }
        }
        for &inst in &data.insts {
            for &result in &self.insts[inst].results {
                let outside = self.values[result]
                    .uses
                    .iter()
                    .filter(|u| self.insts[u.inst].parent != InstParent::Block(block))
                    .count();
                if outside > 0 {
                    return Err(IrError::DanglingReference {
                        what: self.describe_value(result),
                        count: outside,
                    });
                }
            }
        }

        let parent = data.parent;
        let value = data.value;
        let insts = data.insts.clone();
        for inst in insts {
            self.free_inst(inst);
        }
        if let Some(process) = parent {
            self.units[process].blocks.retain(|&b| b != block);
            self.touch(process);
            tracing::debug!(unit = %self.unit_name(process), "removed block");
        }
        self.values.remove(value);
        self.blocks.remove(block);
        Ok(())
    }

    /// Designates the entry block of a process.
    ///
    /// The block must already belong to the process. Fails with
    /// [`IrError::EntryAlreadySet`] if the process has an entry block.
    pub fn set_entry(&mut self, process: UnitId, block: BlockId) -> IrResult<()> {
        if let Some(current) = self.units[process].entry {
            return Err(IrError::EntryAlreadySet {
                unit: self.unit_name(process).to_string(),
                block: self.block_name(current).to_string(),
            });
        }
        if self.blocks[block].parent != Some(process) {
            return Err(IrError::NotAttached(format!(
                "block %{} (to @{})",
                self.block_name(block),
                self.unit_name(process)
            )));
        }
        self.units[process].entry = Some(block);
        self.touch(process);
        tracing::debug!(
            unit = %self.unit_name(process),
            block = %self.block_name(block),
            "set entry block"
        );
        Ok(())
    }

    /// Clears the entry designation of a process, returning the previous entry.
    pub fn clear_entry(&mut self, process: UnitId) -> Option<BlockId> {
        let previous = self.units[process].entry.take();
        if previous.is_some() {
            self.touch(process);
            tracing::debug!(unit = %self.unit_name(process), "cleared entry block");
        }
        previous
    }

    /// Returns the entry block of a process.
    pub fn entry_block(&self, process: UnitId) -> Option<BlockId> {
        self.units[process].entry
    }

    /// Returns the terminator of a block, if its last instruction is one.
    pub fn terminator(&self, block: BlockId) -> Option<InstId> {
        self.blocks[block]
            .insts
            .last()
            .copied()
            .filter(|&i| self.insts[i].kind.is_terminator())
    }

    /// Looks up a block of a process by name.
    pub fn block_by_name(&self, process: UnitId, name: &str) -> Option<BlockId> {
        self.units[process]
            .blocks
            .iter()
            .copied()
            .find(|&b| self.block_name(b) == name)
    }

    fn block_ident(&self, block: BlockId) -> Ident {
        let value = self.blocks[block].value;
        self.values[value]
            .name
            .unwrap_or_else(|| self.intern("?"))
    }

    pub(crate) fn check_block_name(
        &self,
        process: UnitId,
        name: Ident,
        except: Option<BlockId>,
    ) -> IrResult<()> {
        let taken = self.units[process].blocks.iter().any(|&b| {
            Some(b) != except && self.values[self.blocks[b].value].name == Some(name)
        });
        if taken {
            return Err(IrError::DuplicateName {
                name: self.resolve(name).to_string(),
                scope: format!("blocks of @{}", self.unit_name(process)),
            });
        }
        Ok(())
    }
}
