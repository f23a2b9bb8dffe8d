//! Modules: named, ordered collections of units.

use crate::context::Context;
use crate::error::{IrError, IrResult};
use crate::ids::{ModuleId, UnitId};
use loom_common::Ident;
use serde::{Deserialize, Serialize};

/// A module node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleData {
    pub(crate) name: Ident,
    pub(crate) units: Vec<UnitId>,
}

impl ModuleData {
    /// The interned name.
    pub fn name(&self) -> Ident {
        self.name
    }

    /// Attached units in order.
    pub fn units(&self) -> &[UnitId] {
        &self.units
    }
}

impl Context {
    /// Creates an empty module.
    pub fn new_module(&mut self, name: &str) -> ModuleId {
        let ident = self.intern(name);
        let id = self.modules.alloc(ModuleData {
            name: ident,
            units: Vec::new(),
        });
        tracing::debug!(module = %name, "created module");
        id
    }

    /// Appends a standalone unit to a module.
    ///
    /// Fails with [`IrError::AlreadyAttached`] if the unit belongs to a module
    /// and with [`IrError::DuplicateName`] if the module has a unit of the
    /// same name.
    pub fn append_unit(&mut self, module: ModuleId, unit: UnitId) -> IrResult<()> {
        if let Some(owner) = self.units[unit].module {
            return Err(IrError::AlreadyAttached(format!(
                "unit @{} (in module {})",
                self.unit_name(unit),
                self.module_name(owner)
            )));
        }
        self.check_module_name(module, self.units[unit].name, None)?;
        self.modules[module].units.push(unit);
        self.units[unit].module = Some(module);
        tracing::debug!(
            module = %self.module_name(module),
            unit = %self.unit_name(unit),
            "appended unit"
        );
        Ok(())
    }

    /// Detaches a unit from its module, making it standalone again.
    pub fn detach_unit(&mut self, unit: UnitId) -> IrResult<()> {
        let Some(module) = self.units[unit].module.take() else {
            return Err(IrError::NotAttached(format!(
                "unit @{}",
                self.unit_name(unit)
            )));
        };
        self.modules[module].units.retain(|&u| u != unit);
        tracing::debug!(
            module = %self.module_name(module),
            unit = %self.unit_name(unit),
            "detached unit"
        );
        Ok(())
    }

    /// Looks up a unit of a module by name.
    pub fn unit_by_name(&self, module: ModuleId, name: &str) -> Option<UnitId> {
        let ident = self.interner.get(name)?;
        self.modules[module]
            .units
            .iter()
            .copied()
            .find(|&u| self.units[u].name == ident)
    }

    /// Destroys a module.
    ///
    /// Units no instance refers to are destroyed with it, repeatedly, so that
    /// units only kept alive by other destroyed units go too. Units still
    /// referenced from outside are released to standalone ownership and
    /// returned.
    pub fn destroy_module(&mut self, module: ModuleId) -> IrResult<Vec<UnitId>> {
        let mut pending = std::mem::take(&mut self.modules[module].units);
        for &unit in &pending {
            self.units[unit].module = None;
        }
        while let Some(pos) = pending
            .iter()
            .position(|&u| self.units[u].instances.is_empty())
        {
            let unit = pending.remove(pos);
            self.destroy_unit(unit)?;
        }
        let name = self.module_name(module).to_string();
        self.modules.remove(module);
        tracing::debug!(module = %name, released = pending.len(), "destroyed module");
        Ok(pending)
    }

    pub(crate) fn check_module_name(
        &self,
        module: ModuleId,
        name: Ident,
        except: Option<UnitId>,
    ) -> IrResult<()> {
        let data = &self.modules[module];
        if data
            .units
            .iter()
            .any(|&u| Some(u) != except && self.units[u].name == name)
        {
            return Err(IrError::DuplicateName {
                name: self.resolve(name).to_string(),
                scope: format!("module {}", self.resolve(data.name)),
            });
        }
        Ok(())
    }
}
