//! Serializable snapshots of a module.
//!
//! A snapshot carries no IDs: every operand, block, and callee is recorded by
//! the same name the assembly writer prints, so two snapshots of equivalent
//! modules compare equal.

use crate::names::ValueNames;
use loom_ir::{Context, InstId, InstKind, ModuleId, UnitId, UnitKind, ValueId};
use serde::{Deserialize, Serialize};

/// A module and its units in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    /// The module name.
    pub name: String,
    /// The units, in module order.
    pub units: Vec<UnitSnapshot>,
}

/// An entity or a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// The unit name, without the `@` sigil.
    pub name: String,
    /// `entity` or `proc`.
    pub kind: String,
    /// The signature type, e.g. `(i1, i1) -> (i1)`.
    pub signature: String,
    /// Input arguments.
    pub inputs: Vec<PortSnapshot>,
    /// Output arguments.
    pub outputs: Vec<PortSnapshot>,
    /// The body of an entity.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insts: Vec<InstSnapshot>,
    /// The blocks of a process.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<BlockSnapshot>,
    /// The entry block of a process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
}

/// A unit argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSnapshot {
    /// `%name` or `%N`.
    pub name: String,
    /// The argument type.
    pub ty: String,
}

/// A basic block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    /// The block name.
    pub name: String,
    /// The instructions in order.
    pub insts: Vec<InstSnapshot>,
}

/// An instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstSnapshot {
    /// The mnemonic; compares include their predicate, as in `cmp.eq`.
    pub op: String,
    /// Names of the results.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<String>,
    /// Operands as printed, e.g. `i1 %CK` or `i1 0`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operands: Vec<String>,
    /// The instantiated unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callee: Option<String>,
    /// The instance label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Captures `module` with every name resolved.
pub fn snapshot_module(ctx: &Context, module: ModuleId) -> ModuleSnapshot {
    ModuleSnapshot {
        name: ctx.module_name(module).to_string(),
        units: ctx
            .module(module)
            .units()
            .iter()
            .map(|&unit| snapshot_unit(ctx, unit))
            .collect(),
    }
}

/// Renders a snapshot as pretty-printed JSON.
pub fn snapshot_to_json(snapshot: &ModuleSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

fn snapshot_unit(ctx: &Context, unit: UnitId) -> UnitSnapshot {
    let data = ctx.unit(unit);
    let names = ValueNames::for_unit(ctx, unit);
    let ports = |values: &[ValueId]| -> Vec<PortSnapshot> {
        values
            .iter()
            .map(|&v| PortSnapshot {
                name: names.reference(ctx, v),
                ty: ctx.types().display(ctx.value_ty(v)),
            })
            .collect()
    };
    let insts = |list: &[InstId]| -> Vec<InstSnapshot> {
        list.iter()
            .map(|&inst| snapshot_inst(ctx, &names, inst))
            .collect()
    };
    let (body, blocks) = match data.kind() {
        UnitKind::Entity => (insts(data.insts()), Vec::new()),
        UnitKind::Process => (
            Vec::new(),
            data.blocks()
                .iter()
                .map(|&block| BlockSnapshot {
                    name: ctx.block_name(block).to_string(),
                    insts: insts(ctx.block(block).insts()),
                })
                .collect(),
        ),
    };
    UnitSnapshot {
        name: ctx.unit_name(unit).to_string(),
        kind: data.kind().keyword().to_string(),
        signature: ctx.types().display(data.sig()),
        inputs: ports(data.inputs()),
        outputs: ports(data.outputs()),
        insts: body,
        blocks,
        entry: data.entry().map(|b| ctx.block_name(b).to_string()),
    }
}

fn snapshot_inst(ctx: &Context, names: &ValueNames, inst: InstId) -> InstSnapshot {
    let data = ctx.inst(inst);
    let (op, callee) = match data.kind() {
        InstKind::Const(konst) => (format!("const.i{}", konst.width), None),
        InstKind::Sig { ty } => (format!("sig.{}", ctx.types().display(*ty)), None),
        InstKind::Cmp(cmp) => (format!("cmp.{cmp}"), None),
        InstKind::Inst { callee, .. } => (
            "inst".to_string(),
            Some(ctx.unit_name(*callee).to_string()),
        ),
        other => (other.mnemonic().to_string(), None),
    };
    let mut operands: Vec<String> = data
        .operands()
        .iter()
        .map(|&v| names.typed(ctx, v))
        .collect();
    if let InstKind::Const(konst) = data.kind() {
        operands.push(konst.value.to_string());
    }
    InstSnapshot {
        op,
        results: data
            .results()
            .iter()
            .map(|&r| names.reference(ctx, r))
            .collect(),
        operands,
        callee,
        label: data.label().map(|l| ctx.resolve(l).to_string()),
    }
}
