//! LoomIR: a typed value graph for describing digital hardware.
//!
//! A [`Context`] owns every node: interned [`Type`]s, values, instructions,
//! basic blocks, units, and modules. Units are either entities (pure dataflow:
//! signals, comparisons, drives, and instances of other units) or processes
//! (sequential control flow over basic blocks). Every value keeps a use-list of
//! the operand slots referencing it, which makes replacing and destroying values
//! cheap and checkable.
//!
//! Mutations enforce the graph invariants as they happen; block termination
//! and process reachability are checked on request by
//! [`Context::validate_unit`], so units can pass through invalid intermediate
//! states while they are being built.

#![warn(missing_docs)]

pub mod arena;
pub mod block;
pub mod builder;
pub mod cfg;
pub mod const_value;
pub mod context;
pub mod error;
pub mod ids;
pub mod inst;
pub mod module;
pub mod pass;
pub mod types;
pub mod unit;
pub mod value;
pub mod verify;

pub use arena::{Arena, ArenaId};
pub use block::BlockData;
pub use builder::InstBuilder;
pub use const_value::ConstInt;
pub use context::Context;
pub use error::{IrError, IrResult};
pub use ids::{BlockId, InstId, ModuleId, TypeId, UnitId, ValueId};
pub use inst::{CompareOp, InstData, InstKind, InstParent};
pub use module::ModuleData;
pub use pass::{run_reduction, ReductionPass, StraightLineReduction};
pub use types::{Type, TypeDb};
pub use unit::{UnitData, UnitKind};
pub use value::{ArgDirection, Use, ValueData, ValueKind};
