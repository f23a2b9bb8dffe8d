//! Textual views of Loom IR modules.
//!
//! [`write_module`] prints the human-readable assembly form; [`snapshot_module`]
//! builds a serializable tree with every name resolved, for tools that want
//! JSON. Both only read the graph through the public [`loom_ir::Context`] API.

#![warn(missing_docs)]

mod names;
pub mod snapshot;
pub mod writer;

pub use snapshot::{
    snapshot_module, snapshot_to_json, BlockSnapshot, InstSnapshot, ModuleSnapshot, PortSnapshot,
    UnitSnapshot,
};
pub use writer::{module_to_string, write_module, AsmWriter};
