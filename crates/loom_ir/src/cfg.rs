//! Control-flow queries over the blocks of a process.
//!
//! Successors are read from block terminators; predecessors come from the
//! use-list of a block's value, so neither query scans the whole process.

use crate::context::Context;
use crate::ids::{BlockId, UnitId};
use crate::inst::InstParent;
use crate::value::ValueKind;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::Dfs;

impl Context {
    /// Returns the blocks the terminator of `block` may branch to, without
    /// duplicates and in operand order.
    pub fn successors(&self, block: BlockId) -> Vec<BlockId> {
        let Some(term) = self.terminator(block) else {
            return Vec::new();
        };
        let mut succs = Vec::new();
        for &op in &self.insts[term].operands {
            if let ValueKind::Block(target) = self.values[op].kind {
                if !succs.contains(&target) {
                    succs.push(target);
                }
            }
        }
        succs
    }

    /// Returns the blocks whose terminators branch to `block`.
    pub fn predecessors(&self, block: BlockId) -> Vec<BlockId> {
        let value = self.blocks[block].value;
        let mut preds = Vec::new();
        for u in &self.values[value].uses {
            if let InstParent::Block(pred) = self.insts[u.inst].parent {
                if !preds.contains(&pred) {
                    preds.push(pred);
                }
            }
        }
        preds
    }

    /// Builds the control-flow graph of a process.
    pub fn cfg(&self, process: UnitId) -> DiGraphMap<BlockId, ()> {
        let mut graph = DiGraphMap::new();
        for &block in &self.units[process].blocks {
            graph.add_node(block);
        }
        for &block in &self.units[process].blocks {
            for succ in self.successors(block) {
                graph.add_edge(block, succ, ());
            }
        }
        graph
    }

    /// Returns the blocks reachable from the entry block in depth-first order.
    ///
    /// Empty if the process has no entry block.
    pub fn reachable_blocks(&self, process: UnitId) -> Vec<BlockId> {
        let Some(entry) = self.units[process].entry else {
            return Vec::new();
        };
        let graph = self.cfg(process);
        let mut dfs = Dfs::new(&graph, entry);
        let mut order = Vec::new();
        while let Some(block) = dfs.next(&graph) {
            order.push(block);
        }
        order
    }

    /// Returns the blocks of a process not reachable from its entry block.
    pub fn orphan_blocks(&self, process: UnitId) -> Vec<BlockId> {
        let reachable = self.reachable_blocks(process);
        self.units[process]
            .blocks
            .iter()
            .copied()
            .filter(|b| !reachable.contains(b))
            .collect()
    }
}
