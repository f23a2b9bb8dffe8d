//! Convenience builder for appending instructions.
//!
//! ```
//! use loom_ir::{CompareOp, Context};
//!
//! let mut ctx = Context::new();
//! let i1 = ctx.int_ty(1).unwrap();
//! let sig = ctx.unit_ty(&[i1, i1], &[i1]).unwrap();
//! let top = ctx.new_entity(sig, "top").unwrap();
//! let (a, b) = (ctx.input(top, 0), ctx.input(top, 1));
//! let same = ctx.ins(top).cmp(CompareOp::Eq, a, b).unwrap();
//! let out = ctx.output(top, 0);
//! ctx.ins(top).drv(out, same).unwrap();
//! assert_eq!(ctx.unit(top).insts().len(), 2);
//! ```

use crate::context::Context;
use crate::const_value::ConstInt;
use crate::error::{IrError, IrResult};
use crate::ids::{BlockId, InstId, TypeId, UnitId, ValueId};
use crate::inst::{CompareOp, InstKind, InstParent};

/// Appends instructions to one entity body or block.
pub struct InstBuilder<'a> {
    ctx: &'a mut Context,
    parent: InstParent,
}

impl Context {
    /// Returns a builder appending to `parent`.
    pub fn ins(&mut self, parent: impl Into<InstParent>) -> InstBuilder<'_> {
        InstBuilder {
            ctx: self,
            parent: parent.into(),
        }
    }
}

impl InstBuilder<'_> {
    fn append(&mut self, kind: InstKind, operands: Vec<ValueId>) -> IrResult<InstId> {
        self.ctx.append_inst(self.parent, kind, operands)
    }

    fn append_value(&mut self, kind: InstKind, operands: Vec<ValueId>) -> IrResult<ValueId> {
        let inst = self.append(kind, operands)?;
        self.ctx.insts[inst]
            .result()
            .ok_or_else(|| IrError::TypeMismatch("instruction produced no result".to_string()))
    }

    /// `const iN value`, materialized as an instruction.
    pub fn const_int(&mut self, width: u32, value: u64) -> IrResult<ValueId> {
        let konst = ConstInt::new(width, value)?;
        self.ctx.types.int(width)?;
        self.append_value(InstKind::Const(konst), vec![])
    }

    /// `sig ty [init]`
    pub fn sig(&mut self, ty: TypeId, init: Option<ValueId>) -> IrResult<ValueId> {
        self.append_value(InstKind::Sig { ty }, init.into_iter().collect())
    }

    /// `cmp op lhs, rhs`
    pub fn cmp(&mut self, op: CompareOp, lhs: ValueId, rhs: ValueId) -> IrResult<ValueId> {
        self.append_value(InstKind::Cmp(op), vec![lhs, rhs])
    }

    /// `cmp eq lhs, rhs`
    pub fn eq(&mut self, lhs: ValueId, rhs: ValueId) -> IrResult<ValueId> {
        self.cmp(CompareOp::Eq, lhs, rhs)
    }

    /// `drv target, value`
    pub fn drv(&mut self, target: ValueId, value: ValueId) -> IrResult<InstId> {
        self.append(InstKind::Drv, vec![target, value])
    }

    /// Instantiates `callee`, binding `inputs` and `outputs` to its ports.
    pub fn inst(
        &mut self,
        callee: UnitId,
        inputs: &[ValueId],
        outputs: &[ValueId],
    ) -> IrResult<InstId> {
        let kind = InstKind::Inst {
            callee,
            inputs: inputs.len() as u32,
        };
        let operands = inputs.iter().chain(outputs).copied().collect();
        self.append(kind, operands)
    }

    /// `br target`
    pub fn br(&mut self, target: BlockId) -> IrResult<InstId> {
        let target = self.ctx.blocks[target].value;
        self.append(InstKind::Br, vec![target])
    }

    /// `br cond, then, else`
    pub fn br_cond(
        &mut self,
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    ) -> IrResult<InstId> {
        let then_value = self.ctx.blocks[then_block].value;
        let else_value = self.ctx.blocks[else_block].value;
        self.append(InstKind::BrCond, vec![cond, then_value, else_value])
    }

    /// `ret`
    pub fn ret(&mut self) -> IrResult<InstId> {
        self.append(InstKind::Ret, vec![])
    }

    /// `halt`
    pub fn halt(&mut self) -> IrResult<InstId> {
        self.append(InstKind::Halt, vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_instruction_has_int_result() {
        let mut ctx = Context::new();
        let i1 = ctx.int_ty(1).unwrap();
        let sig = ctx.unit_ty(&[], &[i1]).unwrap();
        let e = ctx.new_entity(sig, "e").unwrap();
        let k = ctx.ins(e).const_int(4, 9).unwrap();
        let i4 = ctx.int_ty(4).unwrap();
        assert_eq!(ctx.value_ty(k), i4);
        assert_eq!(ctx.value_unit(k), Some(e));
        assert!(ctx.ins(e).const_int(4, 16).is_err());
    }

    #[test]
    fn sig_with_initial_value() {
        let mut ctx = Context::new();
        let i8 = ctx.int_ty(8).unwrap();
        let sig = ctx.unit_ty(&[], &[]).unwrap();
        let e = ctx.new_entity(sig, "e").unwrap();
        let init = ctx.const_int(8, 3).unwrap();
        let s = ctx.ins(e).sig(i8, Some(init)).unwrap();
        let i8s = ctx.signal_ty(i8).unwrap();
        assert_eq!(ctx.value_ty(s), i8s);
        let bad = ctx.const_int(1, 0).unwrap();
        assert!(ctx.ins(e).sig(i8, Some(bad)).is_err());
    }

    #[test]
    fn instance_results_follow_outputs() {
        let mut ctx = Context::new();
        let i1 = ctx.int_ty(1).unwrap();
        let i4 = ctx.int_ty(4).unwrap();
        let child_sig = ctx.unit_ty(&[i1], &[i4]).unwrap();
        let child = ctx.new_process(child_sig, "child").unwrap();
        let top_sig = ctx.unit_ty(&[i1], &[i4]).unwrap();
        let top = ctx.new_entity(top_sig, "top").unwrap();
        let (i, o) = (ctx.input(top, 0), ctx.output(top, 0));
        let inst = ctx.ins(top).inst(child, &[i], &[o]).unwrap();
        let data = ctx.inst(inst);
        assert_eq!(data.instance_inputs(), &[i]);
        assert_eq!(data.instance_outputs(), &[o]);
        assert_eq!(data.results().len(), 1);
        let result = data.results()[0];
        assert_eq!(ctx.value_ty(result), i4);
    }

    #[test]
    fn instance_arity_mismatch() {
        let mut ctx = Context::new();
        let i1 = ctx.int_ty(1).unwrap();
        let child_sig = ctx.unit_ty(&[i1, i1, i1], &[i1]).unwrap();
        let child = ctx.new_process(child_sig, "child").unwrap();
        let top_sig = ctx.unit_ty(&[i1, i1], &[i1]).unwrap();
        let top = ctx.new_entity(top_sig, "top").unwrap();
        let (a, b, o) = (ctx.input(top, 0), ctx.input(top, 1), ctx.output(top, 0));
        let err = ctx.ins(top).inst(child, &[a, b], &[o]).unwrap_err();
        assert!(matches!(err, IrError::SignatureMismatch(_)));
        assert_eq!(ctx.unit(child).ref_count(), 0);
    }

    #[test]
    fn self_instance_rejected() {
        let mut ctx = Context::new();
        let i1 = ctx.int_ty(1).unwrap();
        let sig = ctx.unit_ty(&[i1], &[i1]).unwrap();
        let e = ctx.new_entity(sig, "e").unwrap();
        let (i, o) = (ctx.input(e, 0), ctx.output(e, 0));
        assert!(matches!(
            ctx.ins(e).inst(e, &[i], &[o]),
            Err(IrError::InvalidPlacement(_))
        ));
    }

    #[test]
    fn mutual_instances_rejected() {
        let mut ctx = Context::new();
        let i1 = ctx.int_ty(1).unwrap();
        let sig = ctx.unit_ty(&[i1], &[i1]).unwrap();
        let a = ctx.new_entity(sig, "a").unwrap();
        let b = ctx.new_entity(sig, "b").unwrap();
        let c = ctx.new_entity(sig, "c").unwrap();
        let (ai, ao) = (ctx.input(a, 0), ctx.output(a, 0));
        ctx.ins(a).inst(b, &[ai], &[ao]).unwrap();
        let (bi, bo) = (ctx.input(b, 0), ctx.output(b, 0));
        ctx.ins(b).inst(c, &[bi], &[bo]).unwrap();

        let (ci, co) = (ctx.input(c, 0), ctx.output(c, 0));
        assert!(matches!(
            ctx.ins(c).inst(a, &[ci], &[co]),
            Err(IrError::InvalidPlacement(_))
        ));
        assert!(matches!(
            ctx.ins(b).inst(a, &[bi], &[bo]),
            Err(IrError::InvalidPlacement(_))
        ));
        assert_eq!(ctx.unit(a).ref_count(), 0);
        assert!(ctx.unit(c).insts().is_empty());
    }

    #[test]
    fn br_cond_needs_i1() {
        let mut ctx = Context::new();
        let i2 = ctx.int_ty(2).unwrap();
        let sig = ctx.unit_ty(&[i2], &[]).unwrap();
        let p = ctx.new_process(sig, "p").unwrap();
        let a = ctx.new_block("a");
        let b = ctx.new_block("b");
        ctx.append_block(p, a).unwrap();
        ctx.append_block(p, b).unwrap();
        let wide = ctx.input(p, 0);
        assert!(matches!(
            ctx.ins(a).br_cond(wide, a, b),
            Err(IrError::TypeMismatch(_))
        ));
    }

    #[test]
    fn branch_to_detached_block_rejected() {
        let mut ctx = Context::new();
        let sig = ctx.unit_ty(&[], &[]).unwrap();
        let p = ctx.new_process(sig, "p").unwrap();
        let a = ctx.new_block("a");
        ctx.append_block(p, a).unwrap();
        let loose = ctx.new_block("loose");
        assert!(matches!(ctx.ins(a).br(loose), Err(IrError::NotAttached(_))));
    }
}
