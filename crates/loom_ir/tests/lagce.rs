//! End-to-end scenarios around the latch-based gated clock enable (LAGCE).
//!
//! The entity `LAGCE (CK, E) -> (GCK)` declares a signal `Q` and instantiates
//! the process `LAGCE_proc (CK, E, Q) -> (GCK, Q)`, which gates the clock with
//! a latched enable.

use loom_ir::{
    BlockId, CompareOp, Context, InstId, InstKind, IrError, ModuleId, UnitId, ValueId,
};
use proptest::prelude::*;

struct Lagce {
    module: ModuleId,
    entity: UnitId,
    process: UnitId,
    q: ValueId,
    instance: InstId,
    blocks: [BlockId; 5],
}

fn build_lagce(ctx: &mut Context) -> Lagce {
    let i1 = ctx.int_ty(1).unwrap();
    let module = ctx.new_module("lagce");

    let proc_sig = ctx.unit_ty(&[i1, i1, i1], &[i1, i1]).unwrap();
    let process = ctx.new_process(proc_sig, "LAGCE_proc").unwrap();
    ctx.name_args(process, &["CK", "E", "Q"], &["GCK", "Q"])
        .unwrap();
    ctx.append_unit(module, process).unwrap();

    let ent_sig = ctx.unit_ty(&[i1, i1], &[i1]).unwrap();
    let entity = ctx.new_entity(ent_sig, "LAGCE").unwrap();
    ctx.name_args(entity, &["CK", "E"], &["GCK"]).unwrap();
    let q = ctx.ins(entity).sig(i1, None).unwrap();
    ctx.set_name(q, Some("Q")).unwrap();
    let (ck, en, gck) = (
        ctx.input(entity, 0),
        ctx.input(entity, 1),
        ctx.output(entity, 0),
    );
    let instance = ctx
        .ins(entity)
        .inst(process, &[ck, en, q], &[gck, q])
        .unwrap();
    ctx.set_inst_label(instance, Some("p")).unwrap();
    ctx.append_unit(module, entity).unwrap();

    let blocks = ["entry", "ckl", "ckla", "cklb", "ckh"].map(|n| ctx.new_block(n));
    for b in blocks {
        ctx.append_block(process, b).unwrap();
    }
    let [entry, ckl, ckla, cklb, ckh] = blocks;
    ctx.set_entry(process, entry).unwrap();

    let (p_ck, p_e, p_q) = (
        ctx.input(process, 0),
        ctx.input(process, 1),
        ctx.input(process, 2),
    );
    let (p_gck, p_qout) = (ctx.output(process, 0), ctx.output(process, 1));
    let zero = ctx.const_int(1, 0).unwrap();

    let ck_low = ctx.ins(entry).eq(p_ck, zero).unwrap();
    ctx.ins(entry).br_cond(ck_low, ckl, ckh).unwrap();

    ctx.ins(ckl).drv(p_gck, zero).unwrap();
    let q_low = ctx.ins(ckl).eq(p_q, zero).unwrap();
    ctx.ins(ckl).br_cond(q_low, ckla, cklb).unwrap();

    ctx.ins(ckla).drv(p_qout, p_ck).unwrap();
    ctx.ins(ckla).ret().unwrap();

    ctx.ins(cklb).drv(p_qout, p_e).unwrap();
    ctx.ins(cklb).ret().unwrap();

    ctx.ins(ckh).drv(p_gck, p_q).unwrap();
    ctx.ins(ckh).ret().unwrap();

    Lagce {
        module,
        entity,
        process,
        q,
        instance,
        blocks,
    }
}

#[test]
fn process_validates() {
    let mut ctx = Context::new();
    let l = build_lagce(&mut ctx);
    assert_eq!(ctx.validate_unit(l.process), Ok(()));
    assert_eq!(ctx.validate_unit(l.entity), Ok(()));
    assert_eq!(ctx.validate_module(l.module), Ok(()));

    assert_eq!(ctx.entry_block(l.process), Some(l.blocks[0]));
    assert_eq!(ctx.reachable_blocks(l.process).len(), 5);
    for b in l.blocks {
        assert!(ctx.terminator(b).is_some());
    }
    assert_eq!(ctx.predecessors(l.blocks[2]), vec![l.blocks[1]]);
    assert_eq!(ctx.successors(l.blocks[0]), vec![l.blocks[1], l.blocks[4]]);
}

#[test]
fn instance_binds_signal_and_outputs() {
    let mut ctx = Context::new();
    let l = build_lagce(&mut ctx);
    assert_eq!(ctx.unit(l.process).ref_count(), 1);
    assert_eq!(ctx.unit(l.process).instances(), &[l.instance]);
    assert_eq!(ctx.inst_label(l.instance), Some("p"));
    let inst = ctx.inst(l.instance);
    assert_eq!(inst.instance_inputs().len(), 3);
    assert_eq!(inst.instance_outputs().len(), 2);
    assert_eq!(inst.results().len(), 2);
    // Q is bound as the third input and the second output.
    assert_eq!(ctx.uses(l.q).len(), 2);
    assert_eq!(ctx.module(l.module).units().len(), 2);
    assert_eq!(ctx.unit_by_name(l.module, "LAGCE"), Some(l.entity));
}

#[test]
fn instance_with_two_inputs_is_a_signature_mismatch() {
    let mut ctx = Context::new();
    let l = build_lagce(&mut ctx);
    let (ck, en, gck) = (
        ctx.input(l.entity, 0),
        ctx.input(l.entity, 1),
        ctx.output(l.entity, 0),
    );
    let body_before = ctx.unit(l.entity).insts().to_vec();
    let err = ctx
        .ins(l.entity)
        .inst(l.process, &[ck, en], &[gck, l.q])
        .unwrap_err();
    assert!(matches!(err, IrError::SignatureMismatch(_)));
    assert_eq!(ctx.unit(l.entity).insts(), body_before.as_slice());
    assert_eq!(ctx.unit(l.process).ref_count(), 1);
}

#[test]
fn destroying_driven_signal_is_refused() {
    let mut ctx = Context::new();
    let l = build_lagce(&mut ctx);
    let one = ctx.const_int(1, 1).unwrap();
    let drive = ctx.ins(l.entity).drv(l.q, one).unwrap();
    let uses_before = ctx.uses(l.q).to_vec();
    let revision = ctx.unit(l.entity).revision();

    let err = ctx.destroy_value(l.q).unwrap_err();
    assert!(matches!(err, IrError::DanglingReference { count: 3, .. }));
    assert_eq!(ctx.uses(l.q), uses_before.as_slice());
    assert!(ctx.try_inst(drive).is_some());
    assert_eq!(ctx.unit(l.entity).revision(), revision);
    assert_eq!(ctx.validate_unit(l.entity), Ok(()));
}

#[test]
fn redirecting_branch_orphans_block() {
    let mut ctx = Context::new();
    let l = build_lagce(&mut ctx);
    let [_, ckl, ckla, cklb, _] = l.blocks;
    let br = ctx.terminator(ckl).unwrap();
    let cklb_value = ctx.block(cklb).value();
    ctx.set_operand(br, 1, cklb_value).unwrap();

    assert_eq!(
        ctx.validate_unit(l.process),
        Err(IrError::OrphanBlock {
            unit: "LAGCE_proc".to_string(),
            block: "ckla".to_string(),
        })
    );
    assert_eq!(ctx.orphan_blocks(l.process), vec![ckla]);
    assert!(ctx.predecessors(ckla).is_empty());
}

#[test]
fn second_terminator_is_refused() {
    let mut ctx = Context::new();
    let l = build_lagce(&mut ctx);
    let ckh = l.blocks[4];
    assert_eq!(
        ctx.ins(ckh).halt(),
        Err(IrError::BlockAlreadyTerminated {
            block: "ckh".to_string()
        })
    );
}

#[test]
fn process_names_in_separate_directions() {
    let mut ctx = Context::new();
    let l = build_lagce(&mut ctx);
    let q_in = ctx.input(l.process, 2);
    let e_in = ctx.input(l.process, 1);
    assert_eq!(ctx.value_name(q_in), Some("Q"));
    assert!(matches!(
        ctx.set_name(e_in, Some("CK")),
        Err(IrError::DuplicateName { .. })
    ));
}

#[test]
fn referenced_process_outlives_direct_destroy() {
    let mut ctx = Context::new();
    let l = build_lagce(&mut ctx);
    assert!(matches!(
        ctx.destroy_unit(l.process),
        Err(IrError::DanglingReference { count: 1, .. })
    ));
    let released = ctx.destroy_module(l.module).unwrap();
    assert!(released.is_empty());
    assert!(ctx.try_unit(l.process).is_none());
    assert!(ctx.try_unit(l.entity).is_none());
    assert!(ctx.try_value(l.q).is_none());
}

#[test]
fn lagce_process_is_not_straight_line() {
    let mut ctx = Context::new();
    let l = build_lagce(&mut ctx);
    let mut pass = loom_ir::StraightLineReduction;
    let revision = ctx.unit(l.process).revision();
    let err = loom_ir::run_reduction(&mut pass, &mut ctx, l.process).unwrap_err();
    assert!(matches!(err, IrError::NotReducible { .. }));
    assert_eq!(ctx.unit(l.process).revision(), revision);
}

#[test]
fn insertion_keeps_terminator_last() {
    let mut ctx = Context::new();
    let l = build_lagce(&mut ctx);
    let ckh = l.blocks[4];
    let ret = ctx.terminator(ckh).unwrap();
    let gck = ctx.output(l.process, 0);
    let one = ctx.const_int(1, 1).unwrap();
    let drv = ctx
        .insert_inst_before(ret, InstKind::Drv, vec![gck, one])
        .unwrap();
    let insts = ctx.block(ckh).insts();
    assert_eq!(insts.len(), 3);
    assert_eq!(insts[1], drv);
    assert_eq!(insts[2], ret);
    assert_eq!(ctx.validate_unit(l.process), Ok(()));
}

#[test]
fn unnamed_compare_is_replaceable() {
    let mut ctx = Context::new();
    let l = build_lagce(&mut ctx);
    let entry = l.blocks[0];
    let br = ctx.terminator(entry).unwrap();
    let old_cond = ctx.inst(br).operands()[0];
    let e_in = ctx.input(l.process, 1);
    let zero = ctx.const_int(1, 0).unwrap();
    let cmp = ctx
        .insert_inst_before(br, InstKind::Cmp(CompareOp::Ne), vec![e_in, zero])
        .unwrap();
    let new_cond = ctx.inst(cmp).results()[0];
    assert_eq!(ctx.replace_all_uses(old_cond, new_cond), Ok(1));
    assert_eq!(ctx.inst(br).operands()[0], new_cond);
    ctx.destroy_value(old_cond).unwrap();
    assert_eq!(ctx.validate_unit(l.process), Ok(()));
}

proptest! {
    #[test]
    fn unit_ports_read_back_in_order(
        ins in proptest::collection::vec(1u32..128, 0..8),
        outs in proptest::collection::vec(1u32..128, 0..8),
    ) {
        let mut ctx = Context::new();
        let in_tys: Vec<_> = ins.iter().map(|&w| ctx.int_ty(w).unwrap()).collect();
        let out_tys: Vec<_> = outs.iter().map(|&w| ctx.int_ty(w).unwrap()).collect();
        let sig = ctx.unit_ty(&in_tys, &out_tys).unwrap();
        let unit = ctx.new_entity(sig, "u").unwrap();
        let read_ins: Vec<_> = (0..ins.len()).map(|i| ctx.value_ty(ctx.input(unit, i))).collect();
        let read_outs: Vec<_> = (0..outs.len())
            .map(|i| ctx.value_ty(ctx.output(unit, i)))
            .collect();
        prop_assert_eq!(read_ins, in_tys);
        prop_assert_eq!(read_outs, out_tys);
    }

    #[test]
    fn terminated_block_refuses_appends(n in 0usize..6) {
        let mut ctx = Context::new();
        let i1 = ctx.int_ty(1).unwrap();
        let sig = ctx.unit_ty(&[i1], &[i1]).unwrap();
        let p = ctx.new_process(sig, "p").unwrap();
        let b = ctx.new_block("b");
        ctx.append_block(p, b).unwrap();
        let (input, output) = (ctx.input(p, 0), ctx.output(p, 0));
        for _ in 0..n {
            ctx.ins(b).drv(output, input).unwrap();
        }
        ctx.ins(b).ret().unwrap();
        let blocked = matches!(
            ctx.ins(b).drv(output, input),
            Err(IrError::BlockAlreadyTerminated { .. })
        );
        prop_assert!(blocked);
    }
}
