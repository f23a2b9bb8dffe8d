//! Built-in sample designs.
//!
//! The driver has no assembly reader; it works on modules assembled here with
//! the `loom_ir` builder API.

use clap::ValueEnum;
use loom_ir::{Context, IrResult, ModuleId};

/// The sample designs the driver can build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Design {
    /// The latch-based gated clock enable: an entity instantiating a
    /// four-way branching process.
    Lagce,
    /// The gated clock with the `ckla` arm cut off, which leaves an orphaned block.
    LagceOrphan,
    /// A single-block process that drives the inverse of its input.
    Inverter,
}

/// Builds `design` into a fresh module of `ctx`.
pub fn build(ctx: &mut Context, design: Design) -> IrResult<ModuleId> {
    match design {
        Design::Lagce => build_lagce(ctx, false),
        Design::LagceOrphan => build_lagce(ctx, true),
        Design::Inverter => build_inverter(ctx),
    }
}

/// ```text
/// proc @LAGCE_proc (i1 %CK, i1 %E, i1 %Q) -> (i1 %GCK, i1 %Q)
/// entity @LAGCE (i1 %CK, i1 %E) -> (i1 %GCK)
/// ```
///
/// While the clock is low the gated clock is held low and the latch follows
/// the enable; while it is high the latched value passes through.
fn build_lagce(ctx: &mut Context, orphan_ckla: bool) -> IrResult<ModuleId> {
    let i1 = ctx.int_ty(1)?;
    let module = ctx.new_module("lagce");

    let proc_sig = ctx.unit_ty(&[i1, i1, i1], &[i1, i1])?;
    let process = ctx.new_process(proc_sig, "LAGCE_proc")?;
    ctx.name_args(process, &["CK", "E", "Q"], &["GCK", "Q"])?;
    ctx.append_unit(module, process)?;

    let ent_sig = ctx.unit_ty(&[i1, i1], &[i1])?;
    let entity = ctx.new_entity(ent_sig, "LAGCE")?;
    ctx.name_args(entity, &["CK", "E"], &["GCK"])?;
    let q = ctx.ins(entity).sig(i1, None)?;
    ctx.set_name(q, Some("Q"))?;
    let (ck, en, gck) = (
        ctx.input(entity, 0),
        ctx.input(entity, 1),
        ctx.output(entity, 0),
    );
    let instance = ctx.ins(entity).inst(process, &[ck, en, q], &[gck, q])?;
    ctx.set_inst_label(instance, Some("p"))?;
    ctx.append_unit(module, entity)?;

    let [entry, ckl, ckla, cklb, ckh] =
        ["entry", "ckl", "ckla", "cklb", "ckh"].map(|name| ctx.new_block(name));
    for block in [entry, ckl, ckla, cklb, ckh] {
        ctx.append_block(process, block)?;
    }
    ctx.set_entry(process, entry)?;

    let (p_ck, p_e, p_q) = (
        ctx.input(process, 0),
        ctx.input(process, 1),
        ctx.input(process, 2),
    );
    let (p_gck, p_qout) = (ctx.output(process, 0), ctx.output(process, 1));
    let zero = ctx.const_int(1, 0)?;

    let ck_low = ctx.ins(entry).eq(p_ck, zero)?;
    ctx.ins(entry).br_cond(ck_low, ckl, ckh)?;

    ctx.ins(ckl).drv(p_gck, zero)?;
    let q_low = ctx.ins(ckl).eq(p_q, zero)?;
    let low_arm = if orphan_ckla { cklb } else { ckla };
    ctx.ins(ckl).br_cond(q_low, low_arm, cklb)?;

    ctx.ins(ckla).drv(p_qout, p_ck)?;
    ctx.ins(ckla).ret()?;

    ctx.ins(cklb).drv(p_qout, p_e)?;
    ctx.ins(cklb).ret()?;

    ctx.ins(ckh).drv(p_gck, p_q)?;
    ctx.ins(ckh).ret()?;

    tracing::debug!(module = "lagce", orphan_ckla, "built sample design");
    Ok(module)
}

fn build_inverter(ctx: &mut Context) -> IrResult<ModuleId> {
    let i1 = ctx.int_ty(1)?;
    let module = ctx.new_module("inverter");
    let sig = ctx.unit_ty(&[i1], &[i1])?;
    let process = ctx.new_process(sig, "inv")?;
    ctx.name_args(process, &["a"], &["y"])?;
    ctx.append_unit(module, process)?;

    let entry = ctx.new_block("entry");
    ctx.append_block(process, entry)?;
    ctx.set_entry(process, entry)?;
    let (a, y) = (ctx.input(process, 0), ctx.output(process, 0));
    let zero = ctx.const_int(1, 0)?;
    let low = ctx.ins(entry).eq(a, zero)?;
    ctx.ins(entry).drv(y, low)?;
    ctx.ins(entry).ret()?;

    tracing::debug!(module = "inverter", "built sample design");
    Ok(module)
}
