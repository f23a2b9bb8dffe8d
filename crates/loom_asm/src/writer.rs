//! The human-readable assembly form.
//!
//! ```text
//! proc @LAGCE_proc (i1 %CK, i1 %E, i1 %Q) -> (i1 %GCK, i1 %Q) {
//! %entry:
//!     %0 = cmp eq i1 %CK, i1 0
//!     br.cond i1 %0, %ckl, %ckh
//! ...
//! }
//!
//! entity @LAGCE (i1 %CK, i1 %E) -> (i1 %GCK) {
//!     %Q = sig i1
//!     %0, %1 = inst p @LAGCE_proc (i1 %CK, i1 %E, i1$ %Q) -> (i1 %GCK, i1$ %Q)
//! }
//! ```
//!
//! Units appear in module order. Entities print their instructions as a flat
//! list, processes as labelled blocks in block order. Unnamed values are
//! numbered per unit and pooled constants are printed inline.

use crate::names::ValueNames;
use loom_ir::{Context, InstId, InstKind, ModuleId, UnitId, UnitKind, ValueId};
use std::io::{self, Write};

/// Writes modules and units as assembly text to an [`io::Write`] sink.
pub struct AsmWriter<'a, W: Write> {
    ctx: &'a Context,
    out: W,
}

impl<'a, W: Write> AsmWriter<'a, W> {
    /// Creates a writer reading from `ctx`.
    pub fn new(ctx: &'a Context, out: W) -> Self {
        Self { ctx, out }
    }

    /// Consumes the writer, returning the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes every unit of `module`, separated by blank lines.
    pub fn write_module(&mut self, module: ModuleId) -> io::Result<()> {
        writeln!(self.out, "; module {}", self.ctx.module_name(module))?;
        for &unit in self.ctx.module(module).units() {
            writeln!(self.out)?;
            self.write_unit(unit)?;
        }
        Ok(())
    }

    /// Writes one unit.
    pub fn write_unit(&mut self, unit: UnitId) -> io::Result<()> {
        let ctx = self.ctx;
        let data = ctx.unit(unit);
        let names = ValueNames::for_unit(ctx, unit);
        let args = |values: &[ValueId]| {
            values
                .iter()
                .map(|&v| names.typed(ctx, v))
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(
            self.out,
            "{} @{} ({}) -> ({}) {{",
            data.kind().keyword(),
            ctx.unit_name(unit),
            args(data.inputs()),
            args(data.outputs())
        )?;
        match data.kind() {
            UnitKind::Entity => {
                for &inst in data.insts() {
                    self.write_inst(&names, inst)?;
                }
            }
            UnitKind::Process => {
                for &block in data.blocks() {
                    writeln!(self.out, "%{}:", ctx.block_name(block))?;
                    for &inst in ctx.block(block).insts() {
                        self.write_inst(&names, inst)?;
                    }
                }
            }
        }
        writeln!(self.out, "}}")
    }

    fn write_inst(&mut self, names: &ValueNames, inst: InstId) -> io::Result<()> {
        let line = render_inst(self.ctx, names, inst);
        writeln!(self.out, "    {line}")
    }
}

fn render_inst(ctx: &Context, names: &ValueNames, inst: InstId) -> String {
    let data = ctx.inst(inst);
    let typed = |v: &ValueId| names.typed(ctx, *v);
    let list = |values: &[ValueId]| values.iter().map(typed).collect::<Vec<_>>().join(", ");
    let ops = data.operands();
    let body = match data.kind() {
        InstKind::Const(konst) => format!("const {konst}"),
        InstKind::Sig { ty } => match ops.first() {
            Some(init) => format!(
                "sig {} {}",
                ctx.types().display(*ty),
                names.reference(ctx, *init)
            ),
            None => format!("sig {}", ctx.types().display(*ty)),
        },
        InstKind::Cmp(op) => format!("cmp {op} {}", list(ops)),
        InstKind::Drv => format!("drv {}", list(ops)),
        InstKind::Inst { callee, .. } => {
            let label = match data.label() {
                Some(label) => format!("{} ", ctx.resolve(label)),
                None => String::new(),
            };
            format!(
                "inst {label}@{} ({}) -> ({})",
                ctx.unit_name(*callee),
                list(data.instance_inputs()),
                list(data.instance_outputs())
            )
        }
        InstKind::Br | InstKind::BrCond => format!("{} {}", data.kind().mnemonic(), list(ops)),
        InstKind::Ret | InstKind::Halt => data.kind().mnemonic().to_string(),
    };
    if data.results().is_empty() {
        body
    } else {
        let results: Vec<String> = data
            .results()
            .iter()
            .map(|&r| names.reference(ctx, r))
            .collect();
        format!("{} = {body}", results.join(", "))
    }
}

/// Writes `module` as assembly text to `out`.
pub fn write_module<W: Write>(ctx: &Context, module: ModuleId, out: W) -> io::Result<()> {
    AsmWriter::new(ctx, out).write_module(module)
}

/// Renders `module` as assembly text.
pub fn module_to_string(ctx: &Context, module: ModuleId) -> String {
    let mut writer = AsmWriter::new(ctx, Vec::new());
    // Writing into a Vec cannot fail.
    let _ = writer.write_module(module);
    String::from_utf8_lossy(&writer.into_inner()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_ir::CompareOp;

    #[test]
    fn entity_is_flat() {
        let mut ctx = Context::new();
        let m = ctx.new_module("m");
        let i1 = ctx.int_ty(1).unwrap();
        let sig = ctx.unit_ty(&[i1, i1], &[i1]).unwrap();
        let top = ctx.new_entity(sig, "top").unwrap();
        ctx.append_unit(m, top).unwrap();
        ctx.name_args(top, &["a", "b"], &["y"]).unwrap();
        let (a, b, y) = (ctx.input(top, 0), ctx.input(top, 1), ctx.output(top, 0));
        let lt = ctx.ins(top).cmp(CompareOp::Lt, a, b).unwrap();
        ctx.ins(top).drv(y, lt).unwrap();

        let text = module_to_string(&ctx, m);
        assert_eq!(
            text,
            "; module m\n\
             \n\
             entity @top (i1 %a, i1 %b) -> (i1 %y) {\n    \
             %0 = cmp ult i1 %a, i1 %b\n    \
             drv i1 %y, i1 %0\n\
             }\n"
        );
    }

    #[test]
    fn process_prints_blocks() {
        let mut ctx = Context::new();
        let m = ctx.new_module("m");
        let i1 = ctx.int_ty(1).unwrap();
        let sig = ctx.unit_ty(&[i1], &[i1]).unwrap();
        let p = ctx.new_process(sig, "p").unwrap();
        ctx.append_unit(m, p).unwrap();
        ctx.name_args(p, &["x"], &["q"]).unwrap();
        let entry = ctx.new_block("entry");
        let done = ctx.new_block("done");
        ctx.append_block(p, entry).unwrap();
        ctx.append_block(p, done).unwrap();
        ctx.set_entry(p, entry).unwrap();
        let (x, q) = (ctx.input(p, 0), ctx.output(p, 0));
        ctx.ins(entry).drv(q, x).unwrap();
        ctx.ins(entry).br(done).unwrap();
        ctx.ins(done).halt().unwrap();

        let text = module_to_string(&ctx, m);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "; module m",
                "",
                "proc @p (i1 %x) -> (i1 %q) {",
                "%entry:",
                "    drv i1 %q, i1 %x",
                "    br %done",
                "%done:",
                "    halt",
                "}",
            ]
        );
    }

    #[test]
    fn constants_and_signals() {
        let mut ctx = Context::new();
        let m = ctx.new_module("m");
        let i8 = ctx.int_ty(8).unwrap();
        let sig = ctx.unit_ty(&[], &[]).unwrap();
        let top = ctx.new_entity(sig, "top").unwrap();
        ctx.append_unit(m, top).unwrap();
        let seven = ctx.ins(top).const_int(8, 7).unwrap();
        let s = ctx.ins(top).sig(i8, Some(seven)).unwrap();
        ctx.set_name(s, Some("s")).unwrap();
        let pooled = ctx.const_int(8, 3).unwrap();
        ctx.ins(top).drv(s, pooled).unwrap();

        let text = module_to_string(&ctx, m);
        assert!(text.contains("    %0 = const i8 7\n"));
        assert!(text.contains("    %s = sig i8 %0\n"));
        assert!(text.contains("    drv i8$ %s, i8 3\n"));
    }

    #[test]
    fn empty_module() {
        let mut ctx = Context::new();
        let m = ctx.new_module("empty");
        assert_eq!(module_to_string(&ctx, m), "; module empty\n");
    }
}
