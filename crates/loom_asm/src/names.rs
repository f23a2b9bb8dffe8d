//! Printable names for the values of one unit.

use loom_ir::{Context, UnitId, ValueId, ValueKind};
use std::collections::HashMap;

/// Assigns `%0, %1, ...` to the unnamed arguments and results of a unit, in
/// definition order, so that every operand can be printed.
pub(crate) struct ValueNames {
    numbered: HashMap<ValueId, usize>,
}

impl ValueNames {
    pub(crate) fn for_unit(ctx: &Context, unit: UnitId) -> Self {
        let data = ctx.unit(unit);
        let mut numbered = HashMap::new();
        let mut next = 0;
        let mut visit = |value: ValueId| {
            if ctx.value_name(value).is_none() {
                numbered.insert(value, next);
                next += 1;
            }
        };
        for &arg in data.inputs().iter().chain(data.outputs()) {
            visit(arg);
        }
        for inst in ctx.unit_insts(unit) {
            for &result in ctx.inst(inst).results() {
                visit(result);
            }
        }
        Self { numbered }
    }

    /// `%name`, `%3`, or the literal of a pooled constant such as `i1 0`.
    pub(crate) fn reference(&self, ctx: &Context, value: ValueId) -> String {
        if let ValueKind::Const(konst) = ctx.value(value).kind() {
            return konst.to_string();
        }
        match ctx.value_name(value) {
            Some(name) => format!("%{name}"),
            None => match self.numbered.get(&value) {
                Some(n) => format!("%{n}"),
                None => "%?".to_string(),
            },
        }
    }

    /// The reference prefixed with its type, as operands are printed. Blocks
    /// and constants carry no extra prefix.
    pub(crate) fn typed(&self, ctx: &Context, value: ValueId) -> String {
        match ctx.value(value).kind() {
            ValueKind::Const(_) | ValueKind::Block(_) => self.reference(ctx, value),
            _ => format!(
                "{} {}",
                ctx.types().display(ctx.value_ty(value)),
                self.reference(ctx, value)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_values_numbered_in_order() {
        let mut ctx = Context::new();
        let i1 = ctx.int_ty(1).unwrap();
        let sig = ctx.unit_ty(&[i1, i1], &[i1]).unwrap();
        let top = ctx.new_entity(sig, "top").unwrap();
        ctx.name_args(top, &["a"], &[]).unwrap();
        let (a, b) = (ctx.input(top, 0), ctx.input(top, 1));
        let eq = ctx.ins(top).eq(a, b).unwrap();
        let zero = ctx.const_int(1, 0).unwrap();

        let names = ValueNames::for_unit(&ctx, top);
        assert_eq!(names.reference(&ctx, a), "%a");
        assert_eq!(names.reference(&ctx, b), "%0");
        assert_eq!(names.reference(&ctx, ctx.output(top, 0)), "%1");
        assert_eq!(names.reference(&ctx, eq), "%2");
        assert_eq!(names.typed(&ctx, eq), "i1 %2");
        assert_eq!(names.typed(&ctx, zero), "i1 0");
    }
}
