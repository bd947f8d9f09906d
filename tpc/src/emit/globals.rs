//! `.bss` section emission (§4.6 "Global addressing", §4.7). Ported from
//! `original_source/src/writter.c`'s `writeGlobals`.

use crate::context::EmitContext;
use crate::instr;

fn reservation_directive(size: u32) -> &'static str {
    match size {
        1 => "resb",
        2 => "resw",
        4 => "resd",
        _ => "resq",
    }
}

/// Emits `section .bss` with one reservation line per global, each sized
/// off the variable's primitive type, not its full element-count × size.
/// See DESIGN.md's note on `writeGlobals`: the count is passed straight to
/// `resb`/`resw`/`resd`/`resq`, which already reserves that many units of
/// the given width.
pub fn emit_globals(ctx: &mut EmitContext<'_>) {
    ctx.line("section .bss");
    let program = ctx.program();
    let directives: Vec<(String, &'static str, u32)> = program
        .globals
        .iter()
        .map(|sym| (sym.id.clone(), reservation_directive(sym.ty.size()), sym.element_count))
        .collect();
    for (id, directive, count) in directives {
        instr!(ctx, "{}: {} {}", id, directive, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::{ProgramTable, VariableTable};
    use crate::types::PrimitiveType;

    #[test]
    fn globals_reserve_by_element_width() {
        let mut globals = VariableTable::new();
        globals.push("a".to_string(), PrimitiveType::Int, 3, true, false, 1).unwrap();
        globals.push("c".to_string(), PrimitiveType::Char, 1, false, false, 1).unwrap();
        let mut program = ProgramTable::default();
        program.globals = globals;

        let mut ctx = EmitContext::new(&program);
        emit_globals(&mut ctx);
        let text = ctx.into_output();
        assert!(text.contains("a: resd 3"));
        assert!(text.contains("c: resb 1"));
    }
}
