//! The fixed I/O prelude (§4.2): hand-written NASM bodies for `getChar`,
//! `getInt`, `putChar`, `putInt`, emitted verbatim into every translation
//! unit. Ported from `original_source/src/defaultFunctionWritter.c`.
//!
//! Emission order here (`getChar, getInt, putChar, putInt`) is independent
//! of the program table's *registration* order (`getChar, putChar, getInt,
//! putInt`, see `symbols::add_default_functions`); only the textual
//! sequence in the `.asm` file is affected by this module.

use crate::context::EmitContext;
use std::fmt::Write as _;

pub fn emit_prelude(ctx: &mut EmitContext<'_>) {
    emit_get_char_aux(ctx);
    emit_get_char(ctx);
    emit_get_int(ctx);
    emit_put_char(ctx);
    emit_put_int(ctx);
}

fn emit_get_char_aux(ctx: &mut EmitContext<'_>) {
    ctx.raw(
        "__getCharAux__:\n\
         \tsub rsp, 1\n\
         \tmov rax, 0\n\
         \tmov rdi, 0\n\
         \tmov rsi, rsp\n\
         \tmov rdx, 1\n\
         \tsyscall\n\
         \tmovzx rax, byte [rsp]\n\
         \tadd rsp, 1\n\
         \tret\n",
    );
}

fn emit_get_char(ctx: &mut EmitContext<'_>) {
    ctx.raw(
        "getChar:\n\
         \tcall __getCharAux__\n\
         \tmov r10, rax\n\
         \tcall __getCharAux__\n\
         \tmov rax, r10\n\
         \tret\n",
    );
}

fn emit_get_int(ctx: &mut EmitContext<'_>) {
    ctx.raw(
        "getInt:\n\
         \txor r11, r11\n\
         \txor r10, r10\n\
         \tcall __getCharAux__\n\
         \tcmp al, '-'\n\
         \tjne .getInt_digits\n\
         \tmov r10, 1\n\
         \tcall __getCharAux__\n\
         .getInt_digits:\n\
         \tcmp al, '0'\n\
         \tjl .getInt_done\n\
         \tcmp al, '9'\n\
         \tjg .getInt_done\n\
         \timul r11, r11, 10\n\
         \tsub al, '0'\n\
         \tmovzx rax, al\n\
         \tadd r11, rax\n\
         \tcall __getCharAux__\n\
         \tjmp .getInt_digits\n\
         .getInt_done:\n\
         \tmov rax, r11\n\
         \tcmp r10, 1\n\
         \tjne .getInt_return\n\
         \tneg rax\n\
         .getInt_return:\n\
         \tret\n",
    );
}

fn emit_put_char(ctx: &mut EmitContext<'_>) {
    ctx.raw(
        "putChar:\n\
         \tpush rdi\n\
         \tmov rax, 1\n\
         \tmov rdi, 1\n\
         \tmov rsi, rsp\n\
         \tmov rdx, 1\n\
         \tsyscall\n\
         \tpop rdi\n\
         \tret\n",
    );
}

fn emit_put_int(ctx: &mut EmitContext<'_>) {
    // Negative-sign handling, then digit extraction (idiv by r12=10,
    // pushing each remainder + '0'), then popping digits most-significant
    // first through alignment-wrapped calls to putChar.
    let mut body = String::new();
    body.push_str(
        "putInt:\n\
         \tpush r13\n\
         \tpush r14\n\
         \tmov r13, rdi\n\
         \tmov r12, 10\n\
         \tmov r14, 0\n\
         \tcmp r13, 0\n\
         \tjge .putInt_extract\n\
         \tneg r13\n\
         \tpush r15\n\
         \tmov r15, rsp\n\
         \tand rsp, -16\n\
         \tsub rsp, 8\n\
         \tmov rdi, '-'\n\
         \tcall putChar\n\
         \tmov rsp, r15\n\
         \tpop r15\n\
         .putInt_extract:\n\
         \tmov rax, r13\n\
         .putInt_extract_loop:\n\
         \txor rdx, rdx\n\
         \tidiv r12\n\
         \tadd rdx, '0'\n\
         \tpush rdx\n\
         \tinc r14\n\
         \tcmp rax, 0\n\
         \tjne .putInt_extract_loop\n\
         .putInt_emit_loop:\n\
         \tpop rdi\n\
         \tpush r15\n\
         \tmov r15, rsp\n\
         \tand rsp, -16\n\
         \tsub rsp, 8\n\
         \tcall putChar\n\
         \tmov rsp, r15\n\
         \tpop r15\n\
         \tdec r14\n\
         \tcmp r14, 0\n\
         \tjne .putInt_emit_loop\n\
         \tpop r14\n\
         \tpop r13\n\
         \tret\n",
    );
    write!(ctx.out(), "{}", body).expect("writing to an in-memory buffer cannot fail");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::ProgramTable;

    #[test]
    fn prelude_emits_all_four_builtins_in_fixed_order() {
        let program = ProgramTable::default();
        let mut ctx = EmitContext::new(&program);
        emit_prelude(&mut ctx);
        let text = ctx.into_output();

        let get_char = text.find("getChar:").unwrap();
        let get_int = text.find("getInt:").unwrap();
        let put_char = text.find("putChar:").unwrap();
        let put_int = text.find("putInt:").unwrap();
        assert!(get_char < get_int);
        assert!(get_int < put_char);
        assert!(put_char < put_int);
    }

    #[test]
    fn get_char_aux_precedes_get_char() {
        let program = ProgramTable::default();
        let mut ctx = EmitContext::new(&program);
        emit_prelude(&mut ctx);
        let text = ctx.into_output();
        assert!(text.find("__getCharAux__:").unwrap() < text.find("getChar:").unwrap());
    }
}
