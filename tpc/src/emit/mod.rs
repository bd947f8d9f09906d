//! Code generation: lowers the AST to NASM text, fused with the semantic
//! checker of §4.5 as the original does (spec.md §9 notes a two-pass
//! design as an equally valid alternative; this crate keeps the fusion).

mod expr;
mod function;
mod globals;
mod stmt;

use crate::ast::{Node, NodeKind};
use crate::context::EmitContext;
use crate::error::{Error, ErrorKind, Result};
use crate::prelude;
use crate::symbols::build_program_table;

/// Register order for the first six System-V integer/pointer arguments.
pub(crate) const ARG_REGISTERS: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];

/// Compiles a whole program AST into a complete NASM translation unit
/// (§4.7). Building the program table and walking the AST both fail fast:
/// the first error aborts and is returned to the caller.
pub fn compile(root: &Node) -> Result<String> {
    let program = build_program_table(root)?;

    let functions_block = root
        .child_labeled(NodeKind::DeclFoncts)
        .ok_or_else(|| Error::new(ErrorKind::NotABody, root.line))?;

    let mut ctx = EmitContext::new(&program);

    globals::emit_globals(&mut ctx);
    ctx.line("");
    ctx.line("global _start");
    ctx.line("section .text");
    ctx.line("");

    prelude::emit_prelude(&mut ctx);
    ctx.line("");

    for decl_fonct in &functions_block.children {
        let name = function_name(decl_fonct)?;
        if name == "main" {
            continue;
        }
        function::emit_function(&mut ctx, decl_fonct, &program)?;
        ctx.line("");
    }

    let main_decl = functions_block
        .children
        .iter()
        .find(|d| function_name(d).map(|n| n == "main").unwrap_or(false))
        .ok_or_else(|| Error::new(ErrorKind::NoMainFunction, root.line))?;
    function::emit_main(&mut ctx, main_decl, &program)?;

    Ok(ctx.into_output())
}

fn function_name(decl_fonct: &Node) -> Result<&str> {
    let func_head = decl_fonct
        .child_labeled(NodeKind::FuncHead)
        .ok_or_else(|| Error::new(ErrorKind::NotABody, decl_fonct.line))?;
    let name_node = func_head
        .second_child()
        .ok_or_else(|| Error::new(ErrorKind::NullArgument, func_head.line))?;
    name_node
        .ident()
        .ok_or_else(|| Error::new(ErrorKind::NullArgument, name_node.line))
}
