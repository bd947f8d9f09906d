//! Function prologue/epilogue and top-level dispatch for a `DeclFonct` node
//! (§4.6 "Function shape", "Program entry point"). Ported from `writeFunction`
//! and `writeMain` in `original_source/src/writter.c`.

use crate::ast::{Node, NodeKind};
use crate::context::EmitContext;
use crate::error::{Error, ErrorKind, Result};
use crate::instr;
use crate::symbols::ProgramTable;

use super::stmt::emit_instr;

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

fn function_body(decl_fonct: &Node) -> Result<&Node> {
    decl_fonct
        .child_labeled(NodeKind::Body)
        .ok_or_else(|| Error::new(ErrorKind::NotABody, decl_fonct.line))
}

/// True when the body has no direct `Return` statement, meaning the caller
/// must emit a default epilogue (`getChildLabeled`, not a deep search;
/// a `Return` nested inside an `If`/`While` doesn't count).
fn needs_default_epilogue(body: &Node) -> bool {
    body.child_labeled(NodeKind::Return).is_none()
}

/// Emits one non-`main` user function: label, standard prologue, body, and
/// a default `ret` sequence if the body never returns explicitly.
pub(crate) fn emit_function(ctx: &mut EmitContext<'_>, decl_fonct: &Node, program: &ProgramTable) -> Result<()> {
    let name = function_name(decl_fonct)?;
    let function = program
        .functions
        .get(name)
        .ok_or_else(|| Error::new(ErrorKind::IdNotInTable, decl_fonct.line))?;
    let body = function_body(decl_fonct)?;

    ctx.label(name);
    instr!(ctx, "push rbp");
    instr!(ctx, "mov rbp, rsp");

    for stmt in &body.children {
        emit_instr(ctx, stmt, program, function)?;
    }

    if needs_default_epilogue(body) {
        instr!(ctx, "mov rsp, rbp");
        instr!(ctx, "pop rbp");
        instr!(ctx, "ret");
    }
    Ok(())
}

/// Emits the program entry point. `main` never pushes `rbp` (there is no
/// caller to return to), and its default exit is `sys_exit(0)` rather than
/// `ret` (§4.6, "Program entry point").
pub(crate) fn emit_main(ctx: &mut EmitContext<'_>, decl_fonct: &Node, program: &ProgramTable) -> Result<()> {
    let function = program
        .functions
        .get("main")
        .ok_or_else(|| Error::new(ErrorKind::NoMainFunction, decl_fonct.line))?;
    let body = function_body(decl_fonct)?;

    ctx.label("_start");
    instr!(ctx, "mov rbp, rsp");

    for stmt in &body.children {
        emit_instr(ctx, stmt, program, function)?;
    }

    if needs_default_epilogue(body) {
        instr!(ctx, "mov rax, 60");
        instr!(ctx, "mov rdi, 0");
        instr!(ctx, "syscall");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Payload;
    use crate::symbols::{FunctionTable, VariableTable};
    use crate::types::PrimitiveType;

    fn decl_fonct(name: &str, body_children: Vec<Node>) -> Node {
        let func_head = Node::new(NodeKind::FuncHead, 1).with_children(vec![
            Node::new(NodeKind::Void, 1),
            Node::with_payload(NodeKind::Ident, Payload::Ident(name.to_string()), 1),
            Node::new(NodeKind::ParamList, 1).with_children(vec![Node::new(NodeKind::Void, 1)]),
        ]);
        let body = Node::new(NodeKind::Body, 1).with_children(body_children);
        Node::new(NodeKind::DeclFonct, 1).with_children(vec![func_head, body])
    }

    fn program_with(name: &str, return_type: PrimitiveType) -> ProgramTable {
        let mut functions = FunctionTable::new();
        functions.push(name.to_string(), return_type, VariableTable::new(), VariableTable::new(), 1).unwrap();
        let mut program = ProgramTable::default();
        program.functions = functions;
        program
    }

    #[test]
    fn function_without_return_gets_default_epilogue() {
        let program = program_with("f", PrimitiveType::Void);
        let decl = decl_fonct("f", vec![]);
        let mut ctx = EmitContext::new(&program);
        emit_function(&mut ctx, &decl, &program).unwrap();
        let out = ctx.into_output();
        assert!(out.contains("f:"));
        assert!(out.contains("push rbp"));
        assert!(out.contains("pop rbp"));
        assert!(out.contains("ret"));
    }

    #[test]
    fn function_with_explicit_return_skips_default_epilogue() {
        let program = program_with("f", PrimitiveType::Void);
        let value = Node::new(NodeKind::Return, 2);
        let decl = decl_fonct("f", vec![value]);
        let mut ctx = EmitContext::new(&program);
        emit_function(&mut ctx, &decl, &program).unwrap();
        let out = ctx.into_output();
        // Exactly one "ret" from the explicit Return's own emission, none
        // from a synthesized default epilogue.
        assert_eq!(out.matches("ret").count(), 1);
    }

    #[test]
    fn main_never_pushes_rbp_and_defaults_to_exit_zero() {
        let program = program_with("main", PrimitiveType::Int);
        let decl = decl_fonct("main", vec![]);
        let mut ctx = EmitContext::new(&program);
        emit_main(&mut ctx, &decl, &program).unwrap();
        let out = ctx.into_output();
        assert!(out.contains("_start:"));
        assert!(!out.contains("push rbp"));
        assert!(out.contains("mov rax, 60"));
        assert!(out.contains("mov rdi, 0"));
    }
}
