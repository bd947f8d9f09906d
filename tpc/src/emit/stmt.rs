//! Statement-level lowering: instruction blocks, `if`/`else`, `while`,
//! `return`, local declarations, and assignment (§4.6). Ported from
//! `writeInstr`'s dispatch switch and its statement-shaped cases in
//! `original_source/src/writter.c`.
//!
//! The frontend never instantiates a `SuiteInstr` wrapper node (see
//! DESIGN.md): a function body's children are a flat statement list, with
//! an optional `DeclVarsLocale` node as one of those statements, matching
//! `processInstructionBlock`'s plain sibling walk.

use crate::ast::{Node, NodeKind};
use crate::classify::classify;
use crate::context::EmitContext;
use crate::error::{Error, ErrorKind, Result};
use crate::instr;
use crate::symbols::{FunctionSymbol, ProgramTable};
use crate::types::PrimitiveType;

use super::expr::{emit_assign_target, emit_expr};

/// Walks a flat statement list in order, aborting emission at the first
/// error (`processInstructionBlock`).
pub(crate) fn emit_block(ctx: &mut EmitContext<'_>, statements: &[Node], program: &ProgramTable, function: &FunctionSymbol) -> Result<()> {
    for stmt in statements {
        emit_instr(ctx, stmt, program, function)?;
    }
    Ok(())
}

/// Dispatches one statement node, mirroring `writeInstr`'s switch.
pub(crate) fn emit_instr(ctx: &mut EmitContext<'_>, node: &Node, program: &ProgramTable, function: &FunctionSymbol) -> Result<()> {
    match node.kind {
        NodeKind::DeclVarsLocale => {
            instr!(ctx, "sub rsp, {}", function.locals.size());
            ctx.line("");
            Ok(())
        }
        NodeKind::If => emit_if(ctx, node, program, function),
        NodeKind::While => emit_while(ctx, node, program, function),
        NodeKind::Return => emit_return(ctx, node, program, function),
        NodeKind::Egual => emit_assignment(ctx, node, program, function),
        NodeKind::Else => Err(Error::new(ErrorKind::NotAList, node.line)),

        // Expression-statements, evaluated for effect; the pushed result is
        // never popped back off.
        NodeKind::Ident
        | NodeKind::Array
        | NodeKind::Num
        | NodeKind::Character
        | NodeKind::Or
        | NodeKind::And
        | NodeKind::Eq
        | NodeKind::Order
        | NodeKind::Addsub
        | NodeKind::Divstar => {
            emit_expr(ctx, node, program, function)?;
            ctx.line("");
            Ok(())
        }
        _ => Err(Error::new(ErrorKind::NotAList, node.line)),
    }
}

fn emit_if(ctx: &mut EmitContext<'_>, node: &Node, program: &ProgramTable, function: &FunctionSymbol) -> Result<()> {
    let cond = node.first_child().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?;
    let maybe_else = node.child_labeled(NodeKind::Else);
    let n = ctx.next_if();

    emit_expr(ctx, cond, program, function)?;
    instr!(ctx, "pop rax");
    instr!(ctx, "cmp rax, 0");
    instr!(ctx, "je .{}{}", if maybe_else.is_some() { "else" } else { "endif" }, n);
    ctx.line("");

    let then_body: Vec<&Node> = node.children.iter().skip(1).filter(|c| c.kind != NodeKind::Else).collect();
    for stmt in then_body {
        emit_instr(ctx, stmt, program, function)?;
    }

    if let Some(else_node) = maybe_else {
        instr!(ctx, "jmp .endif{}", n);
        ctx.line("");
        ctx.label(&format!(".else{}", n));
        emit_block(ctx, &else_node.children, program, function)?;
    }

    ctx.label(&format!(".endif{}", n));
    ctx.line("");
    Ok(())
}

fn emit_while(ctx: &mut EmitContext<'_>, node: &Node, program: &ProgramTable, function: &FunctionSymbol) -> Result<()> {
    let cond = node.first_child().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?;
    let n = ctx.next_while();

    ctx.label(&format!(".loop{}", n));

    // A bare identifier condition is implicitly reinterpreted as
    // `identifier != 0` (§4.6), since the language has no standalone
    // boolean-truthiness rule for a raw scalar value otherwise.
    if cond.kind == NodeKind::Ident {
        emit_expr(ctx, cond, program, function)?;
        instr!(ctx, "mov rax, 0");
        instr!(ctx, "pop rcx");
        instr!(ctx, "cmp rcx, rax");
        instr!(ctx, "jne .true_cond{}", n);
        instr!(ctx, "mov rax, 0");
        instr!(ctx, "jmp .after_cond{}", n);
        ctx.label(&format!(".true_cond{}", n));
        instr!(ctx, "mov rax, 1");
        ctx.label(&format!(".after_cond{}", n));
    } else {
        emit_expr(ctx, cond, program, function)?;
        instr!(ctx, "pop rax");
    }
    instr!(ctx, "cmp rax, 0");
    instr!(ctx, "je .endloop{}", n);
    ctx.line("");

    for stmt in node.children.iter().skip(1) {
        emit_instr(ctx, stmt, program, function)?;
    }

    instr!(ctx, "jmp .loop{}", n);
    ctx.label(&format!(".endloop{}", n));
    ctx.line("");
    Ok(())
}

fn emit_return(ctx: &mut EmitContext<'_>, node: &Node, program: &ProgramTable, function: &FunctionSymbol) -> Result<()> {
    let value = node.first_child();

    if function.return_type == PrimitiveType::Void {
        if value.is_some() {
            return Err(Error::new(ErrorKind::VoidReturnIllegal, node.line));
        }
        instr!(ctx, "mov rax, 0");
        return emit_return_sequence(ctx, function);
    }

    let value = match value {
        Some(v) if !classify(v, program, function).is_void() => v,
        _ => return Err(Error::new(ErrorKind::MissingReturnValue, node.line)),
    };

    if function.return_type == PrimitiveType::Char && classify(value, program, function) == crate::types::ExprClass::IntValued {
        eprintln!("{}: returning an int where a char is expected", node.line);
    }

    emit_expr(ctx, value, program, function)?;
    instr!(ctx, "pop rax");
    emit_return_sequence(ctx, function)
}

fn emit_return_sequence(ctx: &mut EmitContext<'_>, function: &FunctionSymbol) -> Result<()> {
    if function.id == "main" {
        instr!(ctx, "mov rdi, rax");
        instr!(ctx, "mov rax, 60");
        instr!(ctx, "syscall");
    } else {
        instr!(ctx, "mov rsp, rbp");
        instr!(ctx, "pop rbp");
        instr!(ctx, "ret");
    }
    ctx.line("");
    Ok(())
}

fn emit_assignment(ctx: &mut EmitContext<'_>, node: &Node, program: &ProgramTable, function: &FunctionSymbol) -> Result<()> {
    let target = node.first_child().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?;
    let value = node.second_child().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?;

    let (target_class, value_class) = (classify(target, program, function), classify(value, program, function));
    if target_class.is_void() || value_class.is_void() {
        return Err(Error::new(ErrorKind::VoidAssignment, node.line));
    }

    emit_expr(ctx, value, program, function)?;
    emit_assign_target(ctx, target, program, function)?;

    if value_class == crate::types::ExprClass::IntValued && target_class == crate::types::ExprClass::CharValued {
        eprintln!("{}: assigning an int to a char", node.line);
    }

    ctx.line("");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Payload;
    use crate::symbols::VariableTable;

    fn function_with(return_type: PrimitiveType, locals: VariableTable) -> FunctionSymbol {
        FunctionSymbol {
            id: "f".to_string(),
            return_type,
            params: VariableTable::new(),
            locals,
            address: 0,
        }
    }

    #[test]
    fn decl_vars_locale_reserves_stack_space() {
        let mut locals = VariableTable::new();
        locals.push("x".to_string(), PrimitiveType::Int, 1, false, false, 1).unwrap();
        let program = ProgramTable::default();
        let function = function_with(PrimitiveType::Int, locals);
        let decl = Node::new(NodeKind::DeclVarsLocale, 1);

        let mut ctx = EmitContext::new(&program);
        emit_instr(&mut ctx, &decl, &program, &function).unwrap();
        assert!(ctx.into_output().contains("sub rsp, 4"));
    }

    #[test]
    fn void_function_rejects_return_with_value() {
        let program = ProgramTable::default();
        let function = function_with(PrimitiveType::Void, VariableTable::new());
        let value = Node::with_payload(NodeKind::Num, Payload::Int(1), 2);
        let ret = Node::new(NodeKind::Return, 2).with_children(vec![value]);

        let mut ctx = EmitContext::new(&program);
        let err = emit_instr(&mut ctx, &ret, &program, &function).unwrap_err();
        assert_eq!(err.kind, ErrorKind::VoidReturnIllegal);
    }

    #[test]
    fn main_return_emits_exit_syscall() {
        let program = ProgramTable::default();
        let function = function_with(PrimitiveType::Int, VariableTable::new());
        let mut main_function = function.clone();
        main_function.id = "main".to_string();
        let value = Node::with_payload(NodeKind::Num, Payload::Int(0), 1);
        let ret = Node::new(NodeKind::Return, 1).with_children(vec![value]);

        let mut ctx = EmitContext::new(&program);
        emit_instr(&mut ctx, &ret, &program, &main_function).unwrap();
        let out = ctx.into_output();
        assert!(out.contains("mov rdi, rax"));
        assert!(out.contains("syscall"));
    }
}
