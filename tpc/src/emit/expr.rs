//! Expression lowering: literals, identifier load/store, arithmetic,
//! comparisons, and function calls (§4.6). Ported from the `write*`/`handle*`
//! family in `original_source/src/writter.c`.
//!
//! The original keeps three near-duplicate families of identifier handlers
//! (local / argument / global, each with a "get" and a "push" side). This
//! module collapses all six into [`emit_load`] and [`emit_store`],
//! parameterized on [`VarOrigin`] the way [`resolve_variable`] already
//! unifies lookup. The `-1` address-sentinel (`writeEventualIndex`) fires
//! for a bare array reference on all three origins, local, parameter, and
//! global alike.

use crate::ast::{Node, NodeKind};
use crate::classify::classify;
use crate::context::EmitContext;
use crate::error::{Error, ErrorKind, Result};
use crate::instr;
use crate::symbols::{resolve_variable, FunctionSymbol, ProgramTable, Symbol, VarOrigin};
use crate::types::PrimitiveType;

use super::ARG_REGISTERS;

fn width_keyword(ty: PrimitiveType) -> &'static str {
    if ty == PrimitiveType::Int {
        "dword"
    } else {
        "byte"
    }
}

fn store_register(ty: PrimitiveType) -> &'static str {
    if ty == PrimitiveType::Int {
        "eax"
    } else {
        "al"
    }
}

/// `[rbp - N]` subtrahend for a local scalar (§4.6: "Locals live at
/// `[rbp - (offset + size)]`").
fn local_scalar_offset(sym: &Symbol) -> u32 {
    sym.address + sym.ty.size()
}

/// `[rbp - N]` subtrahend for the base of a local array (§4.6: "Arrays are
/// addressed as `[rbp - (offset + element_count × element_size) + index ×
/// element_size]`").
fn local_array_offset(sym: &Symbol) -> u32 {
    sym.address + sym.ty.size() * sym.element_count
}

fn arg_register(position: usize, line: u32) -> Result<&'static str> {
    match position {
        0..=5 => Ok(ARG_REGISTERS[position]),
        6..=11 => Ok(ARG_REGISTERS[position - 6]),
        _ => Err(Error::new(ErrorKind::TooManyArgument, line)),
    }
}

fn param_position(id: &str, function: &FunctionSymbol, line: u32) -> Result<usize> {
    function
        .params
        .position(id)
        .ok_or_else(|| Error::new(ErrorKind::IdNotInTable, line))
}

/// Emits the `-1` sentinel (bare array reference) or the evaluated index
/// expression, pushing the result (the unified `writeEventualIndex`).
fn emit_eventual_index(
    ctx: &mut EmitContext<'_>,
    index: Option<&Node>,
    program: &ProgramTable,
    function: &FunctionSymbol,
) -> Result<()> {
    match index {
        None => {
            instr!(ctx, "mov rax, -1");
            instr!(ctx, "push rax");
            Ok(())
        }
        Some(idx) => {
            if classify(idx, program, function).is_void() {
                return Err(Error::new(ErrorKind::VoidIndex, idx.line));
            }
            emit_expr(ctx, idx, program, function)
        }
    }
}

/// Loads a resolved variable's value onto the stack ("get the value and
/// push it", `writePushIdent`/`write*VariablePushValue` in the original).
fn emit_load(
    ctx: &mut EmitContext<'_>,
    origin: VarOrigin,
    sym: &Symbol,
    index: Option<&Node>,
    program: &ProgramTable,
    function: &FunctionSymbol,
    line: u32,
) -> Result<()> {
    if sym.is_array || sym.is_address {
        emit_eventual_index(ctx, index, program, function)?;
        let n = ctx.next_assignment();
        instr!(ctx, "pop rbx");
        match origin {
            VarOrigin::Global => {
                instr!(ctx, "cmp rbx, -1");
                instr!(ctx, "jne .not_address{}", n);
                instr!(ctx, "lea rax, [{}]", sym.id);
                instr!(ctx, "jmp .end_assignment{}", n);
                ctx.label(&format!(".not_address{}", n));
                instr!(ctx, "imul rbx, {}", sym.ty.size());
                instr!(ctx, "xor rax, rax");
                instr!(ctx, "movsx rax, {} [{} + rbx]", width_keyword(sym.ty), sym.id);
                ctx.label(&format!(".end_assignment{}", n));
            }
            VarOrigin::Local => {
                let base = local_array_offset(sym);
                instr!(ctx, "cmp rbx, -1");
                instr!(ctx, "jne .not_address{}", n);
                instr!(ctx, "lea rax, [rbp - {}]", base);
                instr!(ctx, "jmp .end_assignment{}", n);
                ctx.label(&format!(".not_address{}", n));
                instr!(ctx, "imul rbx, {}", sym.ty.size());
                instr!(ctx, "xor rax, rax");
                instr!(ctx, "movsx rax, {} [rbp - {} + rbx]", width_keyword(sym.ty), base);
                ctx.label(&format!(".end_assignment{}", n));
            }
            VarOrigin::Param => {
                let position = param_position(&sym.id, function, line)?;
                let reg = arg_register(position, line)?;
                instr!(ctx, "cmp rbx, -1");
                instr!(ctx, "jne .not_address{}", n);
                instr!(ctx, "mov rax, {}", reg);
                instr!(ctx, "jmp .end_assignment{}", n);
                ctx.label(&format!(".not_address{}", n));
                instr!(ctx, "imul rbx, {}", sym.ty.size());
                instr!(ctx, "xor rax, rax");
                instr!(ctx, "movsx rax, {} [{} + rbx]", width_keyword(sym.ty), reg);
                ctx.label(&format!(".end_assignment{}", n));
            }
        }
    } else {
        match origin {
            VarOrigin::Global => {
                instr!(ctx, "xor rax, rax");
                instr!(ctx, "movsx rax, {} [{}]", width_keyword(sym.ty), sym.id);
            }
            VarOrigin::Local => {
                instr!(ctx, "xor rax, rax");
                instr!(ctx, "movsx rax, {} [rbp - {}]", width_keyword(sym.ty), local_scalar_offset(sym));
            }
            VarOrigin::Param => {
                let position = param_position(&sym.id, function, line)?;
                let reg = arg_register(position, line)?;
                instr!(ctx, "mov rax, {}", reg);
            }
        }
    }
    instr!(ctx, "push rax");
    Ok(())
}

/// Stores the stack's top value into a resolved variable ("pop the value
/// off the stack and write it", `writeGetIdent`/`write*VariableGetValue`
/// in the original).
fn emit_store(
    ctx: &mut EmitContext<'_>,
    origin: VarOrigin,
    sym: &Symbol,
    index: Option<&Node>,
    program: &ProgramTable,
    function: &FunctionSymbol,
    line: u32,
) -> Result<()> {
    if sym.is_array || sym.is_address {
        emit_eventual_index(ctx, index, program, function)?;
        instr!(ctx, "pop rbx");
        instr!(ctx, "imul rbx, {}", sym.ty.size());
        match origin {
            VarOrigin::Global => {
                instr!(ctx, "pop rax");
                instr!(ctx, "mov [{} + rbx], {}", sym.id, store_register(sym.ty));
            }
            VarOrigin::Local => {
                let base = local_array_offset(sym);
                instr!(ctx, "pop rax");
                instr!(ctx, "mov [rbp - {} + rbx], {}", base, store_register(sym.ty));
            }
            VarOrigin::Param => {
                let position = param_position(&sym.id, function, line)?;
                let reg = arg_register(position, line)?;
                instr!(ctx, "mov rax, {}", reg);
                instr!(ctx, "add rax, rbx");
                instr!(ctx, "pop rbx");
                instr!(ctx, "mov [rax], {}", if sym.ty == PrimitiveType::Int { "ebx" } else { "bl" });
            }
        }
    } else {
        match origin {
            VarOrigin::Global => {
                instr!(ctx, "pop rax");
                instr!(ctx, "mov {} [{}], {}", width_keyword(sym.ty), sym.id, store_register(sym.ty));
            }
            VarOrigin::Local => {
                instr!(ctx, "pop rax");
                instr!(ctx, "mov [rbp - {}], {}", local_scalar_offset(sym), store_register(sym.ty));
            }
            VarOrigin::Param => {
                let position = param_position(&sym.id, function, line)?;
                let reg = arg_register(position, line)?;
                instr!(ctx, "pop rax");
                instr!(ctx, "mov {}, rax", reg);
            }
        }
    }
    Ok(())
}

/// Stores the already-pushed right-hand side into the l-value described by
/// `target` (an `Ident` or `Array` node), the assignment half used by
/// `emit::stmt`'s `Egual` handling.
pub(crate) fn emit_assign_target(
    ctx: &mut EmitContext<'_>,
    target: &Node,
    program: &ProgramTable,
    function: &FunctionSymbol,
) -> Result<()> {
    let id = target
        .ident()
        .or_else(|| target.first_child().and_then(Node::ident))
        .ok_or_else(|| Error::new(ErrorKind::NullArgument, target.line))?;
    let (origin, sym) = resolve_variable(id, program, function)
        .ok_or_else(|| Error::new(ErrorKind::IdNotInTable, target.line))?;

    let index = match target.kind {
        NodeKind::Array => Some(
            target
                .second_child()
                .ok_or_else(|| Error::new(ErrorKind::NullArgument, target.line))?,
        ),
        _ => None,
    };
    if index.is_some() && !sym.is_array {
        return Err(Error::new(ErrorKind::ArrayUnexpected, target.line));
    }
    emit_store(ctx, origin, sym, index, program, function, target.line)
}

/// Lowers any expression-shaped node: literals, identifier reads, function
/// calls, and the binary operator tiers (`writeInstr`'s expression cases).
pub(crate) fn emit_expr(
    ctx: &mut EmitContext<'_>,
    node: &Node,
    program: &ProgramTable,
    function: &FunctionSymbol,
) -> Result<()> {
    match node.kind {
        NodeKind::Num => {
            let value = node.int_value().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?;
            instr!(ctx, "mov rax, {}", value);
            instr!(ctx, "push rax");
            Ok(())
        }
        NodeKind::Character => {
            let value = node.char_value().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?;
            instr!(ctx, "xor rax, rax");
            instr!(ctx, "mov al, {}", value);
            instr!(ctx, "push rax");
            Ok(())
        }
        NodeKind::Ident => {
            if let Some(args) = node.child_labeled(NodeKind::Arguments) {
                emit_call(ctx, node, args, program, function)
            } else {
                let id = node.ident().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?;
                let (origin, sym) = resolve_variable(id, program, function)
                    .ok_or_else(|| Error::new(ErrorKind::IdNotInTable, node.line))?;
                emit_load(ctx, origin, sym, None, program, function, node.line)
            }
        }
        NodeKind::Array => {
            let ident = node.first_child().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?;
            let id = ident.ident().ok_or_else(|| Error::new(ErrorKind::NullArgument, ident.line))?;
            let (origin, sym) = resolve_variable(id, program, function)
                .ok_or_else(|| Error::new(ErrorKind::IdNotInTable, node.line))?;
            if !sym.is_array {
                return Err(Error::new(ErrorKind::ArrayUnexpected, node.line));
            }
            let index = node.second_child();
            emit_load(ctx, origin, sym, index, program, function, node.line)
        }
        NodeKind::Or | NodeKind::And | NodeKind::Eq | NodeKind::Order => emit_boolean_comp(ctx, node, program, function),
        NodeKind::Addsub => emit_addsub(ctx, node, program, function),
        NodeKind::Divstar => emit_divstar(ctx, node, program, function),
        NodeKind::ExclamationPoint => emit_not(ctx, node, program, function),
        _ => Err(Error::new(ErrorKind::NotAList, node.line)),
    }
}

/// Unary logical negation: `0` becomes `1`, anything else becomes `0`.
/// Classifies as `IntValued`, the same as the other boolean operators.
fn emit_not(ctx: &mut EmitContext<'_>, node: &Node, program: &ProgramTable, function: &FunctionSymbol) -> Result<()> {
    let operand = node.first_child().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?;
    if classify(operand, program, function).is_void() {
        return Err(Error::new(ErrorKind::VoidComparation, node.line));
    }
    emit_expr(ctx, operand, program, function)?;

    let n = ctx.next_condition();
    instr!(ctx, "pop rax");
    instr!(ctx, "cmp rax, 0");
    instr!(ctx, "je .true{}", n);
    instr!(ctx, "mov rax, 0");
    instr!(ctx, "jmp .false{}", n);
    ctx.label(&format!(".true{}", n));
    instr!(ctx, "mov rax, 1");
    ctx.label(&format!(".false{}", n));
    instr!(ctx, "push rax");
    Ok(())
}

/// `-x` is rewritten as `0 - x` (§4.6, "Unary minus") before emission; any
/// other single-child `Addsub` would be a malformed tree.
fn emit_addsub(ctx: &mut EmitContext<'_>, node: &Node, program: &ProgramTable, function: &FunctionSymbol) -> Result<()> {
    let op = node.operator().unwrap_or("+");
    let (left_is_zero, right) = if node.children.len() == 1 && op == "-" {
        (true, node.first_child().unwrap())
    } else {
        (false, node.second_child().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?)
    };
    let left = node.first_child().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?;

    if !left_is_zero && (classify(left, program, function).is_void() || classify(right, program, function).is_void()) {
        return Err(Error::new(ErrorKind::VoidAddsub, node.line));
    }
    if left_is_zero && classify(right, program, function).is_void() {
        return Err(Error::new(ErrorKind::VoidAddsub, node.line));
    }

    if left_is_zero {
        instr!(ctx, "mov rax, 0");
        instr!(ctx, "push rax");
    } else {
        emit_expr(ctx, left, program, function)?;
    }
    emit_expr(ctx, right, program, function)?;

    instr!(ctx, "pop rcx");
    instr!(ctx, "pop rax");
    instr!(ctx, "{} rax, rcx", if op == "+" { "add" } else { "sub" });
    instr!(ctx, "push rax");
    Ok(())
}

fn emit_divstar(ctx: &mut EmitContext<'_>, node: &Node, program: &ProgramTable, function: &FunctionSymbol) -> Result<()> {
    let left = node.first_child().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?;
    let right = node.second_child().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?;
    if classify(left, program, function).is_void() || classify(right, program, function).is_void() {
        return Err(Error::new(ErrorKind::VoidDivstar, node.line));
    }

    emit_expr(ctx, left, program, function)?;
    emit_expr(ctx, right, program, function)?;

    instr!(ctx, "pop rcx");
    instr!(ctx, "pop rax");
    if node.operator() == Some("/") {
        instr!(ctx, "xor edx, edx");
        instr!(ctx, "idiv rcx");
    } else {
        instr!(ctx, "imul rax, rcx");
    }
    instr!(ctx, "push rax");
    Ok(())
}

fn emit_boolean_comp(ctx: &mut EmitContext<'_>, node: &Node, program: &ProgramTable, function: &FunctionSymbol) -> Result<()> {
    let left = node.first_child().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?;
    let right = node.second_child().ok_or_else(|| Error::new(ErrorKind::NullArgument, node.line))?;
    let (left_class, right_class) = (classify(left, program, function), classify(right, program, function));
    if left_class.is_void() || right_class.is_void() {
        return Err(Error::new(ErrorKind::VoidComparation, node.line));
    }

    emit_expr(ctx, left, program, function)?;
    emit_expr(ctx, right, program, function)?;

    instr!(ctx, "pop rcx");
    instr!(ctx, "pop rax");
    emit_right_comp(ctx, node)?;
    instr!(ctx, "push rax");
    Ok(())
}

fn emit_right_comp(ctx: &mut EmitContext<'_>, node: &Node) -> Result<()> {
    let n = ctx.next_condition();
    match node.kind {
        NodeKind::Eq => {
            let jmp = if node.operator() == Some("==") { "je" } else { "jne" };
            instr!(ctx, "cmp rax, rcx");
            instr!(ctx, "{} .true{}", jmp, n);
            instr!(ctx, "xor rax, rax");
            instr!(ctx, "jmp .false{}", n);
            ctx.label(&format!(".true{}", n));
            instr!(ctx, "mov rax, 1");
            ctx.label(&format!(".false{}", n));
            Ok(())
        }
        NodeKind::Order => {
            let op = node.operator().unwrap_or(">");
            let mut chars = op.chars();
            let first = chars.next().unwrap_or('>');
            let has_eq = op.len() > 1;
            let jmp = match (first, has_eq) {
                ('>', true) => "jge",
                ('>', false) => "jg",
                (_, true) => "jle",
                (_, false) => "jl",
            };
            instr!(ctx, "cmp rax, rcx");
            instr!(ctx, "{} .true{}", jmp, n);
            instr!(ctx, "xor rax, rax");
            instr!(ctx, "jmp .false{}", n);
            ctx.label(&format!(".true{}", n));
            instr!(ctx, "mov rax, 1");
            ctx.label(&format!(".false{}", n));
            Ok(())
        }
        NodeKind::And | NodeKind::Or => {
            instr!(ctx, "{} rax, rcx", if node.kind == NodeKind::And { "and" } else { "or" });
            instr!(ctx, "test rax, rax");
            instr!(ctx, "setnz al");
            Ok(())
        }
        _ => Err(Error::new(ErrorKind::UnknownBooleanOperation, node.line)),
    }
}

/// Checks an argument's array/pointer shape against the callee's parameter
/// (`checkArgummentType`).
fn check_argument_type(arg: &Node, program: &ProgramTable, function: &FunctionSymbol, callee_param: &Symbol) -> Result<()> {
    let id = match arg.kind {
        NodeKind::Ident => arg.ident(),
        NodeKind::Array => arg.first_child().and_then(Node::ident),
        _ => None,
    };
    let id = match id {
        Some(id) => id,
        None => return Ok(()),
    };
    let (_, caller_sym) = match resolve_variable(id, program, function) {
        Some(found) => found,
        None => return Ok(()),
    };

    let has_index = arg.kind == NodeKind::Array;
    let caller_is_array_ref = (caller_sym.is_array || caller_sym.is_address) && !has_index;

    if caller_is_array_ref != callee_param.is_address || (caller_is_array_ref && caller_sym.ty != callee_param.ty) {
        if caller_is_array_ref || callee_param.is_address {
            return Err(Error::new(ErrorKind::InvalidArgumentType, arg.line));
        }
    }
    Ok(())
}

/// Places one call argument right-to-left (so later-evaluated arguments are
/// already on the stack when earlier ones pop their register), checking its
/// type and emitting the final register move. Mirrors `writeArg`'s
/// recursive structure: recurse to the tail of the list first, then handle
/// the head on the way back out.
fn emit_args(
    ctx: &mut EmitContext<'_>,
    args: &[Node],
    index: usize,
    program: &ProgramTable,
    function: &FunctionSymbol,
    callee: &FunctionSymbol,
) -> Result<()> {
    if index >= args.len() {
        return Ok(());
    }
    let arg = &args[index];

    if classify(arg, program, function).is_void() {
        return Err(Error::new(ErrorKind::VoidArgumentPassed, arg.line));
    }

    emit_args(ctx, args, index + 1, program, function, callee)?;

    let callee_param = callee.params.iter().nth(index).ok_or_else(|| Error::new(ErrorKind::TooManyArgument, arg.line))?;

    match arg.kind {
        NodeKind::Ident | NodeKind::Array | NodeKind::Address => {
            check_argument_type(arg, program, function, callee_param)?;
        }
        _ if callee_param.is_address => {
            return Err(Error::new(ErrorKind::ArrayExpected, arg.line));
        }
        _ => {}
    }

    emit_expr(ctx, arg, program, function)?;

    let reg = arg_register(index, arg.line)?;
    instr!(ctx, "pop rax");
    instr!(ctx, "mov {}, rax", reg);
    Ok(())
}

/// Saves/restores the calling function's own argument registers around a
/// nested call, capped at the first six parameters (the set the calling
/// convention has registers for).
fn push_args(ctx: &mut EmitContext<'_>, function: &FunctionSymbol) {
    let n = function.params.len().min(ARG_REGISTERS.len());
    for reg in ARG_REGISTERS[..n].iter().rev() {
        instr!(ctx, "push {}", reg);
    }
}

fn pop_args(ctx: &mut EmitContext<'_>, function: &FunctionSymbol) {
    let n = function.params.len().min(ARG_REGISTERS.len());
    for reg in ARG_REGISTERS[..n].iter() {
        instr!(ctx, "pop {}", reg);
    }
}

fn emit_call(
    ctx: &mut EmitContext<'_>,
    call_node: &Node,
    args_node: &Node,
    program: &ProgramTable,
    function: &FunctionSymbol,
) -> Result<()> {
    let name = call_node.ident().ok_or_else(|| Error::new(ErrorKind::NullArgument, call_node.line))?;
    let callee = program
        .functions
        .get(name)
        .ok_or_else(|| Error::new(ErrorKind::NotAFunction, call_node.line))?;

    let arg_list = args_node.first_child().map(|n| n.children.as_slice()).unwrap_or(&[]);
    let given = arg_list.len();
    let expected = callee.params.len();
    if given != expected {
        let kind = if given > expected { ErrorKind::TooManyArgument } else { ErrorKind::TooFewArgument };
        return Err(Error::new(kind, call_node.line));
    }

    push_args(ctx, function);
    emit_args(ctx, arg_list, 0, program, function, callee)?;

    instr!(ctx, "push r15");
    instr!(ctx, "mov r15, rsp");
    instr!(ctx, "and rsp, -16");
    instr!(ctx, "sub rsp, 8");
    instr!(ctx, "call {}", name);
    instr!(ctx, "mov rsp, r15");
    instr!(ctx, "pop r15");

    pop_args(ctx, function);

    if callee.return_type != PrimitiveType::Void {
        instr!(ctx, "push rax");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Payload;
    use crate::symbols::VariableTable;

    fn function_with(params: VariableTable, locals: VariableTable) -> FunctionSymbol {
        FunctionSymbol {
            id: "f".to_string(),
            return_type: PrimitiveType::Int,
            params,
            locals,
            address: 0,
        }
    }

    #[test]
    fn literal_int_pushes_value() {
        let program = ProgramTable::default();
        let function = function_with(VariableTable::new(), VariableTable::new());
        let num = Node::with_payload(NodeKind::Num, Payload::Int(7), 1);
        let mut ctx = EmitContext::new(&program);
        emit_expr(&mut ctx, &num, &program, &function).unwrap();
        let out = ctx.into_output();
        assert!(out.contains("mov rax, 7"));
        assert!(out.contains("push rax"));
    }

    #[test]
    fn bare_local_array_reference_emits_sentinel() {
        let mut locals = VariableTable::new();
        locals.push("a".to_string(), PrimitiveType::Int, 4, true, false, 1).unwrap();
        let program = ProgramTable::default();
        let function = function_with(VariableTable::new(), locals);
        let ident = Node::with_payload(NodeKind::Ident, Payload::Ident("a".to_string()), 1);

        let mut ctx = EmitContext::new(&program);
        emit_expr(&mut ctx, &ident, &program, &function).unwrap();
        let out = ctx.into_output();
        assert!(out.contains("mov rax, -1"));
        assert!(out.contains("lea rax, [rbp -"));
    }

    #[test]
    fn unary_minus_rewrites_to_zero_minus_x() {
        let mut locals = VariableTable::new();
        locals.push("x".to_string(), PrimitiveType::Int, 1, false, false, 1).unwrap();
        let program = ProgramTable::default();
        let function = function_with(VariableTable::new(), locals);
        let x = Node::with_payload(NodeKind::Ident, Payload::Ident("x".to_string()), 1);
        let neg = Node::with_payload(NodeKind::Addsub, Payload::Operator("-"), 1).with_children(vec![x]);

        let mut ctx = EmitContext::new(&program);
        emit_expr(&mut ctx, &neg, &program, &function).unwrap();
        let out = ctx.into_output();
        assert!(out.contains("mov rax, 0"));
        assert!(out.contains("sub rax, rcx"));
    }

    #[test]
    fn void_addsub_operand_is_rejected() {
        let program = ProgramTable::default();
        let function = function_with(VariableTable::new(), VariableTable::new());
        let unknown = Node::with_payload(NodeKind::Ident, Payload::Ident("nope".to_string()), 1);
        let lit = Node::with_payload(NodeKind::Num, Payload::Int(1), 1);
        let add = Node::with_payload(NodeKind::Addsub, Payload::Operator("+"), 1).with_children(vec![lit, unknown]);

        let mut ctx = EmitContext::new(&program);
        let err = emit_expr(&mut ctx, &add, &program, &function).unwrap_err();
        assert_eq!(err.kind, ErrorKind::VoidAddsub);
    }
}
