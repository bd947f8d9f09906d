//! Expression classification (§4.4): assigns each expression node one of
//! `IntValued`/`CharValued`/`AddressValued`/`Void`, used by the checker to
//! detect illegal void use without needing a separate typed-IR pass.
//!
//! AST convention this module (and the emitter) relies on: a bare `Ident`
//! node with no children is a variable reference; an `Ident` node carrying
//! an `Arguments` child (present even for a zero-argument call) is a call;
//! an `Array` node's two children are `[Ident, index-expression]`. Mirrors
//! `getExpressionType` (`original_source/src/utilitaries.c`).

use crate::ast::{Node, NodeKind};
use crate::symbols::{resolve_variable, FunctionSymbol, ProgramTable};
use crate::types::{ExprClass, PrimitiveType};

pub fn classify(node: &Node, program: &ProgramTable, function: &FunctionSymbol) -> ExprClass {
    match node.kind {
        NodeKind::Num => ExprClass::IntValued,
        NodeKind::Character => ExprClass::CharValued,
        NodeKind::Or
        | NodeKind::And
        | NodeKind::Eq
        | NodeKind::Order
        | NodeKind::Addsub
        | NodeKind::Divstar
        | NodeKind::ExclamationPoint => ExprClass::IntValued,

        NodeKind::Ident => classify_ident(node, program, function),
        NodeKind::Array => classify_array_use(node, program, function),

        // Any other node reaching classification (malformed shape) carries
        // no value.
        _ => ExprClass::Void,
    }
}

fn classify_ident(node: &Node, program: &ProgramTable, function: &FunctionSymbol) -> ExprClass {
    let id = match node.ident() {
        Some(id) => id,
        None => return ExprClass::Void,
    };

    if node.child_labeled(NodeKind::Arguments).is_some() {
        return match program.functions.get(id) {
            Some(callee) => ExprClass::of_scalar(callee.return_type),
            None => ExprClass::Void,
        };
    }

    match resolve_variable(id, program, function) {
        Some((_, sym)) if sym.is_array || sym.is_address => ExprClass::AddressValued,
        Some((_, sym)) => ExprClass::of_scalar(sym.ty),
        None => ExprClass::Void,
    }
}

fn classify_array_use(node: &Node, program: &ProgramTable, function: &FunctionSymbol) -> ExprClass {
    let ident = match node.first_child() {
        Some(ident) => ident,
        None => return ExprClass::Void,
    };
    let id = match ident.ident() {
        Some(id) => id,
        None => return ExprClass::Void,
    };

    match resolve_variable(id, program, function) {
        Some((_, sym)) => ExprClass::of_scalar(sym.ty),
        None => ExprClass::Void,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Payload;
    use crate::symbols::VariableTable;

    fn sample_function(params: VariableTable, locals: VariableTable) -> FunctionSymbol {
        FunctionSymbol {
            id: "main".to_string(),
            return_type: PrimitiveType::Int,
            params,
            locals,
            address: 0,
        }
    }

    #[test]
    fn literal_nodes_classify_directly() {
        let program = ProgramTable::default();
        let function = sample_function(VariableTable::new(), VariableTable::new());
        let num = Node::with_payload(NodeKind::Num, Payload::Int(1), 1);
        let ch = Node::with_payload(NodeKind::Character, Payload::Char(b'a'), 1);
        assert_eq!(classify(&num, &program, &function), ExprClass::IntValued);
        assert_eq!(classify(&ch, &program, &function), ExprClass::CharValued);
    }

    #[test]
    fn bare_array_identifier_is_address_valued() {
        let mut globals = VariableTable::new();
        globals.push("a".to_string(), PrimitiveType::Int, 3, true, false, 1).unwrap();
        let mut program = ProgramTable::default();
        program.globals = globals;
        let function = sample_function(VariableTable::new(), VariableTable::new());

        let ident = Node::with_payload(NodeKind::Ident, Payload::Ident("a".to_string()), 1);
        assert_eq!(classify(&ident, &program, &function), ExprClass::AddressValued);
    }

    #[test]
    fn indexed_array_use_is_element_type() {
        let mut globals = VariableTable::new();
        globals.push("a".to_string(), PrimitiveType::Char, 3, true, false, 1).unwrap();
        let mut program = ProgramTable::default();
        program.globals = globals;
        let function = sample_function(VariableTable::new(), VariableTable::new());

        let ident = Node::with_payload(NodeKind::Ident, Payload::Ident("a".to_string()), 1);
        let index = Node::with_payload(NodeKind::Num, Payload::Int(0), 1);
        let array_use = Node::new(NodeKind::Array, 1).with_children(vec![ident, index]);
        assert_eq!(classify(&array_use, &program, &function), ExprClass::CharValued);
    }

    #[test]
    fn unresolved_identifier_is_void() {
        let program = ProgramTable::default();
        let function = sample_function(VariableTable::new(), VariableTable::new());
        let ident = Node::with_payload(NodeKind::Ident, Payload::Ident("nope".to_string()), 1);
        assert_eq!(classify(&ident, &program, &function), ExprClass::Void);
    }
}
