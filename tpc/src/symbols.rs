//! Symbol tables, function tables, the program table, and the builder that
//! walks the AST to populate them (§3, §4.3).
//!
//! Offset and size-accumulation formulas here are ported from
//! `original_source/src/symbolTable.c` and `src/functionTable.c`. See
//! DESIGN.md's "Open Question resolutions" for the two formulas kept as-is.

use crate::ast::{Node, NodeKind};
use crate::error::{Error, ErrorKind, Result};
use crate::types::PrimitiveType;

/// One declared variable: a global, a local, or a parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub id: String,
    pub ty: PrimitiveType,
    pub address: u32,
    pub element_count: u32,
    pub is_array: bool,
    /// True only for array parameters, which are passed (and stored) as an
    /// 8-byte pointer rather than inline element storage.
    pub is_address: bool,
}

impl Symbol {
    /// The physical footprint this entry occupies, used to compute the
    /// *next* entry's offset.
    pub fn physical_size(&self) -> u32 {
        if self.is_address {
            8
        } else if self.is_array {
            self.ty.size() * self.element_count
        } else {
            self.ty.size()
        }
    }
}

/// Insertion-ordered variable table with a running cumulative byte size.
#[derive(Clone, Debug, Default)]
pub struct VariableTable {
    entries: Vec<Symbol>,
    size: u32,
}

impl VariableTable {
    pub fn new() -> VariableTable {
        VariableTable::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.entries.iter()
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn get(&self, id: &str) -> Option<&Symbol> {
        self.entries.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// The entry's 0-based position in insertion order. Used for parameter
    /// register addressing, where the register slot is the symbol's
    /// position in the table rather than its byte `address`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|s| s.id == id)
    }

    /// Insert a new entry at the end of the table, rejecting a duplicate id.
    /// The offset is the previous entry's offset plus its physical size
    /// (`0` for the first entry). The table's running `size` additionally
    /// carries the array-parameter quirk: a declared array of
    /// `element_count == 1` contributes 8 bytes regardless of its element
    /// type, matching `putSymbolInTable`.
    pub fn push(
        &mut self,
        id: String,
        ty: PrimitiveType,
        element_count: u32,
        is_array: bool,
        is_address: bool,
        line: u32,
    ) -> Result<()> {
        if self.contains(&id) {
            return Err(Error::new(ErrorKind::IdInTable, line));
        }

        let address = match self.entries.last() {
            None => 0,
            Some(prev) => prev.address + prev.physical_size(),
        };

        self.size += if is_array && element_count == 1 {
            8
        } else {
            ty.size() * element_count
        };

        self.entries.push(Symbol {
            id,
            ty,
            address,
            element_count,
            is_array,
            is_address,
        });
        Ok(())
    }

    /// Sum of each entry's raw primitive-type byte width (1 or 4),
    /// ignoring array/pointer-ness entirely. Used (bug-for-bug) by the
    /// function-address accumulation chain; see DESIGN.md.
    pub fn raw_type_footprint(&self) -> u32 {
        self.entries.iter().map(|s| s.ty.size()).sum()
    }
}

/// One function's signature and scope: parameter table, local table, return
/// type, and its accumulated stack-footprint address.
#[derive(Clone, Debug)]
pub struct FunctionSymbol {
    pub id: String,
    pub return_type: PrimitiveType,
    pub params: VariableTable,
    pub locals: VariableTable,
    pub address: u32,
}

/// Insertion-ordered function table.
#[derive(Clone, Debug, Default)]
pub struct FunctionTable {
    entries: Vec<FunctionSymbol>,
}

impl FunctionTable {
    pub fn new() -> FunctionTable {
        FunctionTable::default()
    }

    pub fn get(&self, id: &str) -> Option<&FunctionSymbol> {
        self.entries.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FunctionSymbol> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn next_address(&self) -> u32 {
        match self.entries.last() {
            None => 0,
            Some(prev) => prev.address + prev.params.raw_type_footprint() + prev.locals.raw_type_footprint(),
        }
    }

    fn push_unchecked(&mut self, id: String, return_type: PrimitiveType, params: VariableTable, locals: VariableTable) {
        let address = self.next_address();
        self.entries.push(FunctionSymbol {
            id,
            return_type,
            params,
            locals,
            address,
        });
    }

    pub fn push(
        &mut self,
        id: String,
        return_type: PrimitiveType,
        params: VariableTable,
        locals: VariableTable,
        line: u32,
    ) -> Result<()> {
        if self.contains(&id) {
            return Err(Error::new(ErrorKind::IdInTable, line));
        }
        self.push_unchecked(id, return_type, params, locals);
        Ok(())
    }
}

/// `{ globals, functions, total_size }` (§3).
#[derive(Clone, Debug, Default)]
pub struct ProgramTable {
    pub globals: VariableTable,
    pub functions: FunctionTable,
}

impl ProgramTable {
    pub fn total_size(&self) -> u32 {
        self.globals.size()
    }
}

/// Registers the four built-ins in the order `getChar, putChar, getInt,
/// putInt`, matching `addDefaultFunctions`. This order feeds the
/// function-address accumulation chain the first user function's address
/// is computed from; it is independent of the prelude's *text emission*
/// order (`prelude.rs`).
fn add_default_functions(functions: &mut FunctionTable) {
    functions.push_unchecked("getChar".to_string(), PrimitiveType::Char, VariableTable::new(), VariableTable::new());

    let mut put_char_params = VariableTable::new();
    put_char_params
        .push("c".to_string(), PrimitiveType::Char, 1, false, false, 0)
        .expect("builtin param table starts empty");
    functions.push_unchecked("putChar".to_string(), PrimitiveType::Void, put_char_params, VariableTable::new());

    functions.push_unchecked("getInt".to_string(), PrimitiveType::Int, VariableTable::new(), VariableTable::new());

    let mut put_int_params = VariableTable::new();
    put_int_params
        .push("n".to_string(), PrimitiveType::Int, 1, false, false, 0)
        .expect("builtin param table starts empty");
    functions.push_unchecked("putInt".to_string(), PrimitiveType::Void, put_int_params, VariableTable::new());
}

fn resolve_declared_type(node: &Node) -> PrimitiveType {
    match node.kind {
        NodeKind::Void => PrimitiveType::Void,
        NodeKind::Type => node
            .ident()
            .and_then(PrimitiveType::from_str)
            .unwrap_or(PrimitiveType::Unauthorized),
        _ => PrimitiveType::Unauthorized,
    }
}

/// Adds every declarator in a `DeclVarsGlobale`/`DeclVarsLocale` block to
/// `table`. Each `Declarateurs` child groups a shared `Type` node with one
/// or more declarators: a plain `Ident` (scalar) or an `Array` node whose
/// children are `[Ident, Num]` (element count taken from the `Num` child,
/// per §4.3's "array size taken from the Num sibling of the Array marker").
fn add_declarations(block: &Node, table: &mut VariableTable) -> Result<()> {
    for group in &block.children {
        let ty_node = group
            .first_child()
            .ok_or_else(|| Error::new(ErrorKind::NotAType, group.line))?;
        let ty = resolve_declared_type(ty_node);

        for declarator in group.children.iter().skip(1) {
            match declarator.kind {
                NodeKind::Ident => {
                    let id = declarator
                        .ident()
                        .ok_or_else(|| Error::new(ErrorKind::NullArgument, declarator.line))?
                        .to_string();
                    table.push(id, ty, 1, false, false, declarator.line)?;
                }
                NodeKind::Array => {
                    let ident = declarator
                        .first_child()
                        .ok_or_else(|| Error::new(ErrorKind::NullArgument, declarator.line))?;
                    let count_node = declarator
                        .second_child()
                        .ok_or_else(|| Error::new(ErrorKind::NullArgument, declarator.line))?;
                    let id = ident
                        .ident()
                        .ok_or_else(|| Error::new(ErrorKind::NullArgument, declarator.line))?
                        .to_string();
                    let count = count_node
                        .int_value()
                        .ok_or_else(|| Error::new(ErrorKind::NullArgument, declarator.line))?
                        as u32;
                    table.push(id, ty, count, true, false, declarator.line)?;
                }
                _ => return Err(Error::new(ErrorKind::NotAList, declarator.line)),
            }
        }
    }
    Ok(())
}

/// Builds one function's parameter table from its `ParamList` node. A
/// `ParamList` whose sole child is `Void` means "no parameters" (§4.3).
/// Every other child is a `ListTypVar` pairing a `Type` with either an
/// `Ident` (scalar parameter) or an `Array` node wrapping a bare `Ident`
/// (array parameter, stored as an 8-byte pointer, §4.3, "`addParamList`
/// always adds symbols with size 1").
fn add_params(param_list: &Node, params: &mut VariableTable) -> Result<()> {
    if let Some(first) = param_list.first_child() {
        if param_list.children.len() == 1 && first.kind == NodeKind::Void {
            return Ok(());
        }
    }

    for list_typ_var in &param_list.children {
        let ty_node = list_typ_var
            .first_child()
            .ok_or_else(|| Error::new(ErrorKind::NotAType, list_typ_var.line))?;
        let ty = resolve_declared_type(ty_node);
        let declarator = list_typ_var
            .second_child()
            .ok_or_else(|| Error::new(ErrorKind::NullArgument, list_typ_var.line))?;

        match declarator.kind {
            NodeKind::Ident => {
                let id = declarator
                    .ident()
                    .ok_or_else(|| Error::new(ErrorKind::NullArgument, declarator.line))?
                    .to_string();
                params.push(id, ty, 1, false, false, declarator.line)?;
            }
            NodeKind::Array => {
                let ident = declarator
                    .first_child()
                    .ok_or_else(|| Error::new(ErrorKind::NullArgument, declarator.line))?;
                let id = ident
                    .ident()
                    .ok_or_else(|| Error::new(ErrorKind::NullArgument, declarator.line))?
                    .to_string();
                params.push(id, ty, 1, true, true, declarator.line)?;
            }
            _ => return Err(Error::new(ErrorKind::NotAList, declarator.line)),
        }
    }
    Ok(())
}

/// Walks the whole program AST and builds the program table, in the order
/// of §4.3: globals, then built-ins, then each user function in source
/// order, rejecting on the first failure.
pub fn build_program_table(root: &Node) -> Result<ProgramTable> {
    let mut table = ProgramTable::default();

    if let Some(globals_block) = root.child_labeled(NodeKind::DeclVarsGlobale) {
        add_declarations(globals_block, &mut table.globals)?;
    }

    add_default_functions(&mut table.functions);

    let functions_block = root
        .child_labeled(NodeKind::DeclFoncts)
        .ok_or_else(|| Error::new(ErrorKind::NotABody, root.line))?;

    for decl_fonct in &functions_block.children {
        let func_head = decl_fonct
            .child_labeled(NodeKind::FuncHead)
            .ok_or_else(|| Error::new(ErrorKind::NotABody, decl_fonct.line))?;
        let body = decl_fonct
            .child_labeled(NodeKind::Body)
            .ok_or_else(|| Error::new(ErrorKind::NotABody, decl_fonct.line))?;

        let return_ty_node = func_head
            .first_child()
            .ok_or_else(|| Error::new(ErrorKind::NotAType, func_head.line))?;
        let name_node = func_head
            .second_child()
            .ok_or_else(|| Error::new(ErrorKind::NullArgument, func_head.line))?;
        let param_list = func_head
            .third_child()
            .ok_or_else(|| Error::new(ErrorKind::NotAList, func_head.line))?;

        let return_type = resolve_declared_type(return_ty_node);
        let id = name_node
            .ident()
            .ok_or_else(|| Error::new(ErrorKind::NullArgument, name_node.line))?
            .to_string();

        if table.globals.contains(&id) {
            return Err(Error::new(ErrorKind::IdInTable, decl_fonct.line));
        }

        let mut params = VariableTable::new();
        add_params(param_list, &mut params)?;

        let mut locals = VariableTable::new();
        if let Some(locals_block) = body.child_labeled(NodeKind::DeclVarsLocale) {
            add_declarations(locals_block, &mut locals)?;
        }

        table.functions.push(id, return_type, params, locals, decl_fonct.line)?;
    }

    if !table.functions.contains("main") {
        return Err(Error::new(ErrorKind::NoMainFunction, root.line));
    }

    Ok(table)
}

/// Where a resolved identifier's storage lives, mirroring the three-way
/// dispatch `handleLocalGetIdent`/`handlerArgGetIdent`/`handleGlobalGetIdent`
/// branch on in the original emitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarOrigin {
    Local,
    Param,
    Global,
}

/// Resolves an identifier through the scope chain local → param → global,
/// the order every identifier lookup in this crate must use (§3 invariant,
/// §8 testable property).
pub fn resolve_variable<'a>(
    id: &str,
    program: &'a ProgramTable,
    function: &'a FunctionSymbol,
) -> Option<(VarOrigin, &'a Symbol)> {
    if let Some(sym) = function.locals.get(id) {
        return Some((VarOrigin::Local, sym));
    }
    if let Some(sym) = function.params.get(id) {
        return Some((VarOrigin::Param, sym));
    }
    if let Some(sym) = program.globals.get(id) {
        return Some((VarOrigin::Global, sym));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_table_offsets_are_cumulative() {
        let mut table = VariableTable::new();
        table.push("a".to_string(), PrimitiveType::Int, 1, false, false, 1).unwrap();
        table.push("b".to_string(), PrimitiveType::Char, 1, false, false, 1).unwrap();
        table.push("c".to_string(), PrimitiveType::Int, 3, true, false, 1).unwrap();

        assert_eq!(table.get("a").unwrap().address, 0);
        assert_eq!(table.get("b").unwrap().address, 4);
        assert_eq!(table.get("c").unwrap().address, 5);
        assert_eq!(table.size(), 4 + 1 + 12);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut table = VariableTable::new();
        table.push("a".to_string(), PrimitiveType::Int, 1, false, false, 1).unwrap();
        let err = table.push("a".to_string(), PrimitiveType::Char, 1, false, false, 2).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IdInTable);
    }

    #[test]
    fn array_parameter_of_count_one_is_still_eight_bytes() {
        let mut table = VariableTable::new();
        table.push("arr".to_string(), PrimitiveType::Int, 1, true, true, 1).unwrap();
        table.push("next".to_string(), PrimitiveType::Char, 1, false, false, 1).unwrap();

        assert_eq!(table.size(), 8 + 1);
        assert_eq!(table.get("next").unwrap().address, 8);
    }

    #[test]
    fn default_functions_are_registered_in_fixed_order() {
        let mut functions = FunctionTable::new();
        add_default_functions(&mut functions);
        let names: Vec<&str> = functions.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(names, vec!["getChar", "putChar", "getInt", "putInt"]);
    }

    #[test]
    fn function_address_accumulates_raw_type_width_not_physical_size() {
        let mut functions = FunctionTable::new();
        add_default_functions(&mut functions);
        // putInt has one int param (raw width 4); the function after it
        // should start at getInt.address + 0 (no locals/params) = getInt's
        // own address, and putInt's own address should be getInt.address.
        let get_int_addr = functions.get("getInt").unwrap().address;
        let put_int_addr = functions.get("putInt").unwrap().address;
        assert_eq!(put_int_addr, get_int_addr);
    }
}
