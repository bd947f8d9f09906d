//! Recursive-descent parser: token stream to the `Prog`-rooted AST of
//! §4.1. One production per non-terminal named in §4.8, following the
//! precedence chain `Or > And > Eq > Order > Addsub > Divstar > unary
//! (`!`/`-`) > primary` implied by `tree.h`'s tier names (`TB`/`FB`/`M`/
//! `E`/`T`/`F`).
//!
//! Function bodies and `if`/`while` bodies carry no `SuiteInstr`/block
//! wrapper node (see DESIGN.md): a brace-delimited block is flattened
//! directly into its parent's child list, exactly as the emitter's own
//! flat statement-list walk expects.

use matches::matches;

use super::lexer::{Token, TokenKind};
use super::{Result, SyntaxError};
use crate::ast::{Node, NodeKind, Payload};

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

fn err(line: u32, message: impl Into<String>) -> SyntaxError {
    SyntaxError { message: message.into(), line }
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Parser<'a> {
        Parser { tokens, pos: 0 }
    }

    fn eof_line(&self) -> u32 {
        self.tokens.last().map(|t| t.line).unwrap_or(1)
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn line(&self) -> u32 {
        self.tokens.get(self.pos).map(|t| t.line).unwrap_or_else(|| self.eof_line())
    }

    fn advance(&mut self) -> Result<Token> {
        let token = self.tokens.get(self.pos).cloned().ok_or_else(|| err(self.eof_line(), "unexpected end of input"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: &TokenKind) -> Result<Token> {
        let token = self.advance()?;
        if &token.kind == expected {
            Ok(token)
        } else {
            Err(err(token.line, format!("expected {:?}, found {:?}", expected, token.kind)))
        }
    }

    fn expect_ident(&mut self) -> Result<(String, u32)> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Ident(name) => Ok((name, token.line)),
            other => Err(err(token.line, format!("expected identifier, found {:?}", other))),
        }
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn is_type_keyword(&self) -> bool {
        matches!(self.peek(), Some(TokenKind::Int) | Some(TokenKind::Char))
    }

    /// True when the declaration starting at the current position is a
    /// function (`Type|void Ident (`), as opposed to a variable
    /// declaration (`Type Ident` followed by `[`, `,`, or `;`).
    fn starts_function_decl(&self) -> bool {
        match self.peek() {
            Some(TokenKind::Void) => true,
            Some(TokenKind::Int) | Some(TokenKind::Char) => {
                matches!(self.peek_at(1), Some(TokenKind::Ident(_))) && matches!(self.peek_at(2), Some(TokenKind::LParen))
            }
            _ => false,
        }
    }

    fn parse_type(&mut self) -> Result<Node> {
        let token = self.advance()?;
        let name = match token.kind {
            TokenKind::Int => "int",
            TokenKind::Char => "char",
            other => return Err(err(token.line, format!("expected a type keyword, found {:?}", other))),
        };
        Ok(Node::with_payload(NodeKind::Type, Payload::Ident(name.to_string()), token.line))
    }

    /// `Ident` or `Ident[Num]`, used for globals and locals.
    fn parse_sized_declarator(&mut self) -> Result<Node> {
        let (name, line) = self.expect_ident()?;
        if self.at(&TokenKind::LBracket) {
            self.advance()?;
            let count_token = self.advance()?;
            let count = match count_token.kind {
                TokenKind::IntLit(v) if v > 0 => v,
                TokenKind::IntLit(_) => return Err(err(count_token.line, "array size must be positive")),
                other => return Err(err(count_token.line, format!("expected an array size, found {:?}", other))),
            };
            self.expect(&TokenKind::RBracket)?;
            let ident = Node::with_payload(NodeKind::Ident, Payload::Ident(name), line);
            let num = Node::with_payload(NodeKind::Num, Payload::Int(count), count_token.line);
            Ok(Node::new(NodeKind::Array, line).with_children(vec![ident, num]))
        } else {
            Ok(Node::with_payload(NodeKind::Ident, Payload::Ident(name), line))
        }
    }

    /// One `Type decl [, decl]* ;` group, shared by globals and locals.
    fn parse_declarateurs_group(&mut self) -> Result<Node> {
        let ty = self.parse_type()?;
        let line = ty.line;
        let mut children = vec![ty];
        children.push(self.parse_sized_declarator()?);
        while self.at(&TokenKind::Comma) {
            self.advance()?;
            children.push(self.parse_sized_declarator()?);
        }
        self.expect(&TokenKind::Semicolon)?;
        Ok(Node::new(NodeKind::Declarateurs, line).with_children(children))
    }

    fn parse_decl_block(&mut self, kind: NodeKind) -> Result<Option<Node>> {
        let line = self.line();
        let mut groups = Vec::new();
        while self.is_type_keyword() && !self.starts_function_decl() {
            groups.push(self.parse_declarateurs_group()?);
        }
        if groups.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Node::new(kind, line).with_children(groups)))
        }
    }

    /// `Ident` or `Ident[]`, used for array parameters (no size in the
    /// parameter position; the callee only ever sees a pointer).
    fn parse_param_declarator(&mut self) -> Result<Node> {
        let (name, line) = self.expect_ident()?;
        if self.at(&TokenKind::LBracket) {
            self.advance()?;
            self.expect(&TokenKind::RBracket)?;
            let ident = Node::with_payload(NodeKind::Ident, Payload::Ident(name), line);
            Ok(Node::new(NodeKind::Array, line).with_children(vec![ident]))
        } else {
            Ok(Node::with_payload(NodeKind::Ident, Payload::Ident(name), line))
        }
    }

    fn parse_param_list(&mut self) -> Result<Node> {
        let open = self.expect(&TokenKind::LParen)?;
        if self.at(&TokenKind::Void) {
            self.advance()?;
            self.expect(&TokenKind::RParen)?;
            return Ok(Node::new(NodeKind::ParamList, open.line).with_children(vec![Node::new(NodeKind::Void, open.line)]));
        }

        let mut params = Vec::new();
        loop {
            let ty = self.parse_type()?;
            let line = ty.line;
            let declarator = self.parse_param_declarator()?;
            params.push(Node::new(NodeKind::ListTypVar, line).with_children(vec![ty, declarator]));
            if self.at(&TokenKind::Comma) {
                self.advance()?;
                continue;
            }
            break;
        }
        self.expect(&TokenKind::RParen)?;
        Ok(Node::new(NodeKind::ParamList, open.line).with_children(params))
    }

    fn parse_func_decl(&mut self) -> Result<Node> {
        let return_ty = if self.at(&TokenKind::Void) {
            let token = self.advance()?;
            Node::new(NodeKind::Void, token.line)
        } else {
            self.parse_type()?
        };
        let line = return_ty.line;
        let (name, name_line) = self.expect_ident()?;
        let name_node = Node::with_payload(NodeKind::Ident, Payload::Ident(name), name_line);
        let params = self.parse_param_list()?;
        let func_head = Node::new(NodeKind::FuncHead, line).with_children(vec![return_ty, name_node, params]);
        let body = self.parse_body()?;
        Ok(Node::new(NodeKind::DeclFonct, line).with_children(vec![func_head, body]))
    }

    fn parse_body(&mut self) -> Result<Node> {
        let open = self.expect(&TokenKind::LBrace)?;
        let mut children = Vec::new();
        if let Some(decls) = self.parse_decl_block(NodeKind::DeclVarsLocale)? {
            children.push(decls);
        }
        while !self.at(&TokenKind::RBrace) {
            children.extend(self.parse_stmt_list_one()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Node::new(NodeKind::Body, open.line).with_children(children))
    }

    /// Parses one grammatical statement, returning every AST node it
    /// produces at the parent's nesting level (more than one only when
    /// the statement is a bare `{ ... }` block, which is flattened rather
    /// than wrapped; no `SuiteInstr`/block node exists in this AST).
    fn parse_stmt_list_one(&mut self) -> Result<Vec<Node>> {
        match self.peek() {
            Some(TokenKind::LBrace) => {
                self.advance()?;
                let mut out = Vec::new();
                while !self.at(&TokenKind::RBrace) {
                    out.extend(self.parse_stmt_list_one()?);
                }
                self.expect(&TokenKind::RBrace)?;
                Ok(out)
            }
            Some(TokenKind::Semicolon) => {
                self.advance()?;
                Ok(Vec::new())
            }
            Some(TokenKind::If) => Ok(vec![self.parse_if()?]),
            Some(TokenKind::While) => Ok(vec![self.parse_while()?]),
            Some(TokenKind::Return) => Ok(vec![self.parse_return()?]),
            _ => Ok(vec![self.parse_expr_or_assignment_stmt()?]),
        }
    }

    fn parse_if(&mut self) -> Result<Node> {
        let token = self.advance()?; // 'if'
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_exp()?;
        self.expect(&TokenKind::RParen)?;
        let mut children = vec![cond];
        children.extend(self.parse_stmt_list_one()?);

        if self.at(&TokenKind::Else) {
            self.advance()?;
            let else_line = token.line;
            let else_children = self.parse_stmt_list_one()?;
            children.push(Node::new(NodeKind::Else, else_line).with_children(else_children));
        }
        Ok(Node::new(NodeKind::If, token.line).with_children(children))
    }

    fn parse_while(&mut self) -> Result<Node> {
        let token = self.advance()?; // 'while'
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_exp()?;
        self.expect(&TokenKind::RParen)?;
        let mut children = vec![cond];
        children.extend(self.parse_stmt_list_one()?);
        Ok(Node::new(NodeKind::While, token.line).with_children(children))
    }

    fn parse_return(&mut self) -> Result<Node> {
        let token = self.advance()?; // 'return'
        if self.at(&TokenKind::Semicolon) {
            self.advance()?;
            return Ok(Node::new(NodeKind::Return, token.line));
        }
        let value = self.parse_exp()?;
        self.expect(&TokenKind::Semicolon)?;
        Ok(Node::new(NodeKind::Return, token.line).with_children(vec![value]))
    }

    fn parse_expr_or_assignment_stmt(&mut self) -> Result<Node> {
        let line = self.line();
        let expr = self.parse_exp()?;
        if self.at(&TokenKind::Assign) {
            if !matches!(expr.kind, NodeKind::Ident | NodeKind::Array) {
                return Err(err(line, "left-hand side of an assignment must be an identifier or array element"));
            }
            self.advance()?;
            let value = self.parse_exp()?;
            self.expect(&TokenKind::Semicolon)?;
            Ok(Node::new(NodeKind::Egual, line).with_children(vec![expr, value]))
        } else {
            self.expect(&TokenKind::Semicolon)?;
            Ok(expr)
        }
    }

    // --- expression tiers, in increasing precedence order ---

    fn parse_exp(&mut self) -> Result<Node> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Node> {
        let mut left = self.parse_and()?;
        while self.at(&TokenKind::OrOr) {
            let token = self.advance()?;
            let right = self.parse_and()?;
            left = Node::new(NodeKind::Or, token.line).with_children(vec![left, right]);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Node> {
        let mut left = self.parse_eq()?;
        while self.at(&TokenKind::AndAnd) {
            let token = self.advance()?;
            let right = self.parse_eq()?;
            left = Node::new(NodeKind::And, token.line).with_children(vec![left, right]);
        }
        Ok(left)
    }

    fn parse_eq(&mut self) -> Result<Node> {
        let mut left = self.parse_order()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::EqEq) => "==",
                Some(TokenKind::Neq) => "!=",
                _ => break,
            };
            let token = self.advance()?;
            let right = self.parse_order()?;
            left = Node::with_payload(NodeKind::Eq, Payload::Operator(op), token.line).with_children(vec![left, right]);
        }
        Ok(left)
    }

    fn parse_order(&mut self) -> Result<Node> {
        let mut left = self.parse_addsub()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Lt) => "<",
                Some(TokenKind::Le) => "<=",
                Some(TokenKind::Gt) => ">",
                Some(TokenKind::Ge) => ">=",
                _ => break,
            };
            let token = self.advance()?;
            let right = self.parse_addsub()?;
            left = Node::with_payload(NodeKind::Order, Payload::Operator(op), token.line).with_children(vec![left, right]);
        }
        Ok(left)
    }

    fn parse_addsub(&mut self) -> Result<Node> {
        let mut left = self.parse_divstar()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => "+",
                Some(TokenKind::Minus) => "-",
                _ => break,
            };
            let token = self.advance()?;
            let right = self.parse_divstar()?;
            left = Node::with_payload(NodeKind::Addsub, Payload::Operator(op), token.line).with_children(vec![left, right]);
        }
        Ok(left)
    }

    fn parse_divstar(&mut self) -> Result<Node> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => "*",
                Some(TokenKind::Slash) => "/",
                _ => break,
            };
            let token = self.advance()?;
            let right = self.parse_unary()?;
            left = Node::with_payload(NodeKind::Divstar, Payload::Operator(op), token.line).with_children(vec![left, right]);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Node> {
        match self.peek() {
            Some(TokenKind::Minus) => {
                let token = self.advance()?;
                let operand = self.parse_unary()?;
                Ok(Node::with_payload(NodeKind::Addsub, Payload::Operator("-"), token.line).with_children(vec![operand]))
            }
            Some(TokenKind::Bang) => {
                let token = self.advance()?;
                let operand = self.parse_unary()?;
                Ok(Node::new(NodeKind::ExclamationPoint, token.line).with_children(vec![operand]))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Node> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::IntLit(v) => Ok(Node::with_payload(NodeKind::Num, Payload::Int(v), token.line)),
            TokenKind::CharLit(v) => Ok(Node::with_payload(NodeKind::Character, Payload::Char(v), token.line)),
            TokenKind::LParen => {
                let inner = self.parse_exp()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(name) => {
                if self.at(&TokenKind::LParen) {
                    self.advance()?;
                    let args = self.parse_arg_list()?;
                    self.expect(&TokenKind::RParen)?;
                    let list_exp = if args.is_empty() {
                        Vec::new()
                    } else {
                        vec![Node::new(NodeKind::ListExp, token.line).with_children(args)]
                    };
                    let arguments = Node::new(NodeKind::Arguments, token.line).with_children(list_exp);
                    Ok(Node::with_payload(NodeKind::Ident, Payload::Ident(name), token.line).with_children(vec![arguments]))
                } else if self.at(&TokenKind::LBracket) {
                    self.advance()?;
                    let index = self.parse_exp()?;
                    self.expect(&TokenKind::RBracket)?;
                    let ident = Node::with_payload(NodeKind::Ident, Payload::Ident(name), token.line);
                    Ok(Node::new(NodeKind::Array, token.line).with_children(vec![ident, index]))
                } else {
                    Ok(Node::with_payload(NodeKind::Ident, Payload::Ident(name), token.line))
                }
            }
            other => Err(err(token.line, format!("expected an expression, found {:?}", other))),
        }
    }

    fn parse_arg_list(&mut self) -> Result<Vec<Node>> {
        if self.at(&TokenKind::RParen) {
            return Ok(Vec::new());
        }
        let mut args = vec![self.parse_exp()?];
        while self.at(&TokenKind::Comma) {
            self.advance()?;
            args.push(self.parse_exp()?);
        }
        Ok(args)
    }
}

pub fn parse(tokens: &[Token]) -> Result<Node> {
    let mut parser = Parser::new(tokens);
    let line = tokens.first().map(|t| t.line).unwrap_or(1);

    let mut top_children = Vec::new();
    if let Some(globals) = parser.parse_decl_block(NodeKind::DeclVarsGlobale)? {
        top_children.push(globals);
    }

    let mut functions = Vec::new();
    while parser.peek().is_some() {
        if !parser.starts_function_decl() {
            return Err(err(parser.line(), "expected a function declaration"));
        }
        functions.push(parser.parse_func_decl()?);
    }
    top_children.push(Node::new(NodeKind::DeclFoncts, line).with_children(functions));

    Ok(Node::new(NodeKind::Prog, line).with_children(top_children))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::lex;

    fn parse_source(src: &str) -> Node {
        let tokens = lex(src).unwrap();
        parse(&tokens).unwrap()
    }

    #[test]
    fn parses_hello_integer() {
        let prog = parse_source("int main(void) { putInt(42); return 0; }");
        let functions = prog.child_labeled(NodeKind::DeclFoncts).unwrap();
        assert_eq!(functions.children.len(), 1);
        let main_decl = &functions.children[0];
        let func_head = main_decl.child_labeled(NodeKind::FuncHead).unwrap();
        assert_eq!(func_head.second_child().unwrap().ident(), Some("main"));
        let body = main_decl.child_labeled(NodeKind::Body).unwrap();
        assert_eq!(body.children.len(), 2);
        assert_eq!(body.children[0].kind, NodeKind::Ident);
        assert_eq!(body.children[1].kind, NodeKind::Return);
    }

    #[test]
    fn parses_global_array_decl_and_index() {
        let prog = parse_source("int a[3]; int main(void){ a[0]=7; putInt(a[0]); return 0;}");
        let globals = prog.child_labeled(NodeKind::DeclVarsGlobale).unwrap();
        let group = &globals.children[0];
        let array_decl = &group.children[1];
        assert_eq!(array_decl.kind, NodeKind::Array);
        assert_eq!(array_decl.first_child().unwrap().ident(), Some("a"));
        assert_eq!(array_decl.second_child().unwrap().int_value(), Some(3));
    }

    #[test]
    fn parses_unary_minus_as_single_child_addsub() {
        let prog = parse_source("int main(void){ putInt(-5); return 0;}");
        let functions = prog.child_labeled(NodeKind::DeclFoncts).unwrap();
        let body = functions.children[0].child_labeled(NodeKind::Body).unwrap();
        let call = &body.children[0];
        let args = call.child_labeled(NodeKind::Arguments).unwrap();
        let list_exp = &args.children[0];
        let neg = &list_exp.children[0];
        assert_eq!(neg.kind, NodeKind::Addsub);
        assert_eq!(neg.operator(), Some("-"));
        assert_eq!(neg.children.len(), 1);
    }

    #[test]
    fn parses_while_with_bare_identifier_condition() {
        let prog = parse_source("int main(void){ int x; x=3; while(x){ x = x-1; } return 0; }");
        let functions = prog.child_labeled(NodeKind::DeclFoncts).unwrap();
        let body = functions.children[0].child_labeled(NodeKind::Body).unwrap();
        let while_node = body.children.iter().find(|n| n.kind == NodeKind::While).unwrap();
        assert_eq!(while_node.first_child().unwrap().kind, NodeKind::Ident);
    }

    #[test]
    fn if_else_flattens_block_bodies_without_a_wrapper_node() {
        let prog = parse_source("void f(void){ } int main(void){ if (1) { putInt(1); putInt(2); } else { putInt(3); } return 0; }");
        let functions = prog.child_labeled(NodeKind::DeclFoncts).unwrap();
        let main_decl = functions.children.iter().find(|d| d.child_labeled(NodeKind::FuncHead).unwrap().second_child().unwrap().ident() == Some("main")).unwrap();
        let body = main_decl.child_labeled(NodeKind::Body).unwrap();
        let if_node = body.children.iter().find(|n| n.kind == NodeKind::If).unwrap();
        // cond, putInt(1), putInt(2), Else{putInt(3)}
        assert_eq!(if_node.children.len(), 4);
        assert_eq!(if_node.children[3].kind, NodeKind::Else);
        assert_eq!(if_node.children[3].children.len(), 1);
    }

    #[test]
    fn rejects_malformed_trailing_tokens_with_a_syntax_error() {
        let tokens = lex("int main(void) { return 0; } )").unwrap();
        let err = parse(&tokens).unwrap_err();
        assert_eq!(err.line, 1);
    }
}
