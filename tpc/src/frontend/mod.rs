//! The frontend: a hand-rolled lexer and recursive-descent parser that turn
//! TPC source text into the AST shape §4.1 describes. Peripheral to the
//! core per spec.md §1; its grammar choices never override a core rule,
//! and it is grounded only in the token/production shape implied by
//! `original_source/include/tree.h`'s label set and
//! `original_source/src/utilitaries.c`'s option/help text, since no
//! `.lex`/`.y` grammar file was present in the retrieved reference
//! material (see DESIGN.md).

mod lexer;
mod parser;

use std::fmt;

/// A lexical or grammatical failure. Distinct from [`crate::error::Error`]:
/// these map to exit code `1` (§6), never `2`/`3`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub line: u32,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.line, self.message)
    }
}

impl std::error::Error for SyntaxError {}

pub type Result<T> = std::result::Result<T, SyntaxError>;

/// Lexes then parses a whole translation unit, producing the `Prog` root
/// node the rest of the crate consumes.
pub fn parse_program(source: &str) -> Result<crate::ast::Node> {
    let tokens = lexer::lex(source)?;
    parser::parse(&tokens)
}
