//! Single-pass compiler from TPC source to x86-64 NASM assembly.
//!
//! [`compile_source`] is the whole pipeline: lex + parse the source text,
//! build the program symbol table, then walk the AST once more, fused with
//! the semantic checker, emitting a complete `.asm` translation unit.

pub mod ast;
pub mod classify;
pub mod context;
pub mod dump;
mod emit;
pub mod error;
pub mod frontend;
pub mod prelude;
pub mod symbols;
pub mod types;

pub use error::{Error, ErrorKind, Result};

/// Top-level error covering every stage of the pipeline: a lex/parse
/// failure (exit `1`) or a core semantic/environmental failure (exit `2`
/// or `3`, per [`ErrorKind::exit_code`]).
#[derive(Clone, Debug)]
pub enum CompileError {
    Syntax(frontend::SyntaxError),
    Semantic(Error),
}

impl CompileError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CompileError::Syntax(_) => 1,
            CompileError::Semantic(err) => err.exit_code(),
        }
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Syntax(err) => write!(f, "{}", err),
            CompileError::Semantic(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<frontend::SyntaxError> for CompileError {
    fn from(err: frontend::SyntaxError) -> CompileError {
        CompileError::Syntax(err)
    }
}

impl From<Error> for CompileError {
    fn from(err: Error) -> CompileError {
        CompileError::Semantic(err)
    }
}

/// Parses `source`, builds the program table, and emits the `.asm` text.
/// The single entry point `main.rs` drives for a normal (non-dump)
/// compilation.
pub fn compile_source(source: &str) -> std::result::Result<String, CompileError> {
    let root = frontend::parse_program(source)?;
    Ok(emit::compile(&root)?)
}

/// Parses `source` and builds its program table, without emitting
/// assembly. Used by the `-s`/`-F`/`-f`/`-g`/`-t` dump flags, which exit
/// before any code generation happens.
pub fn parse_and_build(source: &str) -> std::result::Result<(ast::Node, symbols::ProgramTable), CompileError> {
    let root = frontend::parse_program(source)?;
    let table = symbols::build_program_table(&root)?;
    Ok((root, table))
}
