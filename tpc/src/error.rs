//! The closed error-kind enumeration (§7) and its exit-code mapping, in the
//! same tiered shape as `vasm`'s own `error.rs`: a `Display`-able error type
//! carrying just enough context to print a useful diagnostic, with no
//! recovery attempted anywhere the core returns one.

use std::fmt;

/// Every distinct failure the core can report. A strict superset-free,
/// closed enumeration: one variant per rule in SPEC_FULL.md §4.5 and §7.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NullArgument,
    AllocError,
    IdInTable,
    IdNotInTable,
    IdUnauthorized,
    TooLongId,
    NotAFunction,
    NotAList,
    NotAType,
    NotABody,
    CouldNotOpenFile,
    UnknownBooleanOperation,
    ArgWrongType,
    TooManyArgument,
    TooFewArgument,
    MissingReturnValue,
    InvalidArgumentType,
    NoMainFunction,
    ArrayUnexpected,
    ArrayExpected,
    VoidAddsub,
    VoidAssignment,
    VoidComparation,
    VoidReturnIllegal,
    VoidArgumentPassed,
    VoidIndex,
    VoidDivstar,
}

impl ErrorKind {
    /// Direct port of `getErrorCode`'s exit-code table.
    pub fn exit_code(self) -> i32 {
        use ErrorKind::*;
        match self {
            AllocError | CouldNotOpenFile | NotAList | NotAType | NotABody => 3,
            _ => 2,
        }
    }

    fn message(self) -> &'static str {
        use ErrorKind::*;
        match self {
            NullArgument => "null argument passed internally",
            AllocError => "allocation failure",
            IdInTable => "identifier already declared in this scope",
            IdNotInTable => "identifier not found",
            IdUnauthorized => "identifier uses an unauthorized type",
            TooLongId => "identifier is too long",
            NotAFunction => "identifier is not a function",
            NotAList => "expected a list node",
            NotAType => "expected a type node",
            NotABody => "expected a function body",
            CouldNotOpenFile => "could not open output file",
            UnknownBooleanOperation => "unknown boolean operation",
            ArgWrongType => "argument has the wrong type",
            TooManyArgument => "too many arguments in call",
            TooFewArgument => "too few arguments in call",
            MissingReturnValue => "missing return value",
            InvalidArgumentType => "invalid argument type",
            NoMainFunction => "no function named main",
            ArrayUnexpected => "indexing a non-array identifier",
            ArrayExpected => "expected an array, found a scalar",
            VoidAddsub => "void operand in addition or subtraction",
            VoidAssignment => "void operand in assignment",
            VoidComparation => "void operand in comparison",
            VoidReturnIllegal => "returning a value from a void function",
            VoidArgumentPassed => "void-valued argument passed to a call",
            VoidIndex => "void-valued array index",
            VoidDivstar => "void operand in multiplication or division",
        }
    }
}

/// An `ErrorKind` with the source line that triggered it attached, mirroring
/// the `fprintf(stderr, "%d: ...", lineno, ...)` call sites of the original
/// emitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub line: u32,
}

impl Error {
    pub fn new(kind: ErrorKind, line: u32) -> Error {
        Error { kind, line }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.line, self.kind.message())
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environmental_errors_map_to_exit_3() {
        for kind in &[
            ErrorKind::AllocError,
            ErrorKind::CouldNotOpenFile,
            ErrorKind::NotAList,
            ErrorKind::NotAType,
            ErrorKind::NotABody,
        ] {
            assert_eq!(kind.exit_code(), 3);
        }
    }

    #[test]
    fn missing_main_maps_to_exit_2() {
        assert_eq!(ErrorKind::NoMainFunction.exit_code(), 2);
    }

    #[test]
    fn display_includes_line_number() {
        let err = Error::new(ErrorKind::TooFewArgument, 7);
        assert_eq!(format!("{}", err), "7: too few arguments in call");
    }
}
