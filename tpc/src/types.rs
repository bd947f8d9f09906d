//! Primitive TPC types and the coarse classes assigned to expressions.

use std::fmt;

/// A declared TPC type. `Unauthorized` is never a legal declaration; it is
/// the sentinel produced when a type keyword fails to resolve.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PrimitiveType {
    Void,
    Char,
    Int,
    Unauthorized,
}

impl PrimitiveType {
    /// Size in bytes used for layout and memory-access width.
    pub fn size(self) -> u32 {
        match self {
            PrimitiveType::Void => 0,
            PrimitiveType::Char => 1,
            PrimitiveType::Int => 4,
            PrimitiveType::Unauthorized => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Void => "void",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Unauthorized => "unauthorized",
        }
    }

    pub fn from_str(s: &str) -> Option<PrimitiveType> {
        match s {
            "void" => Some(PrimitiveType::Void),
            "char" => Some(PrimitiveType::Char),
            "int" => Some(PrimitiveType::Int),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse semantic class assigned to an expression during classification
/// (§4.4). Used for error detection only, never for code shape.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExprClass {
    IntValued,
    CharValued,
    AddressValued,
    Void,
}

impl ExprClass {
    /// The class a scalar variable of the given primitive type carries.
    pub fn of_scalar(ty: PrimitiveType) -> ExprClass {
        match ty {
            PrimitiveType::Int => ExprClass::IntValued,
            PrimitiveType::Char => ExprClass::CharValued,
            PrimitiveType::Void | PrimitiveType::Unauthorized => ExprClass::Void,
        }
    }

    pub fn is_void(self) -> bool {
        self == ExprClass::Void
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_name_round_trip() {
        for name in &["char", "int", "void"] {
            let ty = PrimitiveType::from_str(name).expect("known type name");
            assert_eq!(ty.as_str(), *name);
        }
    }

    #[test]
    fn unknown_type_name_does_not_parse() {
        assert_eq!(PrimitiveType::from_str("float"), None);
    }

    #[test]
    fn sizes_match_layout_rule() {
        assert_eq!(PrimitiveType::Char.size(), 1);
        assert_eq!(PrimitiveType::Int.size(), 4);
        assert_eq!(PrimitiveType::Void.size(), 0);
    }
}
