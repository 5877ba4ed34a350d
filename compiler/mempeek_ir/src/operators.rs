//! Operator types for unary and binary expressions.

use std::fmt;

/// Binary operators.
///
/// Comparison and logical operators produce [`TRUE`](crate::TRUE) or
/// [`FALSE`](crate::FALSE). The `Signed*` comparisons view both operands as
/// two's complement 64-bit numbers; all other operators are unsigned.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Shift
    Shl,
    Shr,

    // Unsigned comparison
    Lt,
    Gt,
    LtEq,
    GtEq,
    Eq,
    NotEq,

    // Signed comparison
    SignedLt,
    SignedGt,
    SignedLtEq,
    SignedGtEq,

    // Bitwise
    BitAnd,
    BitXor,
    BitOr,

    // Logical
    And,
    Xor,
    Or,
}

impl BinaryOp {
    /// Returns the source-level symbol for this operator.
    ///
    /// Used in trace output and error messages.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::SignedLt => "<+",
            Self::SignedGt => ">+",
            Self::SignedLtEq => "<=+",
            Self::SignedGtEq => ">=+",
            Self::BitAnd => "&",
            Self::BitXor => "^",
            Self::BitOr => "|",
            Self::And => "&&",
            Self::Xor => "^^",
            Self::Or => "||",
        }
    }

    /// Whether the right operand is only evaluated when the left one does
    /// not already decide the result.
    pub const fn is_short_circuit(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    /// Two's complement negation.
    Neg,
    /// Bitwise complement.
    BitNot,
    /// Logical not: `TRUE` for zero, `FALSE` otherwise.
    Not,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::BitNot => "~",
            Self::Not => "!",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}
