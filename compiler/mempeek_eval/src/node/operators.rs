//! Operator semantics on words.
//!
//! Arithmetic wraps modulo 2^64. Comparisons and logical operators return
//! [`TRUE`] (all bits set) or [`FALSE`].

use mempeek_ir::{BinaryOp, Location, UnaryOp, Word, FALSE, TRUE};

use crate::errors::{division_by_zero, modulo_by_zero, RuntimeError};

#[inline]
fn truth(condition: bool) -> Word {
    if condition {
        TRUE
    } else {
        FALSE
    }
}

/// Shift amounts of 64 or more shift every bit out.
#[inline]
fn shift_amount(count: Word) -> Option<u32> {
    u32::try_from(count).ok().filter(|&c| c < Word::BITS)
}

/// Apply a binary operator to two evaluated operands.
///
/// `location` is attached to division and modulo by zero failures.
pub fn evaluate_binary(
    op: BinaryOp,
    left: Word,
    right: Word,
    location: &Location,
) -> Result<Word, RuntimeError> {
    let value = match op {
        BinaryOp::Add => left.wrapping_add(right),
        BinaryOp::Sub => left.wrapping_sub(right),
        BinaryOp::Mul => left.wrapping_mul(right),
        BinaryOp::Div => left
            .checked_div(right)
            .ok_or_else(|| division_by_zero(location))?,
        BinaryOp::Mod => left
            .checked_rem(right)
            .ok_or_else(|| modulo_by_zero(location))?,
        BinaryOp::Shl => shift_amount(right).map_or(0, |c| left << c),
        BinaryOp::Shr => shift_amount(right).map_or(0, |c| left >> c),

        BinaryOp::Lt => truth(left < right),
        BinaryOp::Gt => truth(left > right),
        BinaryOp::LtEq => truth(left <= right),
        BinaryOp::GtEq => truth(left >= right),
        BinaryOp::Eq => truth(left == right),
        BinaryOp::NotEq => truth(left != right),

        BinaryOp::SignedLt => truth(left.cast_signed() < right.cast_signed()),
        BinaryOp::SignedGt => truth(left.cast_signed() > right.cast_signed()),
        BinaryOp::SignedLtEq => truth(left.cast_signed() <= right.cast_signed()),
        BinaryOp::SignedGtEq => truth(left.cast_signed() >= right.cast_signed()),

        BinaryOp::BitAnd => left & right,
        BinaryOp::BitXor => left ^ right,
        BinaryOp::BitOr => left | right,

        BinaryOp::And => truth(left != 0 && right != 0),
        BinaryOp::Xor => truth((left != 0) != (right != 0)),
        BinaryOp::Or => truth(left != 0 || right != 0),
    };
    Ok(value)
}

/// Apply a unary operator.
pub fn evaluate_unary(op: UnaryOp, operand: Word) -> Word {
    match op {
        UnaryOp::Neg => operand.wrapping_neg(),
        UnaryOp::BitNot => !operand,
        UnaryOp::Not => truth(operand == 0),
    }
}
