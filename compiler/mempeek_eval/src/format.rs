//! Rendering of words for `print`.

use mempeek_ir::{AccessSize, FormatKind, Word};

/// Render `value` as `kind` at `size`.
///
/// The value is truncated (or sign-extended for [`FormatKind::Signed`]) to
/// `size` first. [`FormatKind::Float`] reads all 64 bits regardless of size;
/// narrower float formats are rejected when the print node is built.
pub fn format_word(value: Word, kind: FormatKind, size: AccessSize) -> String {
    let value_at_size = size.truncate(value);
    match kind {
        FormatKind::Dec => value_at_size.to_string(),
        FormatKind::Signed => size.sign_extend(value).to_string(),
        FormatKind::Hex => {
            let width = 2 * size.bytes() as usize;
            format!("0x{value_at_size:0width$x}")
        }
        FormatKind::Bin => format_binary(value_at_size, size),
        FormatKind::Float => format_general(f64::from_bits(value)),
    }
}

/// Bits most significant first, a space between groups of four.
fn format_binary(value: Word, size: AccessSize) -> String {
    let bits = size.bits();
    let mut out = String::with_capacity(bits as usize + bits as usize / 4);
    for i in (0..bits).rev() {
        out.push(if value & (1 << i) != 0 { '1' } else { '0' });
        if i > 0 && i % 4 == 0 {
            out.push(' ');
        }
    }
    out
}

/// Significant digits of the general float notation.
const FLOAT_PRECISION: i32 = 6;

/// General float notation: fixed or scientific, whichever the exponent
/// calls for, trailing zeros removed (`%g`).
fn format_general(value: f64) -> String {
    if value.is_nan() {
        return if value.is_sign_negative() { "-nan" } else { "nan" }.to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Round to the target precision first; the exponent of the rounded
    // value decides the notation.
    let scientific = format!("{:.*e}", (FLOAT_PRECISION - 1) as usize, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= FLOAT_PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            strip_fraction_zeros(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (FLOAT_PRECISION - 1 - exponent) as usize;
        let fixed = format!("{value:.decimals$}");
        strip_fraction_zeros(&fixed).to_string()
    }
}

fn strip_fraction_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
