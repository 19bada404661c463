//! Numeric literals.
//!
//! Single pass: every digit (integer and fractional) accumulates into one
//! integer mantissa, each fractional digit lowers the decimal scale by one,
//! and an exponent shifts it. The literal is a FLOAT only if fractional
//! digits were seen or the final scale is negative, so `1e3` is the
//! integer `1000` and `25e-1` is the float `2.5`.

use vex_diagnostic::{CompileError, CompileResult};
use vex_ir::{TokenKind, TokenValue};

use crate::cursor::Cursor;

#[inline]
fn is_digit_or_sep(b: u8) -> bool {
    b.is_ascii_digit() || b == b'_'
}

fn too_large(cursor: &Cursor<'_>) -> CompileError {
    CompileError::syntax(cursor.position(), "integer literal is too large")
}

/// Scan a literal starting at an ASCII digit.
pub(crate) fn scan_number(cursor: &mut Cursor<'_>) -> CompileResult<(TokenKind, TokenValue)> {
    let mut mantissa: u128 = 0;
    let mut overflowed = false;
    let mut scale: i64 = 0;
    let mut fractional = false;

    let mut accumulate = |mantissa: &mut u128, digit: u8| {
        match mantissa
            .checked_mul(10)
            .and_then(|m| m.checked_add(u128::from(digit - b'0')))
        {
            Some(m) => *mantissa = m,
            None => overflowed = true,
        }
    };

    while is_digit_or_sep(cursor.current()) {
        let b = cursor.current();
        if b != b'_' {
            accumulate(&mut mantissa, b);
        }
        cursor.advance();
    }

    // `1.5` but not `1..` or `1.x`
    if cursor.current() == b'.' && cursor.peek().is_ascii_digit() {
        fractional = true;
        cursor.advance();
        while is_digit_or_sep(cursor.current()) {
            let b = cursor.current();
            if b != b'_' {
                accumulate(&mut mantissa, b);
                scale -= 1;
            }
            cursor.advance();
        }
    }

    if matches!(cursor.current(), b'e' | b'E') {
        let signed = matches!(cursor.peek(), b'+' | b'-');
        let first_digit = if signed { cursor.peek2() } else { cursor.peek() };
        if first_digit.is_ascii_digit() {
            cursor.advance();
            let negative = signed && cursor.current() == b'-';
            if signed {
                cursor.advance();
            }
            let mut exponent: i64 = 0;
            while is_digit_or_sep(cursor.current()) {
                let b = cursor.current();
                if b != b'_' {
                    exponent = exponent
                        .saturating_mul(10)
                        .saturating_add(i64::from(b - b'0'));
                }
                cursor.advance();
            }
            scale = if negative {
                scale.saturating_sub(exponent)
            } else {
                scale.saturating_add(exponent)
            };
        }
    }

    if overflowed {
        return Err(too_large(cursor));
    }

    if fractional || scale < 0 {
        if mantissa == 0 {
            return Ok((TokenKind::Float, TokenValue::Float(0.0)));
        }
        #[expect(
            clippy::cast_precision_loss,
            reason = "float literals round to the nearest f64"
        )]
        let base = mantissa as f64;
        let exp = i32::try_from(scale.unsigned_abs()).unwrap_or(i32::MAX);
        // Dividing by an exact power of ten rounds correctly for short literals.
        let value = if scale < 0 {
            base / 10f64.powi(exp)
        } else {
            base * 10f64.powi(exp)
        };
        if !value.is_finite() {
            return Err(CompileError::syntax(
                cursor.position(),
                "float literal is too large",
            ));
        }
        return Ok((TokenKind::Float, TokenValue::Float(value)));
    }

    // Zero stays zero under any exponent; anything else past 10^38 overflows.
    if mantissa == 0 {
        return Ok((TokenKind::Int, TokenValue::Int(0)));
    }
    let value = u32::try_from(scale)
        .ok()
        .and_then(|exp| 10u128.checked_pow(exp))
        .and_then(|factor| mantissa.checked_mul(factor))
        .ok_or_else(|| too_large(cursor))?;
    Ok((TokenKind::Int, TokenValue::Int(value)))
}

#[cfg(test)]
mod tests;
