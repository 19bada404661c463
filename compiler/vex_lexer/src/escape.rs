//! Escape sequences in string and char literals.
//!
//! Named escapes `\n \t \r \a \b \f \v \\ \' \"`, octal `\0NN` (a bare
//! `\0` is NUL) and hex `\xNN` (exactly two digits). Everything else is a
//! malformed escape.

use vex_diagnostic::{CompileError, CompileResult};

use crate::cursor::Cursor;

fn named(b: u8) -> Option<u8> {
    let decoded = match b {
        b'n' => b'\n',
        b't' => b'\t',
        b'r' => b'\r',
        b'a' => 0x07,
        b'b' => 0x08,
        b'f' => 0x0c,
        b'v' => 0x0b,
        b'\\' => b'\\',
        b'\'' => b'\'',
        b'"' => b'"',
        _ => return None,
    };
    Some(decoded)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode one escape. The cursor sits on the backslash.
pub(crate) fn scan_escape(cursor: &mut Cursor<'_>) -> CompileResult<u8> {
    let start = cursor.position();
    cursor.advance();
    if cursor.is_eof() {
        return Err(CompileError::syntax(start, "unterminated escape sequence"));
    }
    let b = cursor.current();
    cursor.advance();

    if let Some(decoded) = named(b) {
        return Ok(decoded);
    }
    match b {
        b'0' => {
            let mut value: u32 = 0;
            for _ in 0..2 {
                let d = cursor.current();
                if !(b'0'..=b'7').contains(&d) {
                    break;
                }
                value = value * 8 + u32::from(d - b'0');
                cursor.advance();
            }
            // Two octal digits never exceed 0o77.
            u8::try_from(value).map_err(|_| CompileError::syntax(start, "octal escape out of range"))
        }
        b'x' => {
            let hi = hex_value(cursor.current());
            let lo = hex_value(cursor.peek());
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    cursor.advance_n(2);
                    Ok(hi * 16 + lo)
                }
                _ => Err(CompileError::syntax(
                    start,
                    "malformed hex escape: expected two hex digits after `\\x`",
                )),
            }
        }
        other => Err(CompileError::syntax(
            start,
            format!(
                "unknown escape sequence `\\{}`",
                char::from(other).escape_default()
            ),
        )),
    }
}
