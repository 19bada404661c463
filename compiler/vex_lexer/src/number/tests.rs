use proptest::prelude::*;

use super::*;

fn scan(src: &str) -> CompileResult<(TokenKind, TokenValue)> {
    let mut cursor = Cursor::new(src);
    scan_number(&mut cursor)
}

#[test]
fn integers_and_separators() {
    assert_eq!(scan("42"), Ok((TokenKind::Int, TokenValue::Int(42))));
    assert_eq!(scan("1_000_000"), Ok((TokenKind::Int, TokenValue::Int(1_000_000))));
}

#[test]
fn positive_exponent_stays_integer() {
    assert_eq!(scan("1e3"), Ok((TokenKind::Int, TokenValue::Int(1000))));
    assert_eq!(scan("7E+2"), Ok((TokenKind::Int, TokenValue::Int(700))));
}

#[test]
fn fraction_or_negative_scale_is_float() {
    assert_eq!(scan("2.5"), Ok((TokenKind::Float, TokenValue::Float(2.5))));
    assert_eq!(scan("25e-1"), Ok((TokenKind::Float, TokenValue::Float(2.5))));
    assert_eq!(scan("1.0"), Ok((TokenKind::Float, TokenValue::Float(1.0))));
    assert_eq!(scan("1.5e2"), Ok((TokenKind::Float, TokenValue::Float(150.0))));
}

#[test]
fn dot_without_digit_is_not_consumed() {
    let mut cursor = Cursor::new("3.x");
    assert_eq!(
        scan_number(&mut cursor),
        Ok((TokenKind::Int, TokenValue::Int(3)))
    );
    assert_eq!(cursor.current(), b'.');
}

#[test]
fn e_without_digits_is_left_for_the_identifier() {
    let mut cursor = Cursor::new("4else");
    assert_eq!(
        scan_number(&mut cursor),
        Ok((TokenKind::Int, TokenValue::Int(4)))
    );
    assert_eq!(cursor.current(), b'e');
}

#[test]
fn overflow_is_a_syntax_error() {
    let err = scan("999999999999999999999999999999999999999999").unwrap_err();
    assert_eq!(err.kind, vex_diagnostic::ErrorKind::Syntax);
    assert!(scan("1e60").is_err());
}

#[test]
fn huge_exponent_on_zero_is_zero() {
    assert_eq!(scan("0e999999999999"), Ok((TokenKind::Int, TokenValue::Int(0))));
    assert_eq!(scan("0e99999999999999999999999"), Ok((TokenKind::Int, TokenValue::Int(0))));
    assert_eq!(scan("0.0e999999999"), Ok((TokenKind::Float, TokenValue::Float(0.0))));
}

#[test]
fn huge_exponent_on_nonzero_overflows_at_once() {
    assert!(scan("1e999999999999").is_err());
    assert!(scan("1e39").is_err());
    assert_eq!(
        scan("1e38"),
        Ok((TokenKind::Int, TokenValue::Int(10u128.pow(38))))
    );
    let err = scan("1.5e999999").unwrap_err();
    assert_eq!(err.message, "float literal is too large");
    assert_eq!(scan("1e-999999"), Ok((TokenKind::Float, TokenValue::Float(0.0))));
}

proptest! {
    #[test]
    fn any_u64_scans_back(n in any::<u64>()) {
        prop_assert_eq!(
            scan(&n.to_string()),
            Ok((TokenKind::Int, TokenValue::Int(u128::from(n))))
        );
    }

    #[test]
    fn fraction_scans_close(int in 0u32..100_000, frac in 0u32..1000) {
        let text = format!("{int}.{frac:03}");
        let expected = f64::from(int) + f64::from(frac) / 1000.0;
        match scan(&text) {
            Ok((TokenKind::Float, TokenValue::Float(v))) => {
                prop_assert!((v - expected).abs() <= expected.abs() * 1e-12 + 1e-12);
            }
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }
}
