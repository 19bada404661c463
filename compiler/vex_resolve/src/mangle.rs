//! Linkage names.
//!
//! ```text
//! _ZN<len><segment>...<len><name>E
//! ```
//!
//! | Symbol             | Mangled               |
//! |--------------------|-----------------------|
//! | `printf` (global)  | `printf`              |
//! | `math::add`        | `_ZN4math3addE`       |
//! | `a::b::c::f`       | `_ZN1a1b1c1fE`        |
//!
//! Length prefixes keep `ab::c` and `a::bc` apart without escaping. Names
//! in the global namespace keep C linkage and are not mangled.

use std::fmt::Write;

use vex_ir::{ModulePath, QualifiedName};

pub const MANGLE_PREFIX: &str = "_ZN";
const MANGLE_SUFFIX: char = 'E';

pub fn mangle(name: &QualifiedName) -> String {
    if name.module.is_global() {
        return name.name.clone();
    }
    let mut out = String::with_capacity(MANGLE_PREFIX.len() + 8 * (name.module.len() + 1));
    out.push_str(MANGLE_PREFIX);
    for segment in name.module.segments() {
        // Writing into a String cannot fail.
        let _ = write!(out, "{}{segment}", segment.len());
    }
    let _ = write!(out, "{}{}", name.name.len(), name.name);
    out.push(MANGLE_SUFFIX);
    out
}

/// Inverse of [`mangle`] for mangled names; `None` for malformed input.
/// Unmangled names come back as global names.
pub fn demangle(symbol: &str) -> Option<QualifiedName> {
    let Some(body) = symbol.strip_prefix(MANGLE_PREFIX) else {
        return Some(QualifiedName::global(symbol));
    };
    let mut rest = body.strip_suffix(MANGLE_SUFFIX)?;
    let mut parts = Vec::new();
    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let len: usize = rest[..digits].parse().ok()?;
        let tail = &rest[digits..];
        if len == 0 || tail.len() < len || !tail.is_char_boundary(len) {
            return None;
        }
        parts.push(tail[..len].to_owned());
        rest = &tail[len..];
    }
    let name = parts.pop()?;
    if parts.is_empty() {
        return None;
    }
    Some(QualifiedName::new(ModulePath::new(parts), name))
}
