//! Type descriptors.
//!
//! A [`Type`] is a structural description; sizes, layouts and struct
//! members live in the type registry (`vex_types`).

use std::fmt;

use crate::QualifiedName;

/// Built-in scalar types, declared in promotion order.
///
/// The declaration order *is* the promotion lattice:
/// `bool < i8 < i16 < i32 < i64 < i128 < f32 < f64`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Scalar {
    Bool,
    I8,
    I16,
    I32,
    I64,
    I128,
    F32,
    F64,
}

impl Scalar {
    pub const ALL: [Scalar; 8] = [
        Scalar::Bool,
        Scalar::I8,
        Scalar::I16,
        Scalar::I32,
        Scalar::I64,
        Scalar::I128,
        Scalar::F32,
        Scalar::F64,
    ];

    /// Position in the promotion lattice.
    #[inline]
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Scalar::Bool => "bool",
            Scalar::I8 => "i8",
            Scalar::I16 => "i16",
            Scalar::I32 => "i32",
            Scalar::I64 => "i64",
            Scalar::I128 => "i128",
            Scalar::F32 => "f32",
            Scalar::F64 => "f64",
        }
    }

    pub fn from_name(name: &str) -> Option<Scalar> {
        Scalar::ALL.into_iter().find(|s| s.name() == name)
    }

    #[inline]
    pub fn is_float(self) -> bool {
        matches!(self, Scalar::F32 | Scalar::F64)
    }

    /// Integer types, `bool` included.
    #[inline]
    pub fn is_integral(self) -> bool {
        !self.is_float()
    }

    pub fn bits(self) -> u32 {
        match self {
            Scalar::Bool => 1,
            Scalar::I8 => 8,
            Scalar::I16 => 16,
            Scalar::I32 | Scalar::F32 => 32,
            Scalar::I64 | Scalar::F64 => 64,
            Scalar::I128 => 128,
        }
    }

    pub fn byte_size(self) -> u64 {
        match self {
            Scalar::Bool | Scalar::I8 => 1,
            Scalar::I16 => 2,
            Scalar::I32 | Scalar::F32 => 4,
            Scalar::I64 | Scalar::F64 => 8,
            Scalar::I128 => 16,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A Vex type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Type {
    Void,
    Scalar(Scalar),
    Pointer(Box<Type>),
    /// Fixed-length array `T[N]`.
    Array(Box<Type>, u64),
    /// SIMD vector `vec<S, N>`.
    Vector(Scalar, u32),
    /// Struct, by canonical (or not yet resolved) qualified name.
    Struct(QualifiedName),
}

impl Type {
    pub const BOOL: Type = Type::Scalar(Scalar::Bool);
    pub const I8: Type = Type::Scalar(Scalar::I8);
    pub const I32: Type = Type::Scalar(Scalar::I32);
    pub const I64: Type = Type::Scalar(Scalar::I64);
    pub const F64: Type = Type::Scalar(Scalar::F64);

    #[must_use]
    pub fn pointer_to(self) -> Type {
        Type::Pointer(Box::new(self))
    }

    /// `i8*`, the type of string literals.
    pub fn c_string() -> Type {
        Type::I8.pointer_to()
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    #[inline]
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Type::Scalar(s) => Some(*s),
            _ => None,
        }
    }

    #[inline]
    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    /// Element type of an array, vector or pointer.
    pub fn element(&self) -> Option<Type> {
        match self {
            Type::Array(elem, _) | Type::Pointer(elem) => Some((**elem).clone()),
            Type::Vector(s, _) => Some(Type::Scalar(*s)),
            _ => None,
        }
    }

    /// Aggregates are stored by reference and copied bytewise.
    #[inline]
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Type::Array(..) | Type::Vector(..) | Type::Struct(_))
    }

    pub fn struct_name(&self) -> Option<&QualifiedName> {
        match self {
            Type::Struct(name) => Some(name),
            _ => None,
        }
    }
}

impl From<Scalar> for Type {
    fn from(s: Scalar) -> Self {
        Type::Scalar(s)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => f.write_str("void"),
            Type::Scalar(s) => write!(f, "{s}"),
            Type::Pointer(inner) => write!(f, "{inner}*"),
            Type::Array(elem, len) => write!(f, "{elem}[{len}]"),
            Type::Vector(s, len) => write!(f, "vec<{s},{len}>"),
            Type::Struct(name) => write!(f, "{name}"),
        }
    }
}

/// A function signature.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FnSig {
    pub params: Vec<Type>,
    pub ret: Type,
    /// Accepts extra arguments after `params` (C `...`).
    pub variadic: bool,
}

impl fmt::Display for FnSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        if self.variadic {
            if !self.params.is_empty() {
                f.write_str(", ")?;
            }
            f.write_str("...")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

#[cfg(test)]
mod tests;
