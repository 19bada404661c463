//! The storage engine.
//!
//! Given what the left-hand side already is (an existing binding's content
//! type, a declared type, or nothing) and the type of the right-hand value,
//! decide how the store is lowered:
//!
//! | right value                  | left side                         | action          |
//! |------------------------------|-----------------------------------|-----------------|
//! | array / vector               | none, or same type (undeclared)   | `Rebind`        |
//! | array / vector               | declared same type, or element store | `ByteCopy`   |
//! | array ↔ vector, same element | any                               | `ByteCopy` (min) |
//! | scalar                       | none or scalar                    | `AllocateStore` |
//! | pointer                      | none or matching pointer          | `PointerStore`  |
//! | struct                       | none or same struct               | `ByteCopy`      |
//! | struct                       | layout-identical struct           | `BitCastStore`  |
//!
//! Anything else against a left type is a type error.

use tracing::debug;
use vex_ir::{Scalar, Type};

use crate::{
    conversion::{convert, ConvertMode},
    Conversion, TypeError, TypeRegistry,
};

/// Where the store happens.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StoreSite {
    /// `x = v` (also `p.x = v`, `a[i] = v`).
    Assign,
    /// `x: T = v`
    Init,
    /// A struct-literal member or array-literal element.
    Element,
    /// An incoming argument bound to its parameter slot.
    Param,
}

#[derive(Clone, Debug)]
pub struct StorageRequest<'a> {
    /// Content type of the existing binding, if any.
    pub existing: Option<&'a Type>,
    /// Explicitly declared type, if any.
    pub declared: Option<&'a Type>,
    pub value: &'a Type,
    pub site: StoreSite,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StorageAction {
    /// Point the name at the value's storage. No allocation, no copy.
    Rebind,
    /// Materialize into a slot, converting first.
    AllocateStore {
        conversion: Conversion,
        /// The conversion narrows; exactly one warning must be reported.
        narrowing_warning: bool,
    },
    /// `memcpy` this many bytes.
    ByteCopy { bytes: u64 },
    /// Store a pointer, bit-casting it first if `cast`.
    PointerStore { cast: bool },
    /// Same layout, different struct: bit-cast the storage and copy.
    BitCastStore,
}

fn incompatible(from: &Type, to: &Type) -> TypeError {
    TypeError::Incompatible {
        from: from.clone(),
        to: to.clone(),
    }
}

/// Byte pointers (`i8*`) convert to and from any pointer on store.
fn is_byte_pointer(ty: &Type) -> bool {
    ty.pointee() == Some(&Type::Scalar(Scalar::I8))
}

pub fn decide_storage(
    registry: &TypeRegistry,
    req: &StorageRequest<'_>,
) -> Result<StorageAction, TypeError> {
    let value = req.value;
    if value.is_void() {
        return Err(TypeError::VoidValue);
    }
    let left = req.declared.or(req.existing);

    let action = match (left, value) {
        (None, Type::Array(..) | Type::Vector(..)) => StorageAction::Rebind,
        (None, Type::Struct(_)) => StorageAction::ByteCopy {
            bytes: registry.size_of(value)?,
        },
        (None, Type::Scalar(_)) => StorageAction::AllocateStore {
            conversion: Conversion::Identity,
            narrowing_warning: false,
        },
        (None, Type::Pointer(_)) => StorageAction::PointerStore { cast: false },
        (None, Type::Void) => return Err(TypeError::VoidValue),

        (Some(l @ Type::Scalar(_)), Type::Scalar(_)) => {
            let mode = match req.site {
                StoreSite::Assign | StoreSite::Init => ConvertMode::WarnedStore,
                StoreSite::Element | StoreSite::Param => ConvertMode::Implicit,
            };
            let conversion = convert(value, l, mode)?;
            StorageAction::AllocateStore {
                conversion,
                narrowing_warning: conversion.is_narrowing(),
            }
        }

        (Some(l @ Type::Pointer(_)), Type::Pointer(_)) => {
            if l == value {
                StorageAction::PointerStore { cast: false }
            } else if is_byte_pointer(l) || is_byte_pointer(value) {
                StorageAction::PointerStore { cast: true }
            } else {
                return Err(TypeError::PointerMismatch {
                    from: value.clone(),
                    to: l.clone(),
                });
            }
        }
        (Some(l @ Type::Pointer(_)), Type::Array(..)) => {
            return Err(TypeError::ArrayPointer {
                from: value.clone(),
                to: l.clone(),
            });
        }

        (Some(l @ (Type::Array(..) | Type::Vector(..))), Type::Array(..) | Type::Vector(..)) => {
            if l.element() != value.element() {
                return Err(incompatible(value, l));
            }
            let same_kind = matches!(
                (l, value),
                (Type::Array(..), Type::Array(..)) | (Type::Vector(..), Type::Vector(..))
            );
            let rebinds = same_kind
                && l == value
                && req.declared.is_none()
                && matches!(req.site, StoreSite::Assign | StoreSite::Param);
            if rebinds {
                StorageAction::Rebind
            } else {
                let bytes = registry.size_of(l)?.min(registry.size_of(value)?);
                StorageAction::ByteCopy { bytes }
            }
        }

        (Some(l @ Type::Struct(_)), Type::Struct(_)) => {
            if l == value {
                StorageAction::ByteCopy {
                    bytes: registry.size_of(value)?,
                }
            } else if registry.layout_identical(l, value) {
                StorageAction::BitCastStore
            } else {
                return Err(incompatible(value, l));
            }
        }

        (Some(l), _) => return Err(incompatible(value, l)),
    };
    debug!(
        value = %value,
        left = ?left.map(ToString::to_string),
        site = ?req.site,
        ?action,
        "storage decision"
    );
    Ok(action)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
