//! The type registry: byte sizes, alignments and struct definitions.
//!
//! # Design
//!
//! - Structs in a `BTreeMap` by canonical name, so exported interfaces
//!   iterate deterministically
//! - Layouts memoized in an `FxHashMap` keyed by the full type
//! - Layout computation is recursive through pointers, arrays, vectors
//!   and struct members; a struct must be registered before any type
//!   mentioning it is laid out

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::debug;
use vex_ir::{QualifiedName, Scalar, Type};

use crate::TypeError;

const POINTER_SIZE: u64 = 8;
const MAX_VECTOR_ALIGN: u64 = 16;

/// Byte size and alignment of a type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    pub size: u64,
    pub align: u64,
}

impl Layout {
    const fn new(size: u64, align: u64) -> Self {
        Layout { size, align }
    }
}

/// A struct definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct StructDef {
    pub name: QualifiedName,
    /// Members in declaration order; the index is the member ordinal.
    pub members: Vec<(String, Type)>,
    /// Byte offset of each member, natural alignment.
    pub offsets: Vec<u64>,
    pub layout: Layout,
}

impl StructDef {
    /// Ordinal and type of a member.
    pub fn member(&self, name: &str) -> Option<(usize, &Type)> {
        self.members
            .iter()
            .enumerate()
            .find(|(_, (m, _))| m == name)
            .map(|(i, (_, ty))| (i, ty))
    }
}

#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    structs: BTreeMap<QualifiedName, StructDef>,
    layouts: FxHashMap<Type, Layout>,
}

fn round_up(value: u64, align: u64) -> Option<u64> {
    if align <= 1 {
        Some(value)
    } else {
        value.div_ceil(align).checked_mul(align)
    }
}

/// `len` elements of `elem`; sizes past `u64` are rejected.
fn array_layout(elem: Layout, len: u64, ty: &Type) -> Result<Layout, TypeError> {
    elem.size
        .checked_mul(len)
        .map(|size| Layout::new(size, elem.align))
        .ok_or_else(|| TypeError::TooLarge(ty.to_string()))
}

/// `T*`, `T**`, ... for the struct named `name`.
fn points_to(ty: &Type, name: &QualifiedName) -> bool {
    let mut cur = ty;
    let mut depth = 0;
    while let Type::Pointer(inner) = cur {
        cur = inner;
        depth += 1;
    }
    depth > 0 && cur.struct_name() == Some(name)
}

fn scalar_layout(s: Scalar) -> Layout {
    Layout::new(s.byte_size(), s.byte_size())
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    /// Compute and memoize the layout of `ty` and everything it contains.
    pub fn register(&mut self, ty: &Type) -> Result<Layout, TypeError> {
        if let Some(layout) = self.layouts.get(ty) {
            return Ok(*layout);
        }
        let layout = match ty {
            Type::Void => Layout::new(0, 1),
            Type::Scalar(s) => scalar_layout(*s),
            Type::Pointer(inner) => {
                // Pointee must exist, but `T*` inside `T` is fine: only
                // check struct pointees by name.
                if let Type::Struct(name) = &**inner {
                    if !self.structs.contains_key(name) {
                        return Err(TypeError::UnknownStruct(name.to_string()));
                    }
                } else {
                    self.register(inner)?;
                }
                Layout::new(POINTER_SIZE, POINTER_SIZE)
            }
            Type::Array(elem, len) => {
                let elem = self.register(elem)?;
                array_layout(elem, *len, ty)?
            }
            Type::Vector(s, len) => {
                let size = s.byte_size() * u64::from(*len);
                Layout::new(size, size.next_power_of_two().min(MAX_VECTOR_ALIGN))
            }
            Type::Struct(name) => self
                .structs
                .get(name)
                .map(|def| def.layout)
                .ok_or_else(|| TypeError::UnknownStruct(name.to_string()))?,
        };
        self.layouts.insert(ty.clone(), layout);
        Ok(layout)
    }

    /// Layout of `ty`, computing it without memoizing if needed.
    pub fn layout(&self, ty: &Type) -> Result<Layout, TypeError> {
        if let Some(layout) = self.layouts.get(ty) {
            return Ok(*layout);
        }
        match ty {
            Type::Void => Ok(Layout::new(0, 1)),
            Type::Scalar(s) => Ok(scalar_layout(*s)),
            Type::Pointer(_) => Ok(Layout::new(POINTER_SIZE, POINTER_SIZE)),
            Type::Array(elem, len) => {
                let elem = self.layout(elem)?;
                array_layout(elem, *len, ty)
            }
            Type::Vector(s, len) => {
                let size = s.byte_size() * u64::from(*len);
                Ok(Layout::new(size, size.next_power_of_two().min(MAX_VECTOR_ALIGN)))
            }
            Type::Struct(name) => self
                .structs
                .get(name)
                .map(|def| def.layout)
                .ok_or_else(|| TypeError::UnknownStruct(name.to_string())),
        }
    }

    pub fn size_of(&self, ty: &Type) -> Result<u64, TypeError> {
        self.layout(ty).map(|l| l.size)
    }

    /// Name used in diagnostics and generic dispatch tables.
    pub fn display_name(&self, ty: &Type) -> String {
        ty.to_string()
    }

    pub fn is_struct(&self, name: &QualifiedName) -> bool {
        self.structs.contains_key(name)
    }

    /// Define a struct. Member types must already be registrable.
    pub fn register_struct(
        &mut self,
        name: QualifiedName,
        members: Vec<(String, Type)>,
    ) -> Result<&StructDef, TypeError> {
        if self.structs.contains_key(&name) {
            return Err(TypeError::StructRedefinition(name.to_string()));
        }
        let too_large = || TypeError::TooLarge(name.to_string());
        let mut offsets = Vec::with_capacity(members.len());
        let mut offset = 0;
        let mut align = 1;
        for (_, ty) in &members {
            if ty.struct_name() == Some(&name) {
                return Err(TypeError::RecursiveStruct(name.to_string()));
            }
            let layout = if points_to(ty, &name) {
                Layout::new(POINTER_SIZE, POINTER_SIZE)
            } else {
                self.register(ty)?
            };
            offset = round_up(offset, layout.align).ok_or_else(too_large)?;
            offsets.push(offset);
            offset = offset.checked_add(layout.size).ok_or_else(too_large)?;
            align = align.max(layout.align);
        }
        let layout = Layout::new(round_up(offset, align).ok_or_else(too_large)?, align);
        debug!(name = %name, size = layout.size, "registered struct");
        let def = StructDef {
            name: name.clone(),
            members,
            offsets,
            layout,
        };
        Ok(self.structs.entry(name).or_insert(def))
    }

    /// Load a definition from a compiled module. Re-importing the same
    /// definition is a no-op.
    pub fn import_struct(&mut self, def: StructDef) -> Result<(), TypeError> {
        match self.structs.get(&def.name) {
            Some(existing) if *existing == def => Ok(()),
            Some(_) => Err(TypeError::StructRedefinition(def.name.to_string())),
            None => {
                self.layouts
                    .insert(Type::Struct(def.name.clone()), def.layout);
                self.structs.insert(def.name.clone(), def);
                Ok(())
            }
        }
    }

    pub fn struct_def(&self, name: &QualifiedName) -> Option<&StructDef> {
        self.structs.get(name)
    }

    /// Ordinal and type of `member` in struct `name`.
    pub fn member_ordinal(
        &self,
        name: &QualifiedName,
        member: &str,
    ) -> Result<(usize, Type), TypeError> {
        let def = self
            .structs
            .get(name)
            .ok_or_else(|| TypeError::UnknownStruct(name.to_string()))?;
        def.member(member)
            .map(|(i, ty)| (i, ty.clone()))
            .ok_or_else(|| TypeError::UnknownMember {
                ty: name.to_string(),
                member: member.to_owned(),
            })
    }

    /// Structs defined in `module`, in name order.
    pub fn structs_in<'a>(
        &'a self,
        module: &'a vex_ir::ModulePath,
    ) -> impl Iterator<Item = &'a StructDef> + 'a {
        self.structs.values().filter(move |d| &d.name.module == module)
    }

    /// Same size and, member by member, the same scalar/pointer shape.
    /// Names may differ.
    pub fn layout_identical(&self, a: &Type, b: &Type) -> bool {
        if a == b {
            return true;
        }
        match (a, b) {
            (Type::Pointer(_), Type::Pointer(_)) => true,
            (Type::Array(ea, la), Type::Array(eb, lb)) => {
                la == lb && self.layout_identical(ea, eb)
            }
            (Type::Struct(na), Type::Struct(nb)) => {
                match (self.structs.get(na), self.structs.get(nb)) {
                    (Some(da), Some(db)) => {
                        da.layout == db.layout
                            && da.offsets == db.offsets
                            && da.members.len() == db.members.len()
                            && da
                                .members
                                .iter()
                                .zip(&db.members)
                                .all(|((_, ta), (_, tb))| self.layout_identical(ta, tb))
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }
}
