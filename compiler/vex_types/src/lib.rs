//! Types for Vex: the registry of sizes and struct layouts, the scalar
//! promotion lattice, and the storage engine that decides what every
//! assignment, initialization and parameter binding lowers to.
//!
//! Everything here is a pure decision over [`Type`](vex_ir::Type)s; the
//! lowering crate carries the decisions out against a backend.

mod conversion;
mod error;
mod lattice;
mod registry;
mod storage;

pub use conversion::{convert, ConvertMode, Conversion};
pub use error::TypeError;
pub use lattice::{common_scalar, default_literal_scalar, literal_fits, promotes_to};
pub use registry::{Layout, StructDef, TypeRegistry};
pub use storage::{decide_storage, StorageAction, StorageRequest, StoreSite};
