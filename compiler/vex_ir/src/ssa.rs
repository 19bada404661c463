//! Opaque handles into an SSA emission backend.
//!
//! The front end never looks inside emitted code; it only carries these
//! `Copy` ids between backend calls. Each id is a `u32` index assigned by
//! the backend. `NONE` (`u32::MAX`) marks an absent value.

macro_rules! ssa_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(u32);

        impl $name {
            /// Sentinel for "absent".
            pub const NONE: Self = Self(u32::MAX);

            #[inline]
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub fn is_none(self) -> bool {
                self.0 == u32::MAX
            }

            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }

            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

ssa_id!(
    /// Handle to an SSA value (instruction result, argument, constant, global).
    ValueId
);
ssa_id!(
    /// Handle to a basic block.
    BlockId
);
ssa_id!(
    /// Handle to a function.
    FunctionId
);
