//! Arena handles for registry-owned nodes.
//!
//! Packages, modules, imports and synthesized symbols all live in arenas
//! inside the [`Registry`](super::Registry). Everything else refers to them
//! through these `Copy` handles, so two importers holding the same
//! `ModuleId` are guaranteed to observe the same module.

use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub(crate) const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Get the raw arena index.
            #[inline]
            pub const fn index(self) -> u32 {
                self.0
            }

            #[inline]
            pub(crate) const fn slot(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "({})"), self.0)
            }
        }
    };
}

arena_id!(
    /// A package (directory-like namespace node).
    PackageId,
    "PackageId"
);
arena_id!(
    /// A compiled module. Exactly one exists per qualified name.
    ModuleId,
    "ModuleId"
);
arena_id!(
    /// One import directive.
    ImportId,
    "ImportId"
);
arena_id!(
    /// A forwarding alias synthesized from a bind-list entry.
    AliasId,
    "AliasId"
);
arena_id!(
    /// Any other named top-level declaration.
    DeclId,
    "DeclId"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_small_and_ordered() {
        assert_eq!(std::mem::size_of::<ModuleId>(), 4);
        assert!(ModuleId::new(1) < ModuleId::new(2));
        assert_eq!(ImportId::new(7).slot(), 7);
    }

    #[test]
    fn test_id_debug() {
        assert_eq!(format!("{:?}", PackageId::new(3)), "PackageId(3)");
        assert_eq!(format!("{:?}", AliasId::new(0)), "AliasId(0)");
    }
}
