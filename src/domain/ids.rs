// Generational handles for arena-resident interaction records.
//
// Layout: low 32 bits = slot index (0 is nil), high 32 bits = generation.
// Despawning bumps the slot generation, so a handle held across a despawn stops resolving.

use std::fmt;
use std::hash::Hash;

/// Handle type usable as an arena key.
pub trait ArenaId: Copy + Eq + Hash + fmt::Debug {
    fn from_parts(index: u32, generation: u32) -> Self;
    fn index(self) -> u32;
    fn generation(self) -> u32;
}

macro_rules! define_handle {
    ($name:ident, $label:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            #[inline]
            pub const fn nil() -> Self {
                Self(0)
            }

            #[inline]
            pub const fn is_nil(self) -> bool {
                self.0 == 0
            }

            #[inline]
            pub const fn as_u64(self) -> u64 {
                self.0
            }

            #[inline]
            pub const fn from_u64(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl ArenaId for $name {
            #[inline]
            fn from_parts(index: u32, generation: u32) -> Self {
                Self(((generation as u64) << 32) | index as u64)
            }

            #[inline]
            fn index(self) -> u32 {
                (self.0 & 0xFFFF_FFFF) as u32
            }

            #[inline]
            fn generation(self) -> u32 {
                (self.0 >> 32) as u32
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}:{})", $label, self.index(), self.generation())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}.{}", $label, self.index(), self.generation())
            }
        }
    };
}

define_handle!(EntityId, "entity", "Handle of an interactable entity.");
define_handle!(HandId, "hand", "Handle of a grab point (one per controller hand).");
define_handle!(ZoneId, "zone", "Handle of a snapzone receptacle.");

/// Replicated identity of a session participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticipantId(pub u32);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "participant#{}", self.0)
    }
}
