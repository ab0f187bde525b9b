use std::fmt::Display;
use std::fmt::Formatter;

/// Dense index of a component kind within one registry.
///
/// Indices are assigned in registration order and are only meaningful for
/// the world built from that registry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd, Default)]
pub struct ComponentType {
    pub(crate) index: u16,
}

impl ComponentType {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl Display for ComponentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Storage category of a component kind.
///
/// `SingleFrame` composes with `Multiple` through its `multiple` flag; the
/// `check` flag asks the runtime to verify that some bulk-remove system
/// clears the kind every frame.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum StorageKind {
    /// At most one instance per entity.
    Single,
    /// Zero or more instances per entity; removal releases all of them.
    Multiple,
    /// Exactly one value per world, readable through any entity.
    Singleton,
    /// Cleared wholesale once per frame.
    SingleFrame { multiple: bool, check: bool },
}

impl StorageKind {
    pub fn is_single_frame(self) -> bool {
        matches!(self, StorageKind::SingleFrame { .. })
    }

    pub fn is_multiple(self) -> bool {
        matches!(
            self,
            StorageKind::Multiple
                | StorageKind::SingleFrame {
                    multiple: true,
                    ..
                }
        )
    }

    pub fn is_singleton(self) -> bool {
        matches!(self, StorageKind::Singleton)
    }

    pub(crate) fn checked_single_frame(self) -> bool {
        matches!(self, StorageKind::SingleFrame { check: true, .. })
    }
}
