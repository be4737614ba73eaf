//! Token identity and slot entries

use heapless::String;

/// Maximum label length in bytes
pub const MAX_LABEL_LEN: usize = 32;

/// Display name of a token, copied verbatim
pub type Label = String<MAX_LABEL_LEN>;

/// 4-byte token identifier
///
/// The all-zero identifier marks a slot that was never assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Uid(pub [u8; 4]);

impl Uid {
    /// The unassigned identifier
    pub const EMPTY: Uid = Uid([0; 4]);

    /// Check if this is the unassigned identifier
    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

/// A detected token, as handed over by the detection collaborator
#[derive(Debug, Clone)]
pub struct TokenDescriptor<T> {
    pub uid: Uid,
    pub label: Label,
    /// Token is physically present
    pub loaded: bool,
    /// Token should be reported as changed
    pub changed: bool,
    /// Tag contents
    pub tag: T,
}

impl<T> TokenDescriptor<T> {
    /// Descriptor for a token that was just placed on the portal
    pub fn placed(uid: Uid, label: Label, tag: T) -> Self {
        Self {
            uid,
            label,
            loaded: true,
            changed: true,
            tag,
        }
    }
}

/// One entry of the slot table
#[derive(Debug, Clone, Default)]
pub struct TokenSlot<T> {
    pub(crate) uid: Uid,
    pub(crate) loaded: bool,
    pub(crate) changed: bool,
    pub(crate) label: Label,
    pub(crate) tag: T,
}

impl<T> TokenSlot<T> {
    pub fn uid(&self) -> Uid {
        self.uid
    }

    /// Token is present and associated with this slot
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Presence or identity changed since the last status report
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tag(&self) -> &T {
        &self.tag
    }

    pub(crate) fn tag_mut(&mut self) -> &mut T {
        &mut self.tag
    }

    /// Copy a descriptor into this slot
    pub(crate) fn assign(&mut self, descriptor: TokenDescriptor<T>) {
        self.uid = descriptor.uid;
        self.label = descriptor.label;
        self.loaded = descriptor.loaded;
        self.changed = descriptor.changed;
        self.tag = descriptor.tag;
    }
}
