//! Update flags exchanged between host and screen
//!
//! The 32-bit flags word is split into bytes:
//!
//! | byte | meaning |
//! |------|---------|
//! | 0 | protocol bits (`FULL`, `GEOMETRY`, `REMOVED`) |
//! | 1 | element attribute categories (`BOUNDS` .. `TOUCH`) |
//! | 2-3 | reserved |

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Which parts of an element changed since the last transmitted snapshot
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct UpdateFlags: u32 {
        /// Whole state transmitted (first contact, reconnect, forced resync)
        const FULL = 1 << 0;
        /// The element's geometries were rebuilt
        const GEOMETRY = 1 << 1;
        /// The element was removed
        const REMOVED = 1 << 2;

        const BOUNDS = 1 << 8;
        const COLOR = 1 << 9;
        const ALPHA = 1 << 10;
        const STYLE = 1 << 11;
        const VISIBLE = 1 << 12;
        const HIGHLIGHT = 1 << 13;
        const TOUCH = 1 << 14;

        /// Every attribute category
        const ATTRIBUTES = Self::BOUNDS.bits()
            | Self::COLOR.bits()
            | Self::ALPHA.bits()
            | Self::STYLE.bits()
            | Self::VISIBLE.bits()
            | Self::HIGHLIGHT.bits()
            | Self::TOUCH.bits();
    }
}

/// Bit offset of the attribute byte inside the flags word
pub const ATTRIBUTE_SHIFT: u32 = 8;

impl UpdateFlags {
    /// The attribute byte on its own
    pub fn attribute_byte(self) -> u8 {
        ((self.bits() & Self::ATTRIBUTES.bits()) >> ATTRIBUTE_SHIFT) as u8
    }

    /// Rebuild attribute flags from a packed attribute byte
    pub fn from_attribute_byte(byte: u8) -> Self {
        Self::from_bits_truncate((byte as u32) << ATTRIBUTE_SHIFT) & Self::ATTRIBUTES
    }

    /// True when only attribute bits that don't affect geometry are set,
    /// i.e. the screen can repaint without re-laying out the element.
    pub fn is_paint_only(self) -> bool {
        !self.is_empty()
            && (self & !(Self::COLOR | Self::ALPHA | Self::STYLE | Self::HIGHLIGHT | Self::TOUCH))
                .is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_byte_roundtrip() {
        let flags = UpdateFlags::BOUNDS | UpdateFlags::TOUCH | UpdateFlags::FULL;
        let byte = flags.attribute_byte();
        assert_eq!(byte, 0b0100_0001);
        assert_eq!(
            UpdateFlags::from_attribute_byte(byte),
            UpdateFlags::BOUNDS | UpdateFlags::TOUCH
        );
    }

    #[test]
    fn test_attributes_live_in_second_byte() {
        assert_eq!(UpdateFlags::ATTRIBUTES.bits() & !0xFF00, 0);
        assert_eq!(UpdateFlags::ATTRIBUTES.attribute_byte(), 0x7F);
    }

    #[test]
    fn test_paint_only() {
        assert!((UpdateFlags::COLOR | UpdateFlags::ALPHA).is_paint_only());
        assert!(!(UpdateFlags::COLOR | UpdateFlags::BOUNDS).is_paint_only());
        assert!(!UpdateFlags::empty().is_paint_only());
    }
}
