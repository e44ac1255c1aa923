//! Element style: category plus behavioral flags, and the touch state code

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Visual category of an element, selects its palette entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StyleCategory {
    /// Panel background and decorations
    #[default]
    Background,
    /// Touchable controls
    Button,
    /// Static text
    Label,
    /// Read-only value displays
    Display,
    /// Needs attention but not critical
    Warning,
    /// Critical state
    Alert,
}

impl StyleCategory {
    pub const ALL: [StyleCategory; 6] = [
        StyleCategory::Background,
        StyleCategory::Button,
        StyleCategory::Label,
        StyleCategory::Display,
        StyleCategory::Warning,
        StyleCategory::Alert,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

bitflags! {
    /// Behavioral style flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StyleFlags: u8 {
        /// Alternates between normal and inverted with the panel blink phase
        const BLINKING = 1 << 0;
        /// Drawn inverted while set
        const SELECTED = 1 << 1;
        /// Ignores the panel's global fade
        const MODAL = 1 << 2;
    }
}

/// Style of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Style {
    pub category: StyleCategory,
    #[serde(default)]
    pub flags: StyleFlags,
}

impl Style {
    pub const fn new(category: StyleCategory) -> Self {
        Self {
            category,
            flags: StyleFlags::empty(),
        }
    }

    pub fn with(mut self, flags: StyleFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn without(mut self, flags: StyleFlags) -> Self {
        self.flags.remove(flags);
        self
    }

    pub fn is_blinking(&self) -> bool {
        self.flags.contains(StyleFlags::BLINKING)
    }

    pub fn is_selected(&self) -> bool {
        self.flags.contains(StyleFlags::SELECTED)
    }

    pub fn is_modal(&self) -> bool {
        self.flags.contains(StyleFlags::MODAL)
    }
}

impl From<StyleCategory> for Style {
    fn from(category: StyleCategory) -> Self {
        Style::new(category)
    }
}

/// Discrete touch state code; 0 means untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TouchState(pub u8);

impl TouchState {
    pub const UNTOUCHED: TouchState = TouchState(0);
    pub const PRESSED: TouchState = TouchState(1);

    pub fn is_touched(self) -> bool {
        self.0 != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_flags() {
        let style = Style::new(StyleCategory::Button).with(StyleFlags::BLINKING | StyleFlags::MODAL);
        assert!(style.is_blinking());
        assert!(style.is_modal());
        assert!(!style.is_selected());
        assert!(!style.without(StyleFlags::MODAL).is_modal());
    }

    #[test]
    fn test_category_indices_are_dense() {
        for (i, category) in StyleCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_touch_state() {
        assert!(!TouchState::UNTOUCHED.is_touched());
        assert!(TouchState(3).is_touched());
    }
}
