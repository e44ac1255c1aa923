//! Color schemes and the panel state consulted when deriving paint colors

use std::sync::Arc;

use panelkit_paint::Color;
use serde::{Deserialize, Serialize};

use crate::style::StyleCategory;

/// Colors for one style category in its normal and inverted form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryColors {
    pub background: Color,
    pub foreground: Color,
    pub inverted_background: Color,
    pub inverted_foreground: Color,
}

impl CategoryColors {
    /// Colors whose inverted form swaps background and foreground
    pub const fn swapping(background: Color, foreground: Color) -> Self {
        Self {
            background,
            foreground,
            inverted_background: foreground,
            inverted_foreground: background,
        }
    }

    pub fn background(&self, inverted: bool) -> Color {
        if inverted {
            self.inverted_background
        } else {
            self.background
        }
    }

    pub fn foreground(&self, inverted: bool) -> Color {
        if inverted {
            self.inverted_foreground
        } else {
            self.foreground
        }
    }
}

/// Palette for every style category plus the highlight color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub name: String,
    categories: [CategoryColors; StyleCategory::ALL.len()],
    pub highlight: Color,
}

impl ColorScheme {
    pub fn new(
        name: impl Into<String>,
        categories: [CategoryColors; StyleCategory::ALL.len()],
        highlight: Color,
    ) -> Self {
        Self {
            name: name.into(),
            categories,
            highlight,
        }
    }

    /// Light scheme for daylight operation
    pub fn day() -> Self {
        Self::new(
            "day",
            [
                CategoryColors::swapping(Color::from_hex(0xF2F2F2), Color::from_hex(0x202020)),
                CategoryColors::swapping(Color::from_hex(0xC8D4E0), Color::from_hex(0x10243A)),
                CategoryColors::swapping(Color::from_hex(0xF2F2F2), Color::from_hex(0x303030)),
                CategoryColors::swapping(Color::from_hex(0xFFFFFF), Color::from_hex(0x000000)),
                CategoryColors::swapping(Color::from_hex(0xFFD85A), Color::from_hex(0x000000)),
                CategoryColors::swapping(Color::from_hex(0xE0302A), Color::from_hex(0xFFFFFF)),
            ],
            Color::from_hex(0x3A8EE6),
        )
    }

    /// Dark scheme for night operation
    pub fn night() -> Self {
        Self::new(
            "night",
            [
                CategoryColors::swapping(Color::from_hex(0x000000), Color::from_hex(0x8A2A1A)),
                CategoryColors::swapping(Color::from_hex(0x1A0A05), Color::from_hex(0xB03A20)),
                CategoryColors::swapping(Color::from_hex(0x000000), Color::from_hex(0x8A2A1A)),
                CategoryColors::swapping(Color::from_hex(0x0A0A0A), Color::from_hex(0xC04020)),
                CategoryColors::swapping(Color::from_hex(0x3A2A00), Color::from_hex(0xD0A020)),
                CategoryColors::swapping(Color::from_hex(0x500A0A), Color::from_hex(0xFF4030)),
            ],
            Color::from_hex(0x602010),
        )
    }

    pub fn colors(&self, category: StyleCategory) -> &CategoryColors {
        &self.categories[category.index()]
    }

    pub fn set_colors(&mut self, category: StyleCategory, colors: CategoryColors) {
        self.categories[category.index()] = colors;
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::day()
    }
}

/// Global panel context consulted when deriving an element's paint colors
#[derive(Debug, Clone)]
pub struct PanelState {
    /// Global blink phase; blinking elements invert while on
    pub blink_on: bool,
    /// Global panel opacity (fade); modal elements ignore it
    pub opacity: f32,
    pub scheme: Arc<ColorScheme>,
}

impl PanelState {
    pub fn new(scheme: Arc<ColorScheme>) -> Self {
        Self {
            blink_on: false,
            opacity: 1.0,
            scheme,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_blink(mut self, blink_on: bool) -> Self {
        self.blink_on = blink_on;
        self
    }

    /// Flip the blink phase, returning the new phase
    pub fn toggle_blink(&mut self) -> bool {
        self.blink_on = !self.blink_on;
        self.blink_on
    }
}

impl Default for PanelState {
    fn default() -> Self {
        Self::new(Arc::new(ColorScheme::default()))
    }
}
