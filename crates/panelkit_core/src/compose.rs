//! Effective paint color composition
//!
//! An element's selection, touch and blink state all invert its palette
//! entry. Each contributes one toggle; an even number of active toggles
//! cancels out. The rules are pure functions over [`PaintState`] so they can
//! be checked in isolation from element bookkeeping.

use panelkit_paint::Color;

use crate::scheme::ColorScheme;
use crate::style::{Style, TouchState};

/// Inputs to color composition for one element at one instant
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PaintState {
    pub style: Style,
    pub touch: TouchState,
    pub blink_on: bool,
    pub highlighted: bool,
}

impl PaintState {
    /// Whether the palette entry is drawn inverted
    pub fn inverted(&self) -> bool {
        let selected = self.style.is_selected();
        let touched = self.touch.is_touched();
        let blinking = self.style.is_blinking() && self.blink_on;
        selected ^ touched ^ blinking
    }

    /// Whether a custom color override may show: always, unless the element
    /// blinks and the blink phase is off
    pub fn custom_color_visible(&self) -> bool {
        !self.style.is_blinking() || self.blink_on
    }
}

/// Colors an element paints with after composition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintColors {
    pub background: Color,
    pub foreground: Color,
}

/// Resolve background and ink for `state`, honoring a custom override
pub fn compose_paint_state(
    state: &PaintState,
    custom: Option<Color>,
    scheme: &ColorScheme,
) -> PaintColors {
    PaintColors {
        background: effective_background(custom, state, scheme),
        foreground: effective_foreground(state, scheme),
    }
}

/// Effective background color
pub fn effective_background(
    custom: Option<Color>,
    state: &PaintState,
    scheme: &ColorScheme,
) -> Color {
    match custom {
        Some(color) if state.custom_color_visible() => color,
        _ if state.highlighted => scheme.highlight,
        _ => scheme
            .colors(state.style.category)
            .background(state.inverted()),
    }
}

/// Effective foreground (ink) color
pub fn effective_foreground(state: &PaintState, scheme: &ColorScheme) -> Color {
    scheme
        .colors(state.style.category)
        .foreground(state.inverted())
}

/// Effective background opacity.
///
/// Element opacity is stored unclamped; the result is clamped to `[0, 1]`
/// here, with NaN treated as fully transparent.
pub fn effective_background_alpha(alpha: f32, style: &Style, panel_opacity: f32) -> f32 {
    let faded = if style.is_modal() {
        alpha
    } else {
        alpha * panel_opacity
    };
    if faded.is_nan() {
        0.0
    } else {
        faded.clamp(0.0, 1.0)
    }
}
