//! Element state with change tracking
//!
//! `ElementState` holds the authoritative visual attributes of one element.
//! Mutators record that something changed; [`ElementState::update_flags`]
//! compares two snapshots and reports which attribute categories differ.
//! Colors and opacity the element actually paints with are derived on demand
//! from the state and a [`PanelState`], never stored.

use panelkit_paint::{Color, Rect};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::compose::{self, PaintState};
use crate::flags::UpdateFlags;
use crate::scheme::PanelState;
use crate::style::{Style, TouchState};

/// Opacity equality where NaN equals NaN, so a NaN opacity doesn't dirty the
/// element on every comparison
fn same_alpha(a: f32, b: f32) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

/// Opacity on the wire. JSON has no NaN or infinity, so non-finite values
/// travel as the tokens `"nan"`, `"inf"` and `"-inf"`.
mod opacity {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(alpha: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        match *alpha {
            a if a.is_finite() => serializer.serialize_f32(a),
            a if a.is_nan() => serializer.serialize_str("nan"),
            a if a > 0.0 => serializer.serialize_str("inf"),
            _ => serializer.serialize_str("-inf"),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        deserializer.deserialize_any(OpacityVisitor)
    }

    struct OpacityVisitor;

    impl<'de> Visitor<'de> for OpacityVisitor {
        type Value = f32;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or one of \"nan\", \"inf\", \"-inf\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f32, E> {
            Ok(v as f32)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f32, E> {
            Ok(v as f32)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f32, E> {
            Ok(v as f32)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f32, E> {
            match v {
                "nan" => Ok(f32::NAN),
                "inf" => Ok(f32::INFINITY),
                "-inf" => Ok(f32::NEG_INFINITY),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }
    }
}

/// One changed attribute, carried by incremental updates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "attr", content = "value", rename_all = "snake_case")]
pub enum StateChange {
    Bounds(Option<Rect>),
    Color(Option<Color>),
    Alpha(#[serde(with = "opacity")] f32),
    Style(Style),
    Visible(bool),
    Highlight(bool),
    Touch(TouchState),
}

impl StateChange {
    /// The flag this change belongs to
    pub fn flag(&self) -> UpdateFlags {
        match self {
            StateChange::Bounds(_) => UpdateFlags::BOUNDS,
            StateChange::Color(_) => UpdateFlags::COLOR,
            StateChange::Alpha(_) => UpdateFlags::ALPHA,
            StateChange::Style(_) => UpdateFlags::STYLE,
            StateChange::Visible(_) => UpdateFlags::VISIBLE,
            StateChange::Highlight(_) => UpdateFlags::HIGHLIGHT,
            StateChange::Touch(_) => UpdateFlags::TOUCH,
        }
    }
}

/// List of changes for one element; most updates carry only a few
pub type StateChanges = SmallVec<[StateChange; 4]>;

/// Serializable, diff-able visual state of one element
#[derive(Debug, Serialize, Deserialize)]
pub struct ElementState {
    bounds: Option<Rect>,
    color: Option<Color>,
    #[serde(with = "opacity")]
    alpha: f32,
    style: Style,
    visible: bool,
    highlighted: bool,
    touch: TouchState,
    #[serde(skip)]
    changed: bool,
}

impl ElementState {
    /// New visible, opaque element. Starts out changed so the first sync
    /// cycle picks it up.
    pub fn new(bounds: Rect, style: Style) -> Self {
        Self {
            bounds: Some(bounds),
            color: None,
            alpha: 1.0,
            style,
            visible: true,
            highlighted: false,
            touch: TouchState::UNTOUCHED,
            changed: true,
        }
    }

    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn color(&self) -> Option<Color> {
        self.color
    }

    /// Stored opacity, as set; may lie outside `[0, 1]`
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn touch(&self) -> TouchState {
        self.touch
    }

    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        if self.bounds != bounds {
            self.bounds = bounds;
            self.changed = true;
        }
    }

    pub fn set_color(&mut self, color: Option<Color>) {
        if self.color != color {
            self.color = color;
            self.changed = true;
        }
    }

    /// Set the opacity. Any value is accepted; it is clamped when painting.
    pub fn set_alpha(&mut self, alpha: f32) {
        if !same_alpha(self.alpha, alpha) {
            self.alpha = alpha;
            self.changed = true;
        }
    }

    pub fn set_style(&mut self, style: Style) {
        if self.style != style {
            self.style = style;
            self.changed = true;
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.changed = true;
        }
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        if self.highlighted != highlighted {
            self.highlighted = highlighted;
            self.changed = true;
        }
    }

    pub fn set_touch(&mut self, touch: TouchState) {
        if self.touch != touch {
            self.touch = touch;
            self.changed = true;
        }
    }

    /// Whether any attribute changed since the last [`clear_changed`](Self::clear_changed)
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// Attribute categories that differ between `self` and `prior`.
    ///
    /// An empty result means nothing needs to be transmitted.
    pub fn update_flags(&self, prior: &ElementState) -> UpdateFlags {
        let mut flags = UpdateFlags::empty();
        if self.bounds != prior.bounds {
            flags |= UpdateFlags::BOUNDS;
        }
        if self.color != prior.color {
            flags |= UpdateFlags::COLOR;
        }
        if !same_alpha(self.alpha, prior.alpha) {
            flags |= UpdateFlags::ALPHA;
        }
        if self.style != prior.style {
            flags |= UpdateFlags::STYLE;
        }
        if self.visible != prior.visible {
            flags |= UpdateFlags::VISIBLE;
        }
        if self.highlighted != prior.highlighted {
            flags |= UpdateFlags::HIGHLIGHT;
        }
        if self.touch != prior.touch {
            flags |= UpdateFlags::TOUCH;
        }
        flags
    }

    /// Current values of the attributes named by `flags`
    pub fn changes(&self, flags: UpdateFlags) -> StateChanges {
        let mut changes = StateChanges::new();
        if flags.contains(UpdateFlags::BOUNDS) {
            changes.push(StateChange::Bounds(self.bounds));
        }
        if flags.contains(UpdateFlags::COLOR) {
            changes.push(StateChange::Color(self.color));
        }
        if flags.contains(UpdateFlags::ALPHA) {
            changes.push(StateChange::Alpha(self.alpha));
        }
        if flags.contains(UpdateFlags::STYLE) {
            changes.push(StateChange::Style(self.style));
        }
        if flags.contains(UpdateFlags::VISIBLE) {
            changes.push(StateChange::Visible(self.visible));
        }
        if flags.contains(UpdateFlags::HIGHLIGHT) {
            changes.push(StateChange::Highlight(self.highlighted));
        }
        if flags.contains(UpdateFlags::TOUCH) {
            changes.push(StateChange::Touch(self.touch));
        }
        changes
    }

    /// Apply one received change through the regular mutators
    pub fn apply_change(&mut self, change: StateChange) {
        match change {
            StateChange::Bounds(bounds) => self.set_bounds(bounds),
            StateChange::Color(color) => self.set_color(color),
            StateChange::Alpha(alpha) => self.set_alpha(alpha),
            StateChange::Style(style) => self.set_style(style),
            StateChange::Visible(visible) => self.set_visible(visible),
            StateChange::Highlight(highlighted) => self.set_highlighted(highlighted),
            StateChange::Touch(touch) => self.set_touch(touch),
        }
    }

    /// Composition inputs for this element under `panel`
    pub fn paint_state(&self, panel: &PanelState) -> PaintState {
        PaintState {
            style: self.style,
            touch: self.touch,
            blink_on: panel.blink_on,
            highlighted: self.highlighted,
        }
    }

    pub fn effective_background(&self, panel: &PanelState) -> Color {
        compose::effective_background(self.color, &self.paint_state(panel), &panel.scheme)
    }

    pub fn effective_foreground(&self, panel: &PanelState) -> Color {
        compose::effective_foreground(&self.paint_state(panel), &panel.scheme)
    }

    /// Background opacity after the panel fade, clamped to `[0, 1]`
    pub fn effective_background_alpha(&self, panel: &PanelState) -> f32 {
        compose::effective_background_alpha(self.alpha, &self.style, panel.opacity)
    }
}

impl Clone for ElementState {
    /// Copies the authoritative attributes only; the clone starts unchanged
    fn clone(&self) -> Self {
        Self {
            bounds: self.bounds,
            color: self.color,
            alpha: self.alpha,
            style: self.style,
            visible: self.visible,
            highlighted: self.highlighted,
            touch: self.touch,
            changed: false,
        }
    }
}

impl PartialEq for ElementState {
    /// Attribute-wise equality; the transient change flag is ignored
    fn eq(&self, other: &Self) -> bool {
        self.update_flags(other).is_empty()
    }
}

impl Default for ElementState {
    fn default() -> Self {
        Self::new(Rect::ZERO, Style::default())
    }
}
