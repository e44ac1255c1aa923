//! An element's state together with the geometries that draw it

use panelkit_core::{ElementState, PanelState, UpdateFlags};
use panelkit_paint::{Point, Rect};

use crate::geometry::{Geometry, Surface};

/// Element as painted on the screen
pub struct ElementView {
    state: ElementState,
    geometries: Vec<Box<dyn Geometry>>,
}

impl ElementView {
    pub fn new(state: ElementState) -> Self {
        Self {
            state,
            geometries: Vec::new(),
        }
    }

    pub fn with_geometry(mut self, geometry: impl Geometry + 'static) -> Self {
        self.geometries.push(Box::new(geometry));
        self
    }

    pub fn push_geometry(&mut self, geometry: Box<dyn Geometry>) {
        self.geometries.push(geometry);
    }

    /// Replace the visual representation, releasing the old geometries
    pub fn set_geometries(&mut self, geometries: Vec<Box<dyn Geometry>>) {
        self.release();
        self.geometries = geometries;
    }

    pub fn geometries(&self) -> &[Box<dyn Geometry>] {
        &self.geometries
    }

    pub fn state(&self) -> &ElementState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ElementState {
        &mut self.state
    }

    /// Replace the state with one received from the host, returning the
    /// categories that differ
    pub fn replace_state(&mut self, state: ElementState) -> UpdateFlags {
        let flags = state.update_flags(&self.state);
        self.state = state;
        flags
    }

    /// Paint every geometry with the element's effective colors
    pub fn paint(&self, surface: &mut Surface<'_>, panel: &PanelState) {
        if !self.state.is_visible() {
            return;
        }
        let saved = (surface.ink(), surface.background(), surface.opacity());
        surface.set_colors(
            self.state.effective_foreground(panel),
            self.state.effective_background(panel),
            self.state.effective_background_alpha(panel),
        );
        for geometry in &self.geometries {
            geometry.paint(surface);
        }
        surface.set_colors(saved.0, saved.1, saved.2);
    }

    /// Whether a touch at `point` lands on this element
    pub fn hit_test(&self, point: Point) -> bool {
        self.state.is_visible() && self.geometries.iter().any(|g| g.area().contains(point))
    }

    /// Region to repaint when the element changes
    pub fn dirty_region(&self) -> Rect {
        self.geometries
            .iter()
            .map(|g| g.bounds())
            .chain(self.state.bounds())
            .fold(Rect::ZERO, |acc, rect| acc.union(&rect))
    }

    /// Release cached device resources of every geometry
    pub fn release(&self) {
        for geometry in &self.geometries {
            geometry.release();
        }
    }
}

impl Drop for ElementView {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::AreaGeometry;
    use crate::test_support::surface_commands;
    use crate::text::TextGeometry;
    use panelkit_core::{Style, StyleCategory, TouchState};
    use panelkit_paint::{DeviceId, FillStyle, Font, PaintCommand, PaintContext};

    fn button() -> ElementView {
        let bounds = Rect::new(10.0, 10.0, 40.0, 20.0);
        ElementView::new(ElementState::new(bounds, Style::new(StyleCategory::Button)))
            .with_geometry(AreaGeometry::rect(bounds, false))
            .with_geometry(TextGeometry::new(
                "GO",
                Font::default(),
                Point::new(14.0, 26.0),
                bounds,
            ))
    }

    #[test]
    fn test_paint_uses_effective_colors() {
        let panel = PanelState::default();
        let mut view = button();
        view.state_mut().set_touch(TouchState::PRESSED);
        let mut ctx = PaintContext::new(DeviceId::next(), 1.0);

        let commands = surface_commands(&mut ctx, |s| view.paint(s, &panel));
        let colors = panel.scheme.colors(StyleCategory::Button);
        match &commands[0] {
            PaintCommand::FillPolygons { style: FillStyle::Color(color), .. } => {
                assert_eq!(*color, colors.inverted_background);
            }
            other => panic!("unexpected command {other:?}"),
        }
        match &commands[1] {
            PaintCommand::DrawGlyphs { color, .. } => {
                assert_eq!(*color, colors.inverted_foreground);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_hidden_element_paints_nothing_and_ignores_touch() {
        let panel = PanelState::default();
        let mut view = button();
        assert!(view.hit_test(Point::new(20.0, 20.0)));

        view.state_mut().set_visible(false);
        let mut ctx = PaintContext::new(DeviceId::next(), 1.0);
        let commands = surface_commands(&mut ctx, |s| view.paint(s, &panel));
        assert!(commands.is_empty());
        assert!(!view.hit_test(Point::new(20.0, 20.0)));
    }

    #[test]
    fn test_dirty_region_covers_geometries() {
        let view = button().with_geometry(AreaGeometry::rect(Rect::new(0.0, 0.0, 5.0, 5.0), true));
        assert_eq!(view.dirty_region(), Rect::new(0.0, 0.0, 50.0, 30.0));
    }

    #[test]
    fn test_replace_state_reports_diff() {
        let mut view = button();
        let mut next = view.state().clone();
        next.set_alpha(0.5);
        assert_eq!(view.replace_state(next), UpdateFlags::ALPHA);
    }
}
