//! Helpers shared by unit tests

use panelkit_paint::{PaintCommand, PaintContext};

use crate::geometry::Surface;

/// Run `paint` against a fresh surface over `ctx` and return what it recorded
pub(crate) fn surface_commands(
    ctx: &mut PaintContext,
    paint: impl FnOnce(&mut Surface<'_>),
) -> Vec<PaintCommand> {
    {
        let mut surface = Surface::new(ctx);
        paint(&mut surface);
    }
    ctx.take_commands()
}
