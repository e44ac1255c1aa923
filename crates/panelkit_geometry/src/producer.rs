//! The strategy object that renders async geometries

use panelkit_paint::Raster;

use crate::error::RenderError;

/// Renders frames of an async geometry on a worker lane.
///
/// One producer instance serves one geometry at a time. `initialize` and
/// `shutdown` bracket the lifetime of its private workspace; `apply` renders
/// one frame of `input` into `target`, which is already sized to the
/// geometry and cleared.
pub trait Producer: Send + Sync + 'static {
    /// Data a frame is rendered from
    type Input: Send + Sync + 'static;
    /// State kept between frames (scratch buffers, precomputed tables)
    type Workspace: Send + 'static;

    /// Create the workspace for a geometry of `width` x `height` pixels
    fn initialize(&self, width: u32, height: u32) -> Self::Workspace;

    fn apply(
        &self,
        workspace: &mut Self::Workspace,
        target: &mut Raster,
        input: &Self::Input,
    ) -> Result<(), RenderError>;

    /// Release the workspace; called when the producer is replaced or the
    /// geometry is detached
    fn shutdown(&self, workspace: Self::Workspace) {
        drop(workspace);
    }
}
