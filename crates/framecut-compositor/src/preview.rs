//! Live-preview rendering: the shared composite fitted into the viewport.
//!
//! The frame is composited at full project resolution — the same call the
//! export path makes — then uniformly scaled into the viewport with
//! letterboxing, over a checkerboard that marks transparency.

use framecut_core::{fit_rect, FrameRate, Result, Rgba, Vec2};
use framecut_timeline::{Clip, Track};

use crate::compositor::{CompositeOptions, Compositor, FrameSources, MasksView};
use crate::surface::Surface;

const CHECKER_CELL: u32 = 8;
const CHECKER_LIGHT: Rgba = [220, 220, 220, 255];
const CHECKER_DARK: Rgba = [160, 160, 160, 255];

/// Renders preview frames into a viewport surface.
pub struct PreviewRenderer {
    compositor: Compositor,
    /// Project-resolution frame, reused across renders.
    frame: Surface,
}

impl PreviewRenderer {
    pub fn new(canvas_size: (u32, u32)) -> Self {
        Self {
            compositor: Compositor::new(canvas_size),
            frame: Surface::new(canvas_size.0, canvas_size.1),
        }
    }

    pub fn compositor_mut(&mut self) -> &mut Compositor {
        &mut self.compositor
    }

    /// Render the frame at `time` into `viewport`.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        viewport: &mut Surface,
        time: f64,
        frame_rate: FrameRate,
        tracks: &[Track],
        clips: &[Clip],
        masks: &MasksView<'_>,
        sources: &mut dyn FrameSources,
    ) -> Result<()> {
        self.compositor.composite(
            &mut self.frame,
            time,
            frame_rate,
            tracks,
            clips,
            masks,
            sources,
            CompositeOptions { background: None },
        )?;

        viewport.fill_checkerboard(CHECKER_CELL, CHECKER_LIGHT, CHECKER_DARK);
        let canvas = self.compositor.canvas_size();
        let dst = fit_rect(
            Vec2::new(canvas.0 as f32, canvas.1 as f32),
            Vec2::new(viewport.width() as f32, viewport.height() as f32),
        );
        viewport.blit_scaled(self.frame.raster(), dst);
        Ok(())
    }

    /// The last composited project-resolution frame (parity checks).
    pub fn last_frame(&self) -> &Surface {
        &self.frame
    }
}
