//! Mask edit sessions: idle → editing → idle.
//!
//! Entering edit locates (or creates) the mask covering the current time on
//! a track and initializes the live drawing surface — cleared, then filled
//! with the committed matte if one exists, else fully opaque. Strokes only
//! touch the live surface. Exiting edit, switching tool mode, or switching
//! the edited mask commits the surface back into the mask's data first;
//! dropping uncommitted strokes is a defect, not acceptable behavior.

use framecut_core::{Matte, Vec2};
use framecut_timeline::{Mask, MaskHit, MatteRef, Project};
use tracing::debug;
use uuid::Uuid;

/// Window used when no clip anchors a newly created mask, seconds.
const DEFAULT_MASK_DURATION: f64 = 5.0;

enum State {
    Idle,
    Editing { mask_id: Uuid, surface: Matte },
}

/// Per-session mask editing state machine.
pub struct MaskEditSession {
    state: State,
}

impl MaskEditSession {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, State::Editing { .. })
    }

    /// The mask under edit and its live surface, for the compositor's
    /// live-sentinel path.
    pub fn live(&self) -> Option<(Uuid, &Matte)> {
        match &self.state {
            State::Editing { mask_id, surface } => Some((*mask_id, surface)),
            State::Idle => None,
        }
    }

    /// Enter edit mode for a track at a time. Reuses the mask covering that
    /// time if there is one, otherwise creates one anchored at the active
    /// clip's window (or a default window). Switching from another mask
    /// commits it first. Returns the edited mask id.
    pub fn begin(&mut self, project: &mut Project, track_id: Uuid, time: f64) -> Option<Uuid> {
        let existing = project
            .mask_at(track_id, time, None)
            .map(|hit| match hit {
                MaskHit::Committed(mask) | MaskHit::Live(mask) => mask.id,
            });

        if let State::Editing { mask_id, .. } = &self.state {
            if existing == Some(*mask_id) {
                return Some(*mask_id);
            }
            self.commit(project);
        }

        let mask_id = match existing {
            Some(id) => id,
            None => {
                let window = project
                    .clip_at(track_id, time)
                    .map(|clip| (clip.start_time, clip.duration))
                    .unwrap_or((time, DEFAULT_MASK_DURATION));
                let mask = Mask::new(track_id, window.0, window.1, project.canvas_size);
                project.add_mask(mask)?
            }
        };

        let mask = project.mask(mask_id)?;
        let surface = match mask.matte_at(time - mask.start_time) {
            Some(MatteRef::Single(matte)) => matte.clone(),
            Some(MatteRef::Blend { from, to, t }) => flatten_blend(from, to, t),
            None => Matte::opaque(mask.size.0, mask.size.1),
        };

        debug!(mask = %mask_id, "mask edit started");
        self.state = State::Editing { mask_id, surface };
        Some(mask_id)
    }

    /// Paint an opaque stroke segment on the live surface.
    pub fn paint(&mut self, from: Vec2, to: Vec2, radius: f32) {
        self.stroke(from, to, radius, 255);
    }

    /// Erase a stroke segment on the live surface.
    pub fn erase(&mut self, from: Vec2, to: Vec2, radius: f32) {
        self.stroke(from, to, radius, 0);
    }

    fn stroke(&mut self, from: Vec2, to: Vec2, radius: f32, value: u8) {
        let State::Editing { surface, .. } = &mut self.state else {
            return;
        };
        let length = (to - from).length();
        let steps = (length / (radius * 0.5).max(1.0)).ceil() as u32 + 1;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            stamp(surface, from.lerp(to, t), radius, value);
        }
    }

    /// Commit the live surface into the mask's stored matte and leave edit
    /// mode. Safe to call when idle.
    pub fn commit(&mut self, project: &mut Project) {
        let state = std::mem::replace(&mut self.state, State::Idle);
        let State::Editing { mask_id, surface } = state else {
            return;
        };
        if let Some(mask) = project.mask_mut(mask_id) {
            mask.commit_static(surface);
            debug!(mask = %mask_id, "mask edit committed");
        }
        project.notify_masks_changed();
    }
}

impl Default for MaskEditSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Filled circle stamp.
fn stamp(surface: &mut Matte, center: Vec2, radius: f32, value: u8) {
    let r = radius.max(0.5);
    let x0 = (center.x - r).floor().max(0.0) as u32;
    let y0 = (center.y - r).floor().max(0.0) as u32;
    let x1 = ((center.x + r).ceil() as u32).min(surface.width());
    let y1 = ((center.y + r).ceil() as u32).min(surface.height());
    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - center.x;
            let dy = y as f32 + 0.5 - center.y;
            if dx * dx + dy * dy <= r * r {
                surface.set(x, y, value);
            }
        }
    }
}

fn flatten_blend(from: &Matte, to: &Matte, t: f32) -> Matte {
    let mut out = from.clone();
    for (o, s) in out.data_mut().iter_mut().zip(to.data().iter()) {
        *o = (*o as f32 * (1.0 - t) + *s as f32 * t).round() as u8;
    }
    out
}
