//! The editor session: shared model, history capture, render requests.

use crossbeam_channel::Receiver;
use framecut_timeline::{ChangeEvent, EditorHistory, HistoryTarget, Project};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Re-entrant-safe render request flag: bursts of state changes collapse to
/// one scheduled frame.
#[derive(Debug, Clone, Default)]
pub struct RenderQueue(Arc<AtomicBool>);

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a render. Returns true when this call scheduled it (false =
    /// one was already pending).
    pub fn request(&self) -> bool {
        !self.0.swap(true, Ordering::SeqCst)
    }

    /// Consume the pending request, if any. The render loop calls this once
    /// per frame.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// Owns the project and its edit history.
pub struct EditorSession {
    project: Arc<RwLock<Project>>,
    history: EditorHistory,
    render: RenderQueue,
    changes: Receiver<ChangeEvent>,
}

impl EditorSession {
    pub fn new(project: Project) -> Self {
        let changes = project.bus().subscribe();
        info!(project = %project.name, "session opened");
        Self {
            project: Arc::new(RwLock::new(project)),
            history: EditorHistory::new(100),
            render: RenderQueue::new(),
            changes,
        }
    }

    /// Shared model handle for the playback thread.
    pub fn project(&self) -> Arc<RwLock<Project>> {
        self.project.clone()
    }

    pub fn render_queue(&self) -> RenderQueue {
        self.render.clone()
    }

    /// Run a mutating edit. The relevant snapshot is captured synchronously
    /// immediately before the mutation.
    pub fn edit<R>(
        &mut self,
        target: HistoryTarget,
        mutate: impl FnOnce(&mut Project) -> R,
    ) -> R {
        let mut project = self.project.write();
        match target {
            HistoryTarget::Clips => self.history.clips.push(project.clips.clone()),
            HistoryTarget::Masks => self.history.masks.push(project.masks.clone()),
        }
        mutate(&mut project)
    }

    /// Undo on the active target's stack. Returns false when empty.
    pub fn undo(&mut self, target: HistoryTarget) -> bool {
        let mut project = self.project.write();
        match target {
            HistoryTarget::Clips => {
                let Some(snapshot) = self.history.clips.undo(project.clips.clone()) else {
                    return false;
                };
                project.restore_clips(snapshot);
            }
            HistoryTarget::Masks => {
                let Some(snapshot) = self.history.masks.undo(project.masks.clone()) else {
                    return false;
                };
                project.restore_masks(snapshot);
            }
        }
        true
    }

    /// Redo on the active target's stack. Returns false when empty.
    pub fn redo(&mut self, target: HistoryTarget) -> bool {
        let mut project = self.project.write();
        match target {
            HistoryTarget::Clips => {
                let Some(snapshot) = self.history.clips.redo(project.clips.clone()) else {
                    return false;
                };
                project.restore_clips(snapshot);
            }
            HistoryTarget::Masks => {
                let Some(snapshot) = self.history.masks.redo(project.masks.clone()) else {
                    return false;
                };
                project.restore_masks(snapshot);
            }
        }
        true
    }

    /// Drain model change notifications into a render request. The host
    /// calls this from its idle loop.
    pub fn pump(&mut self) {
        let mut changed = false;
        for _ in self.changes.try_iter() {
            changed = true;
        }
        if changed {
            self.render.request();
        }
    }

    pub fn can_undo(&self, target: HistoryTarget) -> bool {
        match target {
            HistoryTarget::Clips => self.history.clips.can_undo(),
            HistoryTarget::Masks => self.history.masks.can_undo(),
        }
    }

    pub fn can_redo(&self, target: HistoryTarget) -> bool {
        match target {
            HistoryTarget::Clips => self.history.clips.can_redo(),
            HistoryTarget::Masks => self.history.masks.can_redo(),
        }
    }
}
