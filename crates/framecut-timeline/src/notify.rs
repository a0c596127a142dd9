//! Change notifications for the data model.
//!
//! The model announces mutations over an explicit subscription interface;
//! the audio scheduler and the render loop subscribe instead of being
//! re-invoked by a UI re-render cycle. Dead subscribers are dropped on the
//! next emit.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

/// What part of the model changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    ClipsChanged,
    TracksChanged,
    MasksChanged,
    DurationChanged,
}

/// Fan-out bus for change events.
#[derive(Debug, Default)]
pub struct ChangeBus {
    subscribers: Mutex<Vec<Sender<ChangeEvent>>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to future change events.
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Deliver an event to every live subscriber.
    pub fn emit(&self, event: ChangeEvent) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event).is_ok());
    }

    /// Number of live subscribers (for tests).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
