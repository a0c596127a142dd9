//! Pre-decoded PCM buffers keyed by media source.
//!
//! Decodes run on worker threads; the scheduler polls readiness each tick.
//! A clip whose buffer is still decoding is a "buffer miss" — a silent
//! no-op retried on the next tick.

use crossbeam_channel::{unbounded, Receiver, Sender};
use framecut_media::{AudioDecoder, PcmBuffer};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

type DecodeResult = (Uuid, Option<PcmBuffer>);

/// Cache of decoded audio, fed by background decode workers.
pub struct BufferCache {
    ready: Mutex<HashMap<Uuid, Arc<PcmBuffer>>>,
    inflight: Mutex<HashSet<Uuid>>,
    tx: Sender<DecodeResult>,
    rx: Receiver<DecodeResult>,
}

impl BufferCache {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            ready: Mutex::new(HashMap::new()),
            inflight: Mutex::new(HashSet::new()),
            tx,
            rx,
        }
    }

    /// Insert an already-decoded buffer.
    pub fn insert(&self, source_id: Uuid, buffer: PcmBuffer) {
        self.ready.lock().insert(source_id, Arc::new(buffer));
    }

    /// Kick off a background decode unless one is already done or running.
    pub fn begin_decode(
        &self,
        source_id: Uuid,
        bytes: Arc<Vec<u8>>,
        decoder: Arc<dyn AudioDecoder>,
    ) {
        if self.ready.lock().contains_key(&source_id) {
            return;
        }
        if !self.inflight.lock().insert(source_id) {
            return;
        }
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let result = match decoder.decode(&bytes) {
                Ok(buffer) => Some(buffer),
                Err(e) => {
                    warn!(source = %source_id, "audio decode failed: {e}");
                    None
                }
            };
            let _ = tx.send((source_id, result));
        });
    }

    /// Drain finished decodes into the ready map.
    fn pump(&self) {
        for (source_id, result) in self.rx.try_iter() {
            self.inflight.lock().remove(&source_id);
            if let Some(buffer) = result {
                debug!(source = %source_id, seconds = buffer.duration(), "audio buffer ready");
                self.ready.lock().insert(source_id, Arc::new(buffer));
            }
        }
    }

    /// The decoded buffer for a source, if ready. Pumps pending results
    /// first, so readiness advances tick by tick.
    pub fn get(&self, source_id: Uuid) -> Option<Arc<PcmBuffer>> {
        self.pump();
        self.ready.lock().get(&source_id).cloned()
    }

    /// Whether a decode for this source is still running.
    pub fn is_decoding(&self, source_id: Uuid) -> bool {
        self.pump();
        self.inflight.lock().contains(&source_id)
    }

    /// Drop every cached buffer (teardown).
    pub fn clear(&self) {
        self.ready.lock().clear();
    }
}

impl Default for BufferCache {
    fn default() -> Self {
        Self::new()
    }
}
