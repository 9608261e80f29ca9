//! Notch lookup and background notch production.
//!
//! Notches are not cached by the timeline. Each frame the renderer asks a
//! `NotchSource` for the batches of every clip and gets back an owned
//! snapshot, so a producer appending in the background can never be observed
//! half-way through an upload.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::state::{ClipId, Notch, NotchBatch, NotchMeta};

/// Supplies notch batches for a clip.
pub trait NotchSource {
    /// Owned snapshot of every batch for `clip`, in draw order. Unknown clips
    /// yield an empty list.
    fn fetch(&self, clip: ClipId) -> Vec<NotchBatch>;
}

impl<F: Fn(ClipId) -> Vec<NotchBatch>> NotchSource for F {
    fn fetch(&self, clip: ClipId) -> Vec<NotchBatch> {
        self(clip)
    }
}

/// Source with no notches at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNotches;

impl NotchSource for NoNotches {
    fn fetch(&self, _clip: ClipId) -> Vec<NotchBatch> {
        Vec::new()
    }
}

/// Thread-safe notch collection that producers append to.
#[derive(Debug, Clone, Default)]
pub struct NotchStore {
    batches: Arc<RwLock<HashMap<ClipId, Vec<NotchBatch>>>>,
}

impl NotchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all batches of a clip.
    pub fn set_batches(&self, clip: ClipId, batches: Vec<NotchBatch>) {
        if let Ok(mut store) = self.batches.write() {
            store.insert(clip, batches);
        }
    }

    /// Add a batch and return its index within the clip.
    pub fn push_batch(&self, clip: ClipId, batch: NotchBatch) -> usize {
        let Ok(mut store) = self.batches.write() else {
            return 0;
        };
        let batches = store.entry(clip).or_default();
        batches.push(batch);
        batches.len() - 1
    }

    /// Append one notch to an existing batch. Returns false when the batch is
    /// gone (e.g. the clip was removed).
    pub fn append(&self, clip: ClipId, batch_index: usize, notch: Notch) -> bool {
        let Ok(mut store) = self.batches.write() else {
            return false;
        };
        match store.get_mut(&clip).and_then(|batches| batches.get_mut(batch_index)) {
            Some(batch) => {
                batch.notches.push(notch);
                true
            }
            None => false,
        }
    }

    pub fn remove_clip(&self, clip: ClipId) {
        if let Ok(mut store) = self.batches.write() {
            store.remove(&clip);
        }
    }

    /// Total notches held for a clip across batches.
    pub fn notch_count(&self, clip: ClipId) -> usize {
        self.batches
            .read()
            .ok()
            .and_then(|store| {
                store
                    .get(&clip)
                    .map(|batches| batches.iter().map(|batch| batch.notches.len()).sum())
            })
            .unwrap_or(0)
    }
}

impl NotchSource for NotchStore {
    fn fetch(&self, clip: ClipId) -> Vec<NotchBatch> {
        self.batches
            .read()
            .ok()
            .and_then(|store| store.get(&clip).cloned())
            .unwrap_or_default()
    }
}

/// Pacing for a `NotchProducer`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProducerConfig {
    pub interval: Duration,
    pub first_frame: i32,
    pub frame_step: i32,
    /// Stop on its own after this many notches
    pub max_notches: Option<usize>,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(16),
            first_frame: 0,
            frame_step: 1,
            max_notches: None,
        }
    }
}

/// Background task appending ticks to one batch of a clip.
///
/// Stops when `stop` is awaited or when the producer is dropped, so the task
/// never outlives the view that owns it.
pub struct NotchProducer {
    clip: ClipId,
    shutdown: watch::Sender<bool>,
    handle: Option<JoinHandle<usize>>,
}

impl NotchProducer {
    /// Start producing. Must be called from within a tokio runtime.
    pub fn spawn(store: NotchStore, clip: ClipId, meta: NotchMeta, config: ProducerConfig) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let batch_index = store.push_batch(clip, NotchBatch::new(meta));
        log::debug!("Starting notch producer for clip {}", clip);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);
            let mut frame = config.first_frame;
            let mut produced = 0_usize;
            loop {
                if config.max_notches.is_some_and(|max| produced >= max) {
                    break;
                }
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        if !store.append(clip, batch_index, Notch { frame }) {
                            break;
                        }
                        produced += 1;
                        frame = frame.saturating_add(config.frame_step);
                    }
                }
            }
            log::debug!("Notch producer for clip {} stopped after {} notches", clip, produced);
            produced
        });

        Self {
            clip,
            shutdown,
            handle: Some(handle),
        }
    }

    pub fn clip(&self) -> ClipId {
        self.clip
    }

    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    /// Signal the task and wait for it. Returns how many notches it appended.
    pub async fn stop(mut self) -> usize {
        let _ = self.shutdown.send(true);
        match self.handle.take() {
            Some(handle) => handle.await.unwrap_or(0),
            None => 0,
        }
    }
}

impl Drop for NotchProducer {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
