//! Latest-snapshot handoff between the inference and render tasks
//!
//! The inference task is the only writer and overwrites the slot on every
//! estimate. The render task reads whatever is currently published and may
//! see the same snapshot across several frames, or skip snapshots entirely.

use crate::core_types::HandPose;
use std::sync::Arc;
use tokio::sync::watch;

/// One published inference result
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSnapshot {
    /// Monotonic publication counter, starting at 1
    pub seq: u64,
    /// Session time of the estimate in seconds
    pub timestamp: f64,
    /// Detected hand, or `None` when no hand was found
    pub pose: Option<HandPose>,
}

type Slot = Option<Arc<PoseSnapshot>>;

/// Create a connected publisher/reader pair with an empty slot
pub fn snapshot_slot() -> (SnapshotPublisher, SnapshotReader) {
    let (tx, rx) = watch::channel(None);
    (
        SnapshotPublisher { tx, next_seq: 1 },
        SnapshotReader { rx, last_seq: 0 },
    )
}

/// Writing half, owned by the inference task
#[derive(Debug)]
pub struct SnapshotPublisher {
    tx: watch::Sender<Slot>,
    next_seq: u64,
}

impl SnapshotPublisher {
    /// Overwrite the slot and return the new sequence number
    pub fn publish(&mut self, timestamp: f64, pose: Option<HandPose>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tx.send_replace(Some(Arc::new(PoseSnapshot {
            seq,
            timestamp,
            pose,
        })));
        seq
    }

    /// Additional reader starting from the current slot contents
    pub fn subscribe(&self) -> SnapshotReader {
        SnapshotReader {
            rx: self.tx.subscribe(),
            last_seq: 0,
        }
    }
}

/// Reading half, owned by the render task (or an observer)
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Slot>,
    last_seq: u64,
}

impl SnapshotReader {
    /// Whatever is currently published, fresh or not
    pub fn latest(&self) -> Option<Arc<PoseSnapshot>> {
        self.rx.borrow().clone()
    }

    /// The current snapshot only if it has not been taken before
    pub fn take_fresh(&mut self) -> Option<Arc<PoseSnapshot>> {
        let snapshot = self.latest()?;
        if snapshot.seq == self.last_seq {
            return None;
        }
        self.last_seq = snapshot.seq;
        Some(snapshot)
    }

    /// Sequence number of the last snapshot returned by `take_fresh`
    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }
}
