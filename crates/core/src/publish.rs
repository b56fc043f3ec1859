//! Single-slot holder for the latest published snapshot.
//!
//! The editor is the only writer; HTTP handlers read concurrently. The slot
//! stores an `Arc`, so a publish is one pointer swap under the write lock and
//! a read is one `Arc` clone under the read lock. Readers always see a whole
//! snapshot.

use std::sync::{Arc, RwLock};

use crate::snapshot::PublishedSnapshot;

/// What the sink currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Published {
    /// Nothing has been published since the sink was created.
    Empty,
    Snapshot(Arc<PublishedSnapshot>),
}

impl Published {
    pub fn snapshot(&self) -> Option<&PublishedSnapshot> {
        match self {
            Published::Empty => None,
            Published::Snapshot(s) => Some(s),
        }
    }
}

/// Last-write-wins snapshot slot.
#[derive(Debug, Default)]
pub struct PublishSink {
    slot: RwLock<Option<Arc<PublishedSnapshot>>>,
}

impl PublishSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink pre-loaded with a previously persisted snapshot.
    pub fn seeded(snapshot: Option<PublishedSnapshot>) -> Self {
        Self {
            slot: RwLock::new(snapshot.map(Arc::new)),
        }
    }

    /// Replace the held snapshot unconditionally.
    pub fn publish(&self, snapshot: PublishedSnapshot) {
        let next = Arc::new(snapshot);
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(next);
    }

    /// The most recent snapshot, or [`Published::Empty`].
    pub fn current(&self) -> Published {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(snapshot) => Published::Snapshot(Arc::clone(snapshot)),
            None => Published::Empty,
        }
    }
}
