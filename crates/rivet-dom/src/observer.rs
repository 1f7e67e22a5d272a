//! Mutation records
//!
//! Child-list changes on the connected tree are queued here while
//! observation is on, and drained by whoever watches the document.

use crate::NodeId;

/// Mutation record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// Parent whose child list changed
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
}

impl MutationRecord {
    /// Record a node inserted under `target`
    pub fn added(target: NodeId, node: NodeId) -> Self {
        Self {
            target,
            added_nodes: vec![node],
            removed_nodes: Vec::new(),
        }
    }

    /// Record a node removed from `target`
    pub fn removed(target: NodeId, node: NodeId) -> Self {
        Self {
            target,
            added_nodes: Vec::new(),
            removed_nodes: vec![node],
        }
    }
}

/// Queue of pending mutation records
#[derive(Debug, Default)]
pub struct MutationQueue {
    observing: bool,
    records: Vec<MutationRecord>,
}

impl MutationQueue {
    /// Start recording
    pub fn observe(&mut self) {
        self.observing = true;
    }

    /// Stop recording and drop pending records
    pub fn disconnect(&mut self) {
        self.observing = false;
        self.records.clear();
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// Queue a record; ignored while not observing
    pub fn push(&mut self, record: MutationRecord) {
        if self.observing {
            self.records.push(record);
        }
    }

    /// Number of pending records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drain pending records
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }
}
