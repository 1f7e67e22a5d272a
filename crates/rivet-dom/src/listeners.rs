//! Event listener registry
//!
//! Listeners are stored per node and event type in attachment order.
//! Handlers are reference counted so a dispatch can snapshot them and
//! hand the document back to each handler mutably.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::{Document, Event, NodeId};

/// Event handler callback
pub type EventHandler = Rc<dyn Fn(&mut Document, &mut Event)>;

/// Handle returned when a listener is added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    event_type: String,
    handler: EventHandler,
}

/// Event listener storage
#[derive(Default)]
pub struct EventListenerRegistry {
    /// Map of node ID -> listeners in attachment order
    listeners: HashMap<NodeId, Vec<Listener>>,
    /// Owning node of each live listener
    owners: HashMap<ListenerId, NodeId>,
    /// Next listener ID
    next_id: u64,
}

impl EventListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event listener
    pub fn add_listener(&mut self, node: NodeId, event_type: &str, handler: EventHandler) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        self.listeners.entry(node).or_default().push(Listener {
            id,
            event_type: event_type.to_string(),
            handler,
        });
        self.owners.insert(id, node);

        id
    }

    /// Remove an event listener; false if it was already gone
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let Some(node) = self.owners.remove(&id) else {
            return false;
        };
        if let Some(node_listeners) = self.listeners.get_mut(&node) {
            node_listeners.retain(|l| l.id != id);
            if node_listeners.is_empty() {
                self.listeners.remove(&node);
            }
        }
        true
    }

    /// Whether a listener is still registered
    pub fn contains(&self, id: ListenerId) -> bool {
        self.owners.contains_key(&id)
    }

    /// Snapshot of the handlers for a node and event type
    pub fn handlers_for(&self, node: NodeId, event_type: &str) -> Vec<(ListenerId, EventHandler)> {
        self.listeners
            .get(&node)
            .map(|ls| {
                ls.iter()
                    .filter(|l| l.event_type == event_type)
                    .map(|l| (l.id, Rc::clone(&l.handler)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Check for listeners of a type on a node
    pub fn has_listeners(&self, node: NodeId, event_type: &str) -> bool {
        self.listeners
            .get(&node)
            .is_some_and(|ls| ls.iter().any(|l| l.event_type == event_type))
    }

    /// Clear all listeners for a node
    pub fn clear_node(&mut self, node: NodeId) {
        if let Some(removed) = self.listeners.remove(&node) {
            for listener in removed {
                self.owners.remove(&listener.id);
            }
        }
    }

    /// Total number of live listeners
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

impl fmt::Debug for EventListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListenerRegistry")
            .field("nodes", &self.listeners.len())
            .field("listeners", &self.owners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> EventHandler {
        Rc::new(|_, _| {})
    }

    #[test]
    fn test_add_remove() {
        let mut registry = EventListenerRegistry::new();
        let a = registry.add_listener(NodeId(1), "click", noop());
        let b = registry.add_listener(NodeId(1), "change", noop());

        assert_eq!(registry.len(), 2);
        assert!(registry.has_listeners(NodeId(1), "click"));

        assert!(registry.remove_listener(a));
        assert!(!registry.remove_listener(a));
        assert!(!registry.has_listeners(NodeId(1), "click"));
        assert!(registry.contains(b));
    }

    #[test]
    fn test_snapshot_keeps_attachment_order() {
        let mut registry = EventListenerRegistry::new();
        let first = registry.add_listener(NodeId(2), "click", noop());
        registry.add_listener(NodeId(2), "keydown", noop());
        let second = registry.add_listener(NodeId(2), "click", noop());

        let ids: Vec<_> = registry
            .handlers_for(NodeId(2), "click")
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn test_clear_node() {
        let mut registry = EventListenerRegistry::new();
        let id = registry.add_listener(NodeId(3), "click", noop());
        registry.add_listener(NodeId(4), "click", noop());

        registry.clear_node(NodeId(3));
        assert!(!registry.contains(id));
        assert_eq!(registry.len(), 1);
    }
}
