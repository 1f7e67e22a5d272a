//! DOM Events
//!
//! Input events (click, change, keydown) and cancelable custom events
//! carrying a `detail` payload.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::NodeId;

/// Built-in event type names
pub mod event_types {
    pub const CLICK: &str = "click";
    pub const CHANGE: &str = "change";
    pub const KEYDOWN: &str = "keydown";
}

/// A single value in an event detail payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DetailValue {
    Node(NodeId),
    Text(String),
    Number(i64),
    Bool(bool),
}

impl From<NodeId> for DetailValue {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<&str> for DetailValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for DetailValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<usize> for DetailValue {
    fn from(n: usize) -> Self {
        Self::Number(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<bool> for DetailValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Key/value payload of a custom event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EventDetail {
    values: BTreeMap<String, DetailValue>,
}

impl EventDetail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<DetailValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<DetailValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&DetailValue> {
        self.values.get(key)
    }

    /// Node reference stored under `key`
    pub fn node(&self, key: &str) -> Option<NodeId> {
        match self.get(key)? {
            DetailValue::Node(id) => Some(*id),
            _ => None,
        }
    }

    /// Text stored under `key`
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            DetailValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Number stored under `key`
    pub fn number(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            DetailValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// DOM event
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub target: NodeId,
    pub current_target: Option<NodeId>,
    pub bubbles: bool,
    pub cancelable: bool,
    pub detail: EventDetail,
    /// Key name for keyboard events
    pub key: Option<String>,
    /// Propagation path, target first. Captured when dispatch starts, so it
    /// still holds nodes a listener detaches along the way.
    pub path: Vec<NodeId>,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl Event {
    /// Create an event with no detail
    pub fn new(event_type: &str, target: NodeId, bubbles: bool, cancelable: bool) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: None,
            bubbles,
            cancelable,
            detail: EventDetail::default(),
            key: None,
            path: Vec::new(),
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    /// Create a bubbling, cancelable custom event
    pub fn custom(name: &str, target: NodeId, detail: EventDetail) -> Self {
        Self {
            detail,
            ..Self::new(name, target, true, true)
        }
    }

    /// Create a click event
    pub fn click(target: NodeId) -> Self {
        Self::new(event_types::CLICK, target, true, true)
    }

    /// Create a change event
    pub fn change(target: NodeId) -> Self {
        Self::new(event_types::CHANGE, target, true, false)
    }

    /// Create a keydown event
    pub fn keydown(target: NodeId, key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            ..Self::new(event_types::KEYDOWN, target, true, true)
        }
    }

    /// Prevent default action (only for cancelable events)
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation to further nodes
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Stop propagation and skip remaining listeners on the current node
    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    pub fn is_immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prevent_default_requires_cancelable() {
        let mut change = Event::change(NodeId(1));
        change.prevent_default();
        assert!(!change.is_default_prevented());

        let mut custom = Event::custom("alertDismiss", NodeId(1), EventDetail::new());
        assert!(custom.bubbles);
        custom.prevent_default();
        assert!(custom.is_default_prevented());
    }

    #[test]
    fn test_detail_accessors() {
        let detail = EventDetail::new()
            .with("list", NodeId(4))
            .with("id", "toggle-2")
            .with("numberOfFiles", 3usize);

        assert_eq!(detail.node("list"), Some(NodeId(4)));
        assert_eq!(detail.text("id"), Some("toggle-2"));
        assert_eq!(detail.number("numberOfFiles"), Some(3));
        assert_eq!(detail.node("id"), None);
        assert_eq!(detail.len(), 3);
    }

    #[test]
    fn test_detail_serializes_as_plain_object() {
        let detail = EventDetail::new()
            .with("type", "single")
            .with("fileName", "notes.txt")
            .with("list", NodeId(7));

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "single", "fileName": "notes.txt", "list": 7 })
        );
    }

    #[test]
    fn test_stop_immediate_implies_stop() {
        let mut event = Event::keydown(NodeId(2), "Escape");
        assert_eq!(event.key.as_deref(), Some("Escape"));
        event.stop_immediate_propagation();
        assert!(event.is_propagation_stopped());
        assert!(event.is_immediate_propagation_stopped());
    }
}
