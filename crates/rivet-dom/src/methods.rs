//! Element method table
//!
//! Lets behaviour code expose named methods on an element so host code
//! can call `open`, `close`, `dismiss` and friends without knowing the
//! instance behind them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::{Document, NodeId};

/// Method callable on an element; receives string arguments
pub type ElementMethod = Rc<dyn Fn(&mut Document, &[&str])>;

/// Methods bound per element
#[derive(Default)]
pub struct ElementMethods {
    methods: HashMap<NodeId, BTreeMap<String, ElementMethod>>,
}

impl ElementMethods {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a method, replacing any existing one with the same name
    pub fn bind(&mut self, element: NodeId, name: &str, method: ElementMethod) {
        self.methods
            .entry(element)
            .or_default()
            .insert(name.to_string(), method);
    }

    /// Remove a binding; false if there was none
    pub fn unbind(&mut self, element: NodeId, name: &str) -> bool {
        let Some(table) = self.methods.get_mut(&element) else {
            return false;
        };
        let removed = table.remove(name).is_some();
        if table.is_empty() {
            self.methods.remove(&element);
        }
        removed
    }

    pub fn get(&self, element: NodeId, name: &str) -> Option<ElementMethod> {
        self.methods.get(&element)?.get(name).cloned()
    }

    pub fn contains(&self, element: NodeId, name: &str) -> bool {
        self.methods
            .get(&element)
            .is_some_and(|table| table.contains_key(name))
    }

    /// Names bound on an element, sorted
    pub fn names(&self, element: NodeId) -> Vec<&str> {
        self.methods
            .get(&element)
            .map(|table| table.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for ElementMethods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.methods.iter().map(|(id, table)| (id, table.keys().collect::<Vec<_>>())))
            .finish()
    }
}
