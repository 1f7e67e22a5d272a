//! Document - High-level document API
//!
//! Owns the tree together with everything components hang off it:
//! event listeners, element methods, focus and file selections.

use std::collections::HashMap;
use std::rc::Rc;

use crate::{
    DomError, DomTree, ElementMethod, ElementMethods, Event, EventListenerRegistry, HtmlParser,
    HtmlSerializer, ListenerId, MutationRecord, NodeId, SelectedFile, Selector,
};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    tree: DomTree,
    listeners: EventListenerRegistry,
    methods: ElementMethods,
    files: HashMap<NodeId, Vec<SelectedFile>>,
    focused: Option<NodeId>,
}

impl Document {
    /// Create a document with an html/head/body skeleton
    pub fn new() -> Self {
        let mut doc = Self::empty();
        let html = doc.tree.append_new_element(NodeId::ROOT, "html");
        doc.tree.append_new_element(html, "head");
        doc.tree.append_new_element(html, "body");
        doc
    }

    /// Create an empty document (no structure)
    pub fn empty() -> Self {
        Self {
            tree: DomTree::new(),
            listeners: EventListenerRegistry::new(),
            methods: ElementMethods::new(),
            files: HashMap::new(),
            focused: None,
        }
    }

    /// Parse markup into a new document
    pub fn parse(html: &str) -> Result<Self, DomError> {
        HtmlParser::new().parse(html)
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get <html> element
    pub fn document_element(&self) -> Option<NodeId> {
        self.child_element(NodeId::ROOT, "html")
    }

    /// Get <head> element
    pub fn head(&self) -> Option<NodeId> {
        self.child_element(self.document_element()?, "head")
    }

    /// Get <body> element
    pub fn body(&self) -> Option<NodeId> {
        self.child_element(self.document_element()?, "body")
    }

    fn child_element(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.tree
            .children(parent)
            .find(|(_, node)| node.as_element().is_some_and(|e| e.tag == tag))
            .map(|(id, _)| id)
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(NodeId::ROOT)
            .into_iter()
            .find(|&n| self.tree.element(n).and_then(|e| e.id()) == Some(id))
    }

    // === Queries ===

    /// First descendant of `root` matching `selector`
    pub fn query_selector(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .tree
            .descendants(root)
            .into_iter()
            .find(|&n| selector.matches(&self.tree, n)))
    }

    /// All descendants of `root` matching `selector`, in document order
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selector = Selector::parse(selector)?;
        Ok(self.select(root, &selector))
    }

    /// All descendants of `root` matching a parsed selector
    pub fn select(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.tree
            .descendants(root)
            .into_iter()
            .filter(|&n| selector.matches(&self.tree, n))
            .collect()
    }

    /// Like [`select`](Self::select) but `root` itself is a candidate
    pub fn select_inclusive(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut found = Vec::new();
        if selector.matches(&self.tree, root) {
            found.push(root);
        }
        found.extend(self.select(root, selector));
        found
    }

    /// First descendant of `root` matching a parsed selector
    pub fn select_first(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.tree
            .descendants(root)
            .into_iter()
            .find(|&n| selector.matches(&self.tree, n))
    }

    /// Check if element matches selector
    pub fn matches(&self, element: NodeId, selector: &str) -> Result<bool, DomError> {
        Ok(Selector::parse(selector)?.matches(&self.tree, element))
    }

    /// Nearest inclusive ancestor matching a parsed selector
    pub fn closest(&self, element: NodeId, selector: &Selector) -> Option<NodeId> {
        std::iter::once(element)
            .chain(self.tree.ancestors(element))
            .find(|&n| selector.matches(&self.tree, n))
    }

    // === Tree manipulation ===

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.tree.create_text(text)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.tree.append_child(parent, child)
    }

    /// Parse markup and append it under `parent`
    pub fn append_html(&mut self, parent: NodeId, html: &str) -> Result<Vec<NodeId>, DomError> {
        HtmlParser::new().parse_fragment_into(html, &mut self.tree, parent)
    }

    /// Detach a node from the document. Focus and file selections inside
    /// the removed subtree are dropped.
    pub fn remove(&mut self, node: NodeId) {
        if self.focused.is_some_and(|f| self.tree.contains(node, f)) {
            self.focused = None;
        }
        let tree = &self.tree;
        self.files.retain(|input, _| !tree.contains(node, *input));
        self.tree.remove(node);
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.is_connected(node)
    }

    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.tree.contains(ancestor, node)
    }

    // === Attributes and content ===

    pub fn get_attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.tree.get_attribute(element, name)
    }

    pub fn has_attribute(&self, element: NodeId, name: &str) -> bool {
        self.tree.has_attribute(element, name)
    }

    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        self.tree.set_attribute(element, name, value);
    }

    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> Option<String> {
        self.tree.remove_attribute(element, name)
    }

    /// Toggle the `hidden` attribute
    pub fn set_hidden(&mut self, element: NodeId, hidden: bool) {
        if hidden {
            self.tree.set_attribute(element, "hidden", "");
        } else {
            self.tree.remove_attribute(element, "hidden");
        }
    }

    /// Connected with no `hidden` attribute on itself or any ancestor
    pub fn is_visible(&self, element: NodeId) -> bool {
        self.is_connected(element)
            && std::iter::once(element)
                .chain(self.tree.ancestors(element))
                .all(|n| !self.tree.has_attribute(n, "hidden"))
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.tree.text_content(node)
    }

    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        self.tree.set_text_content(node, text)
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        HtmlSerializer::new().serialize_inner(&self.tree, node)
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        HtmlSerializer::new().serialize_outer(&self.tree, node)
    }

    // === Events ===

    /// Add an event listener
    pub fn add_event_listener<F>(&mut self, node: NodeId, event_type: &str, handler: F) -> ListenerId
    where
        F: Fn(&mut Document, &mut Event) + 'static,
    {
        self.listeners.add_listener(node, event_type, Rc::new(handler))
    }

    /// Remove an event listener; false if it was already gone
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove_listener(id)
    }

    pub fn has_event_listener(&self, id: ListenerId) -> bool {
        self.listeners.contains(id)
    }

    pub fn listeners(&self) -> &EventListenerRegistry {
        &self.listeners
    }

    /// Dispatch an event at its target, then up the ancestor chain if it
    /// bubbles. Returns false when a listener prevented the default.
    ///
    /// Listeners attached to a node are snapshotted when the event
    /// reaches that node; a listener removed meanwhile is skipped.
    pub fn dispatch_event(&mut self, mut event: Event) -> bool {
        let mut path = vec![event.target];
        if event.bubbles {
            path.extend(self.tree.ancestors(event.target));
        }
        event.path = path.clone();

        tracing::trace!(event = %event.event_type, target = ?event.target, "dispatch");

        for node in path {
            event.current_target = Some(node);
            for (id, handler) in self.listeners.handlers_for(node, &event.event_type) {
                if !self.listeners.contains(id) {
                    continue;
                }
                handler(self, &mut event);
                if event.is_immediate_propagation_stopped() {
                    break;
                }
            }
            if event.is_propagation_stopped() {
                break;
            }
        }

        event.current_target = None;
        !event.is_default_prevented()
    }

    /// Dispatch a click on a node
    pub fn click(&mut self, node: NodeId) -> bool {
        self.dispatch_event(Event::click(node))
    }

    /// Dispatch a keydown on a node
    pub fn press_key(&mut self, node: NodeId, key: &str) -> bool {
        self.dispatch_event(Event::keydown(node, key))
    }

    /// Replace the selected files of an input and dispatch `change`
    pub fn select_files(&mut self, input: NodeId, files: Vec<SelectedFile>) -> bool {
        self.files.insert(input, files);
        self.dispatch_event(Event::change(input))
    }

    /// Files currently selected on an input
    pub fn files(&self, input: NodeId) -> &[SelectedFile] {
        self.files.get(&input).map(Vec::as_slice).unwrap_or_default()
    }

    // === Focus ===

    pub fn focus(&mut self, node: NodeId) {
        if self.tree.element(node).is_some() {
            self.focused = Some(node);
        }
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.focused
    }

    // === Element methods ===

    /// Bind a named method on an element, replacing an existing one
    pub fn bind_method(&mut self, element: NodeId, name: &str, method: ElementMethod) {
        self.methods.bind(element, name, method);
    }

    pub fn unbind_method(&mut self, element: NodeId, name: &str) -> bool {
        self.methods.unbind(element, name)
    }

    pub fn has_method(&self, element: NodeId, name: &str) -> bool {
        self.methods.contains(element, name)
    }

    /// Names of the methods bound on an element
    pub fn method_names(&self, element: NodeId) -> Vec<&str> {
        self.methods.names(element)
    }

    /// Call a method bound on an element
    pub fn call_method(&mut self, element: NodeId, name: &str, args: &[&str]) -> Result<(), DomError> {
        let method = self
            .methods
            .get(element, name)
            .ok_or_else(|| DomError::MethodNotBound {
                element,
                name: name.to_string(),
            })?;
        method(self, args);
        Ok(())
    }

    // === Mutation records ===

    /// Start queueing child-list mutation records
    pub fn observe_mutations(&mut self) {
        self.tree.mutations_mut().observe();
    }

    /// Stop queueing and drop pending records
    pub fn disconnect_mutations(&mut self) {
        self.tree.mutations_mut().disconnect();
    }

    pub fn take_mutation_records(&mut self) -> Vec<MutationRecord> {
        self.tree.mutations_mut().take_records()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
