//! Component base and registry
//!
//! A component binds behaviour to one root element matched by its
//! selector. The [`Controller`](crate::Controller) drives the lifecycle:
//! `init` once, then `connected` while the element is live, then
//! `disconnected` once when it leaves the document.

use std::any::Any;
use std::rc::Rc;

use rivet_dom::{Document, Event, EventDetail, NodeId, Selector};

use crate::{ComponentError, Config};

/// A widget kind
///
/// Implementors are cheap handles over shared state, so the controller,
/// event listeners and bound element methods can all hold one.
pub trait Component: Clone + 'static {
    /// Registry name
    const NAME: &'static str;

    /// Selector matching root elements
    const SELECTOR: &'static str;

    /// Names of methods bound on the root element by `init`
    const METHODS: &'static [&'static str] = &[];

    /// Resolve sub-elements, normalise initial state and bind element
    /// methods. Runs once per element, before `connected`.
    fn init(doc: &mut Document, element: NodeId, config: &Config) -> Result<Self, ComponentError>;

    /// Attach event listeners
    fn connected(&self, doc: &mut Document) -> Result<(), ComponentError>;

    /// Detach everything `connected` attached. Safe to call twice.
    fn disconnected(&self, doc: &mut Document);

    /// Root element
    fn element(&self) -> NodeId;
}

/// Object-safe view of a live component instance
pub trait Behavior {
    /// Registry name of the component kind
    fn kind(&self) -> &'static str;
    fn root(&self) -> NodeId;
    fn bound_methods(&self) -> &'static [&'static str];
    fn attach(&self, doc: &mut Document) -> Result<(), ComponentError>;
    fn detach(&self, doc: &mut Document);
    fn as_any(&self) -> &dyn Any;
}

impl<C: Component> Behavior for C {
    fn kind(&self) -> &'static str {
        C::NAME
    }

    fn root(&self) -> NodeId {
        self.element()
    }

    fn bound_methods(&self) -> &'static [&'static str] {
        C::METHODS
    }

    fn attach(&self, doc: &mut Document) -> Result<(), ComponentError> {
        self.connected(doc)
    }

    fn detach(&self, doc: &mut Document) {
        self.disconnected(doc)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

type Constructor = fn(&mut Document, NodeId, &Config) -> Result<Box<dyn Behavior>, ComponentError>;

fn construct<C: Component>(
    doc: &mut Document,
    element: NodeId,
    config: &Config,
) -> Result<Box<dyn Behavior>, ComponentError> {
    Ok(Box::new(C::init(doc, element, config)?))
}

/// A registered component kind
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    name: &'static str,
    selector: Selector,
    construct: Constructor,
}

impl ComponentDescriptor {
    /// Describe a component type, parsing its selector once
    pub fn of<C: Component>() -> Result<Self, ComponentError> {
        Ok(Self {
            name: C::NAME,
            selector: Selector::parse(C::SELECTOR)?,
            construct: construct::<C>,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub(crate) fn instantiate(
        &self,
        doc: &mut Document,
        element: NodeId,
        config: &Config,
    ) -> Result<Box<dyn Behavior>, ComponentError> {
        (self.construct)(doc, element, config)
    }
}

/// Ordered set of component kinds, unique by name
#[derive(Debug, Clone, Default)]
pub struct Registry {
    descriptors: Vec<ComponentDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in components
    pub fn with_defaults() -> Result<Self, ComponentError> {
        let mut registry = Self::new();
        registry.register::<crate::Modal>()?;
        registry.register::<crate::Sidenav>()?;
        registry.register::<crate::Alert>()?;
        registry.register::<crate::FileInput>()?;
        registry.register::<crate::Tabs>()?;
        Ok(registry)
    }

    /// Register a component type
    pub fn register<C: Component>(&mut self) -> Result<(), ComponentError> {
        self.register_descriptor(ComponentDescriptor::of::<C>()?)
    }

    /// Register a descriptor; names must be unique
    pub fn register_descriptor(&mut self, descriptor: ComponentDescriptor) -> Result<(), ComponentError> {
        if self.is_registered(descriptor.name) {
            return Err(ComponentError::AlreadyRegistered(descriptor.name));
        }

        tracing::debug!(component = descriptor.name, selector = %descriptor.selector, "registered");
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Descriptors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Forget every registration
    pub fn reset(&mut self) {
        self.descriptors.clear();
    }
}

/// Expose a callable method on an element
pub fn bind_method_to_element<F>(doc: &mut Document, element: NodeId, name: &str, method: F)
where
    F: Fn(&mut Document, &[&str]) + 'static,
{
    doc.bind_method(element, name, Rc::new(method));
}

/// Dispatch a bubbling, cancelable custom event. Returns false when a
/// listener prevented the default.
pub fn dispatch_custom_event(doc: &mut Document, name: &str, target: NodeId, detail: EventDetail) -> bool {
    let allowed = doc.dispatch_event(Event::custom(name, target, detail));
    if !allowed {
        tracing::debug!(event = name, target = ?target, "canceled");
    }
    allowed
}

/// Exact-match attribute selector with the value quoted
pub(crate) fn attribute_selector(name: &str, value: &str) -> Result<Selector, ComponentError> {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    Ok(Selector::parse(&format!("[{name}=\"{escaped}\"]"))?)
}

/// First match of a required sub-element
pub(crate) fn require(
    doc: &Document,
    root: NodeId,
    component: &'static str,
    selector: &Selector,
) -> Result<NodeId, ComponentError> {
    doc.select_first(root, selector)
        .ok_or_else(|| ComponentError::MissingElement {
            component,
            selector: selector.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Clone)]
    struct Badge {
        element: NodeId,
    }

    impl Component for Badge {
        const NAME: &'static str = "badge";
        const SELECTOR: &'static str = "[data-badge]";

        fn init(_doc: &mut Document, element: NodeId, _config: &Config) -> Result<Self, ComponentError> {
            Ok(Self { element })
        }

        fn connected(&self, _doc: &mut Document) -> Result<(), ComponentError> {
            Ok(())
        }

        fn disconnected(&self, _doc: &mut Document) {}

        fn element(&self) -> NodeId {
            self.element
        }
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = Registry::new();
        registry.register::<Badge>().unwrap();

        assert_eq!(
            registry.register::<Badge>(),
            Err(ComponentError::AlreadyRegistered("badge"))
        );
        assert_eq!(registry.len(), 1);

        registry.reset();
        assert!(registry.is_empty());
        registry.register::<Badge>().unwrap();
    }

    #[test]
    fn test_defaults_in_order() {
        let registry = Registry::with_defaults().unwrap();
        let names: Vec<_> = registry.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["modal", "sidenav", "alert", "fileInput", "tabs"]);
    }

    #[test]
    fn test_attribute_selector_quotes_value() {
        let doc = Document::parse(r#"<div data-x='say "hi"'></div>"#).unwrap();
        let selector = attribute_selector("data-x", "say \"hi\"").unwrap();
        assert!(doc.select_first(doc.root(), &selector).is_some());

        let missing = attribute_selector("data-x", "other").unwrap();
        let err = require(&doc, doc.root(), "badge", &missing).unwrap_err();
        assert!(matches!(err, ComponentError::MissingElement { component: "badge", .. }));
    }

    #[test]
    fn test_bind_method_to_element() {
        let mut doc = Document::parse("<div id=\"a\"></div>").unwrap();
        let div = doc.get_element_by_id("a").unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        bind_method_to_element(&mut doc, div, "ping", move |_, args| {
            log.borrow_mut().extend(args.iter().map(|a| a.to_string()));
        });

        doc.call_method(div, "ping", &["x"]).unwrap();
        assert_eq!(*seen.borrow(), vec!["x".to_string()]);
    }

    #[test]
    fn test_dispatch_custom_event_reports_cancel() {
        let mut doc = Document::parse("<div id=\"a\"></div>").unwrap();
        let div = doc.get_element_by_id("a").unwrap();
        doc.add_event_listener(doc.root(), "thing", |_, event| event.prevent_default());

        assert!(!dispatch_custom_event(&mut doc, "thing", div, EventDetail::new()));
        assert!(dispatch_custom_event(&mut doc, "other", div, EventDetail::new()));
    }
}
