//! Modal
//!
//! Markup:
//! ```html
//! <button data-rvt-modal-trigger="example">Open</button>
//! <div data-rvt-modal="example">
//!   <div data-rvt-modal-inner>
//!     ...
//!     <button data-rvt-modal-close="example">Close</button>
//!   </div>
//! </div>
//! ```
//!
//! A modal carrying `data-rvt-modal-dialog` is a dialog: it ignores clicks
//! outside it and Escape, and closes only through its close controls or
//! the `close` method.

use std::cell::RefCell;
use std::rc::Rc;

use rivet_dom::{event_types, Document, EventDetail, ListenerId, NodeId, Selector};
use tracing::debug;

use crate::component::{attribute_selector, bind_method_to_element, dispatch_custom_event, require, Component};
use crate::{ComponentError, Config};

pub const MODAL_ATTR: &str = "data-rvt-modal";
pub const TRIGGER_ATTR: &str = "data-rvt-modal-trigger";
pub const CLOSE_ATTR: &str = "data-rvt-modal-close";
pub const INNER_ATTR: &str = "data-rvt-modal-inner";
pub const DIALOG_ATTR: &str = "data-rvt-modal-dialog";

pub const OPENED_EVENT: &str = "rvtModalOpened";
pub const CLOSED_EVENT: &str = "rvtModalClosed";

/// Modal instance
#[derive(Debug, Clone)]
pub struct Modal {
    state: Rc<RefCell<ModalState>>,
}

#[derive(Debug)]
struct ModalState {
    element: NodeId,
    dialog: bool,
    close_on_escape: bool,
    trigger_selector: Selector,
    close_selector: Selector,
    inner: Option<NodeId>,
    open: bool,
    opener: Option<NodeId>,
    connected: bool,
    listeners: Vec<ListenerId>,
    /// Document-level listeners installed while open
    open_listeners: Vec<ListenerId>,
}

impl Component for Modal {
    const NAME: &'static str = "modal";
    const SELECTOR: &'static str = "[data-rvt-modal]";
    const METHODS: &'static [&'static str] = &["open", "close"];

    fn init(doc: &mut Document, element: NodeId, config: &Config) -> Result<Self, ComponentError> {
        let id = doc.get_attribute(element, MODAL_ATTR).unwrap_or_default().to_string();
        let trigger_selector = attribute_selector(TRIGGER_ATTR, &id)?;
        let close_selector = attribute_selector(CLOSE_ATTR, &id)?;
        require(doc, doc.root(), Self::NAME, &close_selector)?;

        let inner = doc.select_first(element, &Selector::parse(&format!("[{INNER_ATTR}]"))?);
        let dialog = doc.has_attribute(element, DIALOG_ATTR);

        doc.set_hidden(element, true);

        let modal = Self {
            state: Rc::new(RefCell::new(ModalState {
                element,
                dialog,
                close_on_escape: config.modal.close_on_escape,
                trigger_selector,
                close_selector,
                inner,
                open: false,
                opener: None,
                connected: false,
                listeners: Vec::new(),
                open_listeners: Vec::new(),
            })),
        };

        let this = modal.clone();
        bind_method_to_element(doc, element, "open", move |doc, _| {
            this.open(doc);
        });
        let this = modal.clone();
        bind_method_to_element(doc, element, "close", move |doc, _| {
            this.close(doc);
        });

        debug!(id = %id, dialog, "modal init");
        Ok(modal)
    }

    fn connected(&self, doc: &mut Document) -> Result<(), ComponentError> {
        let (triggers, closers) = {
            let state = self.state.borrow();
            if state.connected {
                return Ok(());
            }
            let root = doc.root();
            (
                doc.select(root, &state.trigger_selector),
                doc.select(root, &state.close_selector),
            )
        };

        let mut listeners = Vec::with_capacity(triggers.len() + closers.len());
        for trigger in triggers {
            let this = self.clone();
            listeners.push(doc.add_event_listener(trigger, event_types::CLICK, move |doc, _| {
                this.open_from(doc, Some(trigger));
            }));
        }
        for closer in closers {
            let this = self.clone();
            listeners.push(doc.add_event_listener(closer, event_types::CLICK, move |doc, _| {
                this.close(doc);
            }));
        }

        let mut state = self.state.borrow_mut();
        state.listeners = listeners;
        state.connected = true;
        Ok(())
    }

    fn disconnected(&self, doc: &mut Document) {
        let (ids, element, was_open) = {
            let mut state = self.state.borrow_mut();
            state.connected = false;
            let was_open = std::mem::replace(&mut state.open, false);
            state.opener = None;
            let mut ids = std::mem::take(&mut state.listeners);
            ids.append(&mut state.open_listeners);
            (ids, state.element, was_open)
        };
        for id in ids {
            doc.remove_event_listener(id);
        }
        if was_open {
            doc.set_hidden(element, true);
        }
    }

    fn element(&self) -> NodeId {
        self.state.borrow().element
    }
}

impl Modal {
    pub fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    pub fn is_dialog(&self) -> bool {
        self.state.borrow().dialog
    }

    /// Open the modal. Returns true when it opened; false when it was
    /// already open or `rvtModalOpened` was canceled.
    pub fn open(&self, doc: &mut Document) -> bool {
        self.open_from(doc, None)
    }

    fn open_from(&self, doc: &mut Document, trigger: Option<NodeId>) -> bool {
        let (element, focus_target) = {
            let state = self.state.borrow();
            if state.open {
                return false;
            }
            (state.element, state.inner.unwrap_or(state.element))
        };

        let mut detail = EventDetail::new().with("modal", element);
        if let Some(trigger) = trigger {
            detail.insert("trigger", trigger);
        }
        if !dispatch_custom_event(doc, OPENED_EVENT, element, detail) {
            return false;
        }

        doc.set_hidden(element, false);
        doc.focus(focus_target);

        let this = self.clone();
        let click = doc.add_event_listener(doc.root(), event_types::CLICK, move |doc, event| {
            this.handle_document_click(doc, &event.path);
        });
        let this = self.clone();
        let keydown = doc.add_event_listener(doc.root(), event_types::KEYDOWN, move |doc, event| {
            if event.key.as_deref() == Some("Escape") {
                this.handle_escape(doc);
            }
        });

        let mut state = self.state.borrow_mut();
        state.open = true;
        state.opener = trigger;
        state.open_listeners = vec![click, keydown];
        true
    }

    /// Close the modal and return focus to the control that opened it,
    /// or the first trigger. Returns true when it closed.
    pub fn close(&self, doc: &mut Document) -> bool {
        let element = {
            let state = self.state.borrow();
            if !state.open {
                return false;
            }
            state.element
        };

        let detail = EventDetail::new().with("modal", element);
        if !dispatch_custom_event(doc, CLOSED_EVENT, element, detail) {
            return false;
        }

        doc.set_hidden(element, true);

        let (open_listeners, opener, trigger_selector) = {
            let mut state = self.state.borrow_mut();
            state.open = false;
            (
                std::mem::take(&mut state.open_listeners),
                state.opener.take(),
                state.trigger_selector.clone(),
            )
        };
        for id in open_listeners {
            doc.remove_event_listener(id);
        }

        let root = doc.root();
        if let Some(target) = opener.or_else(|| doc.select_first(root, &trigger_selector)) {
            doc.focus(target);
        }
        true
    }

    /// Close when a click lands outside the modal box. Judged on the
    /// dispatch path; the target may already be detached.
    fn handle_document_click(&self, doc: &mut Document, path: &[NodeId]) {
        let outside = {
            let state = self.state.borrow();
            if state.dialog || !state.open {
                return;
            }
            let boundary = state.inner.unwrap_or(state.element);
            !path.contains(&boundary)
                && !path.iter().any(|&node| state.trigger_selector.matches(doc.tree(), node))
        };
        if outside {
            self.close(doc);
        }
    }

    fn handle_escape(&self, doc: &mut Document) {
        let enabled = {
            let state = self.state.borrow();
            !state.dialog && state.close_on_escape
        };
        if enabled {
            self.close(doc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <button id="trigger" data-rvt-modal-trigger="m">Open</button>
        <p id="outside">Elsewhere</p>
        <div id="modal" data-rvt-modal="m">
          <div id="inner" data-rvt-modal-inner>
            <p id="body">Body</p>
            <button id="close" data-rvt-modal-close="m">Close</button>
          </div>
        </div>
    "#;

    fn setup(html: &str) -> (Document, Modal) {
        let mut doc = Document::parse(html).unwrap();
        let element = doc.get_element_by_id("modal").unwrap();
        let modal = Modal::init(&mut doc, element, &Config::default()).unwrap();
        modal.connected(&mut doc).unwrap();
        (doc, modal)
    }

    fn id(doc: &Document, id: &str) -> NodeId {
        doc.get_element_by_id(id).unwrap()
    }

    #[test]
    fn test_init_hides() {
        let (doc, modal) = setup(PAGE);
        assert!(!doc.is_visible(modal.element()));
        assert!(!modal.is_open());
        assert!(!modal.is_dialog());
    }

    #[test]
    fn test_init_requires_close_control() {
        let mut doc = Document::parse(r#"<div id="modal" data-rvt-modal="m"></div>"#).unwrap();
        let element = id(&doc, "modal");
        assert!(matches!(
            Modal::init(&mut doc, element, &Config::default()),
            Err(ComponentError::MissingElement { component: "modal", .. })
        ));
    }

    #[test]
    fn test_trigger_opens_and_focuses_inner() {
        let (mut doc, modal) = setup(PAGE);
        let trigger = id(&doc, "trigger");

        doc.click(trigger);
        assert!(modal.is_open());
        assert!(doc.is_visible(modal.element()));
        assert_eq!(doc.active_element(), Some(id(&doc, "inner")));
    }

    #[test]
    fn test_close_returns_focus_to_opener() {
        let (mut doc, modal) = setup(PAGE);
        let trigger = id(&doc, "trigger");
        doc.click(trigger);
        doc.focus(id(&doc, "body"));

        doc.click(id(&doc, "close"));
        assert!(!modal.is_open());
        assert!(!doc.is_visible(modal.element()));
        assert_eq!(doc.active_element(), Some(trigger));
    }

    #[test]
    fn test_click_inside_keeps_open_outside_closes() {
        let (mut doc, modal) = setup(PAGE);
        doc.click(id(&doc, "trigger"));

        doc.click(id(&doc, "body"));
        assert!(modal.is_open());

        doc.click(id(&doc, "outside"));
        assert!(!modal.is_open());
    }

    #[test]
    fn test_escape_closes() {
        let (mut doc, modal) = setup(PAGE);
        modal.open(&mut doc);
        let body = id(&doc, "body");

        doc.press_key(body, "Enter");
        assert!(modal.is_open());
        doc.press_key(body, "Escape");
        assert!(!modal.is_open());
    }

    #[test]
    fn test_dialog_ignores_outside_click_and_escape() {
        let html = PAGE.replace("data-rvt-modal=\"m\"", "data-rvt-modal=\"m\" data-rvt-modal-dialog");
        let (mut doc, modal) = setup(&html);
        assert!(modal.is_dialog());
        modal.open(&mut doc);

        doc.click(id(&doc, "outside"));
        doc.press_key(id(&doc, "body"), "Escape");
        assert!(modal.is_open());

        doc.click(id(&doc, "close"));
        assert!(!modal.is_open());
    }

    #[test]
    fn test_canceled_open_stays_hidden() {
        let (mut doc, modal) = setup(PAGE);
        doc.add_event_listener(doc.root(), OPENED_EVENT, |_, event| event.prevent_default());

        assert!(!modal.open(&mut doc));
        assert!(!modal.is_open());
        assert!(!doc.is_visible(modal.element()));
    }

    #[test]
    fn test_open_is_idempotent() {
        let (mut doc, modal) = setup(PAGE);
        assert!(modal.open(&mut doc));
        let listeners = doc.listeners().len();

        assert!(!modal.open(&mut doc));
        assert_eq!(doc.listeners().len(), listeners);
    }

    #[test]
    fn test_disconnected_removes_listeners() {
        let (mut doc, modal) = setup(PAGE);
        modal.open(&mut doc);
        modal.disconnected(&mut doc);
        modal.disconnected(&mut doc);
        assert!(doc.listeners().is_empty());
    }

    #[test]
    fn test_disconnected_while_open_hides() {
        let (mut doc, modal) = setup(PAGE);
        doc.click(id(&doc, "trigger"));
        assert!(doc.is_visible(modal.element()));

        modal.disconnected(&mut doc);
        assert!(!modal.is_open());
        assert!(!doc.is_visible(modal.element()));

        modal.connected(&mut doc).unwrap();
        assert!(modal.open(&mut doc));
        assert!(doc.is_visible(modal.element()));
    }

    #[test]
    fn test_click_on_control_detached_inside_keeps_open() {
        let (mut doc, modal) = setup(PAGE);
        let body = id(&doc, "body");
        doc.add_event_listener(body, event_types::CLICK, move |doc, _| doc.remove(body));
        doc.click(id(&doc, "trigger"));

        doc.click(body);
        assert!(!doc.is_connected(body));
        assert!(modal.is_open());
    }
}
