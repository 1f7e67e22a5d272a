//! Alert
//!
//! A dismissible message:
//! ```html
//! <div data-rvt-alert="info">
//!   <p>Heads up.</p>
//!   <button data-rvt-alert-close>Dismiss</button>
//! </div>
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use rivet_dom::{event_types, Document, EventDetail, ListenerId, NodeId, Selector};
use tracing::debug;

use crate::component::{bind_method_to_element, dispatch_custom_event, require, Component};
use crate::{ComponentError, Config};

pub const ALERT_ATTR: &str = "data-rvt-alert";
pub const CLOSE_ATTR: &str = "data-rvt-alert-close";

pub const DISMISS_EVENT: &str = "alertDismiss";

/// Alert instance
#[derive(Debug, Clone)]
pub struct Alert {
    state: Rc<RefCell<AlertState>>,
}

#[derive(Debug)]
struct AlertState {
    element: NodeId,
    id: String,
    close_button: NodeId,
    listener: Option<ListenerId>,
    dismissed: bool,
}

impl Component for Alert {
    const NAME: &'static str = "alert";
    const SELECTOR: &'static str = "[data-rvt-alert]";
    const METHODS: &'static [&'static str] = &["dismiss"];

    fn init(doc: &mut Document, element: NodeId, _config: &Config) -> Result<Self, ComponentError> {
        let id = doc.get_attribute(element, ALERT_ATTR).unwrap_or_default().to_string();
        let close_button = require(doc, element, Self::NAME, &Selector::parse(&format!("[{CLOSE_ATTR}]"))?)?;

        let alert = Self {
            state: Rc::new(RefCell::new(AlertState {
                element,
                id,
                close_button,
                listener: None,
                dismissed: false,
            })),
        };

        let this = alert.clone();
        bind_method_to_element(doc, element, "dismiss", move |doc, _| {
            this.dismiss(doc);
        });

        Ok(alert)
    }

    fn connected(&self, doc: &mut Document) -> Result<(), ComponentError> {
        let close_button = {
            let state = self.state.borrow();
            if state.listener.is_some() || state.dismissed {
                return Ok(());
            }
            state.close_button
        };

        let this = self.clone();
        let id = doc.add_event_listener(close_button, event_types::CLICK, move |doc, _| {
            this.dismiss(doc);
        });
        self.state.borrow_mut().listener = Some(id);
        Ok(())
    }

    fn disconnected(&self, doc: &mut Document) {
        if let Some(id) = self.state.borrow_mut().listener.take() {
            doc.remove_event_listener(id);
        }
    }

    fn element(&self) -> NodeId {
        self.state.borrow().element
    }
}

impl Alert {
    pub fn id(&self) -> String {
        self.state.borrow().id.clone()
    }

    pub fn is_dismissed(&self) -> bool {
        self.state.borrow().dismissed
    }

    /// Remove the alert from the document unless `alertDismiss` is
    /// canceled. Returns true when the alert was removed.
    pub fn dismiss(&self, doc: &mut Document) -> bool {
        let (element, id) = {
            let state = self.state.borrow();
            if state.dismissed {
                return false;
            }
            (state.element, state.id.clone())
        };

        let detail = EventDetail::new().with("id", id.as_str());
        if !dispatch_custom_event(doc, DISMISS_EVENT, element, detail) {
            return false;
        }

        self.disconnected(doc);
        self.state.borrow_mut().dismissed = true;
        doc.remove(element);
        debug!(id = %id, "alert dismissed");
        true
    }
}
