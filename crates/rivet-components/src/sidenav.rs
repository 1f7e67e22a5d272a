//! Sidenav
//!
//! Collapsible navigation groups. Each toggle names the list it controls:
//! ```html
//! <nav data-rvt-sidenav>
//!   <button data-rvt-sidenav-toggle="about" aria-expanded="false">About</button>
//!   <ul data-rvt-sidenav-list="about" hidden>...</ul>
//! </nav>
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use rivet_dom::{event_types, Document, EventDetail, ListenerId, NodeId, Selector};
use tracing::{debug, warn};

use crate::component::{attribute_selector, bind_method_to_element, dispatch_custom_event, Component};
use crate::{ComponentError, Config};

pub const SIDENAV_ATTR: &str = "data-rvt-sidenav";
pub const TOGGLE_ATTR: &str = "data-rvt-sidenav-toggle";
pub const LIST_ATTR: &str = "data-rvt-sidenav-list";

pub const LIST_OPENED_EVENT: &str = "rvtSidenavListOpened";
pub const LIST_CLOSED_EVENT: &str = "rvtSidenavListClosed";

/// Sidenav instance
#[derive(Debug, Clone)]
pub struct Sidenav {
    state: Rc<RefCell<SidenavState>>,
}

#[derive(Debug)]
struct SidenavState {
    element: NodeId,
    toggle_selector: Selector,
    listener: Option<ListenerId>,
}

impl Component for Sidenav {
    const NAME: &'static str = "sidenav";
    const SELECTOR: &'static str = "[data-rvt-sidenav]";
    const METHODS: &'static [&'static str] = &["open", "close", "toggle"];

    fn init(doc: &mut Document, element: NodeId, _config: &Config) -> Result<Self, ComponentError> {
        let toggle_selector = Selector::parse(&format!("[{TOGGLE_ATTR}]"))?;
        let sidenav = Self {
            state: Rc::new(RefCell::new(SidenavState {
                element,
                toggle_selector,
                listener: None,
            })),
        };

        let toggles = doc.select(element, &sidenav.state.borrow().toggle_selector);
        for toggle in toggles {
            let id = doc.get_attribute(toggle, TOGGLE_ATTR).unwrap_or_default().to_string();
            let (_, list) = sidenav.group(doc, &id)?;
            let expanded = doc.get_attribute(toggle, "aria-expanded") == Some("true");
            set_expanded(doc, toggle, list, expanded);
        }

        for name in Self::METHODS {
            let this = sidenav.clone();
            bind_method_to_element(doc, element, name, move |doc, args| {
                let Some(id) = args.first() else {
                    warn!(method = *name, "sidenav method called without a list id");
                    return;
                };
                let result = match *name {
                    "open" => this.open(doc, id),
                    "close" => this.close(doc, id),
                    _ => this.toggle(doc, id),
                };
                if let Err(err) = result {
                    warn!(error = %err, "sidenav method failed");
                }
            });
        }

        debug!(element = ?element, "sidenav init");
        Ok(sidenav)
    }

    fn connected(&self, doc: &mut Document) -> Result<(), ComponentError> {
        let element = {
            let state = self.state.borrow();
            if state.listener.is_some() {
                return Ok(());
            }
            state.element
        };

        let this = self.clone();
        let id = doc.add_event_listener(element, event_types::CLICK, move |doc, event| {
            this.handle_click(doc, event.target);
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

impl Sidenav {
    /// Flip a list between expanded and collapsed
    pub fn toggle(&self, doc: &mut Document, id: &str) -> Result<bool, ComponentError> {
        let (toggle, _) = self.group(doc, id)?;
        if is_expanded(doc, toggle) {
            self.close(doc, id)
        } else {
            self.open(doc, id)
        }
    }

    /// Expand a list. Returns false when `rvtSidenavListOpened` was canceled.
    pub fn open(&self, doc: &mut Document, id: &str) -> Result<bool, ComponentError> {
        self.set(doc, id, true)
    }

    /// Collapse a list. Returns false when `rvtSidenavListClosed` was canceled.
    pub fn close(&self, doc: &mut Document, id: &str) -> Result<bool, ComponentError> {
        self.set(doc, id, false)
    }

    /// Whether a list is currently expanded
    pub fn is_open(&self, doc: &Document, id: &str) -> Result<bool, ComponentError> {
        let (toggle, _) = self.group(doc, id)?;
        Ok(is_expanded(doc, toggle))
    }

    fn set(&self, doc: &mut Document, id: &str, expanded: bool) -> Result<bool, ComponentError> {
        let (toggle, list) = self.group(doc, id)?;
        let element = self.element();
        let name = if expanded {
            LIST_OPENED_EVENT
        } else {
            LIST_CLOSED_EVENT
        };

        let detail = EventDetail::new().with("sidenav", element).with("list", list);
        if !dispatch_custom_event(doc, name, element, detail) {
            return Ok(false);
        }

        set_expanded(doc, toggle, list, expanded);
        Ok(true)
    }

    /// Toggle and list for a group id
    fn group(&self, doc: &Document, id: &str) -> Result<(NodeId, NodeId), ComponentError> {
        let element = self.element();
        let toggle = doc.select_first(element, &attribute_selector(TOGGLE_ATTR, id)?);
        let list = doc.select_first(element, &attribute_selector(LIST_ATTR, id)?);
        match (toggle, list) {
            (Some(toggle), Some(list)) => Ok((toggle, list)),
            _ => Err(ComponentError::UnknownGroup {
                component: Self::NAME,
                id: id.to_string(),
            }),
        }
    }

    fn handle_click(&self, doc: &mut Document, target: NodeId) {
        let toggle = {
            let state = self.state.borrow();
            doc.closest(target, &state.toggle_selector)
                .filter(|t| doc.contains(state.element, *t))
        };
        let Some(toggle) = toggle else {
            return;
        };

        let id = doc.get_attribute(toggle, TOGGLE_ATTR).unwrap_or_default().to_string();
        if let Err(err) = self.toggle(doc, &id) {
            warn!(error = %err, "sidenav toggle failed");
        }
    }
}

fn is_expanded(doc: &Document, toggle: NodeId) -> bool {
    doc.get_attribute(toggle, "aria-expanded") == Some("true")
}

fn set_expanded(doc: &mut Document, toggle: NodeId, list: NodeId, expanded: bool) {
    doc.set_attribute(toggle, "aria-expanded", if expanded { "true" } else { "false" });
    doc.set_hidden(list, !expanded);
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAV: &str = r#"
        <nav id="nav" data-rvt-sidenav>
          <ul>
            <li>
              <button data-rvt-sidenav-toggle="toggle-1" aria-expanded="true"><span id="label">One</span></button>
              <ul data-rvt-sidenav-list="toggle-1"><li>a</li></ul>
            </li>
            <li>
              <button id="t2" data-rvt-sidenav-toggle="toggle-2">Two</button>
              <ul id="l2" data-rvt-sidenav-list="toggle-2"><li>b</li></ul>
            </li>
          </ul>
        </nav>
    "#;

    fn setup() -> (Document, Sidenav) {
        let mut doc = Document::parse(NAV).unwrap();
        let nav = doc.get_element_by_id("nav").unwrap();
        let sidenav = Sidenav::init(&mut doc, nav, &Config::default()).unwrap();
        sidenav.connected(&mut doc).unwrap();
        (doc, sidenav)
    }

    #[test]
    fn test_init_normalises_state() {
        let (doc, sidenav) = setup();
        let t2 = doc.get_element_by_id("t2").unwrap();
        let l2 = doc.get_element_by_id("l2").unwrap();

        assert!(sidenav.is_open(&doc, "toggle-1").unwrap());
        assert!(!sidenav.is_open(&doc, "toggle-2").unwrap());
        assert_eq!(doc.get_attribute(t2, "aria-expanded"), Some("false"));
        assert!(!doc.is_visible(l2));
    }

    #[test]
    fn test_click_inside_toggle_flips() {
        let (mut doc, sidenav) = setup();
        let label = doc.get_element_by_id("label").unwrap();

        doc.click(label);
        assert!(!sidenav.is_open(&doc, "toggle-1").unwrap());
        doc.click(label);
        assert!(sidenav.is_open(&doc, "toggle-1").unwrap());
    }

    #[test]
    fn test_open_and_close_are_explicit() {
        let (mut doc, sidenav) = setup();

        assert!(sidenav.open(&mut doc, "toggle-2").unwrap());
        assert!(sidenav.open(&mut doc, "toggle-2").unwrap());
        assert!(sidenav.is_open(&doc, "toggle-2").unwrap());

        assert!(sidenav.close(&mut doc, "toggle-2").unwrap());
        assert!(!sidenav.is_open(&doc, "toggle-2").unwrap());
    }

    #[test]
    fn test_unknown_group() {
        let (mut doc, sidenav) = setup();
        assert_eq!(
            sidenav.toggle(&mut doc, "nope"),
            Err(ComponentError::UnknownGroup {
                component: "sidenav",
                id: "nope".to_string()
            })
        );
    }

    #[test]
    fn test_canceled_close_keeps_list_open() {
        let (mut doc, sidenav) = setup();
        doc.add_event_listener(doc.root(), LIST_CLOSED_EVENT, |_, event| event.prevent_default());

        assert!(!sidenav.close(&mut doc, "toggle-1").unwrap());
        assert!(sidenav.is_open(&doc, "toggle-1").unwrap());
    }

    #[test]
    fn test_bound_methods_take_list_id() {
        let (mut doc, sidenav) = setup();
        let nav = sidenav.element();

        doc.call_method(nav, "toggle", &["toggle-2"]).unwrap();
        assert!(sidenav.is_open(&doc, "toggle-2").unwrap());
        doc.call_method(nav, "close", &["toggle-2"]).unwrap();
        assert!(!sidenav.is_open(&doc, "toggle-2").unwrap());

        doc.call_method(nav, "open", &[]).unwrap();
        doc.call_method(nav, "open", &["missing"]).unwrap();
    }

    #[test]
    fn test_orphan_toggle_fails_init() {
        let mut doc =
            Document::parse(r#"<nav id="nav" data-rvt-sidenav><button data-rvt-sidenav-toggle="x"></button></nav>"#)
                .unwrap();
        let nav = doc.get_element_by_id("nav").unwrap();
        assert!(Sidenav::init(&mut doc, nav, &Config::default()).is_err());
    }
}
