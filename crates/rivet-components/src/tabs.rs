//! Tabs
//!
//! ```html
//! <div data-rvt-tabs>
//!   <div role="tablist">
//!     <button role="tab" aria-controls="one">One</button>
//!     <button role="tab" aria-controls="two">Two</button>
//!   </div>
//!   <div role="tabpanel" id="one">...</div>
//!   <div role="tabpanel" id="two">...</div>
//! </div>
//! ```
//!
//! A tab shows the panel named by its `aria-controls`; without one it
//! shows the panel at the same position. Exactly one panel per group is
//! visible at a time. Groups may nest; tabs and panels belong to their
//! nearest enclosing `data-rvt-tabs` element only.

use std::cell::RefCell;
use std::rc::Rc;

use rivet_dom::{event_types, Document, EventDetail, ListenerId, NodeId, Selector};
use tracing::{debug, warn};

use crate::component::{bind_method_to_element, dispatch_custom_event, Component};
use crate::{ComponentError, Config, Controller};

pub const TABS_ATTR: &str = "data-rvt-tabs";

pub const TAB_ACTIVATED_EVENT: &str = "rvtTabActivated";

/// Tab group instance
#[derive(Debug, Clone)]
pub struct Tabs {
    state: Rc<RefCell<TabsState>>,
}

#[derive(Debug)]
struct TabsState {
    element: NodeId,
    group_selector: Selector,
    tab_selector: Selector,
    panel_selector: Selector,
    listeners: Vec<ListenerId>,
}

impl TabsState {
    /// Whether `node` sits in this group and not in a group nested inside it
    fn owns(&self, doc: &Document, node: NodeId) -> bool {
        doc.tree()
            .ancestors(node)
            .find(|a| self.group_selector.matches(doc.tree(), *a))
            == Some(self.element)
    }

    fn select_owned(&self, doc: &Document, selector: &Selector) -> Vec<NodeId> {
        doc.select(self.element, selector)
            .into_iter()
            .filter(|n| self.owns(doc, *n))
            .collect()
    }
}

impl Component for Tabs {
    const NAME: &'static str = "tabs";
    const SELECTOR: &'static str = "[data-rvt-tabs]";
    const METHODS: &'static [&'static str] = &["activateTab"];

    fn init(doc: &mut Document, element: NodeId, _config: &Config) -> Result<Self, ComponentError> {
        let state = TabsState {
            element,
            group_selector: Selector::parse(Self::SELECTOR)?,
            tab_selector: Selector::parse("[role=\"tab\"]")?,
            panel_selector: Selector::parse("[role=\"tabpanel\"]")?,
            listeners: Vec::new(),
        };

        let Some(first) = state.select_owned(doc, &state.tab_selector).first().copied() else {
            return Err(ComponentError::MissingElement {
                component: Self::NAME,
                selector: state.tab_selector.to_string(),
            });
        };

        let tabs = Self {
            state: Rc::new(RefCell::new(state)),
        };
        tabs.apply_selection(doc, first);

        let this = tabs.clone();
        bind_method_to_element(doc, element, "activateTab", move |doc, args| {
            let Some(index) = args.first().and_then(|a| a.parse::<usize>().ok()) else {
                warn!(args = ?args, "activateTab expects a tab index");
                return;
            };
            let Some(tab) = this.tabs(doc).get(index).copied() else {
                warn!(index, "activateTab index out of range");
                return;
            };
            if let Err(err) = this.activate_tab(doc, tab) {
                warn!(error = %err, "activateTab failed");
            }
        });

        debug!(element = ?element, "tabs init");
        Ok(tabs)
    }

    fn connected(&self, doc: &mut Document) -> Result<(), ComponentError> {
        let element = {
            let state = self.state.borrow();
            if !state.listeners.is_empty() {
                return Ok(());
            }
            state.element
        };

        let this = self.clone();
        let click = doc.add_event_listener(element, event_types::CLICK, move |doc, event| {
            let Some(tab) = this.tab_for(doc, event.target) else {
                return;
            };
            if let Err(err) = this.activate_tab(doc, tab) {
                warn!(error = %err, "tab activation failed");
            }
        });

        let this = self.clone();
        let keydown = doc.add_event_listener(element, event_types::KEYDOWN, move |doc, event| {
            let Some(current) = this.tab_for(doc, event.target) else {
                return;
            };
            let Some(key) = event.key.as_deref() else {
                return;
            };
            let Some(next) = this.neighbour(doc, current, key) else {
                return;
            };
            match this.activate_tab(doc, next) {
                Ok(true) => doc.focus(next),
                Ok(false) => {}
                Err(err) => warn!(error = %err, "tab activation failed"),
            }
        });

        self.state.borrow_mut().listeners = vec![click, keydown];
        Ok(())
    }

    fn disconnected(&self, doc: &mut Document) {
        let ids = std::mem::take(&mut self.state.borrow_mut().listeners);
        for id in ids {
            doc.remove_event_listener(id);
        }
    }

    fn element(&self) -> NodeId {
        self.state.borrow().element
    }
}

impl Tabs {
    /// Tabs of this group, in document order. Tabs of nested groups are
    /// excluded.
    pub fn tabs(&self, doc: &Document) -> Vec<NodeId> {
        let state = self.state.borrow();
        state.select_owned(doc, &state.tab_selector)
    }

    /// Panels of this group, in document order
    pub fn panels(&self, doc: &Document) -> Vec<NodeId> {
        let state = self.state.borrow();
        state.select_owned(doc, &state.panel_selector)
    }

    /// Panel shown by `tab`
    pub fn panel_for(&self, doc: &Document, tab: NodeId) -> Option<NodeId> {
        let panels = self.panels(doc);
        if let Some(controls) = doc.get_attribute(tab, "aria-controls") {
            return panels
                .into_iter()
                .find(|p| doc.get_attribute(*p, "id") == Some(controls));
        }

        let index = self.tabs(doc).iter().position(|t| *t == tab)?;
        panels.get(index).copied()
    }

    /// Currently selected tab
    pub fn selected_tab(&self, doc: &Document) -> Option<NodeId> {
        self.tabs(doc)
            .into_iter()
            .find(|t| doc.get_attribute(*t, "aria-selected") == Some("true"))
    }

    /// Select `tab` and show its panel unless `rvtTabActivated` is
    /// canceled. Returns false on cancel.
    pub fn activate_tab(&self, doc: &mut Document, tab: NodeId) -> Result<bool, ComponentError> {
        let element = self.element();
        if !self.tabs(doc).contains(&tab) {
            return Err(ComponentError::ForeignElement {
                component: Self::NAME,
                element: tab,
            });
        }

        let mut detail = EventDetail::new().with("tabs", element).with("tab", tab);
        if let Some(panel) = self.panel_for(doc, tab) {
            detail.insert("panel", panel);
        }
        if !dispatch_custom_event(doc, TAB_ACTIVATED_EVENT, element, detail) {
            return Ok(false);
        }

        self.apply_selection(doc, tab);
        Ok(true)
    }

    fn apply_selection(&self, doc: &mut Document, tab: NodeId) {
        let panel = self.panel_for(doc, tab);
        for t in self.tabs(doc) {
            let selected = t == tab;
            doc.set_attribute(t, "aria-selected", if selected { "true" } else { "false" });
            doc.set_attribute(t, "tabindex", if selected { "0" } else { "-1" });
        }
        for p in self.panels(doc) {
            doc.set_hidden(p, Some(p) != panel);
        }
    }

    /// Tab of this group at or above `target`
    fn tab_for(&self, doc: &Document, target: NodeId) -> Option<NodeId> {
        let state = self.state.borrow();
        doc.closest(target, &state.tab_selector)
            .filter(|t| state.owns(doc, *t))
    }

    fn neighbour(&self, doc: &Document, current: NodeId, key: &str) -> Option<NodeId> {
        let tabs = self.tabs(doc);
        let index = tabs.iter().position(|t| *t == current)?;
        let last = tabs.len() - 1;
        let next = match key {
            "ArrowRight" => {
                if index == last {
                    0
                } else {
                    index + 1
                }
            }
            "ArrowLeft" => {
                if index == 0 {
                    last
                } else {
                    index - 1
                }
            }
            "Home" => 0,
            "End" => last,
            _ => return None,
        };
        tabs.get(next).copied()
    }
}

/// Activate `tab` in the `group_index`-th tab group of the document
pub fn activate_tab(
    controller: &Controller,
    doc: &mut Document,
    tab: NodeId,
    group_index: usize,
) -> Result<bool, ComponentError> {
    let group = controller
        .instances_in_document_order::<Tabs>(doc)
        .into_iter()
        .nth(group_index)
        .ok_or_else(|| ComponentError::UnknownGroup {
            component: Tabs::NAME,
            id: group_index.to_string(),
        })?;
    group.activate_tab(doc, tab)
}
