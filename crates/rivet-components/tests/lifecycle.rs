//! Controller lifecycle: discovery, teardown and inserted markup

use std::cell::RefCell;
use std::rc::Rc;

use rivet_components::modal::OPENED_EVENT;
use rivet_components::{
    Alert, Component, ComponentError, Config, Controller, Modal, MutationSummary, Registry, Tabs,
};
use rivet_dom::{Document, NodeId};

fn counter(doc: &mut Document, event: &str) -> Rc<RefCell<usize>> {
    let hits = Rc::new(RefCell::new(0));
    let count = Rc::clone(&hits);
    let root = doc.root();
    doc.add_event_listener(root, event, move |_, _| *count.borrow_mut() += 1);
    hits
}

#[test]
fn test_empty_document_is_noop() {
    let mut doc = Document::new();
    let mut controller = Controller::with_defaults().unwrap();
    assert_eq!(controller.init(&mut doc).unwrap(), 0);
    assert!(controller.is_empty());
}

#[test]
fn test_destroyed_modal_no_longer_reacts() {
    let mut doc = Document::parse(
        r#"<button id="t" data-rvt-modal-trigger="m">Open</button>
           <div id="m" data-rvt-modal="m"><button data-rvt-modal-close="m">x</button></div>"#,
    )
    .unwrap();
    let mut controller = Controller::with_defaults().unwrap();
    controller.init(&mut doc).unwrap();
    let modal = doc.get_element_by_id("m").unwrap();
    let trigger = doc.get_element_by_id("t").unwrap();
    let opened = counter(&mut doc, OPENED_EVENT);

    assert_eq!(controller.destroy(&mut doc, modal), 1);
    doc.click(trigger);

    assert_eq!(*opened.borrow(), 0);
    assert!(!doc.is_visible(modal));
    assert!(doc.call_method(modal, "open", &[]).is_err());
    assert_eq!(doc.listeners().len(), 1);
}

#[test]
fn test_inserted_markup_is_initialised() {
    let mut doc = Document::parse(r#"<main id="main"></main>"#).unwrap();
    let main = doc.get_element_by_id("main").unwrap();
    let mut controller = Controller::with_defaults().unwrap();
    controller.init(&mut doc).unwrap();

    doc.append_html(
        main,
        r#"<div id="a" data-rvt-alert="late"><button id="close" data-rvt-alert-close>x</button></div>"#,
    )
    .unwrap();
    let summary = controller.process_mutations(&mut doc).unwrap();
    assert_eq!(
        summary,
        MutationSummary {
            initialized: 1,
            destroyed: 0
        }
    );

    let alert = doc.get_element_by_id("a").unwrap();
    assert_eq!(controller.instance::<Alert>(alert).unwrap().id(), "late");

    let close = doc.get_element_by_id("close").unwrap();
    doc.click(close);
    assert!(!doc.is_connected(alert));

    let summary = controller.process_mutations(&mut doc).unwrap();
    assert_eq!(summary.destroyed, 1);
    assert!(controller.is_empty());
}

#[test]
fn test_removed_subtree_tears_down_everything_inside() {
    let mut doc = Document::parse(
        r#"<section id="s">
             <div data-rvt-tabs><button role="tab">a</button><div role="tabpanel">1</div></div>
             <div data-rvt-tabs><button role="tab">b</button><div role="tabpanel">2</div></div>
           </section>"#,
    )
    .unwrap();
    let section = doc.get_element_by_id("s").unwrap();
    let mut controller = Controller::with_defaults().unwrap();
    controller.init(&mut doc).unwrap();
    assert_eq!(controller.instances::<Tabs>().len(), 2);

    doc.remove(section);
    let summary = controller.process_mutations(&mut doc).unwrap();
    assert_eq!(summary.destroyed, 2);
    assert!(doc.listeners().is_empty());
}

#[test]
fn test_without_observation_nothing_is_queued() {
    let mut doc = Document::parse(r#"<main id="main"></main>"#).unwrap();
    let config: Config = serde_json::from_str(r#"{ "observeMutations": false }"#).unwrap();
    let mut controller = Controller::new(Registry::with_defaults().unwrap(), config);
    controller.init(&mut doc).unwrap();

    let main = doc.get_element_by_id("main").unwrap();
    doc.append_html(main, r#"<div data-rvt-alert="x"><button data-rvt-alert-close></button></div>"#)
        .unwrap();
    assert_eq!(controller.process_mutations(&mut doc).unwrap(), MutationSummary::default());

    assert_eq!(controller.init_within(&mut doc, main).unwrap(), 1);
}

#[test]
fn test_init_error_propagates() {
    let mut doc = Document::parse(r#"<div data-rvt-alert="broken"></div>"#).unwrap();
    let mut controller = Controller::with_defaults().unwrap();

    let err = controller.init(&mut doc).unwrap_err();
    assert!(matches!(err, ComponentError::MissingElement { component: "alert", .. }));
    assert!(controller.is_empty());
}

#[derive(Clone)]
struct Highlight {
    element: NodeId,
    listener: Rc<RefCell<Option<rivet_dom::ListenerId>>>,
}

impl Component for Highlight {
    const NAME: &'static str = "highlight";
    const SELECTOR: &'static str = "[data-rvt-modal]";

    fn init(_doc: &mut Document, element: NodeId, _config: &Config) -> Result<Self, ComponentError> {
        Ok(Self {
            element,
            listener: Rc::new(RefCell::new(None)),
        })
    }

    fn connected(&self, doc: &mut Document) -> Result<(), ComponentError> {
        let element = self.element;
        let id = doc.add_event_listener(element, OPENED_EVENT, move |doc, _| {
            doc.set_attribute(element, "data-highlighted", "");
        });
        *self.listener.borrow_mut() = Some(id);
        Ok(())
    }

    fn disconnected(&self, doc: &mut Document) {
        if let Some(id) = self.listener.borrow_mut().take() {
            doc.remove_event_listener(id);
        }
    }

    fn element(&self) -> NodeId {
        self.element
    }
}

#[test]
fn test_two_components_on_one_element() {
    let mut doc = Document::parse(
        r#"<div id="m" data-rvt-modal="m"><button data-rvt-modal-close="m">x</button></div>"#,
    )
    .unwrap();
    let mut registry = Registry::with_defaults().unwrap();
    registry.register::<Highlight>().unwrap();
    assert!(registry.register::<Highlight>().is_err());

    let mut controller = Controller::new(registry, Config::default());
    assert_eq!(controller.init(&mut doc).unwrap(), 2);

    let element = doc.get_element_by_id("m").unwrap();
    assert!(controller.is_bound(element, "modal"));
    assert!(controller.is_bound(element, "highlight"));

    let modal = controller.instance::<Modal>(element).unwrap();
    modal.open(&mut doc);
    assert!(doc.has_attribute(element, "data-highlighted"));

    assert_eq!(controller.destroy_all(&mut doc), 2);
    assert!(doc.listeners().is_empty());
}
