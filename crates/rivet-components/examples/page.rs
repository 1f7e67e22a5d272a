//! Drive every widget on a small page and print the resulting markup
//!
//! Run with `RUST_LOG=debug` to see component lifecycle logs.

use anyhow::Context;
use rivet_components::{tabs, Controller, Modal, Sidenav, Tabs};
use rivet_dom::{Document, SelectedFile};
use tracing_subscriber::EnvFilter;

const PAGE: &str = r#"
<button id="open" data-rvt-modal-trigger="welcome">Open</button>
<div data-rvt-modal="welcome">
  <div data-rvt-modal-inner>
    <p>Welcome!</p>
    <button data-rvt-modal-close="welcome">Close</button>
  </div>
</div>

<nav id="nav" data-rvt-sidenav>
  <button data-rvt-sidenav-toggle="about" aria-expanded="false">About</button>
  <ul data-rvt-sidenav-list="about"><li>History</li></ul>
</nav>

<div id="notice" data-rvt-alert="notice">
  <p>Scheduled maintenance tonight.</p>
  <button data-rvt-alert-close>Dismiss</button>
</div>

<div data-rvt-file-input="upload">
  <input id="files" type="file" data-rvt-file-input-button multiple>
  <span data-rvt-file-input-preview>No file selected</span>
</div>

<div data-rvt-tabs>
  <button id="tab-1" role="tab">Overview</button>
  <button id="tab-2" role="tab">Details</button>
  <div role="tabpanel">Overview panel</div>
  <div role="tabpanel">Details panel</div>
</div>
"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut doc = Document::parse(PAGE)?;
    let mut controller = Controller::with_defaults()?;
    let created = controller.init(&mut doc)?;
    println!("initialised {created} components");

    doc.add_event_listener(doc.root(), "rvtModalOpened", |_, event| {
        println!("modal opened: {:?}", event.detail);
    });

    let trigger = doc.get_element_by_id("open").context("no modal trigger")?;
    doc.click(trigger);
    let modal = controller
        .instances::<Modal>()
        .into_iter()
        .next()
        .context("no modal instance")?;
    println!("modal open: {}", modal.is_open());
    modal.close(&mut doc);

    let nav = doc.get_element_by_id("nav").context("no sidenav")?;
    let sidenav = controller.instance::<Sidenav>(nav).context("sidenav not bound")?;
    sidenav.toggle(&mut doc, "about")?;
    println!("about expanded: {}", sidenav.is_open(&doc, "about")?);

    let notice = doc.get_element_by_id("notice").context("no alert")?;
    doc.call_method(notice, "dismiss", &[])?;
    let summary = controller.process_mutations(&mut doc)?;
    println!("after dismiss: {summary:?}");

    let input = doc.get_element_by_id("files").context("no file input")?;
    doc.select_files(
        input,
        vec![SelectedFile::new("report.pdf"), SelectedFile::new("<notes>.txt")],
    );

    let tab = doc.get_element_by_id("tab-2").context("no tab")?;
    tabs::activate_tab(&controller, &mut doc, tab, 0)?;
    let group = controller
        .instances::<Tabs>()
        .into_iter()
        .next()
        .context("no tab group")?;
    println!("selected tab: {:?}", group.selected_tab(&doc));

    let body = doc.body().context("no body")?;
    println!("{}", doc.inner_html(body));
    Ok(())
}
