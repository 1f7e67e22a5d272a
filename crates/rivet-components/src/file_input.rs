//! File input
//!
//! Mirrors the selected file names into a preview element:
//! ```html
//! <div data-rvt-file-input="upload">
//!   <input type="file" data-rvt-file-input-button>
//!   <span data-rvt-file-input-preview>No file selected</span>
//! </div>
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use rivet_dom::{escape_html, event_types, Document, EventDetail, ListenerId, NodeId, Selector};
use tracing::{debug, warn};

use crate::component::{dispatch_custom_event, require, Component};
use crate::{ComponentError, Config};

pub const FILE_INPUT_ATTR: &str = "data-rvt-file-input";
pub const BUTTON_ATTR: &str = "data-rvt-file-input-button";
pub const PREVIEW_ATTR: &str = "data-rvt-file-input-preview";

pub const SINGLE_FILE_EVENT: &str = "buildSingleFile";
pub const MULTIPLE_FILES_EVENT: &str = "buildMultipleFiles";

/// File input instance
#[derive(Debug, Clone)]
pub struct FileInput {
    state: Rc<RefCell<FileInputState>>,
}

#[derive(Debug)]
struct FileInputState {
    element: NodeId,
    id: String,
    input: NodeId,
    preview: NodeId,
    placeholder: String,
    listener: Option<ListenerId>,
}

impl Component for FileInput {
    const NAME: &'static str = "fileInput";
    const SELECTOR: &'static str = "[data-rvt-file-input]";

    fn init(doc: &mut Document, element: NodeId, config: &Config) -> Result<Self, ComponentError> {
        let id = doc.get_attribute(element, FILE_INPUT_ATTR).unwrap_or_default().to_string();
        let input = require(doc, element, Self::NAME, &Selector::parse(&format!("[{BUTTON_ATTR}]"))?)?;
        let preview = require(doc, element, Self::NAME, &Selector::parse(&format!("[{PREVIEW_ATTR}]"))?)?;

        Ok(Self {
            state: Rc::new(RefCell::new(FileInputState {
                element,
                id,
                input,
                preview,
                placeholder: config.file_input.preview_text.clone(),
                listener: None,
            })),
        })
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
        let id = doc.add_event_listener(element, event_types::CHANGE, move |doc, event| {
            let input = this.state.borrow().input;
            if event.target != input {
                return;
            }
            if let Err(err) = this.update_preview(doc) {
                warn!(error = %err, "file input preview update failed");
            }
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

impl FileInput {
    pub fn input(&self) -> NodeId {
        self.state.borrow().input
    }

    pub fn preview(&self) -> NodeId {
        self.state.borrow().preview
    }

    /// Rebuild the preview from the input's current selection.
    /// Returns false when the build event was canceled.
    pub fn update_preview(&self, doc: &mut Document) -> Result<bool, ComponentError> {
        let (element, id, input, preview, placeholder) = {
            let state = self.state.borrow();
            (
                state.element,
                state.id.clone(),
                state.input,
                state.preview,
                state.placeholder.clone(),
            )
        };

        let files = doc.files(input).to_vec();
        let text = match files.as_slice() {
            [] => {
                doc.set_text_content(preview, &placeholder)?;
                return Ok(true);
            }
            [file] => {
                let detail = EventDetail::new()
                    .with("type", "single")
                    .with("fileName", escape_html(&file.name))
                    .with("fileInputWrapper", id.as_str());
                if !dispatch_custom_event(doc, SINGLE_FILE_EVENT, element, detail) {
                    return Ok(false);
                }
                file.name.clone()
            }
            many => {
                let detail = EventDetail::new()
                    .with("type", "multiple")
                    .with("numberOfFiles", many.len())
                    .with("fileInputWrapper", id.as_str());
                if !dispatch_custom_event(doc, MULTIPLE_FILES_EVENT, element, detail) {
                    return Ok(false);
                }
                format!("{} files selected", many.len())
            }
        };

        doc.tree_mut().remove_children(preview);
        let span = doc.create_element("span");
        let label = doc.create_text(&text);
        doc.append_child(span, label)?;
        doc.append_child(preview, span)?;

        debug!(id = %id, files = files.len(), "file input preview updated");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use rivet_dom::SelectedFile;

    use super::*;

    const WRAPPER: &str = r#"
        <div id="wrapper" data-rvt-file-input="upload">
          <input id="input" type="file" data-rvt-file-input-button>
          <span id="preview" data-rvt-file-input-preview>Choose</span>
        </div>
    "#;

    fn setup() -> (Document, FileInput) {
        let mut doc = Document::parse(WRAPPER).unwrap();
        let element = doc.get_element_by_id("wrapper").unwrap();
        let file_input = FileInput::init(&mut doc, element, &Config::default()).unwrap();
        file_input.connected(&mut doc).unwrap();
        (doc, file_input)
    }

    #[test]
    fn test_no_files_shows_placeholder() {
        let (mut doc, file_input) = setup();
        doc.select_files(file_input.input(), Vec::new());
        assert_eq!(doc.text_content(file_input.preview()), "No file selected");
    }

    #[test]
    fn test_single_file_name_is_text() {
        let (mut doc, file_input) = setup();
        let seen = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&seen);
        doc.add_event_listener(doc.root(), SINGLE_FILE_EVENT, move |_, event| {
            *slot.borrow_mut() = event.detail.text("fileName").map(str::to_string);
        });

        doc.select_files(file_input.input(), vec![SelectedFile::new("<b>.txt")]);

        let preview = file_input.preview();
        assert_eq!(doc.text_content(preview), "<b>.txt");
        assert_eq!(doc.inner_html(preview), "<span>&lt;b&gt;.txt</span>");
        assert_eq!(seen.borrow().as_deref(), Some("&lt;b&gt;.txt"));
    }

    #[test]
    fn test_multiple_files_count() {
        let (mut doc, file_input) = setup();
        let files = vec![
            SelectedFile::new("a.txt"),
            SelectedFile::new("b.txt"),
        ];
        doc.select_files(file_input.input(), files);
        assert_eq!(doc.text_content(file_input.preview()), "2 files selected");
    }

    #[test]
    fn test_canceled_build_leaves_preview() {
        let (mut doc, file_input) = setup();
        doc.add_event_listener(doc.root(), SINGLE_FILE_EVENT, |_, event| event.prevent_default());

        doc.select_files(file_input.input(), vec![SelectedFile::new("a.txt")]);
        assert_eq!(doc.text_content(file_input.preview()), "Choose");
    }

    #[test]
    fn test_custom_placeholder() {
        let mut doc = Document::parse(WRAPPER).unwrap();
        let element = doc.get_element_by_id("wrapper").unwrap();
        let mut config = Config::default();
        config.file_input.preview_text = "Nothing yet".to_string();
        let file_input = FileInput::init(&mut doc, element, &config).unwrap();

        assert!(file_input.update_preview(&mut doc).unwrap());
        assert_eq!(doc.text_content(file_input.preview()), "Nothing yet");
    }
}
