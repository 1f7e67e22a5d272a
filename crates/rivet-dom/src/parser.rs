//! HTML5 Parser
//!
//! Parses with html5ever into an `RcDom` and converts the result into
//! the arena tree.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::{Document, DomError, DomTree, NodeId};

/// HTML5 parser
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a full document
    ///
    /// Fragments get wrapped in html/head/body like a browser would.
    pub fn parse(&self, html: &str) -> Result<Document, DomError> {
        let dom = self.parse_rcdom(html)?;
        let mut document = Document::empty();
        self.convert_children(&dom.document, document.tree_mut(), NodeId::ROOT)?;

        tracing::debug!(nodes = document.tree().len(), "parsed HTML document");
        Ok(document)
    }

    /// Parse a fragment and append its top-level nodes to `parent`
    ///
    /// Each top-level subtree is built detached and then appended, so a
    /// connected parent gets one mutation record per top-level node.
    pub fn parse_fragment_into(
        &self,
        html: &str,
        tree: &mut DomTree,
        parent: NodeId,
    ) -> Result<Vec<NodeId>, DomError> {
        let dom = self.parse_rcdom(html)?;
        let Some(body) = find_element(&dom.document, "body") else {
            return Ok(Vec::new());
        };

        let mut added = Vec::new();
        for child in body.children.borrow().iter() {
            if let Some(id) = self.convert_node(child, tree)? {
                tree.append_child(parent, id)?;
                added.push(id);
            }
        }
        Ok(added)
    }

    fn parse_rcdom(&self, html: &str) -> Result<RcDom, DomError> {
        parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .map_err(|e| DomError::Parse(e.to_string()))
    }

    fn convert_children(
        &self,
        handle: &Handle,
        tree: &mut DomTree,
        parent: NodeId,
    ) -> Result<(), DomError> {
        for child in handle.children.borrow().iter() {
            if let Some(id) = self.convert_node(child, tree)? {
                tree.append_child(parent, id)?;
            }
        }
        Ok(())
    }

    /// Convert an RcDom node into a detached subtree
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree) -> Result<Option<NodeId>, DomError> {
        match &handle.data {
            RcNodeData::Text { contents } => {
                let text = contents.borrow().to_string();
                if text.trim().is_empty() {
                    return Ok(None);
                }
                Ok(Some(tree.create_text(&text)))
            }
            RcNodeData::Comment { contents } => Ok(Some(tree.create_comment(contents))),
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    tree.set_attribute(id, &attr.name.local, &attr.value);
                }
                self.convert_children(handle, tree, id)?;
                Ok(Some(id))
            }
            // Doctype and processing instructions carry nothing components use
            _ => Ok(None),
        }
    }
}

fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if let RcNodeData::Element { name, .. } = &handle.data {
        if &*name.local == tag {
            return Some(handle.clone());
        }
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}
