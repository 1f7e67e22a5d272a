//! HTML Serialization (innerHTML/outerHTML)
//!
//! Text and attribute values are always escaped, so content inserted as
//! text nodes can never come back out as markup.

use crate::{DomTree, NodeData, NodeId};

/// Void elements (no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// HTML serializer
#[derive(Debug, Default)]
pub struct HtmlSerializer;

impl HtmlSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize innerHTML of a node (children only)
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        for (child, _) in tree.children(node_id) {
            self.serialize_node(tree, child, &mut output);
        }
        output
    }

    /// Serialize outerHTML of a node (including the node itself)
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output);
        output
    }

    fn serialize_node(&self, tree: &DomTree, node_id: NodeId, output: &mut String) {
        let Some(node) = tree.get(node_id) else {
            return;
        };

        match &node.data {
            NodeData::Document => {
                for (child, _) in tree.children(node_id) {
                    self.serialize_node(tree, child, output);
                }
            }
            NodeData::Element(elem) => {
                output.push('<');
                output.push_str(&elem.tag);
                for attr in &elem.attrs {
                    output.push(' ');
                    output.push_str(&attr.name);
                    if !attr.value.is_empty() {
                        output.push_str("=\"");
                        escape_attribute(&attr.value, output);
                        output.push('"');
                    }
                }
                output.push('>');

                if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                    return;
                }
                for (child, _) in tree.children(node_id) {
                    self.serialize_node(tree, child, output);
                }
                output.push_str("</");
                output.push_str(&elem.tag);
                output.push('>');
            }
            NodeData::Text(text) => escape_text(&text.content, output),
            NodeData::Comment(comment) => {
                output.push_str("<!--");
                output.push_str(comment);
                output.push_str("-->");
            }
        }
    }
}

/// Escape text content
fn escape_text(s: &str, output: &mut String) {
    for c in s.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
fn escape_attribute(s: &str, output: &mut String) {
    for c in s.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(c),
        }
    }
}

/// Escape a string for safe use anywhere in markup
pub fn escape_html(s: &str) -> String {
    let mut output = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(c),
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>.txt"), "&lt;script&gt;.txt");
        assert_eq!(escape_html("a & \"b\" 'c'"), "a &amp; &quot;b&quot; &#39;c&#39;");
        assert_eq!(escape_html("plain.pdf"), "plain.pdf");
    }

    #[test]
    fn test_serialize_element_with_text() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        let input = tree.create_element("input");
        tree.set_attribute(div, "data-rvt-alert", "a\"1");
        tree.set_attribute(div, "hidden", "");
        tree.append_child(tree.root(), div).unwrap();
        tree.append_child(div, input).unwrap();
        let text = tree.create_text("<b>&");
        tree.append_child(div, text).unwrap();

        let html = HtmlSerializer::new().serialize_outer(&tree, div);
        assert_eq!(
            html,
            "<div data-rvt-alert=\"a&quot;1\" hidden><input>&lt;b&gt;&amp;</div>"
        );
        assert_eq!(
            HtmlSerializer::new().serialize_inner(&tree, div),
            "<input>&lt;b&gt;&amp;"
        );
    }
}
