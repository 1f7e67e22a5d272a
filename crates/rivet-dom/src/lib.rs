//! Rivet DOM - host document for Rivet components
//!
//! Arena-based DOM tree with CSS selector queries, cancelable event
//! dispatch, an element method table and mutation records. Markup is
//! parsed with html5ever and converted into the arena.

mod document;
mod events;
mod files;
mod listeners;
mod methods;
mod node;
mod observer;
mod parser;
mod selector;
mod serializer;
mod tree;

pub use document::Document;
pub use events::{event_types, DetailValue, Event, EventDetail};
pub use files::SelectedFile;
pub use listeners::{EventHandler, EventListenerRegistry, ListenerId};
pub use methods::{ElementMethod, ElementMethods};
pub use node::{Attribute, ElementData, Node, NodeData, TextData};
pub use observer::{MutationQueue, MutationRecord};
pub use parser::HtmlParser;
pub use selector::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Selector,
    SelectorComponent,
};
pub use serializer::{escape_html, HtmlSerializer};
pub use tree::{Ancestors, Children, DomTree};

use serde::Serialize;

/// Node identifier (index into arena)
///
/// Ids are never reused: a removed node keeps its slot, so a stale id
/// cannot alias a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);

    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check that this is not the sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// DOM errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("HTML parse error: {0}")]
    Parse(String),

    #[error("node {0:?} does not exist")]
    NodeNotFound(NodeId),

    #[error("cannot insert {child:?} into {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("no method `{name}` bound to element {element:?}")]
    MethodNotBound { element: NodeId, name: String },
}
