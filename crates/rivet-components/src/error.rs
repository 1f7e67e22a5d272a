//! Component errors

use rivet_dom::{DomError, NodeId};

/// Errors raised while registering, initialising or driving components
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error("{component}: missing required element `{selector}`")]
    MissingElement {
        component: &'static str,
        selector: String,
    },

    #[error("component `{0}` is already registered")]
    AlreadyRegistered(&'static str),

    #[error("{component}: no group `{id}`")]
    UnknownGroup { component: &'static str, id: String },

    #[error("{component}: element {element:?} does not belong to this instance")]
    ForeignElement {
        component: &'static str,
        element: NodeId,
    },
}
