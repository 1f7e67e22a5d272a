//! Rivet Components
//!
//! Interactive widgets that attach behaviour to server-rendered markup
//! through data attributes.
//!
//! # Example
//! ```
//! use rivet_components::{Controller, Modal};
//! use rivet_dom::Document;
//!
//! let mut doc = Document::parse(r#"
//!     <button data-rvt-modal-trigger="hello">Open</button>
//!     <div data-rvt-modal="hello">
//!       <button data-rvt-modal-close="hello">Close</button>
//!     </div>
//! "#).unwrap();
//!
//! let mut controller = Controller::with_defaults().unwrap();
//! controller.init(&mut doc).unwrap();
//!
//! let root = doc.query_selector(doc.root(), "[data-rvt-modal]").unwrap().unwrap();
//! let modal = controller.instance::<Modal>(root).unwrap();
//! assert!(modal.open(&mut doc));
//! assert!(doc.is_visible(root));
//! ```

pub mod alert;
pub mod component;
pub mod config;
pub mod controller;
mod error;
pub mod file_input;
pub mod modal;
pub mod sidenav;
pub mod tabs;

pub use alert::Alert;
pub use component::{
    bind_method_to_element, dispatch_custom_event, Behavior, Component, ComponentDescriptor, Registry,
};
pub use config::{Config, FileInputOptions, ModalOptions};
pub use controller::{Controller, MutationSummary};
pub use error::ComponentError;
pub use file_input::FileInput;
pub use modal::Modal;
pub use sidenav::Sidenav;
pub use tabs::Tabs;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
