//! Library configuration

use serde::{Deserialize, Serialize};

/// Configuration shared by every component a controller creates
///
/// Every field has a default, so a partial document deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Queue mutation records so removed elements get torn down and
    /// inserted markup gets initialised by `Controller::process_mutations`
    pub observe_mutations: bool,

    pub modal: ModalOptions,

    pub file_input: FileInputOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            observe_mutations: true,
            modal: ModalOptions::default(),
            file_input: FileInputOptions::default(),
        }
    }
}

/// Modal options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModalOptions {
    /// Close non-dialog modals on Escape
    pub close_on_escape: bool,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            close_on_escape: true,
        }
    }
}

/// File input options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileInputOptions {
    /// Preview placeholder shown when no file is selected
    pub preview_text: String,
}

impl Default for FileInputOptions {
    fn default() -> Self {
        Self {
            preview_text: "No file selected".to_string(),
        }
    }
}
