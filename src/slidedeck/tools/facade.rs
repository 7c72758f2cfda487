//! Flat, agent-facing operations over the deck tools.
//!
//! Every operation returns a [`ToolOutput`] instead of a `Result`: the
//! outcome keeps an explicit ok/error discriminant and the typed
//! [`ErrorKind`], and [`ToolOutput::render`] produces the plain
//! `Success: ...` / `Error: ...` text expected by textual callers.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::slidedeck::tools::distribute::{export_to_pdf, package_assets};
use crate::slidedeck::tools::error::{ErrorKind, Result, ToolError};
use crate::slidedeck::tools::generate;
use crate::slidedeck::tools::model::SlideDescriptor;
use crate::slidedeck::tools::store::{DeckStore, validate_name};
use crate::slidedeck::tools::validate::validate_pptx;

/// Payload of a successful tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolValue {
    /// Human readable confirmation.
    Message(String),
    /// Structured result such as a deck listing or validation report.
    Data(Value),
}

/// Error side of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ToolError> for ToolFailure {
    fn from(error: &ToolError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Outcome of one tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Ok(ToolValue),
    Err(ToolFailure),
}

impl ToolOutput {
    fn message(result: Result<String>) -> Self {
        Self::from_result(result.map(ToolValue::Message))
    }

    fn data<T: Serialize>(result: Result<T>) -> Self {
        let data = result.and_then(|value| Ok(ToolValue::Data(serde_json::to_value(value)?)));
        Self::from_result(data)
    }

    fn from_result(result: Result<ToolValue>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(error) => {
                warn!(kind = ?error.kind(), %error, "tool call failed");
                Self::Err(ToolFailure::from(&error))
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Ok(_) => None,
            Self::Err(failure) => Some(failure.kind),
        }
    }

    /// Single-string form: the message, pretty JSON for structured
    /// results, or `Error: <message>`.
    pub fn render(&self) -> String {
        match self {
            Self::Ok(ToolValue::Message(message)) => message.clone(),
            Self::Ok(ToolValue::Data(value)) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Self::Err(failure) => format!("Error: {}", failure.message),
        }
    }

    /// Envelope with an explicit discriminant:
    /// `{"ok": true, "result": ...}` or `{"ok": false, "error": {"kind", "message"}}`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Ok(ToolValue::Message(message)) => json!({"ok": true, "result": message}),
            Self::Ok(ToolValue::Data(value)) => json!({"ok": true, "result": value}),
            Self::Err(failure) => json!({"ok": false, "error": failure}),
        }
    }
}

/// Tool surface bound to one deck root.
#[derive(Debug, Clone)]
pub struct DeckTools {
    store: DeckStore,
}

impl DeckTools {
    pub fn new(store: DeckStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &DeckStore {
        &self.store
    }

    /// Initialises a new deck folder, recording `purpose` in its metadata.
    pub fn create_deck(&self, name: &str, purpose: &str) -> ToolOutput {
        let mut metadata = Map::new();
        metadata.insert("purpose".into(), Value::from(purpose));
        ToolOutput::message(
            self.store
                .create(name, metadata)
                .map(|path| format!("Success: Deck '{name}' initialized at {}", path.display())),
        )
    }

    pub fn clone_deck(&self, source: &str, target: &str) -> ToolOutput {
        ToolOutput::message(self.store.clone_deck(source, target).map(|path| {
            format!(
                "Success: Deck '{source}' cloned to '{target}' at {}",
                path.display()
            )
        }))
    }

    pub fn delete_deck(&self, name: &str) -> ToolOutput {
        ToolOutput::message(
            self.store
                .delete(name)
                .map(|()| format!("Success: Deck '{name}' deleted")),
        )
    }

    /// Names of all decks as a JSON array.
    pub fn list_decks(&self) -> ToolOutput {
        ToolOutput::data(self.store.list())
    }

    pub fn generate_slides(&self, name: &str, slides: &[SlideDescriptor]) -> ToolOutput {
        ToolOutput::message(
            generate::create_deck(&self.store, name, slides)
                .map(|path| format!("Success: Slide deck generated at {}", path.display())),
        )
    }

    /// Validation report of the deck's generated presentation as JSON.
    pub fn validate_deck(&self, name: &str) -> ToolOutput {
        ToolOutput::data(
            validate_name(name).map(|()| validate_pptx(&self.store.output_path(name, "pptx"))),
        )
    }

    pub fn add_image_slide(&self, name: &str, title: &str, image_filename: &str) -> ToolOutput {
        ToolOutput::message(
            generate::add_image_slide(&self.store, name, title, image_filename)
                .map(|path| format!("Success: Image slide added to {}", path.display())),
        )
    }

    pub fn append_slide(&self, name: &str, slide: &SlideDescriptor) -> ToolOutput {
        ToolOutput::message(
            generate::append_slide(&self.store, name, slide)
                .map(|path| format!("Success: Slide appended to {}", path.display())),
        )
    }

    /// Removes the slide at the 0-based `index`.
    pub fn remove_slide(&self, name: &str, index: usize) -> ToolOutput {
        ToolOutput::message(
            generate::remove_slide(&self.store, name, index)
                .map(|path| format!("Success: Slide {index} removed from {}", path.display())),
        )
    }

    pub fn package_deck(&self, name: &str, target_dir: &Path) -> ToolOutput {
        ToolOutput::message(
            package_assets(&self.store, name, target_dir)
                .map(|path| format!("Success: Deck packaged at {}", path.display())),
        )
    }

    pub fn export_pdf(&self, name: &str) -> ToolOutput {
        ToolOutput::message(
            export_to_pdf(&self.store, name)
                .map(|path| format!("Success: Placeholder PDF written to {}", path.display())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_reports_success_then_conflict() {
        let dir = tempdir().unwrap();
        let tools = DeckTools::new(DeckStore::new(dir.path()));

        let first = tools.create_deck("pitch", "investors");
        assert!(first.render().starts_with("Success: Deck 'pitch' initialized at "));

        let second = tools.create_deck("pitch", "investors");
        assert_eq!(second.render(), "Error: Deck 'pitch' already exists.");
        assert_eq!(second.error_kind(), Some(ErrorKind::AlreadyExists));
        assert_eq!(
            second.to_json(),
            json!({
                "ok": false,
                "error": {"kind": "already_exists", "message": "Deck 'pitch' already exists."}
            })
        );
    }

    #[test]
    fn list_renders_json_array() {
        let dir = tempdir().unwrap();
        let tools = DeckTools::new(DeckStore::new(dir.path()));
        tools.create_deck("b", "");
        tools.create_deck("a", "");

        let listing = tools.list_decks();
        assert_eq!(listing.to_json(), json!({"ok": true, "result": ["a", "b"]}));
        let parsed: Vec<String> = serde_json::from_str(&listing.render()).unwrap();
        assert_eq!(parsed, vec!["a", "b"]);
    }

    #[test]
    fn validate_without_output_is_a_report() {
        let dir = tempdir().unwrap();
        let tools = DeckTools::new(DeckStore::new(dir.path()));
        let output = tools.validate_deck("ghost");
        assert!(output.is_ok());
        let report: Value = serde_json::from_str(&output.render()).unwrap();
        assert_eq!(report["valid"], false);
        assert_eq!(report["issues"], json!(["File does not exist."]));
    }

    #[test]
    fn validate_rejects_names_outside_the_root() {
        let dir = tempdir().unwrap();
        let tools = DeckTools::new(DeckStore::new(dir.path().join("decks")));
        for name in ["../../x", "..", "a/b"] {
            let output = tools.validate_deck(name);
            assert_eq!(output.error_kind(), Some(ErrorKind::InvalidInput), "{name:?}");
        }
    }
}
