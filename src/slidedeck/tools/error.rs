use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur while
/// managing decks, writing presentations, or packaging output.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the zip container implementation.
    #[error("PPTX archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Errors bubbled up while reading the workbook embedded in a chart.
    #[error("chart workbook read error: {0}")]
    WorkbookRead(#[from] calamine::XlsxError),

    /// Errors bubbled up while building the workbook embedded in a chart.
    #[error("chart workbook error: {0}")]
    ChartWorkbook(#[from] rust_xlsxwriter::XlsxError),

    /// Raised when a deck directory does not exist.
    #[error("Deck '{0}' not found.")]
    DeckNotFound(String),

    /// Raised when creating or cloning onto a name that is already taken.
    #[error("Deck '{0}' already exists.")]
    DeckExists(String),

    /// Raised when a deck name cannot be mapped onto a single directory.
    #[error("invalid deck name '{0}'")]
    InvalidDeckName(String),

    /// Raised when a referenced file is missing from a deck's assets folder.
    #[error("Asset '{asset}' not found in {deck}/assets")]
    AssetNotFound { deck: String, asset: String },

    /// Raised when an operation needs generated output that does not exist yet.
    #[error("No generated deck found for '{0}'")]
    OutputNotFound(String),

    /// Raised when a slide descriptor or asset cannot be turned into a slide.
    #[error("invalid slide: {0}")]
    InvalidSlide(String),

    /// Raised when a presentation file cannot be parsed.
    #[error("malformed presentation: {0}")]
    MalformedDocument(String),

    /// Raised when a slide position does not exist in the presentation.
    #[error("slide index {index} out of range (deck has {count} slides)")]
    SlideIndexOutOfRange { index: usize, count: usize },

    /// Raised when the input path handed to the CLI does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Coarse classification of [`ToolError`] used by structured tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    MalformedDocument,
    IndexOutOfRange,
    InvalidInput,
    Io,
}

impl ToolError {
    /// Returns the taxonomy bucket the error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::DeckNotFound(_)
            | ToolError::AssetNotFound { .. }
            | ToolError::OutputNotFound(_)
            | ToolError::MissingInput(_) => ErrorKind::NotFound,
            ToolError::DeckExists(_) => ErrorKind::AlreadyExists,
            ToolError::MalformedDocument(_)
            | ToolError::Archive(_)
            | ToolError::WorkbookRead(_) => ErrorKind::MalformedDocument,
            ToolError::SlideIndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            ToolError::InvalidDeckName(_) | ToolError::InvalidSlide(_) | ToolError::Json(_) => {
                ErrorKind::InvalidInput
            }
            ToolError::Io(_) | ToolError::ChartWorkbook(_) | ToolError::Logging(_) => {
                ErrorKind::Io
            }
        }
    }

    pub(crate) fn malformed(error: impl std::fmt::Display) -> Self {
        ToolError::MalformedDocument(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(ToolError::DeckNotFound("a".into()).kind(), ErrorKind::NotFound);
        assert_eq!(ToolError::DeckExists("a".into()).kind(), ErrorKind::AlreadyExists);
        assert_eq!(
            ToolError::SlideIndexOutOfRange { index: 3, count: 1 }.kind(),
            ErrorKind::IndexOutOfRange
        );
        assert_eq!(ToolError::malformed("bad zip").kind(), ErrorKind::MalformedDocument);
    }

    #[test]
    fn kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&ErrorKind::IndexOutOfRange).unwrap();
        assert_eq!(json, "\"index_out_of_range\"");
    }
}
