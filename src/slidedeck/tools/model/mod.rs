pub mod document;
pub mod layout;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use document::{
    ChartData, ChartKind, Frame, ImageFormat, Paragraph, Picture, PlaceholderKind, Presentation,
    Run, Series, Shape, ShapeKind, Slide, TextFrame,
};
pub use layout::{BLANK_LAYOUT, DEFAULT_LAYOUT, LAYOUTS, Layout, LayoutPlaceholder};

/// Status written into a freshly created deck.
pub const STATUS_INITIALIZED: &str = "initialized";
/// Status written once a presentation has been generated for the deck.
pub const STATUS_GENERATED: &str = "generated";

/// Contents of a deck's `config.json` descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Deck name. Always equal to the directory name.
    pub name: String,
    /// Free-form lifecycle marker (`initialized`, `generated`, ...).
    #[serde(default)]
    pub status: String,
    /// Creation timestamp. Decks written by older tooling may lack it.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Caller supplied metadata such as the deck's purpose.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Name of the deck this one was cloned from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloned_from: Option<String>,
    /// Keys written by other tools, kept as they are.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeckConfig {
    /// Creates the descriptor for a new deck stamped with the current time.
    pub fn new(name: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            status: STATUS_INITIALIZED.to_string(),
            created_at: Some(Utc::now()),
            metadata,
            cloned_from: None,
            extra: Map::new(),
        }
    }
}

/// Declarative description of one slide to generate.
///
/// Exactly one body kind is used per slide, checked in the order chart,
/// table, bullet points, plain content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlideDescriptor {
    /// Slide title. Absent titles become `Untitled Slide`.
    #[serde(default)]
    pub title: Option<String>,
    /// Plain body text.
    #[serde(default)]
    pub content: Option<String>,
    /// Index into the layout catalogue. Invalid values use the default layout.
    #[serde(default)]
    pub layout: Option<i64>,
    #[serde(default, alias = "bullets")]
    pub bullet_points: Option<Vec<String>>,
    #[serde(default)]
    pub chart: Option<ChartSpec>,
    /// Grid of cell values; non-string cells are rendered as text.
    #[serde(default)]
    pub table: Option<Vec<Vec<Value>>>,
    /// Typeface applied to body text runs.
    #[serde(default)]
    pub font: Option<String>,
    /// Hex RGB colour (`RRGGBB`) applied to body text runs.
    #[serde(default)]
    pub color: Option<String>,
}

impl SlideDescriptor {
    /// Shorthand for a title and content slide.
    pub fn text(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

/// Chart section of a [`SlideDescriptor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub categories: Vec<String>,
    pub series: Vec<SeriesSpec>,
    #[serde(default, alias = "type")]
    pub kind: ChartKind,
}

/// One named numeric series of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub name: String,
    pub values: Vec<f64>,
}

/// Check outcome recorded in a [`ValidationReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckStatus {
    Passed,
    Warning,
    Failed,
}

/// Result of inspecting a presentation file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<String>,
    pub slide_count: usize,
    pub structural_integrity: CheckStatus,
    pub visual_consistency: CheckStatus,
    /// Distinct typefaces found across all text runs, sorted.
    pub fonts: Vec<String>,
    /// Distinct run colours found across all text runs, sorted.
    pub colors: Vec<String>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            valid: true,
            issues: Vec::new(),
            slide_count: 0,
            structural_integrity: CheckStatus::Passed,
            visual_consistency: CheckStatus::Passed,
            fonts: Vec::new(),
            colors: Vec::new(),
        }
    }
}

impl ValidationReport {
    /// Marks the report invalid and records the reason.
    pub fn fail(&mut self, issue: impl Into<String>) {
        self.valid = false;
        self.issues.push(issue.into());
    }
}
