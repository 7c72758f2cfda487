//! In-memory presentation object model.
//!
//! This is the subset of a PresentationML document the tools work with:
//! slides built from a layout, placeholders, text boxes, pictures, charts,
//! and tables. The [`io`](crate::slidedeck::tools::io) module reads and writes it as PPTX.

use serde::{Deserialize, Serialize};

use crate::slidedeck::tools::error::{Result, ToolError};
use crate::slidedeck::tools::model::layout::{LAYOUTS, resolve};

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// Position and size of a shape in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Frame {
    pub const fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Builds a frame from measurements in inches.
    pub fn inches(x: f64, y: f64, cx: f64, cy: f64) -> Self {
        let emu = |value: f64| (value * EMU_PER_INCH as f64).round() as i64;
        Self::new(emu(x), emu(y), emu(cx), emu(cy))
    }
}

/// Category of a placeholder, matching the `type` attribute of `<p:ph>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Title,
    CenterTitle,
    Subtitle,
    Body,
    Object,
    Chart,
    Table,
    ClipArt,
    Diagram,
    Media,
    Picture,
    SlideImage,
    Date,
    SlideNumber,
    Footer,
    Header,
}

impl PlaceholderKind {
    /// Parses the `type` attribute. A missing attribute means [`PlaceholderKind::Object`].
    pub fn from_xml(value: Option<&str>) -> Self {
        match value {
            Some("title") => Self::Title,
            Some("ctrTitle") => Self::CenterTitle,
            Some("subTitle") => Self::Subtitle,
            Some("body") => Self::Body,
            Some("chart") => Self::Chart,
            Some("tbl") => Self::Table,
            Some("clipArt") => Self::ClipArt,
            Some("dgm") => Self::Diagram,
            Some("media") => Self::Media,
            Some("pic") => Self::Picture,
            Some("sldImg") => Self::SlideImage,
            Some("dt") => Self::Date,
            Some("sldNum") => Self::SlideNumber,
            Some("ftr") => Self::Footer,
            Some("hdr") => Self::Header,
            _ => Self::Object,
        }
    }

    /// Value written to the `type` attribute, `None` for the implicit object type.
    pub fn xml_name(self) -> Option<&'static str> {
        Some(match self {
            Self::Title => "title",
            Self::CenterTitle => "ctrTitle",
            Self::Subtitle => "subTitle",
            Self::Body => "body",
            Self::Object => return None,
            Self::Chart => "chart",
            Self::Table => "tbl",
            Self::ClipArt => "clipArt",
            Self::Diagram => "dgm",
            Self::Media => "media",
            Self::Picture => "pic",
            Self::SlideImage => "sldImg",
            Self::Date => "dt",
            Self::SlideNumber => "sldNum",
            Self::Footer => "ftr",
            Self::Header => "hdr",
        })
    }

    /// Placeholders meant to hold pictures, charts, or other media rather
    /// than typed text. Empty ones are not reported by the validator.
    pub fn is_media(self) -> bool {
        matches!(
            self,
            Self::Object | Self::Chart | Self::ClipArt | Self::Diagram | Self::Media | Self::Picture
        )
    }

    /// Whether a slide placeholder of this kind is stamped with a text body.
    pub fn carries_text(self) -> bool {
        !matches!(self, Self::Picture | Self::Media | Self::ClipArt)
    }

    fn base_name(self) -> &'static str {
        match self {
            Self::Title | Self::CenterTitle => "Title",
            Self::Subtitle => "Subtitle",
            Self::Body => "Text Placeholder",
            Self::Object => "Content Placeholder",
            Self::Picture => "Picture Placeholder",
            Self::Chart => "Chart Placeholder",
            Self::Table => "Table Placeholder",
            _ => "Placeholder",
        }
    }
}

/// A run of text sharing one set of character properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    /// Latin typeface, e.g. `Calibri`.
    pub font: Option<String>,
    /// Solid fill colour as upper-case hex RGB.
    pub color: Option<String>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    /// Outline level, 0 for top-level bullets.
    pub level: u8,
}

impl Paragraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Text body of a shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFrame {
    pub paragraphs: Vec<Paragraph>,
}

impl TextFrame {
    pub fn from_text(text: &str) -> Self {
        let mut frame = Self::default();
        frame.set_text(text);
        frame
    }

    /// Replaces all content. Line feeds start new paragraphs.
    pub fn set_text(&mut self, text: &str) {
        self.paragraphs = text
            .split('\n')
            .map(|line| Paragraph {
                runs: if line.is_empty() { Vec::new() } else { vec![Run::new(line)] },
                level: 0,
            })
            .collect();
    }

    /// Appends a paragraph holding a single run.
    pub fn add_paragraph(&mut self, text: &str, level: u8) -> &mut Paragraph {
        self.paragraphs.push(Paragraph {
            runs: vec![Run::new(text)],
            level,
        });
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    /// Paragraph texts joined with line feeds.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty()
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.paragraphs.iter().flat_map(|paragraph| paragraph.runs.iter())
    }

    /// Applies typeface and colour to every run.
    pub fn style_runs(&mut self, font: Option<&str>, color: Option<&str>) {
        for run in self.paragraphs.iter_mut().flat_map(|p| p.runs.iter_mut()) {
            if let Some(font) = font {
                run.font = Some(font.to_string());
            }
            if let Some(color) = color {
                run.color = Some(color.trim_start_matches('#').to_ascii_uppercase());
            }
        }
    }
}

/// Image encodings accepted for picture shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// Detects the format from the leading magic bytes.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF8") {
            Some(Self::Gif)
        } else if bytes.starts_with(b"BM") {
            Some(Self::Bmp)
        } else if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            Some(Self::Tiff)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub description: String,
}

/// Supported chart families.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Clustered vertical bars.
    #[default]
    Column,
    /// Clustered horizontal bars.
    Bar,
    Line,
    Pie,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// Category/series dataset behind a chart shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub kind: ChartKind,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Placeholder {
        kind: PlaceholderKind,
        idx: u32,
        text: Option<TextFrame>,
    },
    TextBox(TextFrame),
    Picture(Picture),
    Chart(ChartData),
    /// Row-major cell texts.
    Table(Vec<Vec<String>>),
    /// Anything read from a file that the model does not represent.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: u32,
    pub name: String,
    /// Explicit geometry. Placeholders inherit theirs from the layout.
    pub frame: Option<Frame>,
    pub kind: ShapeKind,
}

impl Shape {
    pub fn text_frame(&self) -> Option<&TextFrame> {
        match &self.kind {
            ShapeKind::Placeholder { text, .. } => text.as_ref(),
            ShapeKind::TextBox(text) => Some(text),
            _ => None,
        }
    }

    pub fn text_frame_mut(&mut self) -> Option<&mut TextFrame> {
        match &mut self.kind {
            ShapeKind::Placeholder { text, .. } => text.as_mut(),
            ShapeKind::TextBox(text) => Some(text),
            _ => None,
        }
    }

    pub fn has_text_frame(&self) -> bool {
        self.text_frame().is_some()
    }

    /// Shape text, empty when the shape has no text body.
    pub fn text(&self) -> String {
        self.text_frame().map(TextFrame::text).unwrap_or_default()
    }

    pub fn placeholder_kind(&self) -> Option<PlaceholderKind> {
        match self.kind {
            ShapeKind::Placeholder { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// The title is the placeholder with index 0.
    pub fn is_title(&self) -> bool {
        matches!(self.kind, ShapeKind::Placeholder { idx: 0, .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    /// Index into the layout catalogue.
    pub layout: usize,
    pub shapes: Vec<Shape>,
}

impl Slide {
    /// Creates a slide stamped with the placeholders of `layout`.
    pub fn new(layout: usize) -> Self {
        let layout = resolve(i64::try_from(layout).ok());
        let mut slide = Self {
            layout,
            shapes: Vec::new(),
        };
        for placeholder in LAYOUTS[layout].placeholders {
            let id = slide.next_shape_id();
            slide.shapes.push(Shape {
                id,
                name: format!("{} {}", placeholder.kind.base_name(), id - 1),
                frame: None,
                kind: ShapeKind::Placeholder {
                    kind: placeholder.kind,
                    idx: placeholder.idx,
                    text: placeholder.kind.carries_text().then(|| TextFrame::from_text("")),
                },
            });
        }
        slide
    }

    /// Shape ids start at 2; id 1 belongs to the shape tree itself.
    pub fn next_shape_id(&self) -> u32 {
        self.shapes.iter().map(|shape| shape.id).max().unwrap_or(1) + 1
    }

    pub fn title(&self) -> Option<&Shape> {
        self.shapes.iter().find(|shape| shape.is_title())
    }

    pub fn title_mut(&mut self) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|shape| shape.is_title())
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Shape> {
        self.shapes
            .iter()
            .filter(|shape| matches!(shape.kind, ShapeKind::Placeholder { .. }))
    }

    /// The `position`-th placeholder in document order.
    pub fn placeholder_mut(&mut self, position: usize) -> Option<&mut Shape> {
        self.shapes
            .iter_mut()
            .filter(|shape| matches!(shape.kind, ShapeKind::Placeholder { .. }))
            .nth(position)
    }

    pub fn add_text_box(&mut self, text: &str, frame: Frame) -> &mut Shape {
        let id = self.next_shape_id();
        let kind = ShapeKind::TextBox(TextFrame::from_text(text));
        self.push_shape(format!("TextBox {}", id - 1), frame, kind)
    }

    pub fn add_picture(&mut self, picture: Picture, frame: Frame) -> &mut Shape {
        let id = self.next_shape_id();
        self.push_shape(format!("Picture {}", id - 1), frame, ShapeKind::Picture(picture))
    }

    pub fn add_chart(&mut self, chart: ChartData, frame: Frame) -> &mut Shape {
        let id = self.next_shape_id();
        self.push_shape(format!("Chart {}", id - 1), frame, ShapeKind::Chart(chart))
    }

    pub fn add_table(&mut self, cells: Vec<Vec<String>>, frame: Frame) -> &mut Shape {
        let id = self.next_shape_id();
        self.push_shape(format!("Table {}", id - 1), frame, ShapeKind::Table(cells))
    }

    fn push_shape(&mut self, name: String, frame: Frame, kind: ShapeKind) -> &mut Shape {
        let id = self.next_shape_id();
        self.shapes.push(Shape {
            id,
            name,
            frame: Some(frame),
            kind,
        });
        let last = self.shapes.len() - 1;
        &mut self.shapes[last]
    }
}

/// A whole presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    /// Slide width in EMUs.
    pub slide_width: i64,
    /// Slide height in EMUs.
    pub slide_height: i64,
    pub slides: Vec<Slide>,
}

impl Presentation {
    /// Creates an empty 10" x 7.5" presentation.
    pub fn new() -> Self {
        Self {
            slide_width: 9_144_000,
            slide_height: 6_858_000,
            slides: Vec::new(),
        }
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn add_slide(&mut self, layout: usize) -> &mut Slide {
        self.slides.push(Slide::new(layout));
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    /// Removes the slide at `index` (0-based).
    pub fn remove_slide(&mut self, index: usize) -> Result<Slide> {
        if index >= self.slides.len() {
            return Err(ToolError::SlideIndexOutOfRange {
                index,
                count: self.slides.len(),
            });
        }
        Ok(self.slides.remove(index))
    }
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slidedeck::tools::model::layout::{BLANK_LAYOUT, DEFAULT_LAYOUT};

    #[test]
    fn slide_gets_layout_placeholders() {
        let slide = Slide::new(DEFAULT_LAYOUT);
        let names: Vec<&str> = slide.shapes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Title 1", "Content Placeholder 2"]);
        assert!(slide.title().is_some());
    }

    #[test]
    fn blank_slide_has_no_title() {
        let mut slide = Slide::new(BLANK_LAYOUT);
        assert!(slide.title().is_none());
        let shape = slide.add_text_box("Caption", Frame::inches(0.5, 0.25, 9.0, 1.0));
        assert_eq!(shape.id, 2);
        assert_eq!(shape.name, "TextBox 1");
    }

    #[test]
    fn text_frame_splits_lines_into_paragraphs() {
        let frame = TextFrame::from_text("first\nsecond");
        assert_eq!(frame.paragraphs.len(), 2);
        assert_eq!(frame.text(), "first\nsecond");
        assert!(TextFrame::from_text("  ").is_blank());
    }

    #[test]
    fn style_runs_normalises_colour() {
        let mut frame = TextFrame::from_text("styled");
        frame.style_runs(Some("Georgia"), Some("#ff8800"));
        let run = frame.runs().next().unwrap();
        assert_eq!(run.font.as_deref(), Some("Georgia"));
        assert_eq!(run.color.as_deref(), Some("FF8800"));
    }

    #[test]
    fn remove_slide_checks_bounds() {
        let mut presentation = Presentation::new();
        presentation.add_slide(DEFAULT_LAYOUT);
        let err = presentation.remove_slide(1).unwrap_err();
        assert!(matches!(err, ToolError::SlideIndexOutOfRange { index: 1, count: 1 }));
        presentation.remove_slide(0).unwrap();
        assert_eq!(presentation.slide_count(), 0);
    }

    #[test]
    fn image_format_detection() {
        assert_eq!(ImageFormat::detect(&[0x89, b'P', b'N', b'G', 0x0D]), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::detect(b"not an image"), None);
    }
}
