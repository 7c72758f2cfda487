use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::slidedeck::tools::error::{Result, ToolError};
use crate::slidedeck::tools::io::pptx_read::read_presentation;
use crate::slidedeck::tools::io::pptx_write::write_presentation;
use crate::slidedeck::tools::model::layout::resolve;
use crate::slidedeck::tools::model::{
    BLANK_LAYOUT, ChartData, ChartSpec, Frame, ImageFormat, Picture, Presentation, STATUS_GENERATED,
    Series, Shape, Slide, SlideDescriptor,
};
use crate::slidedeck::tools::store::DeckStore;

/// Title used when a descriptor does not carry one.
pub const DEFAULT_TITLE: &str = "Untitled Slide";

const TITLE_BOX_FRAME: (f64, f64, f64, f64) = (0.5, 0.25, 9.0, 1.0);
const IMAGE_FRAME: (f64, f64, f64, f64) = (1.0, 1.5, 8.0, 5.5);
const CHART_FRAME: (f64, f64, f64, f64) = (2.0, 2.0, 6.0, 4.5);
const TABLE_ORIGIN: (f64, f64) = (1.0, 2.0);
const TABLE_WIDTH: f64 = 8.0;
const TABLE_ROW_HEIGHT: f64 = 0.4;

fn frame((x, y, cx, cy): (f64, f64, f64, f64)) -> Frame {
    Frame::inches(x, y, cx, cy)
}

/// Builds a fresh presentation from `slides` and writes it to
/// `output/<name>.pptx`, replacing any previous output.
#[instrument(level = "info", skip(store, slides), fields(slide_count = slides.len()))]
pub fn create_deck(store: &DeckStore, name: &str, slides: &[SlideDescriptor]) -> Result<PathBuf> {
    store.existing(name)?;
    let mut presentation = Presentation::new();
    for descriptor in slides {
        build_slide(&mut presentation, descriptor)?;
    }
    save(store, name, &presentation)
}

/// Appends a blank slide holding an image from the deck's `assets/` folder
/// and a title text box. Starts a new presentation when none exists yet.
#[instrument(level = "info", skip(store))]
pub fn add_image_slide(
    store: &DeckStore,
    name: &str,
    title: &str,
    image_filename: &str,
) -> Result<PathBuf> {
    store.existing(name)?;
    let image_path = store.assets_dir(name).join(image_filename);
    if !image_path.is_file() {
        return Err(ToolError::AssetNotFound {
            deck: name.to_string(),
            asset: image_filename.to_string(),
        });
    }

    let data = fs::read(&image_path)?;
    let format = ImageFormat::detect(&data).ok_or_else(|| {
        ToolError::InvalidSlide(format!("'{image_filename}' is not a supported image format"))
    })?;
    debug!(?format, bytes = data.len(), "image loaded");

    let mut presentation = load_or_new(&store.output_path(name, "pptx"))?;
    let slide = presentation.add_slide(BLANK_LAYOUT);
    slide.add_picture(
        Picture {
            data,
            format,
            description: image_filename.to_string(),
        },
        frame(IMAGE_FRAME),
    );
    slide.add_text_box(title, frame(TITLE_BOX_FRAME));
    save(store, name, &presentation)
}

/// Appends one slide to the deck's presentation, creating it when absent.
#[instrument(level = "info", skip(store, descriptor))]
pub fn append_slide(
    store: &DeckStore,
    name: &str,
    descriptor: &SlideDescriptor,
) -> Result<PathBuf> {
    store.existing(name)?;
    let mut presentation = load_or_new(&store.output_path(name, "pptx"))?;
    build_slide(&mut presentation, descriptor)?;
    save(store, name, &presentation)
}

/// Drops the slide at the 0-based `index` and re-saves the presentation.
#[instrument(level = "info", skip(store))]
pub fn remove_slide(store: &DeckStore, name: &str, index: usize) -> Result<PathBuf> {
    store.existing(name)?;
    let output = store.output_path(name, "pptx");
    if !output.is_file() {
        return Err(ToolError::OutputNotFound(name.to_string()));
    }
    let mut presentation = read_presentation(&output)?;
    presentation.remove_slide(index)?;
    save(store, name, &presentation)
}

/// Adds a slide for `descriptor`.
///
/// The body is filled from the first matching source in the order chart,
/// table, bullet points, content. Layout indexes outside the catalogue
/// fall back to the default layout.
pub fn build_slide(presentation: &mut Presentation, descriptor: &SlideDescriptor) -> Result<()> {
    let color = descriptor.color.as_deref().map(hex_color).transpose()?;
    let layout = resolve(descriptor.layout);
    if descriptor.layout.is_some_and(|requested| requested != layout as i64) {
        warn!(requested = ?descriptor.layout, layout, "layout out of range, using default");
    }
    let mut slide = Slide::new(layout);

    if let Some(title) = slide.title_mut().and_then(Shape::text_frame_mut) {
        title.set_text(descriptor.title.as_deref().unwrap_or(DEFAULT_TITLE));
    }

    if let Some(chart) = &descriptor.chart {
        slide.add_chart(chart_data(chart)?, frame(CHART_FRAME));
    } else if let Some(grid) = &descriptor.table {
        let cells = table_cells(grid)?;
        let height = TABLE_ROW_HEIGHT * cells.len() as f64;
        let (x, y) = TABLE_ORIGIN;
        slide.add_table(cells, Frame::inches(x, y, TABLE_WIDTH, height));
    } else if let Some(body) = slide.placeholder_mut(1).and_then(Shape::text_frame_mut) {
        match descriptor.bullet_points.as_deref() {
            Some([first, rest @ ..]) => {
                body.set_text(first);
                for bullet in rest {
                    body.add_paragraph(bullet, 0);
                }
            }
            _ => body.set_text(descriptor.content.as_deref().unwrap_or_default()),
        }
        body.style_runs(descriptor.font.as_deref(), color.as_deref());
    }

    presentation.slides.push(slide);
    Ok(())
}

/// Accepts `RRGGBB` with an optional leading `#` and returns it upper-cased.
fn hex_color(color: &str) -> Result<String> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ToolError::InvalidSlide(format!(
            "color '{color}' is not a hex RGB value"
        )));
    }
    Ok(hex.to_ascii_uppercase())
}

fn chart_data(spec: &ChartSpec) -> Result<ChartData> {
    if spec.categories.is_empty() {
        return Err(ToolError::InvalidSlide("chart has no categories".into()));
    }
    if spec.series.is_empty() {
        return Err(ToolError::InvalidSlide("chart has no series".into()));
    }
    if let Some(series) = spec
        .series
        .iter()
        .find(|series| series.values.len() != spec.categories.len())
    {
        return Err(ToolError::InvalidSlide(format!(
            "series '{}' has {} values for {} categories",
            series.name,
            series.values.len(),
            spec.categories.len()
        )));
    }
    Ok(ChartData {
        kind: spec.kind,
        categories: spec.categories.clone(),
        series: spec
            .series
            .iter()
            .map(|series| Series {
                name: series.name.clone(),
                values: series.values.clone(),
            })
            .collect(),
    })
}

/// Renders the grid as text, padding short rows to the widest one.
fn table_cells(grid: &[Vec<Value>]) -> Result<Vec<Vec<String>>> {
    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return Err(ToolError::InvalidSlide("table has no cells".into()));
    }
    Ok(grid
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(cell_text).collect();
            cells.resize(columns, String::new());
            cells
        })
        .collect())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn load_or_new(path: &Path) -> Result<Presentation> {
    if path.is_file() {
        read_presentation(path)
    } else {
        Ok(Presentation::new())
    }
}

fn save(store: &DeckStore, name: &str, presentation: &Presentation) -> Result<PathBuf> {
    let output = store.output_path(name, "pptx");
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    write_presentation(&output, presentation)?;
    if let Err(error) = store.set_status(name, STATUS_GENERATED) {
        warn!(%error, "presentation written but deck status not updated");
    }
    info!(
        path = %output.display(),
        slide_count = presentation.slide_count(),
        "presentation written"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slidedeck::tools::model::{ChartKind, DEFAULT_LAYOUT, SeriesSpec, ShapeKind};
    use serde_json::json;

    fn descriptor(value: Value) -> SlideDescriptor {
        serde_json::from_value(value).unwrap()
    }

    fn body_text(slide: &Slide) -> String {
        slide.placeholders().nth(1).map(Shape::text).unwrap_or_default()
    }

    #[test]
    fn title_defaults_and_content_fill_the_body() {
        let mut presentation = Presentation::new();
        build_slide(&mut presentation, &descriptor(json!({"content": "hello"}))).unwrap();
        let slide = &presentation.slides[0];
        assert_eq!(slide.layout, DEFAULT_LAYOUT);
        assert_eq!(slide.title().map(Shape::text).as_deref(), Some(DEFAULT_TITLE));
        assert_eq!(body_text(slide), "hello");
    }

    #[test]
    fn bullets_win_over_content() {
        let mut presentation = Presentation::new();
        let slide = descriptor(json!({
            "title": "Agenda",
            "content": "ignored",
            "bullet_points": ["one", "two", "three"],
            "font": "Georgia",
        }));
        build_slide(&mut presentation, &slide).unwrap();
        let body = presentation.slides[0]
            .placeholders()
            .nth(1)
            .and_then(Shape::text_frame)
            .unwrap();
        assert_eq!(body.text(), "one\ntwo\nthree");
        assert!(body.paragraphs.iter().all(|p| p.level == 0));
        assert!(body.runs().all(|run| run.font.as_deref() == Some("Georgia")));
    }

    #[test]
    fn colors_must_be_hex_rgb() {
        let mut presentation = Presentation::new();
        for color in ["red", "#12345", "1234567", "#GG0000", ""] {
            let slide = descriptor(json!({"content": "x", "color": color}));
            let err = build_slide(&mut presentation, &slide).unwrap_err();
            assert!(matches!(err, ToolError::InvalidSlide(_)), "{color:?}");
        }
        assert_eq!(presentation.slide_count(), 0);

        build_slide(&mut presentation, &descriptor(json!({"content": "x", "color": "#a1b2c3"})))
            .unwrap();
        let body = presentation.slides[0]
            .placeholders()
            .nth(1)
            .and_then(Shape::text_frame)
            .unwrap();
        assert!(body.runs().all(|run| run.color.as_deref() == Some("A1B2C3")));
    }

    #[test]
    fn out_of_range_layouts_fall_back() {
        let mut presentation = Presentation::new();
        for layout in [-1, 11, 400] {
            build_slide(&mut presentation, &descriptor(json!({"title": "x", "layout": layout})))
                .unwrap();
        }
        assert!(presentation.slides.iter().all(|s| s.layout == DEFAULT_LAYOUT));
    }

    #[test]
    fn chart_takes_priority_and_is_checked() {
        let mut presentation = Presentation::new();
        let mut slide = SlideDescriptor::text("Sales", "ignored");
        slide.table = Some(vec![vec![json!("a")]]);
        slide.chart = Some(ChartSpec {
            categories: vec!["Q1".into(), "Q2".into()],
            series: vec![SeriesSpec {
                name: "2024".into(),
                values: vec![1.0, 2.0],
            }],
            kind: ChartKind::Bar,
        });
        build_slide(&mut presentation, &slide).unwrap();
        let shapes = &presentation.slides[0].shapes;
        let last = shapes.last().map(|s| &s.kind);
        assert!(matches!(last, Some(ShapeKind::Chart(c)) if c.kind == ChartKind::Bar));
        assert!(!shapes.iter().any(|s| matches!(s.kind, ShapeKind::Table(_))));

        if let Some(chart) = slide.chart.as_mut() {
            chart.series[0].values.pop();
        }
        let err = build_slide(&mut presentation, &slide).unwrap_err();
        assert!(matches!(err, ToolError::InvalidSlide(_)));
        assert_eq!(presentation.slide_count(), 1);
    }

    #[test]
    fn table_cells_are_padded_text() {
        let cells = table_cells(&[vec![json!("name"), json!(3), json!(null)], vec![json!(true)]])
            .unwrap();
        assert_eq!(cells, vec![vec!["name", "3", ""], vec!["true", "", ""]]);
        assert!(table_cells(&[vec![], vec![]]).is_err());
    }
}
