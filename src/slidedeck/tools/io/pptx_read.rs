use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, warn};
use zip::ZipArchive;
use zip::result::ZipError;

use super::chart::{parse_chart_xml, push_entity, read_chart_workbook};
use super::rel;
use super::resolve_target;
use crate::slidedeck::tools::error::{Result, ToolError};
use crate::slidedeck::tools::model::document::{
    ChartData, Frame, ImageFormat, Paragraph, Picture, PlaceholderKind, Presentation, Run, Shape,
    ShapeKind, Slide, TextFrame,
};
use crate::slidedeck::tools::model::layout::{DEFAULT_LAYOUT, LAYOUTS};

/// Opens a PPTX file and loads it into the presentation model.
pub fn read_presentation(path: &Path) -> Result<Presentation> {
    let file = File::open(path)?;
    read_from(file)
}

/// Loads a presentation from an in-memory PPTX package.
pub fn presentation_from_bytes(bytes: Vec<u8>) -> Result<Presentation> {
    read_from(Cursor::new(bytes))
}

fn read_from<R: Read + Seek>(reader: R) -> Result<Presentation> {
    let archive = ZipArchive::new(reader)?;
    let mut package = PackageReader { archive };

    let root_rels = package.relationships("")?;
    let main_part = root_rels
        .values()
        .find(|(kind, _)| kind == rel::OFFICE_DOCUMENT)
        .map(|(_, target)| target.clone())
        .ok_or_else(|| ToolError::malformed("package has no presentation part"))?;

    let main_xml = package.part(&main_part)?;
    let (slide_ids, size) = parse_presentation_xml(&main_xml)?;
    let main_rels = package.relationships(&main_part)?;

    let mut presentation = Presentation::new();
    if let Some((cx, cy)) = size {
        presentation.slide_width = cx;
        presentation.slide_height = cy;
    }

    for rel_id in slide_ids {
        let slide_part = main_rels
            .get(&rel_id)
            .map(|(_, target)| target.clone())
            .ok_or_else(|| {
                ToolError::malformed(format!("slide relationship {rel_id} is dangling"))
            })?;
        let slide = read_slide(&mut package, &slide_part)?;
        presentation.slides.push(slide);
    }

    debug!(slide_count = presentation.slide_count(), "presentation loaded");
    Ok(presentation)
}

/// Relationship id → (type, resolved part name).
type RelationshipMap = HashMap<String, (String, String)>;

struct PackageReader<R> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> PackageReader<R> {
    fn part(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = self.archive.by_name(name).map_err(|error| match error {
            ZipError::FileNotFound => ToolError::malformed(format!("missing part '{name}'")),
            other => ToolError::Archive(other),
        })?;
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Reads the relationships of `part` (the package itself when empty).
    /// A part without a `.rels` file simply has no relationships.
    fn relationships(&mut self, part: &str) -> Result<RelationshipMap> {
        let (dir, file) = match part.rfind('/') {
            Some(pos) => (&part[..pos], &part[pos + 1..]),
            None => ("", part),
        };
        let rels_name = if dir.is_empty() {
            format!("_rels/{file}.rels")
        } else {
            format!("{dir}/_rels/{file}.rels")
        };
        let xml = match self.part(&rels_name) {
            Ok(xml) => xml,
            Err(ToolError::MalformedDocument(_)) => return Ok(RelationshipMap::new()),
            Err(other) => return Err(other),
        };
        parse_relationships(&xml, dir)
    }
}

fn attribute(element: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes().flatten() {
        if attr.key.local_name().as_ref() == local {
            let value = attr.unescape_value().map_err(ToolError::malformed)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn parse_relationships(xml: &[u8], base_dir: &str) -> Result<RelationshipMap> {
    let mut reader = Reader::from_reader(xml);
    let mut relationships = RelationshipMap::new();
    loop {
        match reader.read_event().map_err(ToolError::malformed)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if attribute(&e, b"TargetMode")?.as_deref() == Some("External") {
                    continue;
                }
                let id = attribute(&e, b"Id")?;
                let kind = attribute(&e, b"Type")?;
                let target = attribute(&e, b"Target")?;
                if let (Some(id), Some(kind), Some(target)) = (id, kind, target) {
                    relationships.insert(id, (kind, resolve_target(base_dir, &target)));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(relationships)
}

/// Returns the slide relationship ids in presentation order and the slide size.
fn parse_presentation_xml(xml: &[u8]) -> Result<(Vec<String>, Option<(i64, i64)>)> {
    let mut reader = Reader::from_reader(xml);
    let mut slide_ids = Vec::new();
    let mut size = None;
    loop {
        match reader.read_event().map_err(ToolError::malformed)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"sldId" => {
                    if let Some(id) = r_id(&e)? {
                        slide_ids.push(id);
                    }
                }
                b"sldSz" => {
                    let cx = attribute(&e, b"cx")?.and_then(|v| v.parse().ok());
                    let cy = attribute(&e, b"cy")?.and_then(|v| v.parse().ok());
                    if let (Some(cx), Some(cy)) = (cx, cy) {
                        size = Some((cx, cy));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok((slide_ids, size))
}

/// The namespaced `r:id` attribute, as opposed to a plain `id`.
fn r_id(element: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in element.attributes().flatten() {
        let key = attr.key.as_ref();
        if key.ends_with(b":id") || key.ends_with(b":embed") {
            let value = attr.unescape_value().map_err(ToolError::malformed)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn read_slide<R: Read + Seek>(package: &mut PackageReader<R>, part: &str) -> Result<Slide> {
    let xml = package.part(part)?;
    let relationships = package.relationships(part)?;

    let layout = relationships
        .values()
        .find(|(kind, _)| kind == rel::SLIDE_LAYOUT)
        .and_then(|(_, target)| layout_index(target))
        .unwrap_or(DEFAULT_LAYOUT);

    let mut shapes = Vec::new();
    for pending in SlideParser::default().parse(&xml)? {
        let kind = match pending.body {
            PendingBody::Ready(kind) => kind,
            PendingBody::Picture { rel_id, description } => {
                resolve_picture(package, &relationships, rel_id, description)?
            }
            PendingBody::Chart { rel_id } => resolve_chart(package, &relationships, rel_id)?,
        };
        shapes.push(Shape {
            id: pending.id,
            name: pending.name,
            frame: pending.frame,
            kind,
        });
    }

    Ok(Slide { layout, shapes })
}

fn layout_index(target: &str) -> Option<usize> {
    let file = target.rsplit('/').next()?;
    let number: usize = file
        .strip_prefix("slideLayout")?
        .strip_suffix(".xml")?
        .parse()
        .ok()?;
    number.checked_sub(1).filter(|index| *index < LAYOUTS.len())
}

fn resolve_picture<R: Read + Seek>(
    package: &mut PackageReader<R>,
    relationships: &RelationshipMap,
    rel_id: Option<String>,
    description: String,
) -> Result<ShapeKind> {
    let Some((_, target)) = rel_id.and_then(|id| relationships.get(&id)) else {
        warn!("picture without an image relationship");
        return Ok(ShapeKind::Other);
    };
    let data = package.part(target)?;
    match ImageFormat::detect(&data) {
        Some(format) => Ok(ShapeKind::Picture(Picture {
            data,
            format,
            description,
        })),
        None => {
            warn!(part = %target, "unsupported image encoding");
            Ok(ShapeKind::Other)
        }
    }
}

fn resolve_chart<R: Read + Seek>(
    package: &mut PackageReader<R>,
    relationships: &RelationshipMap,
    rel_id: Option<String>,
) -> Result<ShapeKind> {
    let Some((_, target)) = rel_id.and_then(|id| relationships.get(&id)) else {
        warn!("chart frame without a chart relationship");
        return Ok(ShapeKind::Other);
    };
    let xml = package.part(target)?;
    let chart = match parse_chart_xml(&xml) {
        Ok(chart) => chart,
        Err(error) => {
            warn!(part = %target, %error, "chart part not understood");
            return Ok(ShapeKind::Other);
        }
    };
    if has_cached_values(&chart) {
        return Ok(ShapeKind::Chart(chart));
    }

    let chart_rels = package.relationships(target)?;
    let Some((_, workbook)) = chart_rels.values().find(|(kind, _)| kind == rel::PACKAGE) else {
        return Ok(ShapeKind::Chart(chart));
    };
    debug!(part = %workbook, "chart has no cached values, reading embedded workbook");
    let bytes = package.part(workbook)?;
    Ok(ShapeKind::Chart(read_chart_workbook(&bytes, chart.kind)?))
}

fn has_cached_values(chart: &ChartData) -> bool {
    !chart.categories.is_empty()
        && !chart.series.is_empty()
        && chart.series.iter().all(|series| !series.values.is_empty())
}

enum PendingBody {
    Ready(ShapeKind),
    Picture {
        rel_id: Option<String>,
        description: String,
    },
    Chart {
        rel_id: Option<String>,
    },
}

struct PendingShape {
    id: u32,
    name: String,
    frame: Option<Frame>,
    body: PendingBody,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Element {
    Sp,
    Pic,
    GraphicFrame,
    Connector,
}

struct ShapeBuilder {
    element: Element,
    id: u32,
    name: String,
    description: String,
    placeholder: Option<(PlaceholderKind, u32)>,
    text_box: bool,
    frame: Option<Frame>,
    text: Option<TextFrame>,
    embed: Option<String>,
    chart: Option<String>,
    table: Option<Vec<Vec<String>>>,
}

impl ShapeBuilder {
    fn new(element: Element) -> Self {
        Self {
            element,
            id: 0,
            name: String::new(),
            description: String::new(),
            placeholder: None,
            text_box: false,
            frame: None,
            text: None,
            embed: None,
            chart: None,
            table: None,
        }
    }

    fn finish(self) -> PendingShape {
        let body = match (self.element, self.placeholder) {
            (Element::Sp, Some((kind, idx))) => {
                PendingBody::Ready(ShapeKind::Placeholder {
                    kind,
                    idx,
                    text: self.text,
                })
            }
            (Element::Pic, _) => PendingBody::Picture {
                rel_id: self.embed,
                description: self.description,
            },
            (Element::Sp, _) if self.text_box || self.text.is_some() => {
                PendingBody::Ready(ShapeKind::TextBox(self.text.unwrap_or_default()))
            }
            (Element::GraphicFrame, _) if self.table.is_some() => {
                PendingBody::Ready(ShapeKind::Table(self.table.unwrap_or_default()))
            }
            (Element::GraphicFrame, _) if self.chart.is_some() => PendingBody::Chart {
                rel_id: self.chart,
            },
            _ => PendingBody::Ready(ShapeKind::Other),
        };
        PendingShape {
            id: self.id,
            name: self.name,
            frame: self.frame,
            body,
        }
    }
}

/// Event-driven reader for the shape tree of one slide.
#[derive(Default)]
struct SlideParser {
    shapes: Vec<PendingShape>,
    current: Option<ShapeBuilder>,
    in_xfrm: bool,
    in_text_body: bool,
    in_run_props: bool,
    in_text: bool,
    in_table: bool,
    cell_paragraphs: usize,
}

impl SlideParser {
    fn parse(mut self, xml: &[u8]) -> Result<Vec<PendingShape>> {
        let mut reader = Reader::from_reader(xml);
        loop {
            match reader.read_event().map_err(ToolError::malformed)? {
                Event::Start(e) => self.open(&e, false)?,
                Event::Empty(e) => self.open(&e, true)?,
                Event::End(e) => self.close(e.local_name().as_ref()),
                Event::Text(e) if self.in_text => {
                    let text = std::str::from_utf8(e.as_ref()).map_err(ToolError::malformed)?;
                    self.push_text(text);
                }
                Event::GeneralRef(e) if self.in_text => {
                    let name = std::str::from_utf8(e.as_ref()).map_err(ToolError::malformed)?;
                    let mut expanded = String::new();
                    push_entity(&mut expanded, name);
                    self.push_text(&expanded);
                }
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(self.shapes)
    }

    fn open(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<()> {
        let local = e.local_name();
        let name = local.as_ref();

        let element = match name {
            b"sp" => Some(Element::Sp),
            b"pic" => Some(Element::Pic),
            b"graphicFrame" => Some(Element::GraphicFrame),
            b"cxnSp" => Some(Element::Connector),
            _ => None,
        };
        if let Some(element) = element {
            if self.current.is_none() {
                self.current = Some(ShapeBuilder::new(element));
            }
            return Ok(());
        }

        let in_table = self.in_table;
        let in_text_body = self.in_text_body;
        let in_run_props = self.in_run_props;
        let in_xfrm = self.in_xfrm;
        let Some(shape) = self.current.as_mut() else {
            return Ok(());
        };

        match name {
            b"cNvPr" => {
                shape.id = attribute(e, b"id")?.and_then(|v| v.parse().ok()).unwrap_or(0);
                shape.name = attribute(e, b"name")?.unwrap_or_default();
                shape.description = attribute(e, b"descr")?.unwrap_or_default();
            }
            b"cNvSpPr" => {
                shape.text_box = attribute(e, b"txBox")?.is_some_and(|v| v == "1" || v == "true");
            }
            b"ph" => {
                let kind = PlaceholderKind::from_xml(attribute(e, b"type")?.as_deref());
                let idx = attribute(e, b"idx")?.and_then(|v| v.parse().ok()).unwrap_or(0);
                shape.placeholder = Some((kind, idx));
            }
            b"xfrm" if !empty && !in_table => self.in_xfrm = true,
            b"off" if in_xfrm => {
                let frame = shape.frame.get_or_insert(Frame::new(0, 0, 0, 0));
                frame.x = attribute(e, b"x")?.and_then(|v| v.parse().ok()).unwrap_or(0);
                frame.y = attribute(e, b"y")?.and_then(|v| v.parse().ok()).unwrap_or(0);
            }
            b"ext" if in_xfrm => {
                let frame = shape.frame.get_or_insert(Frame::new(0, 0, 0, 0));
                frame.cx = attribute(e, b"cx")?.and_then(|v| v.parse().ok()).unwrap_or(0);
                frame.cy = attribute(e, b"cy")?.and_then(|v| v.parse().ok()).unwrap_or(0);
            }
            b"blip" => shape.embed = r_id(e)?,
            b"chart" => shape.chart = r_id(e)?,
            b"tbl" if !empty => {
                self.in_table = true;
                shape.table = Some(Vec::new());
            }
            b"tr" if in_table => {
                if let Some(table) = shape.table.as_mut() {
                    table.push(Vec::new());
                }
            }
            b"tc" if in_table => {
                if let Some(row) = shape.table.as_mut().and_then(|table| table.last_mut()) {
                    row.push(String::new());
                }
                self.cell_paragraphs = 0;
            }
            b"txBody" if !in_table => {
                shape.text = Some(TextFrame::default());
                self.in_text_body = !empty;
            }
            b"p" if in_table => {
                if self.cell_paragraphs > 0 {
                    if let Some(cell) = last_cell(shape) {
                        cell.push('\n');
                    }
                }
                self.cell_paragraphs += 1;
            }
            b"p" if in_text_body => {
                if let Some(text) = shape.text.as_mut() {
                    text.paragraphs.push(Paragraph::default());
                }
            }
            b"pPr" if in_text_body => {
                let level = attribute(e, b"lvl")?.and_then(|v| v.parse().ok()).unwrap_or(0);
                if let Some(paragraph) = shape.text.as_mut().and_then(|t| t.paragraphs.last_mut()) {
                    paragraph.level = level;
                }
            }
            b"r" | b"fld" if in_text_body => {
                if let Some(paragraph) = shape.text.as_mut().and_then(|t| t.paragraphs.last_mut()) {
                    paragraph.runs.push(Run::default());
                }
            }
            b"br" if in_table => {
                if let Some(cell) = last_cell(shape) {
                    cell.push('\u{0B}');
                }
            }
            b"br" if in_text_body => {
                if let Some(paragraph) = shape.text.as_mut().and_then(|t| t.paragraphs.last_mut()) {
                    paragraph.runs.push(Run::new("\u{0B}"));
                }
            }
            b"rPr" if in_text_body && !empty => self.in_run_props = true,
            b"latin" if in_run_props => {
                if let Some(run) = last_run(shape) {
                    run.font = attribute(e, b"typeface")?.filter(|v| !v.is_empty());
                }
            }
            b"srgbClr" if in_run_props => {
                if let Some(run) = last_run(shape) {
                    run.color = attribute(e, b"val")?.map(|v| v.to_ascii_uppercase());
                }
            }
            b"t" if !empty => self.in_text = true,
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"sp" | b"pic" | b"graphicFrame" | b"cxnSp" => {
                let matches = self.current.as_ref().is_some_and(|shape| {
                    matches!(
                        (shape.element, name),
                        (Element::Sp, b"sp")
                            | (Element::Pic, b"pic")
                            | (Element::GraphicFrame, b"graphicFrame")
                            | (Element::Connector, b"cxnSp")
                    )
                });
                if matches {
                    if let Some(shape) = self.current.take() {
                        self.shapes.push(shape.finish());
                    }
                    self.in_text_body = false;
                    self.in_table = false;
                }
            }
            b"xfrm" => self.in_xfrm = false,
            b"tbl" => self.in_table = false,
            b"txBody" if !self.in_table => self.in_text_body = false,
            b"rPr" => self.in_run_props = false,
            b"t" => self.in_text = false,
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        let in_table = self.in_table;
        let Some(shape) = self.current.as_mut() else {
            return;
        };
        if in_table {
            if let Some(cell) = last_cell(shape) {
                cell.push_str(text);
            }
        } else if let Some(run) = last_run(shape) {
            run.text.push_str(text);
        }
    }
}

fn last_cell(shape: &mut ShapeBuilder) -> Option<&mut String> {
    shape
        .table
        .as_mut()
        .and_then(|table| table.last_mut())
        .and_then(|row| row.last_mut())
}

fn last_run(shape: &mut ShapeBuilder) -> Option<&mut Run> {
    shape
        .text
        .as_mut()
        .and_then(|text| text.paragraphs.last_mut())
        .and_then(|paragraph| paragraph.runs.last_mut())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slidedeck::tools::io::pptx_write::presentation_bytes;
    use crate::slidedeck::tools::model::document::{ChartKind, Series};
    use crate::slidedeck::tools::model::layout::BLANK_LAYOUT;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    fn roundtrip(presentation: &Presentation) -> Presentation {
        presentation_from_bytes(presentation_bytes(presentation).unwrap()).unwrap()
    }

    #[test]
    fn placeholders_text_and_styles_survive() {
        let mut presentation = Presentation::new();
        let slide = presentation.add_slide(DEFAULT_LAYOUT);
        if let Some(title) = slide.title_mut().and_then(Shape::text_frame_mut) {
            title.set_text("Fish & Chips");
        }
        if let Some(body) = slide.placeholder_mut(1).and_then(Shape::text_frame_mut) {
            body.set_text("first");
            body.add_paragraph("second", 1);
            body.style_runs(Some("Verdana"), Some("00ff00"));
        }

        let restored = roundtrip(&presentation);
        assert_eq!(restored.slides, presentation.slides);
        let slide = &restored.slides[0];
        assert_eq!(slide.title().map(Shape::text).as_deref(), Some("Fish & Chips"));
    }

    #[test]
    fn pictures_charts_and_tables_survive() {
        let mut presentation = Presentation::new();
        let slide = presentation.add_slide(BLANK_LAYOUT);
        slide.add_picture(
            Picture {
                data: PNG.to_vec(),
                format: ImageFormat::Png,
                description: "logo.png".into(),
            },
            Frame::inches(1.0, 1.5, 8.0, 5.0),
        );
        slide.add_chart(
            ChartData {
                kind: ChartKind::Pie,
                categories: vec!["a".into(), "b".into()],
                series: vec![Series {
                    name: "share".into(),
                    values: vec![40.0, 60.0],
                }],
            },
            Frame::inches(2.0, 2.0, 6.0, 4.5),
        );
        slide.add_table(
            vec![vec!["h1".into(), "h2".into()], vec!["x".into(), "".into()]],
            Frame::inches(1.0, 2.0, 8.0, 1.5),
        );

        let restored = roundtrip(&presentation);
        assert_eq!(restored.slides[0].layout, BLANK_LAYOUT);
        assert_eq!(restored.slides, presentation.slides);
    }

    #[test]
    fn slide_order_and_size_are_kept() {
        let mut presentation = Presentation::new();
        for label in ["one", "two", "three"] {
            let slide = presentation.add_slide(5);
            if let Some(title) = slide.title_mut().and_then(Shape::text_frame_mut) {
                title.set_text(label);
            }
        }
        let restored = roundtrip(&presentation);
        let titles: Vec<String> = restored
            .slides
            .iter()
            .filter_map(|slide| slide.title().map(Shape::text))
            .collect();
        assert_eq!(titles, vec!["one", "two", "three"]);
        assert_eq!(restored.slide_width, 9_144_000);
    }

    #[test]
    fn control_characters_stay_well_formed() {
        let mut presentation = Presentation::new();
        let slide = presentation.add_slide(DEFAULT_LAYOUT);
        if let Some(title) = slide.title_mut().and_then(Shape::text_frame_mut) {
            title.set_text("T\u{0B}x");
        }
        if let Some(body) = slide.placeholder_mut(1).and_then(Shape::text_frame_mut) {
            body.set_text("a\u{01}b");
        }
        slide.add_table(vec![vec!["c\u{0B}d".into()]], Frame::inches(1.0, 2.0, 8.0, 0.4));

        let bytes = presentation_bytes(&presentation).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
        let mut xml = String::new();
        archive
            .by_name("ppt/slides/slide1.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        assert!(!xml.contains(['\u{01}', '\u{0B}']));
        assert!(xml.contains("<a:br>"));
        assert!(xml.contains("a_x0001_b"));

        let restored = presentation_from_bytes(bytes).unwrap();
        let slide = &restored.slides[0];
        assert_eq!(slide.title().map(Shape::text).as_deref(), Some("T\u{0B}x"));
        assert_eq!(slide.placeholders().nth(1).map(Shape::text).as_deref(), Some("a_x0001_b"));
        let cells = slide.shapes.iter().find_map(|shape| match &shape.kind {
            ShapeKind::Table(rows) => Some(rows.clone()),
            _ => None,
        });
        assert_eq!(cells, Some(vec![vec!["c\u{0B}d".to_string()]]));
    }

    #[test]
    fn oversized_entry_headers_are_not_trusted() {
        let mut bytes = presentation_bytes(&Presentation::new()).unwrap();
        let name = b"ppt/presentation.xml";
        let mut offset = 0;
        while let Some(found) = bytes[offset..]
            .windows(4)
            .position(|window| window == [0x50, 0x4B, 0x01, 0x02])
        {
            let header = offset + found;
            offset = header + 4;
            let Some(&[low, high]) = bytes.get(header + 28..header + 30) else {
                continue;
            };
            let name_len = u16::from_le_bytes([low, high]) as usize;
            if bytes.get(header + 46..header + 46 + name_len) == Some(&name[..]) {
                bytes[header + 24..header + 28].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());
            }
        }

        match presentation_from_bytes(bytes) {
            Ok(presentation) => assert_eq!(presentation.slide_count(), 0),
            Err(err) => assert!(matches!(
                err,
                ToolError::MalformedDocument(_) | ToolError::Archive(_) | ToolError::Io(_)
            )),
        }
    }

    #[test]
    fn garbage_is_not_a_presentation() {
        let err = presentation_from_bytes(b"definitely not a zip".to_vec()).unwrap_err();
        assert_eq!(err.kind(), crate::slidedeck::tools::error::ErrorKind::MalformedDocument);
    }

    #[test]
    fn layout_index_from_target() {
        assert_eq!(layout_index("ppt/slideLayouts/slideLayout7.xml"), Some(6));
        assert_eq!(layout_index("ppt/slideLayouts/slideLayout99.xml"), None);
        assert_eq!(layout_index("ppt/slideLayouts/custom.xml"), None);
    }
}
