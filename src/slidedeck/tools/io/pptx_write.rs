use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use chrono::Utc;
use tracing::debug;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::chart::{chart_workbook, chart_xml};
use super::template::{self, SP_TREE_OPEN, ph_element, xfrm};
use super::{NS_A, NS_P, NS_R, Relationship, XML_DECL, escape_xml, rel, relationships_xml};
use crate::slidedeck::tools::error::Result;
use crate::slidedeck::tools::model::document::{
    ChartData, Frame, ImageFormat, Paragraph, Presentation, Run, Shape, ShapeKind, Slide,
    TextFrame,
};
use crate::slidedeck::tools::model::layout::LAYOUTS;

const CT_PRESENTATION: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
const CT_LAYOUT: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_MASTER: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
const CT_PRES_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
const CT_VIEW_PROPS: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml";
const CT_TABLE_STYLES: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";
const CT_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const IMAGE_FORMATS: [ImageFormat; 5] = [
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
];

/// Writes the presentation to `path`, replacing any existing file.
pub fn write_presentation(path: &Path, presentation: &Presentation) -> Result<()> {
    let bytes = presentation_bytes(presentation)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Serialises the presentation into an in-memory PPTX package.
pub fn presentation_bytes(presentation: &Presentation) -> Result<Vec<u8>> {
    let mut package = PackageWriter::new();

    let mut overrides: Vec<(String, &'static str)> = vec![
        ("/ppt/presentation.xml".into(), CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml".into(), CT_MASTER),
        ("/ppt/theme/theme1.xml".into(), CT_THEME),
        ("/ppt/presProps.xml".into(), CT_PRES_PROPS),
        ("/ppt/viewProps.xml".into(), CT_VIEW_PROPS),
        ("/ppt/tableStyles.xml".into(), CT_TABLE_STYLES),
        ("/docProps/core.xml".into(), CT_CORE),
        ("/docProps/app.xml".into(), CT_APP),
    ];

    package.add(
        "_rels/.rels",
        relationships_xml(&[
            Relationship::new(1, rel::OFFICE_DOCUMENT, "ppt/presentation.xml"),
            Relationship::new(2, rel::CORE_PROPERTIES, "docProps/core.xml"),
            Relationship::new(3, rel::EXTENDED_PROPERTIES, "docProps/app.xml"),
        ])
        .as_bytes(),
    )?;
    package.add("docProps/core.xml", template::core_xml(Utc::now()).as_bytes())?;
    package.add("docProps/app.xml", template::app_xml(presentation.slide_count()).as_bytes())?;

    package.add("ppt/theme/theme1.xml", template::theme_xml().as_bytes())?;
    package.add("ppt/presProps.xml", template::pres_props_xml().as_bytes())?;
    package.add("ppt/viewProps.xml", template::view_props_xml().as_bytes())?;
    package.add("ppt/tableStyles.xml", template::table_styles_xml().as_bytes())?;

    let mut master_rels: Vec<Relationship> = (0..LAYOUTS.len())
        .map(|index| {
            Relationship::new(
                index + 1,
                rel::SLIDE_LAYOUT,
                format!("../slideLayouts/slideLayout{}.xml", index + 1),
            )
        })
        .collect();
    master_rels.push(Relationship::new(LAYOUTS.len() + 1, rel::THEME, "../theme/theme1.xml"));
    package.add("ppt/slideMasters/slideMaster1.xml", template::slide_master_xml().as_bytes())?;
    package.add(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        relationships_xml(&master_rels).as_bytes(),
    )?;

    for (index, layout) in LAYOUTS.iter().enumerate() {
        let number = index + 1;
        package.add(
            &format!("ppt/slideLayouts/slideLayout{number}.xml"),
            template::slide_layout_xml(index, layout).as_bytes(),
        )?;
        package.add(
            &format!("ppt/slideLayouts/_rels/slideLayout{number}.xml.rels"),
            relationships_xml(&[Relationship::new(
                1,
                rel::SLIDE_MASTER,
                "../slideMasters/slideMaster1.xml",
            )])
            .as_bytes(),
        )?;
        overrides.push((format!("/ppt/slideLayouts/slideLayout{number}.xml"), CT_LAYOUT));
    }

    let mut media_counter = 0usize;
    let mut chart_counter = 0usize;
    for (index, slide) in presentation.slides.iter().enumerate() {
        let number = index + 1;
        let mut relationships = vec![Relationship::new(
            1,
            rel::SLIDE_LAYOUT,
            format!("../slideLayouts/slideLayout{}.xml", slide.layout + 1),
        )];
        let mut shape_rels: Vec<Option<String>> = Vec::with_capacity(slide.shapes.len());

        for shape in &slide.shapes {
            let rel_id = match &shape.kind {
                ShapeKind::Picture(picture) => {
                    media_counter += 1;
                    let media = format!("image{media_counter}.{}", picture.format.extension());
                    package.add(&format!("ppt/media/{media}"), &picture.data)?;
                    let relationship = Relationship::new(
                        relationships.len() + 1,
                        rel::IMAGE,
                        format!("../media/{media}"),
                    );
                    let id = relationship.id.clone();
                    relationships.push(relationship);
                    Some(id)
                }
                ShapeKind::Chart(chart) => {
                    chart_counter += 1;
                    write_chart_part(&mut package, chart_counter, chart)?;
                    overrides.push((format!("/ppt/charts/chart{chart_counter}.xml"), CT_CHART));
                    let relationship = Relationship::new(
                        relationships.len() + 1,
                        rel::CHART,
                        format!("../charts/chart{chart_counter}.xml"),
                    );
                    let id = relationship.id.clone();
                    relationships.push(relationship);
                    Some(id)
                }
                _ => None,
            };
            shape_rels.push(rel_id);
        }

        package.add(
            &format!("ppt/slides/slide{number}.xml"),
            slide_xml(slide, &shape_rels).as_bytes(),
        )?;
        package.add(
            &format!("ppt/slides/_rels/slide{number}.xml.rels"),
            relationships_xml(&relationships).as_bytes(),
        )?;
        overrides.push((format!("/ppt/slides/slide{number}.xml"), CT_SLIDE));
    }

    let slide_count = presentation.slide_count();
    let mut presentation_rels = vec![Relationship::new(
        1,
        rel::SLIDE_MASTER,
        "slideMasters/slideMaster1.xml",
    )];
    for number in 1..=slide_count {
        presentation_rels.push(Relationship::new(
            number + 1,
            rel::SLIDE,
            format!("slides/slide{number}.xml"),
        ));
    }
    let next = slide_count + 2;
    presentation_rels.push(Relationship::new(next, rel::THEME, "theme/theme1.xml"));
    presentation_rels.push(Relationship::new(next + 1, rel::PRES_PROPS, "presProps.xml"));
    presentation_rels.push(Relationship::new(next + 2, rel::VIEW_PROPS, "viewProps.xml"));
    presentation_rels.push(Relationship::new(next + 3, rel::TABLE_STYLES, "tableStyles.xml"));

    package.add("ppt/presentation.xml", presentation_xml(presentation).as_bytes())?;
    package.add(
        "ppt/_rels/presentation.xml.rels",
        relationships_xml(&presentation_rels).as_bytes(),
    )?;
    package.add("[Content_Types].xml", content_types_xml(&overrides).as_bytes())?;

    debug!(
        slide_count,
        media_count = media_counter,
        chart_count = chart_counter,
        "presentation package assembled"
    );
    package.finish()
}

fn write_chart_part(package: &mut PackageWriter, number: usize, chart: &ChartData) -> Result<()> {
    let workbook = format!("Microsoft_Excel_Sheet{number}.xlsx");
    package.add(&format!("ppt/embeddings/{workbook}"), &chart_workbook(chart)?)?;
    package.add(&format!("ppt/charts/chart{number}.xml"), chart_xml(chart).as_bytes())?;
    package.add(
        &format!("ppt/charts/_rels/chart{number}.xml.rels"),
        relationships_xml(&[Relationship::new(
            1,
            rel::PACKAGE,
            format!("../embeddings/{workbook}"),
        )])
        .as_bytes(),
    )?;
    Ok(())
}

fn presentation_xml(presentation: &Presentation) -> String {
    let mut xml = String::with_capacity(1024);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1">"#
    ));
    xml.push_str(r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#);
    if !presentation.slides.is_empty() {
        xml.push_str("<p:sldIdLst>");
        for index in 0..presentation.slide_count() {
            xml.push_str(&format!(
                r#"<p:sldId id="{}" r:id="rId{}"/>"#,
                256 + index,
                index + 2
            ));
        }
        xml.push_str("</p:sldIdLst>");
    }
    xml.push_str(&format!(
        r#"<p:sldSz cx="{}" cy="{}" type="screen4x3"/><p:notesSz cx="6858000" cy="9144000"/>"#,
        presentation.slide_width, presentation.slide_height
    ));
    xml.push_str("</p:presentation>");
    xml
}

fn content_types_xml(overrides: &[(String, &'static str)]) -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    xml.push_str(&format!(r#"<Default Extension="xlsx" ContentType="{CT_XLSX}"/>"#));
    for format in IMAGE_FORMATS {
        xml.push_str(&format!(
            r#"<Default Extension="{}" ContentType="{}"/>"#,
            format.extension(),
            format.mime_type()
        ));
    }
    for (part, content_type) in overrides {
        xml.push_str(&format!(r#"<Override PartName="{part}" ContentType="{content_type}"/>"#));
    }
    xml.push_str("</Types>");
    xml
}

fn slide_xml(slide: &Slide, shape_rels: &[Option<String>]) -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">"#));
    xml.push_str("<p:cSld>");
    xml.push_str(SP_TREE_OPEN);
    for (shape, rel_id) in slide.shapes.iter().zip(shape_rels) {
        write_shape(&mut xml, shape, rel_id.as_deref());
    }
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    xml
}

fn c_nv_pr(shape: &Shape, description: Option<&str>) -> String {
    let mut element = format!(r#"<p:cNvPr id="{}" name="{}""#, shape.id, escape_xml(&shape.name));
    if let Some(description) = description {
        element.push_str(&format!(r#" descr="{}""#, escape_xml(description)));
    }
    element.push_str("/>");
    element
}

fn write_shape(xml: &mut String, shape: &Shape, rel_id: Option<&str>) {
    match &shape.kind {
        ShapeKind::Placeholder { kind, idx, text } => {
            xml.push_str("<p:sp><p:nvSpPr>");
            xml.push_str(&c_nv_pr(shape, None));
            xml.push_str(r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>"#);
            xml.push_str(&format!("<p:nvPr>{}</p:nvPr></p:nvSpPr>", ph_element(kind.xml_name(), *idx)));
            match &shape.frame {
                Some(frame) => xml.push_str(&format!("<p:spPr>{}</p:spPr>", xfrm("a:xfrm", frame))),
                None => xml.push_str("<p:spPr/>"),
            }
            if let Some(text) = text {
                write_text_body(xml, "p:txBody", text, "<a:bodyPr/>");
            }
            xml.push_str("</p:sp>");
        }
        ShapeKind::TextBox(text) => {
            xml.push_str("<p:sp><p:nvSpPr>");
            xml.push_str(&c_nv_pr(shape, None));
            xml.push_str(r#"<p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#);
            write_geometry(xml, shape.frame.as_ref());
            write_text_body(xml, "p:txBody", text, r#"<a:bodyPr wrap="square"><a:spAutoFit/></a:bodyPr>"#);
            xml.push_str("</p:sp>");
        }
        ShapeKind::Picture(picture) => {
            xml.push_str("<p:pic><p:nvPicPr>");
            xml.push_str(&c_nv_pr(shape, Some(&picture.description)));
            xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);
            xml.push_str(&format!(
                r#"<p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill>"#,
                rel_id.unwrap_or_default()
            ));
            write_geometry(xml, shape.frame.as_ref());
            xml.push_str("</p:pic>");
        }
        ShapeKind::Chart(_) => {
            write_graphic_frame_open(xml, shape, "");
            xml.push_str(r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart">"#);
            xml.push_str(&format!(
                r#"<c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" r:id="{}"/>"#,
                rel_id.unwrap_or_default()
            ));
            xml.push_str("</a:graphicData></a:graphic></p:graphicFrame>");
        }
        ShapeKind::Table(rows) => {
            write_graphic_frame_open(xml, shape, r#"<a:graphicFrameLocks noGrp="1"/>"#);
            xml.push_str(r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/table">"#);
            write_table(xml, rows, shape.frame.unwrap_or(Frame::new(0, 0, 0, 0)));
            xml.push_str("</a:graphicData></a:graphic></p:graphicFrame>");
        }
        ShapeKind::Other => {}
    }
}

fn write_geometry(xml: &mut String, frame: Option<&Frame>) {
    xml.push_str("<p:spPr>");
    if let Some(frame) = frame {
        xml.push_str(&xfrm("a:xfrm", frame));
    }
    xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#);
}

fn write_graphic_frame_open(xml: &mut String, shape: &Shape, locks: &str) {
    xml.push_str("<p:graphicFrame><p:nvGraphicFramePr>");
    xml.push_str(&c_nv_pr(shape, None));
    xml.push_str(&format!("<p:cNvGraphicFramePr>{locks}</p:cNvGraphicFramePr><p:nvPr/></p:nvGraphicFramePr>"));
    let frame = shape.frame.unwrap_or(Frame::new(0, 0, 0, 0));
    xml.push_str(&xfrm("p:xfrm", &frame));
}

fn write_table(xml: &mut String, rows: &[Vec<String>], frame: Frame) {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
    let row_count = rows.len().max(1);
    let column_width = frame.cx / columns as i64;
    let row_height = frame.cy / row_count as i64;

    xml.push_str(r#"<a:tbl><a:tblPr firstRow="1" bandRow="1"/><a:tblGrid>"#);
    for _ in 0..columns {
        xml.push_str(&format!(r#"<a:gridCol w="{column_width}"/>"#));
    }
    xml.push_str("</a:tblGrid>");
    for row in rows {
        xml.push_str(&format!(r#"<a:tr h="{row_height}">"#));
        for col in 0..columns {
            let cell = row.get(col).map(String::as_str).unwrap_or_default();
            xml.push_str("<a:tc>");
            write_text_body(xml, "a:txBody", &TextFrame::from_text(cell), "<a:bodyPr/>");
            xml.push_str("<a:tcPr/></a:tc>");
        }
        xml.push_str("</a:tr>");
    }
    xml.push_str("</a:tbl>");
}

fn write_text_body(xml: &mut String, tag: &str, text: &TextFrame, body_pr: &str) {
    xml.push_str(&format!("<{tag}>{body_pr}<a:lstStyle/>"));
    if text.paragraphs.is_empty() {
        xml.push_str("<a:p/>");
    }
    for paragraph in &text.paragraphs {
        write_paragraph(xml, paragraph);
    }
    xml.push_str(&format!("</{tag}>"));
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) {
    if paragraph.runs.is_empty() && paragraph.level == 0 {
        xml.push_str("<a:p/>");
        return;
    }
    xml.push_str("<a:p>");
    if paragraph.level > 0 {
        xml.push_str(&format!(r#"<a:pPr lvl="{}"/>"#, paragraph.level));
    }
    for run in &paragraph.runs {
        // Vertical tabs are soft line breaks inside a paragraph.
        for (position, segment) in run.text.split('\u{0B}').enumerate() {
            if position > 0 {
                xml.push_str("<a:br>");
                write_run_props(xml, run);
                xml.push_str("</a:br>");
            }
            if segment.is_empty() && position > 0 {
                continue;
            }
            xml.push_str("<a:r>");
            write_run_props(xml, run);
            xml.push_str(&format!("<a:t>{}</a:t></a:r>", escape_xml(segment)));
        }
    }
    xml.push_str("</a:p>");
}

fn write_run_props(xml: &mut String, run: &Run) {
    if run.font.is_none() && run.color.is_none() {
        xml.push_str(r#"<a:rPr lang="en-US" dirty="0"/>"#);
        return;
    }
    xml.push_str(r#"<a:rPr lang="en-US" dirty="0">"#);
    if let Some(color) = &run.color {
        xml.push_str(&format!(
            r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#,
            escape_xml(color)
        ));
    }
    if let Some(font) = &run.font {
        xml.push_str(&format!(r#"<a:latin typeface="{}"/>"#, escape_xml(font)));
    }
    xml.push_str("</a:rPr>");
}

/// Thin wrapper over the zip writer used for every part of the package.
struct PackageWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl PackageWriter {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    fn add(&mut self, name: &str, content: &[u8]) -> Result<()> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.zip.start_file(name, options)?;
        self.zip.write_all(content)?;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        Ok(self.zip.finish()?.into_inner())
    }
}
