//! Chart parts: DrawingML chart XML plus the workbook that backs its data.

use std::io::Cursor;

use calamine::{DataType, Reader as _, Xlsx};
use quick_xml::Reader;
use quick_xml::events::Event;
use rust_xlsxwriter::Workbook;

use super::{NS_A, NS_C, NS_R, XML_DECL, escape_xml};
use crate::slidedeck::tools::error::{Result, ToolError};
use crate::slidedeck::tools::model::document::{ChartData, ChartKind, Series};

const SHEET: &str = "Sheet1";

/// Spreadsheet column letter for a zero-based column index.
fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Builds the embedded workbook: categories in column A, one column per series.
pub fn chart_workbook(chart: &ChartData) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET)?;

    for (row_idx, category) in chart.categories.iter().enumerate() {
        worksheet.write_string((row_idx + 1) as u32, 0, category)?;
    }
    for (col_idx, series) in chart.series.iter().enumerate() {
        let col = (col_idx + 1) as u16;
        worksheet.write_string(0, col, &series.name)?;
        for (row_idx, value) in series.values.iter().enumerate() {
            worksheet.write_number((row_idx + 1) as u32, col, *value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Recovers the dataset from an embedded workbook laid out by [`chart_workbook`].
///
/// Used for chart parts that carry formulas but no cached values.
pub fn read_chart_workbook(bytes: &[u8], kind: ChartKind) -> Result<ChartData> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ToolError::malformed("chart workbook has no sheets"))??;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| ToolError::malformed("chart workbook is empty"))?;
    let mut series: Vec<Series> = header
        .iter()
        .skip(1)
        .map(|cell| Series {
            name: cell_text(Some(cell)),
            values: Vec::new(),
        })
        .collect();

    let mut categories = Vec::new();
    for row in rows {
        categories.push(cell_text(row.first()));
        for (col_idx, column) in series.iter_mut().enumerate() {
            column.values.push(cell_number(row.get(col_idx + 1)));
        }
    }

    Ok(ChartData {
        kind,
        categories,
        series,
    })
}

fn cell_text(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn cell_number(cell: Option<&DataType>) -> f64 {
    match cell {
        Some(DataType::Float(value)) => *value,
        Some(DataType::Int(value)) => *value as f64,
        Some(DataType::String(value)) => value.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn str_cache(values: &[String]) -> String {
    let mut xml = format!(r#"<c:strCache><c:ptCount val="{}"/>"#, values.len());
    for (idx, value) in values.iter().enumerate() {
        xml.push_str(&format!(r#"<c:pt idx="{idx}"><c:v>{}</c:v></c:pt>"#, escape_xml(value)));
    }
    xml.push_str("</c:strCache>");
    xml
}

fn series_xml(kind: ChartKind, index: usize, series: &Series, categories: &[String]) -> String {
    let column = column_letter(index + 1);
    let last_row = categories.len() + 1;
    let mut xml = format!(r#"<c:ser><c:idx val="{index}"/><c:order val="{index}"/>"#);
    xml.push_str(&format!(
        "<c:tx><c:strRef><c:f>{SHEET}!${column}$1</c:f>{}</c:strRef></c:tx>",
        str_cache(std::slice::from_ref(&series.name))
    ));
    match kind {
        ChartKind::Column | ChartKind::Bar => xml.push_str(r#"<c:invertIfNegative val="0"/>"#),
        ChartKind::Line => xml.push_str(r#"<c:marker><c:symbol val="none"/></c:marker>"#),
        ChartKind::Pie => {}
    }
    xml.push_str(&format!(
        "<c:cat><c:strRef><c:f>{SHEET}!$A$2:$A${last_row}</c:f>{}</c:strRef></c:cat>",
        str_cache(categories)
    ));
    xml.push_str(&format!(
        r#"<c:val><c:numRef><c:f>{SHEET}!${column}$2:${column}${last_row}</c:f><c:numCache><c:formatCode>General</c:formatCode><c:ptCount val="{}"/>"#,
        series.values.len()
    ));
    for (idx, value) in series.values.iter().enumerate() {
        xml.push_str(&format!(r#"<c:pt idx="{idx}"><c:v>{value}</c:v></c:pt>"#));
    }
    xml.push_str("</c:numCache></c:numRef></c:val>");
    if kind == ChartKind::Line {
        xml.push_str(r#"<c:smooth val="0"/>"#);
    }
    xml.push_str("</c:ser>");
    xml
}

fn axes_xml(kind: ChartKind) -> String {
    let (cat_pos, val_pos) = if kind == ChartKind::Bar { ("l", "b") } else { ("b", "l") };
    format!(
        concat!(
            r#"<c:catAx><c:axId val="500000001"/><c:scaling><c:orientation val="minMax"/></c:scaling>"#,
            r#"<c:delete val="0"/><c:axPos val="{cat}"/><c:numFmt formatCode="General" sourceLinked="1"/>"#,
            r#"<c:tickLblPos val="nextTo"/><c:crossAx val="500000002"/><c:crosses val="autoZero"/></c:catAx>"#,
            r#"<c:valAx><c:axId val="500000002"/><c:scaling><c:orientation val="minMax"/></c:scaling>"#,
            r#"<c:delete val="0"/><c:axPos val="{val}"/><c:majorGridlines/><c:numFmt formatCode="General" sourceLinked="1"/>"#,
            r#"<c:tickLblPos val="nextTo"/><c:crossAx val="500000001"/><c:crosses val="autoZero"/></c:valAx>"#
        ),
        cat = cat_pos,
        val = val_pos,
    )
}

/// Serialises the chart part. The embedded workbook is relationship `rId1`.
pub fn chart_xml(chart: &ChartData) -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<c:chartSpace xmlns:c="{NS_C}" xmlns:a="{NS_A}" xmlns:r="{NS_R}">"#
    ));
    xml.push_str(r#"<c:date1904 val="0"/><c:roundedCorners val="0"/>"#);
    xml.push_str(r#"<c:chart><c:autoTitleDeleted val="0"/><c:plotArea><c:layout/>"#);

    let series: String = chart
        .series
        .iter()
        .enumerate()
        .map(|(index, series)| series_xml(chart.kind, index, series, &chart.categories))
        .collect();

    match chart.kind {
        ChartKind::Column | ChartKind::Bar => {
            let dir = if chart.kind == ChartKind::Bar { "bar" } else { "col" };
            xml.push_str(&format!(
                r#"<c:barChart><c:barDir val="{dir}"/><c:grouping val="clustered"/><c:varyColors val="0"/>{series}"#
            ));
            xml.push_str(r#"<c:gapWidth val="150"/><c:axId val="500000001"/><c:axId val="500000002"/></c:barChart>"#);
            xml.push_str(&axes_xml(chart.kind));
        }
        ChartKind::Line => {
            xml.push_str(&format!(
                r#"<c:lineChart><c:grouping val="standard"/><c:varyColors val="0"/>{series}"#
            ));
            xml.push_str(r#"<c:marker val="1"/><c:axId val="500000001"/><c:axId val="500000002"/></c:lineChart>"#);
            xml.push_str(&axes_xml(chart.kind));
        }
        ChartKind::Pie => {
            xml.push_str(&format!(
                r#"<c:pieChart><c:varyColors val="1"/>{series}<c:firstSliceAng val="0"/></c:pieChart>"#
            ));
        }
    }

    xml.push_str("</c:plotArea>");
    xml.push_str(r#"<c:legend><c:legendPos val="r"/><c:overlay val="0"/></c:legend>"#);
    xml.push_str(r#"<c:plotVisOnly val="1"/><c:dispBlanksAs val="gap"/></c:chart>"#);
    xml.push_str(r#"<c:externalData r:id="rId1"><c:autoUpdate val="0"/></c:externalData>"#);
    xml.push_str("</c:chartSpace>");
    xml
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Name,
    Categories,
    Values,
}

/// Recovers the dataset from a chart part's cached values.
pub fn parse_chart_xml(xml: &[u8]) -> Result<ChartData> {
    let mut reader = Reader::from_reader(xml);

    let mut kind = None;
    let mut categories: Vec<String> = Vec::new();
    let mut series: Vec<Series> = Vec::new();
    let mut current: Option<Series> = None;
    let mut series_categories: Vec<String> = Vec::new();
    let mut section = Section::None;
    let mut in_value = false;
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(ToolError::malformed)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"barChart" => kind = kind.or(Some(ChartKind::Column)),
                b"barDir" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"val" && attr.value.as_ref() == b"bar" {
                            kind = Some(ChartKind::Bar);
                        }
                    }
                }
                b"lineChart" => kind = kind.or(Some(ChartKind::Line)),
                b"pieChart" => kind = kind.or(Some(ChartKind::Pie)),
                b"ser" => {
                    current = Some(Series {
                        name: String::new(),
                        values: Vec::new(),
                    });
                    series_categories.clear();
                }
                b"tx" if current.is_some() => section = Section::Name,
                b"cat" => section = Section::Categories,
                b"val" => section = Section::Values,
                b"v" => {
                    in_value = true;
                    text.clear();
                }
                _ => {}
            },
            Event::Text(e) if in_value => {
                text.push_str(std::str::from_utf8(e.as_ref()).map_err(ToolError::malformed)?);
            }
            Event::GeneralRef(e) if in_value => {
                let name = std::str::from_utf8(e.as_ref()).map_err(ToolError::malformed)?;
                push_entity(&mut text, name);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" => {
                    in_value = false;
                    if let Some(series) = current.as_mut() {
                        match section {
                            Section::Name => series.name = text.clone(),
                            Section::Categories => series_categories.push(text.clone()),
                            Section::Values => series.values.push(
                                text.trim().parse::<f64>().map_err(ToolError::malformed)?,
                            ),
                            Section::None => {}
                        }
                    }
                }
                b"tx" | b"cat" | b"val" => section = Section::None,
                b"ser" => {
                    if let Some(done) = current.take() {
                        if categories.is_empty() {
                            categories = std::mem::take(&mut series_categories);
                        }
                        series.push(done);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let kind = kind.ok_or_else(|| ToolError::malformed("chart part has no supported plot"))?;
    Ok(ChartData {
        kind,
        categories,
        series,
    })
}

/// Appends the expansion of an entity reference (`amp`, `#38`, `#x26`).
pub(crate) fn push_entity(text: &mut String, name: &str) {
    if let Some(resolved) = quick_xml::escape::resolve_predefined_entity(name) {
        text.push_str(resolved);
        return;
    }
    let code = if let Some(hex) = name.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(decimal) = name.strip_prefix('#') {
        decimal.parse::<u32>().ok()
    } else {
        None
    };
    match code.and_then(char::from_u32) {
        Some(ch) => text.push(ch),
        None => {
            text.push('&');
            text.push_str(name);
            text.push(';');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: ChartKind) -> ChartData {
        ChartData {
            kind,
            categories: vec!["Q1".into(), "Q2 & Q3".into()],
            series: vec![
                Series {
                    name: "North".into(),
                    values: vec![1.5, 2.0],
                },
                Series {
                    name: "South".into(),
                    values: vec![3.0, 4.25],
                },
            ],
        }
    }

    #[test]
    fn column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }

    #[test]
    fn chart_xml_parses_back_for_every_kind() {
        for kind in [ChartKind::Column, ChartKind::Bar, ChartKind::Line, ChartKind::Pie] {
            let chart = sample(kind);
            let parsed = parse_chart_xml(chart_xml(&chart).as_bytes()).unwrap();
            assert_eq!(parsed, chart);
        }
    }

    #[test]
    fn workbook_is_a_zip_container() {
        let bytes = chart_workbook(&sample(ChartKind::Column)).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn workbook_holds_the_same_data() {
        let chart = sample(ChartKind::Line);
        let bytes = chart_workbook(&chart).unwrap();
        assert_eq!(read_chart_workbook(&bytes, ChartKind::Line).unwrap(), chart);
    }

    #[test]
    fn missing_plot_is_malformed() {
        let err = parse_chart_xml(b"<c:chartSpace><c:chart/></c:chartSpace>").unwrap_err();
        assert!(matches!(err, ToolError::MalformedDocument(_)));
    }
}
