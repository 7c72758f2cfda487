//! Fixed parts of the built-in template: theme, slide master, layouts and
//! the small property parts every package carries.

use chrono::{DateTime, SecondsFormat, Utc};

use super::{NS_A, NS_P, NS_R, XML_DECL, escape_xml};
use crate::slidedeck::tools::model::document::Frame;
use crate::slidedeck::tools::model::layout::{LAYOUTS, Layout, LayoutPlaceholder};

/// `type` attribute of `<p:sldLayout>` for each catalogue entry.
const LAYOUT_TYPES: [&str; 11] = [
    "title",
    "obj",
    "secHead",
    "twoObj",
    "twoTxTwoObj",
    "titleOnly",
    "blank",
    "objTx",
    "picTx",
    "vertTx",
    "vertTitleAndTx",
];

/// Opening of an empty `<p:spTree>` with its mandatory group properties.
pub(crate) const SP_TREE_OPEN: &str = concat!(
    "<p:spTree><p:nvGrpSpPr><p:cNvPr id=\"1\" name=\"\"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>",
    "<p:grpSpPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"0\" cy=\"0\"/>",
    "<a:chOff x=\"0\" y=\"0\"/><a:chExt cx=\"0\" cy=\"0\"/></a:xfrm></p:grpSpPr>"
);

pub(crate) fn xfrm(tag: &str, frame: &Frame) -> String {
    format!(
        r#"<{tag}><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></{tag}>"#,
        frame.x, frame.y, frame.cx, frame.cy
    )
}

/// `<p:ph>` element for a placeholder.
pub(crate) fn ph_element(kind: Option<&str>, idx: u32) -> String {
    let mut element = String::from("<p:ph");
    if let Some(kind) = kind {
        element.push_str(&format!(r#" type="{kind}""#));
    }
    if idx != 0 {
        element.push_str(&format!(r#" idx="{idx}""#));
    }
    element.push_str("/>");
    element
}

fn layout_placeholder_xml(id: u32, placeholder: &LayoutPlaceholder) -> String {
    let name = match placeholder.kind.xml_name() {
        Some("title") | Some("ctrTitle") => "Title".to_string(),
        _ => format!("Placeholder {}", id - 1),
    };
    format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name}"/>"#,
            r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr>"#,
            r#"<p:spPr>{xfrm}</p:spPr>"#,
            r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#
        ),
        id = id,
        name = name,
        ph = ph_element(placeholder.kind.xml_name(), placeholder.idx),
        xfrm = xfrm("a:xfrm", &placeholder.frame),
    )
}

pub(crate) fn slide_layout_xml(index: usize, layout: &Layout) -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="{}" preserve="1">"#,
        LAYOUT_TYPES[index]
    ));
    xml.push_str(&format!(r#"<p:cSld name="{}">"#, escape_xml(layout.name)));
    xml.push_str(SP_TREE_OPEN);
    for (offset, placeholder) in layout.placeholders.iter().enumerate() {
        xml.push_str(&layout_placeholder_xml(offset as u32 + 2, placeholder));
    }
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>");
    xml
}

/// Slide master referencing every layout as `rId1..rId11` and the theme after them.
pub(crate) fn slide_master_xml() -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">"#
    ));
    xml.push_str(r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>"#);
    xml.push_str(SP_TREE_OPEN);
    let title = &LAYOUTS[1].placeholders[0];
    let body = &LAYOUTS[1].placeholders[1];
    xml.push_str(&layout_placeholder_xml(2, title));
    xml.push_str(&format!(
        concat!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Text Placeholder 2"/>"#,
            r#"<p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph type="body" idx="1"/></p:nvPr></p:nvSpPr>"#,
            r#"<p:spPr>{}</p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#
        ),
        xfrm("a:xfrm", &body.frame)
    ));
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str(concat!(
        r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
        r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#
    ));
    xml.push_str("<p:sldLayoutIdLst>");
    for index in 0..LAYOUTS.len() {
        xml.push_str(&format!(
            r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
            2_147_483_649u64 + index as u64,
            index + 1
        ));
    }
    xml.push_str("</p:sldLayoutIdLst>");
    xml.push_str(concat!(
        "<p:txStyles>",
        r#"<p:titleStyle><a:lvl1pPr algn="ctr"><a:defRPr sz="4400"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill>"#,
        r#"<a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle>"#,
        r#"<p:bodyStyle><a:lvl1pPr marL="342900" indent="-342900"><a:buChar char="&#8226;"/><a:defRPr sz="3200">"#,
        r#"<a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr>"#,
        r#"<a:lvl2pPr marL="742950" indent="-285750"><a:buChar char="&#8211;"/><a:defRPr sz="2800">"#,
        r#"<a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl2pPr></p:bodyStyle>"#,
        r#"<p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill>"#,
        r#"<a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr></p:otherStyle>"#,
        "</p:txStyles></p:sldMaster>"
    ));
    xml
}

pub(crate) fn theme_xml() -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<a:theme xmlns:a="{NS_A}" name="Office Theme">"#));
    xml.push_str(concat!(
        "<a:themeElements>",
        r#"<a:clrScheme name="Office">"#,
        r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
        r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#,
        r#"<a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2>"#,
        r#"<a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2>"#,
        r#"<a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4>"#,
        r#"<a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6>"#,
        r#"<a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink>"#,
        "</a:clrScheme>",
        r#"<a:fontScheme name="Office">"#,
        r#"<a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
        r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
        "</a:fontScheme>",
        r#"<a:fmtScheme name="Office">"#,
        "<a:fillStyleLst>",
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="50000"/></a:schemeClr></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="80000"/></a:schemeClr></a:solidFill>"#,
        "</a:fillStyleLst>",
        "<a:lnStyleLst>",
        r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/></a:ln>"#,
        r#"<a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/></a:ln>"#,
        r#"<a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:prstDash val="solid"/></a:ln>"#,
        "</a:lnStyleLst>",
        "<a:effectStyleLst>",
        "<a:effectStyle><a:effectLst/></a:effectStyle>",
        "<a:effectStyle><a:effectLst/></a:effectStyle>",
        "<a:effectStyle><a:effectLst/></a:effectStyle>",
        "</a:effectStyleLst>",
        "<a:bgFillStyleLst>",
        r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="95000"/></a:schemeClr></a:solidFill>"#,
        r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="90000"/></a:schemeClr></a:solidFill>"#,
        "</a:bgFillStyleLst>",
        "</a:fmtScheme>",
        "</a:themeElements>",
        "<a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"
    ));
    xml
}

pub(crate) fn pres_props_xml() -> String {
    format!(
        r#"{XML_DECL}<p:presentationPr xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"/>"#
    )
}

pub(crate) fn view_props_xml() -> String {
    format!(
        concat!(
            r#"{decl}<p:viewPr xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">"#,
            r#"<p:slideViewPr><p:cSldViewPr><p:cViewPr varScale="1"><p:scale><a:sx n="100" d="100"/>"#,
            r#"<a:sy n="100" d="100"/></p:scale><p:origin x="0" y="0"/></p:cViewPr></p:cSldViewPr></p:slideViewPr>"#,
            r#"<p:gridSpacing cx="76200" cy="76200"/></p:viewPr>"#
        ),
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
    )
}

pub(crate) fn table_styles_xml() -> String {
    format!(
        r#"{XML_DECL}<a:tblStyleLst xmlns:a="{NS_A}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#
    )
}

pub(crate) fn app_xml(slide_count: usize) -> String {
    format!(
        concat!(
            r#"{decl}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
            r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            "<Application>slidedeck-tools</Application><PresentationFormat>On-screen Show (4:3)</PresentationFormat>",
            "<Slides>{slides}</Slides></Properties>"
        ),
        decl = XML_DECL,
        slides = slide_count,
    )
}

pub(crate) fn core_xml(created: DateTime<Utc>) -> String {
    let stamp = created.to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        concat!(
            r#"{decl}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:creator>slidedeck-tools</dc:creator>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{stamp}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{stamp}</dcterms:modified>"#,
            "</cp:coreProperties>"
        ),
        decl = XML_DECL,
        stamp = stamp,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_part_names_itself() {
        let xml = slide_layout_xml(1, &LAYOUTS[1]);
        assert!(xml.contains(r#"type="obj""#));
        assert!(xml.contains(r#"<p:cSld name="Title and Content">"#));
        assert!(xml.contains(r#"<p:ph type="title"/>"#));
        assert!(xml.contains(r#"<p:ph idx="1"/>"#));
    }

    #[test]
    fn master_lists_all_layouts() {
        let xml = slide_master_xml();
        assert_eq!(xml.matches("<p:sldLayoutId ").count(), LAYOUTS.len());
    }

    #[test]
    fn table_styles_keeps_literal_braces() {
        assert!(table_styles_xml().contains("{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}"));
    }
}
