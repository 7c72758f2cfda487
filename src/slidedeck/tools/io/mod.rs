pub mod chart;
pub mod pptx_read;
pub mod pptx_write;
pub(crate) mod template;

pub(crate) const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub(crate) const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub(crate) const NS_R: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const NS_C: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";
pub(crate) const NS_PKG_RELS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

pub(crate) const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Relationship type URIs used by the package.
pub(crate) mod rel {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const CHART: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
    pub const PACKAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/package";
    pub const PRES_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
    pub const VIEW_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";
    pub const TABLE_STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";
}

/// Escapes the five XML special characters. Control characters that XML 1.0
/// forbids are written as `_xHHHH_`, the OOXML escape for them.
pub(crate) fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(ch),
            control if (control as u32) < 0x20 => {
                escaped.push_str(&format!("_x{:04X}_", control as u32));
            }
            other => escaped.push(other),
        }
    }
    escaped
}

/// A single `<Relationship>` entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub kind: &'static str,
    pub target: String,
}

impl Relationship {
    pub fn new(id: usize, kind: &'static str, target: impl Into<String>) -> Self {
        Self {
            id: format!("rId{id}"),
            kind,
            target: target.into(),
        }
    }
}

/// Serialises a relationships part.
pub(crate) fn relationships_xml(relationships: &[Relationship]) -> String {
    let mut xml = String::with_capacity(256 + relationships.len() * 160);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(r#"<Relationships xmlns="{NS_PKG_RELS}">"#));
    for relationship in relationships {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            relationship.id,
            relationship.kind,
            escape_xml(&relationship.target)
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// Resolves a relationship target against the directory of its source part.
///
/// `base_dir` is the source part's directory without a trailing slash,
/// e.g. `ppt/slides`. Absolute targets (`/ppt/...`) ignore the base.
pub(crate) fn resolve_target(base_dir: &str, target: &str) -> String {
    let mut segments: Vec<&str> = if target.starts_with('/') {
        Vec::new()
    } else {
        base_dir.split('/').filter(|s| !s.is_empty()).collect()
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn control_characters_use_ooxml_escapes() {
        assert_eq!(escape_xml("a\u{1}b\u{1F}"), "a_x0001_b_x001F_");
        assert_eq!(escape_xml("tab\tline\n"), "tab\tline\n");
    }

    #[test]
    fn resolves_relative_targets() {
        assert_eq!(
            resolve_target("ppt/slides", "../slideLayouts/slideLayout2.xml"),
            "ppt/slideLayouts/slideLayout2.xml"
        );
        assert_eq!(resolve_target("ppt", "slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(resolve_target("", "/ppt/presentation.xml"), "ppt/presentation.xml");
    }

    #[test]
    fn relationships_part_lists_entries() {
        let xml = relationships_xml(&[Relationship::new(1, rel::SLIDE, "slides/slide1.xml")]);
        assert!(xml.contains(r#"Id="rId1""#));
        assert!(xml.contains("slides/slide1.xml"));
    }
}
