use std::collections::BTreeSet;
use std::path::Path;

use tracing::{info, instrument, warn};

use crate::slidedeck::tools::io::pptx_read::read_presentation;
use crate::slidedeck::tools::model::{CheckStatus, Presentation, Shape, TextFrame, ValidationReport};

/// Distinct typefaces tolerated before visual consistency is downgraded.
pub const MAX_FONTS: usize = 3;

/// Inspects a presentation file and reports structural and visual issues.
///
/// Never fails: a missing or unreadable file produces an invalid report.
/// Title and placeholder issues are recorded without invalidating the report.
#[instrument(level = "info", fields(path = %path.display()))]
pub fn validate_pptx(path: &Path) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !path.exists() {
        report.fail("File does not exist.");
        report.structural_integrity = CheckStatus::Failed;
        return report;
    }

    match read_presentation(path) {
        Ok(presentation) => inspect(&presentation, &mut report),
        Err(error) => {
            warn!(%error, "presentation could not be parsed");
            report.fail(format!("Failed to parse PPTX file: {error}"));
            report.structural_integrity = CheckStatus::Failed;
        }
    }

    info!(
        valid = report.valid,
        slide_count = report.slide_count,
        issue_count = report.issues.len(),
        "validation finished"
    );
    report
}

/// Runs every check over an already loaded presentation.
pub fn inspect(presentation: &Presentation, report: &mut ValidationReport) {
    report.slide_count = presentation.slide_count();
    if report.slide_count == 0 {
        report.fail("Presentation has no slides.");
    }

    let mut fonts = BTreeSet::new();
    let mut colors = BTreeSet::new();

    for (position, slide) in presentation.slides.iter().enumerate() {
        let number = position + 1;

        let titled = slide
            .title()
            .is_some_and(|title| !title.text().trim().is_empty());
        if !titled {
            report.issues.push(format!("Slide {number}: Missing or empty title."));
        }

        for placeholder in slide.placeholders() {
            let empty = placeholder.text_frame().is_none_or(|text| text.is_blank());
            let media = placeholder.placeholder_kind().is_some_and(|kind| kind.is_media());
            if empty && !media {
                report.issues.push(format!(
                    "Slide {number}: Placeholder '{}' is empty.",
                    placeholder.name
                ));
                report.structural_integrity = CheckStatus::Warning;
            }
        }

        let runs = slide
            .shapes
            .iter()
            .filter_map(Shape::text_frame)
            .flat_map(TextFrame::runs);
        for run in runs {
            if let Some(font) = run.font.as_deref().filter(|font| !font.is_empty()) {
                fonts.insert(font.to_string());
            }
            if let Some(color) = &run.color {
                colors.insert(color.clone());
            }
        }
    }

    if fonts.len() > MAX_FONTS {
        let listed = fonts.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
        report
            .issues
            .push(format!("High font variety ({} found): {listed}", fonts.len()));
        report.visual_consistency = CheckStatus::Warning;
    }

    report.fonts = fonts.into_iter().collect();
    report.colors = colors.into_iter().collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slidedeck::tools::model::{BLANK_LAYOUT, DEFAULT_LAYOUT, Frame};

    fn titled_slide(presentation: &mut Presentation, title: &str, body: &str, font: &str) {
        let slide = presentation.add_slide(DEFAULT_LAYOUT);
        if let Some(text) = slide.title_mut().and_then(Shape::text_frame_mut) {
            text.set_text(title);
        }
        if let Some(text) = slide.placeholder_mut(1).and_then(Shape::text_frame_mut) {
            text.set_text(body);
            text.style_runs(Some(font), Some("1F4E79"));
        }
    }

    #[test]
    fn empty_presentation_is_invalid() {
        let mut report = ValidationReport::default();
        inspect(&Presentation::new(), &mut report);
        assert!(!report.valid);
        assert_eq!(report.issues, vec!["Presentation has no slides."]);
    }

    #[test]
    fn blank_title_is_reported_but_not_fatal() {
        let mut presentation = Presentation::new();
        titled_slide(&mut presentation, "  ", "body", "Arial");
        let mut report = ValidationReport::default();
        inspect(&presentation, &mut report);

        assert!(report.valid);
        assert!(report.issues.contains(&"Slide 1: Missing or empty title.".to_string()));
        assert!(report.issues.contains(&"Slide 1: Placeholder 'Title 1' is empty.".to_string()));
        assert_eq!(report.structural_integrity, CheckStatus::Warning);
    }

    #[test]
    fn empty_content_placeholders_are_exempt() {
        let mut presentation = Presentation::new();
        titled_slide(&mut presentation, "Title", "", "Arial");
        let mut report = ValidationReport::default();
        inspect(&presentation, &mut report);
        assert!(report.issues.is_empty(), "{:?}", report.issues);
        assert_eq!(report.structural_integrity, CheckStatus::Passed);
    }

    #[test]
    fn text_box_slides_lack_a_title() {
        let mut presentation = Presentation::new();
        presentation
            .add_slide(BLANK_LAYOUT)
            .add_text_box("Caption", Frame::inches(0.5, 0.25, 9.0, 1.0));
        let mut report = ValidationReport::default();
        inspect(&presentation, &mut report);
        assert_eq!(report.issues, vec!["Slide 1: Missing or empty title."]);
    }

    #[test]
    fn font_variety_threshold() {
        let mut presentation = Presentation::new();
        for font in ["Arial", "Georgia", "Verdana"] {
            titled_slide(&mut presentation, "T", "x", font);
        }
        let mut report = ValidationReport::default();
        inspect(&presentation, &mut report);
        assert_eq!(report.visual_consistency, CheckStatus::Passed);
        assert_eq!(report.colors, vec!["1F4E79"]);

        titled_slide(&mut presentation, "T", "x", "Calibri");
        let mut report = ValidationReport::default();
        inspect(&presentation, &mut report);
        assert_eq!(report.visual_consistency, CheckStatus::Warning);
        assert_eq!(
            report.issues,
            vec!["High font variety (4 found): Arial, Calibri, Georgia, Verdana"]
        );
        assert!(report.valid);
    }
}
