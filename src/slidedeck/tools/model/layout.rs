//! Built-in slide layout catalogue.
//!
//! The catalogue mirrors the eleven layouts of the standard 4:3 blank
//! template. Positions are in EMUs (914400 per inch) on a 10" x 7.5" slide.

use super::document::{Frame, PlaceholderKind};

/// Layout used when a descriptor names no layout or an invalid one.
pub const DEFAULT_LAYOUT: usize = 1;
/// Layout without any placeholders.
pub const BLANK_LAYOUT: usize = 6;

/// A placeholder a layout stamps onto every slide that uses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutPlaceholder {
    pub kind: PlaceholderKind,
    pub idx: u32,
    pub frame: Frame,
}

/// A named slide layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub name: &'static str,
    pub placeholders: &'static [LayoutPlaceholder],
}

impl Layout {
    /// Whether slides on this layout get a title placeholder.
    pub fn has_title(&self) -> bool {
        self.placeholders.iter().any(|ph| ph.idx == 0)
    }
}

const fn ph(kind: PlaceholderKind, idx: u32, x: i64, y: i64, cx: i64, cy: i64) -> LayoutPlaceholder {
    LayoutPlaceholder {
        kind,
        idx,
        frame: Frame::new(x, y, cx, cy),
    }
}

const TITLE: LayoutPlaceholder = ph(PlaceholderKind::Title, 0, 457200, 274638, 8229600, 1143000);
const CONTENT: LayoutPlaceholder = ph(PlaceholderKind::Object, 1, 457200, 1600200, 8229600, 4525963);

pub static LAYOUTS: [Layout; 11] = [
    Layout {
        name: "Title Slide",
        placeholders: &[
            ph(PlaceholderKind::CenterTitle, 0, 685800, 2130425, 7772400, 1470025),
            ph(PlaceholderKind::Subtitle, 1, 1371600, 3886200, 6400800, 1752600),
        ],
    },
    Layout {
        name: "Title and Content",
        placeholders: &[TITLE, CONTENT],
    },
    Layout {
        name: "Section Header",
        placeholders: &[
            ph(PlaceholderKind::Title, 0, 722313, 4406900, 7772400, 1362075),
            ph(PlaceholderKind::Body, 1, 722313, 2906713, 7772400, 1500187),
        ],
    },
    Layout {
        name: "Two Content",
        placeholders: &[
            TITLE,
            ph(PlaceholderKind::Object, 1, 457200, 1600200, 4038600, 4525963),
            ph(PlaceholderKind::Object, 2, 4648200, 1600200, 4038600, 4525963),
        ],
    },
    Layout {
        name: "Comparison",
        placeholders: &[
            TITLE,
            ph(PlaceholderKind::Body, 1, 457200, 1535113, 4040188, 639762),
            ph(PlaceholderKind::Object, 2, 457200, 2174875, 4040188, 3951288),
            ph(PlaceholderKind::Body, 3, 4645025, 1535113, 4041775, 639762),
            ph(PlaceholderKind::Object, 4, 4645025, 2174875, 4041775, 3951288),
        ],
    },
    Layout {
        name: "Title Only",
        placeholders: &[TITLE],
    },
    Layout {
        name: "Blank",
        placeholders: &[],
    },
    Layout {
        name: "Content with Caption",
        placeholders: &[
            ph(PlaceholderKind::Title, 0, 457200, 273050, 3008313, 1162050),
            ph(PlaceholderKind::Object, 1, 3575050, 273050, 5111750, 5853113),
            ph(PlaceholderKind::Body, 2, 457200, 1435100, 3008313, 4691063),
        ],
    },
    Layout {
        name: "Picture with Caption",
        placeholders: &[
            ph(PlaceholderKind::Title, 0, 1792288, 4800600, 5486400, 566738),
            ph(PlaceholderKind::Picture, 1, 1792288, 612775, 5486400, 4114800),
            ph(PlaceholderKind::Body, 2, 1792288, 5367338, 5486400, 804862),
        ],
    },
    Layout {
        name: "Title and Vertical Text",
        placeholders: &[TITLE, ph(PlaceholderKind::Body, 1, 457200, 1600200, 8229600, 4525963)],
    },
    Layout {
        name: "Vertical Title and Text",
        placeholders: &[
            ph(PlaceholderKind::Title, 0, 6629400, 274638, 2057400, 5851525),
            ph(PlaceholderKind::Body, 1, 457200, 274638, 6019800, 5851525),
        ],
    },
];

/// Resolves a requested layout index, falling back to [`DEFAULT_LAYOUT`].
pub fn resolve(requested: Option<i64>) -> usize {
    requested
        .and_then(|index| usize::try_from(index).ok())
        .filter(|index| *index < LAYOUTS.len())
        .unwrap_or(DEFAULT_LAYOUT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_indices_fall_back_to_default() {
        assert_eq!(resolve(None), DEFAULT_LAYOUT);
        assert_eq!(resolve(Some(42)), DEFAULT_LAYOUT);
        assert_eq!(resolve(Some(-1)), DEFAULT_LAYOUT);
        assert_eq!(resolve(Some(5)), 5);
    }

    #[test]
    fn blank_layout_has_no_title() {
        assert!(!LAYOUTS[BLANK_LAYOUT].has_title());
        assert!(LAYOUTS[DEFAULT_LAYOUT].has_title());
        assert_eq!(LAYOUTS[BLANK_LAYOUT].name, "Blank");
    }
}
