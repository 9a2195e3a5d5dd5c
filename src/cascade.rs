//! Default style cascade
//!
//! Computes the final style of an element from three layers, later layers
//! winning:
//! ```text
//! inherited  color, font-family, font-size of the resolved parent
//!            (initial values at the root)
//! palette    default color of a series, by position among its series siblings
//! authored   the element's own style
//! ```
//! There are no selectors; each element only sees its parent.

use crate::document::{Document, ElementId, TAG_SERIES};
use crate::error::{ChartError, Result};
use crate::palette::ColorPalette;
use crate::resolve::StyleResolver;
use crate::style::{StyleKey, StyleMap, StyleValue, SANS_SERIF};

// === Initial Values ===

/// Style of the root before anything is authored
pub fn initial_style() -> StyleMap {
    [
        (StyleKey::Color, StyleValue::rgb(0x000000)),
        (StyleKey::FontFamily, StyleValue::keyword(SANS_SERIF)),
        (StyleKey::FontSize, StyleValue::pt(12.0)),
    ]
    .into_iter()
    .collect()
}

// === Resolver ===

#[derive(Debug, Clone, Default)]
pub struct CascadeResolver {
    palette: ColorPalette,
}

impl CascadeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_palette(palette: ColorPalette) -> Self {
        Self { palette }
    }

    fn inherited(&self, document: &Document, id: ElementId) -> StyleMap {
        let Some(parent) = document.element(id).parent() else {
            return initial_style();
        };
        document
            .element(parent)
            .computed_style()
            .iter()
            .filter(|(k, _)| k.is_inherited())
            .map(|(k, v)| (k, v.clone()))
            .collect()
    }

    /// Index of a series element among the series children of its parent
    fn series_position(document: &Document, id: ElementId) -> Option<usize> {
        let parent = document.element(id).parent()?;
        document
            .find_children_by_tag(parent, TAG_SERIES)
            .iter()
            .position(|&s| s == id)
    }
}

impl StyleResolver for CascadeResolver {
    fn compute_style(&self, document: &Document, id: ElementId) -> Result<StyleMap> {
        let element = document.element(id);
        check_authored(element.tag(), element.style())?;

        let mut computed = self.inherited(document, id);
        if element.tag() == TAG_SERIES {
            if let Some(position) = Self::series_position(document, id) {
                computed.set(StyleKey::Color, StyleValue::Color(self.palette.get_color(position)));
            }
        }
        computed.overlay(element.style());
        Ok(computed)
    }
}

// === Validation ===

/// Reject authored values whose kind cannot apply to their key
fn check_authored(tag: &str, style: &StyleMap) -> Result<()> {
    for (key, value) in style.iter() {
        let ok = match key {
            StyleKey::Color
            | StyleKey::BackgroundColor
            | StyleKey::BorderTopColor
            | StyleKey::BorderBottomColor => matches!(value, StyleValue::Color(_)),
            StyleKey::GradientColor => value.as_color().is_some(),
            StyleKey::BarMaxWidth
            | StyleKey::LineWidth
            | StyleKey::BorderTopWidth
            | StyleKey::Width
            | StyleKey::Height
            | StyleKey::FontSize
            | StyleKey::ScaleNum => value.as_length().is_some(),
            StyleKey::DrillUrl => matches!(value, StyleValue::Uri(_) | StyleValue::Keyword(_)),
            StyleKey::ChartType
            | StyleKey::BarStyle
            | StyleKey::AreaStyle
            | StyleKey::Orientation
            | StyleKey::BorderTopStyle
            | StyleKey::FontFamily => value.as_keyword().is_some(),
        };
        if !ok {
            return Err(ChartError::Style(format!(
                "<{}> has invalid {} '{}'",
                tag, key, value
            )));
        }
    }
    Ok(())
}
