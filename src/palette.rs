// Default series colors

use crate::style::rgb;
use plotters::style::RGBColor;

/// Ordered list of colors handed out by position, wrapping around
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    colors: Vec<RGBColor>,
}

impl ColorPalette {
    /// The ten-color categorical palette (d3 category10)
    pub fn category10() -> Self {
        Self {
            colors: [
                0x1f77b4, // blue
                0xff7f0e, // orange
                0x2ca02c, // green
                0xd62728, // red
                0x9467bd, // purple
                0x8c564b, // brown
                0xe377c2, // pink
                0x7f7f7f, // gray
                0xbcbd22, // olive
                0x17becf, // cyan
            ]
            .into_iter()
            .map(rgb)
            .collect(),
        }
    }

    /// A custom palette; an empty list falls back to category10
    pub fn from_colors(colors: Vec<RGBColor>) -> Self {
        if colors.is_empty() {
            return Self::category10();
        }
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get_color(&self, index: usize) -> RGBColor {
        self.colors[index % self.colors.len()]
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::category10()
    }
}
