// CSS-like style properties carried by document elements

use plotters::style::RGBColor;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// === Keys ===

/// Style properties understood by the compiler, resolver and renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StyleKey {
    ChartType,
    BarStyle,
    BarMaxWidth,
    LineWidth,
    AreaStyle,
    Orientation,
    DrillUrl,
    ScaleNum,
    GradientColor,
    BorderTopWidth,
    BorderTopColor,
    BorderTopStyle,
    BorderBottomColor,
    BackgroundColor,
    Color,
    Width,
    Height,
    FontFamily,
    FontSize,
}

impl StyleKey {
    pub const ALL: [StyleKey; 19] = [
        StyleKey::ChartType,
        StyleKey::BarStyle,
        StyleKey::BarMaxWidth,
        StyleKey::LineWidth,
        StyleKey::AreaStyle,
        StyleKey::Orientation,
        StyleKey::DrillUrl,
        StyleKey::ScaleNum,
        StyleKey::GradientColor,
        StyleKey::BorderTopWidth,
        StyleKey::BorderTopColor,
        StyleKey::BorderTopStyle,
        StyleKey::BorderBottomColor,
        StyleKey::BackgroundColor,
        StyleKey::Color,
        StyleKey::Width,
        StyleKey::Height,
        StyleKey::FontFamily,
        StyleKey::FontSize,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StyleKey::ChartType => "chart-type",
            StyleKey::BarStyle => "bar-style",
            StyleKey::BarMaxWidth => "bar-max-width",
            StyleKey::LineWidth => "line-width",
            StyleKey::AreaStyle => "area-style",
            StyleKey::Orientation => "orientation",
            StyleKey::DrillUrl => "drill-url",
            StyleKey::ScaleNum => "scale-num",
            StyleKey::GradientColor => "gradient-color",
            StyleKey::BorderTopWidth => "border-top-width",
            StyleKey::BorderTopColor => "border-top-color",
            StyleKey::BorderTopStyle => "border-top-style",
            StyleKey::BorderBottomColor => "border-bottom-color",
            StyleKey::BackgroundColor => "background-color",
            StyleKey::Color => "color",
            StyleKey::Width => "width",
            StyleKey::Height => "height",
            StyleKey::FontFamily => "font-family",
            StyleKey::FontSize => "font-size",
        }
    }

    /// Look up a key by its CSS name; underscores are accepted for hyphens
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL.into_iter().find(|k| k.name() == normalized)
    }

    /// Whether children take this property from their parent when unset
    pub fn is_inherited(self) -> bool {
        matches!(self, StyleKey::Color | StyleKey::FontFamily | StyleKey::FontSize)
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// === Values ===

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unit {
    Number,
    Px,
    Pt,
    Percent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Color(RGBColor),
    ColorPair(RGBColor, RGBColor),
    Length(f64, Unit),
    Keyword(String),
    Uri(String),
}

impl StyleValue {
    pub fn keyword(kw: &str) -> Self {
        StyleValue::Keyword(kw.to_string())
    }

    pub fn px(v: f64) -> Self {
        StyleValue::Length(v, Unit::Px)
    }

    pub fn pt(v: f64) -> Self {
        StyleValue::Length(v, Unit::Pt)
    }

    pub fn percent(v: f64) -> Self {
        StyleValue::Length(v, Unit::Percent)
    }

    pub fn number(v: f64) -> Self {
        StyleValue::Length(v, Unit::Number)
    }

    pub fn rgb(hex: u32) -> Self {
        StyleValue::Color(rgb(hex))
    }

    pub fn as_color(&self) -> Option<RGBColor> {
        match self {
            StyleValue::Color(c) => Some(*c),
            StyleValue::ColorPair(first, _) => Some(*first),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            StyleValue::Keyword(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_length(&self) -> Option<(f64, Unit)> {
        match self {
            StyleValue::Length(v, u) => Some((*v, *u)),
            _ => None,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Color(c) => write!(f, "{}", hex(c)),
            StyleValue::ColorPair(a, b) => write!(f, "{} {}", hex(a), hex(b)),
            StyleValue::Length(v, Unit::Number) => write!(f, "{}", v),
            StyleValue::Length(v, Unit::Px) => write!(f, "{}px", v),
            StyleValue::Length(v, Unit::Pt) => write!(f, "{}pt", v),
            StyleValue::Length(v, Unit::Percent) => write!(f, "{}%", v),
            StyleValue::Keyword(k) => f.write_str(k),
            StyleValue::Uri(u) => write!(f, "url({})", u),
        }
    }
}

impl FromStr for StyleValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parser::style::parse_style_value(s)
    }
}

// === Keywords ===

/// The `chart-type` discriminator of a series element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesType {
    Bar,
    Line,
    Area,
    Pie,
    Dial,
}

impl SeriesType {
    pub fn keyword(self) -> &'static str {
        match self {
            SeriesType::Bar => "bar",
            SeriesType::Line => "line",
            SeriesType::Area => "area",
            SeriesType::Pie => "pie",
            SeriesType::Dial => "dial",
        }
    }

    pub fn from_keyword(kw: &str) -> Option<Self> {
        match kw {
            "bar" => Some(SeriesType::Bar),
            "line" => Some(SeriesType::Line),
            "area" => Some(SeriesType::Area),
            "pie" => Some(SeriesType::Pie),
            "dial" => Some(SeriesType::Dial),
            _ => None,
        }
    }
}

impl SeriesType {
    /// The categorical kind of this series type; `None` for pie and dial
    pub fn graph_type(self) -> Option<GraphType> {
        match self {
            SeriesType::Bar => Some(GraphType::Bar),
            SeriesType::Line => Some(GraphType::Line),
            SeriesType::Area => Some(GraphType::Area),
            SeriesType::Pie | SeriesType::Dial => None,
        }
    }
}

/// Series types drawn over the domain axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphType {
    Bar,
    Line,
    Area,
}

impl GraphType {
    pub fn series_type(self) -> SeriesType {
        match self {
            GraphType::Bar => SeriesType::Bar,
            GraphType::Line => SeriesType::Line,
            GraphType::Area => SeriesType::Area,
        }
    }
}

pub const BAR_STYLE_BAR: &str = "bar";
pub const AREA_STYLE_AREA: &str = "area";
pub const BORDER_SOLID: &str = "solid";
pub const SANS_SERIF: &str = "sans-serif";
pub const HORIZONTAL: &str = "horizontal";
pub const VERTICAL: &str = "vertical";

// === Container ===

/// Key → value style container, used for authored and for resolved styles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleMap {
    values: BTreeMap<StyleKey, StyleValue>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: StyleKey, value: StyleValue) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: StyleKey) -> Option<&StyleValue> {
        self.values.get(&key)
    }

    pub fn remove(&mut self, key: StyleKey) -> Option<StyleValue> {
        self.values.remove(&key)
    }

    pub fn color(&self, key: StyleKey) -> Option<RGBColor> {
        self.get(key).and_then(StyleValue::as_color)
    }

    pub fn keyword(&self, key: StyleKey) -> Option<&str> {
        self.get(key).and_then(StyleValue::as_keyword)
    }

    pub fn length(&self, key: StyleKey) -> Option<(f64, Unit)> {
        self.get(key).and_then(StyleValue::as_length)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StyleKey, &StyleValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy every value of `other` over this map
    pub fn overlay(&mut self, other: &StyleMap) {
        for (k, v) in other.iter() {
            self.values.insert(k, v.clone());
        }
    }
}

impl FromIterator<(StyleKey, StyleValue)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (StyleKey, StyleValue)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

// === Color Parsing ===

pub fn rgb(hex: u32) -> RGBColor {
    RGBColor(((hex >> 16) & 0xff) as u8, ((hex >> 8) & 0xff) as u8, (hex & 0xff) as u8)
}

pub fn hex(color: &RGBColor) -> String {
    format!("#{:02x}{:02x}{:02x}", color.0, color.1, color.2)
}

/// Parse a color string into RGBColor, supporting hex (#RRGGBB, #RGB) and named colors
pub fn parse_color(color_str: &str) -> Option<RGBColor> {
    let color_str = color_str.trim();

    if color_str.starts_with('#') {
        return parse_hex_color(color_str);
    }

    match color_str.to_lowercase().as_str() {
        "white" => Some(RGBColor(255, 255, 255)),
        "black" => Some(RGBColor(0, 0, 0)),
        "red" => Some(RGBColor(255, 0, 0)),
        "green" => Some(RGBColor(0, 128, 0)),
        "blue" => Some(RGBColor(0, 0, 255)),
        "yellow" => Some(RGBColor(255, 255, 0)),
        "cyan" => Some(RGBColor(0, 255, 255)),
        "magenta" => Some(RGBColor(255, 0, 255)),
        "orange" => Some(RGBColor(255, 165, 0)),
        "purple" => Some(RGBColor(128, 0, 128)),
        "pink" => Some(RGBColor(255, 192, 203)),
        "brown" => Some(RGBColor(139, 69, 19)),
        "gray" | "grey" => Some(RGBColor(128, 128, 128)),
        "darkgray" | "darkgrey" => Some(RGBColor(64, 64, 64)),
        "lightgray" | "lightgrey" => Some(RGBColor(192, 192, 192)),
        _ => None,
    }
}

/// Parse hex color (#RRGGBB or #RGB)
fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(RGBColor(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some(RGBColor(r, g, b))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_color("#FF0000"), Some(RGBColor(255, 0, 0)));
        assert_eq!(parse_color("#F00"), Some(RGBColor(255, 0, 0)));
        assert_eq!(parse_color("#CCCCCC"), Some(RGBColor(204, 204, 204)));
        assert_eq!(parse_color("#GG0000"), None);
        assert_eq!(parse_color("#1234"), None);
    }

    #[test]
    fn test_parse_named_color() {
        assert_eq!(parse_color("white"), Some(RGBColor(255, 255, 255)));
        assert_eq!(parse_color(" Orange "), Some(RGBColor(255, 165, 0)));
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn test_rgb_hex_roundtrip() {
        let c = rgb(0x636363);
        assert_eq!(c, RGBColor(0x63, 0x63, 0x63));
        assert_eq!(hex(&c), "#636363");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(StyleValue::percent(10.0).to_string(), "10%");
        assert_eq!(StyleValue::px(1.0).to_string(), "1px");
        assert_eq!(StyleValue::pt(14.0).to_string(), "14pt");
        assert_eq!(StyleValue::number(1.0).to_string(), "1");
        assert_eq!(
            StyleValue::ColorPair(rgb(0xfcfcfc), rgb(0xd7d8da)).to_string(),
            "#fcfcfc #d7d8da"
        );
        assert_eq!(StyleValue::Uri("http://x".into()).to_string(), "url(http://x)");
    }

    #[test]
    fn test_key_names() {
        for key in StyleKey::ALL {
            assert_eq!(StyleKey::from_name(key.name()), Some(key));
        }
        assert_eq!(StyleKey::from_name("bar_max_width"), Some(StyleKey::BarMaxWidth));
        assert_eq!(StyleKey::from_name("opacity"), None);
    }

    #[test]
    fn test_inherited_keys() {
        assert!(StyleKey::Color.is_inherited());
        assert!(StyleKey::FontSize.is_inherited());
        assert!(!StyleKey::ChartType.is_inherited());
        assert!(!StyleKey::Width.is_inherited());
    }

    #[test]
    fn test_style_map_overlay() {
        let mut base: StyleMap = [
            (StyleKey::Color, StyleValue::rgb(0x000000)),
            (StyleKey::FontSize, StyleValue::pt(12.0)),
        ]
        .into_iter()
        .collect();
        let mut authored = StyleMap::new();
        authored.set(StyleKey::Color, StyleValue::rgb(0xff0000));
        base.overlay(&authored);
        assert_eq!(base.color(StyleKey::Color), Some(RGBColor(255, 0, 0)));
        assert_eq!(base.length(StyleKey::FontSize), Some((12.0, Unit::Pt)));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_series_type_keywords() {
        for t in [SeriesType::Bar, SeriesType::Line, SeriesType::Area, SeriesType::Pie, SeriesType::Dial] {
            assert_eq!(SeriesType::from_keyword(t.keyword()), Some(t));
        }
        assert_eq!(SeriesType::from_keyword("scatter"), None);
    }

    #[test]
    fn test_graph_types() {
        for t in [GraphType::Bar, GraphType::Line, GraphType::Area] {
            assert_eq!(t.series_type().graph_type(), Some(t));
        }
        assert_eq!(SeriesType::Pie.graph_type(), None);
        assert_eq!(SeriesType::Dial.graph_type(), None);
    }
}
