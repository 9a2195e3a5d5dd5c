// Typed plot model: what to chart

use crate::error::{ChartError, Result};
use crate::style::parse_color;
use plotters::style::RGBColor;
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// Complete chart description
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartModel {
    #[serde(default)]
    pub title: Option<String>,
    /// Name of a theme to look up through a theme factory
    #[serde(default)]
    pub theme: Option<String>,
    pub plot: Plot,
}

/// Plot variants. Bar, line and area share the categorical `Graph` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Plot {
    Bar(Graph),
    Line(Graph),
    Area(Graph),
    Pie(PiePlot),
    Dial(DialPlot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

/// Categorical plot payload
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub value_axis_label: Option<String>,
    #[serde(default)]
    pub category_axis_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PiePlot {
    #[serde(default)]
    pub wedges: Vec<Wedge>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Wedge {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DialPlot {
    /// Expected in ascending order; the first min and last max bound the scale
    #[serde(default)]
    pub ranges: Vec<DialRange>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DialRange {
    pub min: f64,
    pub max: f64,
    #[serde(default, deserialize_with = "deserialize_color")]
    pub color: Option<RGBColor>,
}

impl DialRange {
    pub fn new(min: f64, max: f64, color: Option<RGBColor>) -> Self {
        Self { min, max, color }
    }
}

fn deserialize_color<'de, D>(deserializer: D) -> std::result::Result<Option<RGBColor>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_color(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color '{}'", s))),
    }
}

impl Plot {
    /// The categorical payload shared by bar, line and area plots
    pub fn graph(&self) -> Option<&Graph> {
        match self {
            Plot::Bar(g) | Plot::Line(g) | Plot::Area(g) => Some(g),
            Plot::Pie(_) | Plot::Dial(_) => None,
        }
    }
}

impl ChartModel {
    pub fn new(plot: Plot) -> Self {
        Self { title: None, theme: None, plot }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_theme(mut self, theme: &str) -> Self {
        self.theme = Some(theme.to_string());
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| ChartError::resource_load(format!("Invalid chart model: {}", e)))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ChartError::resource_load(format!("Failed to read chart model {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }
}
