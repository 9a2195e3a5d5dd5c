//! Rendering plugin
//!
//! [`ChartPlugin`] turns a styled document plus its data matrix into a
//! [`ChartOutput`], which can then write the chart as PNG or SVG. The default
//! [`PlottersPlugin`] reads a [`ChartScene`] out of the document and draws it
//! with plotters.
//!
//! Text (titles, axis labels, dial numbers) is drawn best effort: when no
//! usable font is available the failure is logged and the shapes are still
//! drawn.

use crate::compiler::{
    TAG_DIAL_CAP, TAG_DIAL_POINTER, TAG_DIAL_RANGE, TAG_DIAL_RANGES, TAG_DIAL_VALUE_INDICATOR,
    TAG_MAJOR_TICK, TAG_MINOR_TICK, TAG_SCALE, TAG_TICK_LABEL,
};
use crate::document::{Document, ElementId, TAG_DOMAIN_LABEL, TAG_PLOT, TAG_RANGE_LABEL, TAG_TITLE};
use crate::error::{ChartError, Result};
use crate::factory::link_series;
use crate::matrix::AggregationMatrix;
use crate::palette::ColorPalette;
use crate::style::{GraphType, SeriesType, StyleKey, StyleMap, Unit, HORIZONTAL, SANS_SERIF};
use crate::OutputFormat;
use anyhow::Context;
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, TextStyle};
use std::f64::consts::PI;
use std::io::Write;
use std::ops::Range;

// =============================================================================
// Plugin Boundary
// =============================================================================

/// Turns a styled chart document and its data into a drawable chart
pub trait ChartPlugin {
    fn render_chart_document(
        &self,
        document: &Document,
        matrix: &AggregationMatrix,
    ) -> Result<Box<dyn ChartOutput>>;
}

/// A processed chart that can be written out
pub trait ChartOutput {
    fn persist_chart(
        &self,
        out: &mut dyn Write,
        format: OutputFormat,
        width: u32,
        height: u32,
    ) -> Result<()>;
}

/// Default plugin drawing with plotters
#[derive(Debug, Clone, Copy, Default)]
pub struct PlottersPlugin;

impl ChartPlugin for PlottersPlugin {
    fn render_chart_document(
        &self,
        document: &Document,
        matrix: &AggregationMatrix,
    ) -> Result<Box<dyn ChartOutput>> {
        let scene = extract_scene(document, matrix)?;
        log::debug!("extracted {} scene", scene.plot.kind());
        Ok(Box::new(PlottersChart {
            scene,
            matrix: matrix.clone(),
        }))
    }
}

// =============================================================================
// Scene
// =============================================================================

/// Everything needed to draw one chart, read from a styled document
#[derive(Debug, Clone, PartialEq)]
pub struct ChartScene {
    pub title: Option<String>,
    pub value_label: Option<String>,
    pub category_label: Option<String>,
    pub plot: PlotScene,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlotScene {
    /// Bar, line or area series over the matrix domains
    Categorical {
        graph_type: GraphType,
        series: Vec<SeriesScene>,
        horizontal: bool,
    },
    /// One wedge per matrix row; series only supply colors
    Pie { series: Vec<SeriesScene> },
    Dial(DialScene),
}

impl PlotScene {
    pub fn kind(&self) -> &'static str {
        match self {
            PlotScene::Categorical { graph_type, .. } => graph_type.series_type().keyword(),
            PlotScene::Pie { .. } => "pie",
            PlotScene::Dial(_) => "dial",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesScene {
    pub color: RGBColor,
    /// Matrix column holding the series values
    pub column: Option<usize>,
    pub line_width: u32,
    /// Upper bound on bar width as a fraction of the category axis
    pub bar_max_width: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialBand {
    pub lower: f64,
    pub upper: f64,
    pub color: RGBColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialScene {
    pub lower: f64,
    pub upper: f64,
    /// Degrees counterclockwise from three o'clock
    pub start_angle: f64,
    /// Negative extents sweep clockwise
    pub extent: f64,
    pub major_increment: f64,
    pub minor_count: usize,
    pub face: RGBColor,
    pub border: RGBColor,
    pub pointer: RGBColor,
    /// Needle length and width as fractions of the dial radius
    pub pointer_length: f64,
    pub pointer_width: f64,
    pub cap: RGBColor,
    pub cap_width: f64,
    pub major_tick: RGBColor,
    pub major_tick_length: f64,
    pub minor_tick: RGBColor,
    pub minor_tick_length: f64,
    pub tick_label: TextScene,
    pub value_indicator: TextScene,
    pub bands: Vec<DialBand>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextScene {
    pub family: String,
    pub size: f64,
    pub color: RGBColor,
}

impl Default for TextScene {
    fn default() -> Self {
        Self {
            family: SANS_SERIF.to_string(),
            size: 12.0,
            color: BLACK,
        }
    }
}

impl Default for DialScene {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: 100.0,
            start_angle: -150.0,
            extent: -240.0,
            major_increment: 20.0,
            minor_count: 2,
            face: WHITE,
            border: RGBColor(0x8d, 0x8d, 0x8d),
            pointer: RGBColor(0x63, 0x63, 0x63),
            pointer_length: 0.9,
            pointer_width: 0.05,
            cap: RGBColor(0x63, 0x63, 0x63),
            cap_width: 0.06,
            major_tick: BLACK,
            major_tick_length: 0.04,
            minor_tick: RGBColor(0x8b, 0x8b, 0x8b),
            minor_tick_length: 0.02,
            tick_label: TextScene { size: 14.0, ..TextScene::default() },
            value_indicator: TextScene::default(),
            bands: Vec::new(),
        }
    }
}

impl DialScene {
    /// Angle in degrees of `value` on the scale
    pub fn angle_of(&self, value: f64) -> f64 {
        let span = self.upper - self.lower;
        if span == 0.0 {
            return self.start_angle;
        }
        self.start_angle + (value - self.lower) / span * self.extent
    }

    /// `value` clamped into the scale, whichever way the bounds are ordered
    pub fn clamp(&self, value: f64) -> f64 {
        let (lo, hi) = ordered(self.lower, self.upper);
        value.max(lo).min(hi)
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

// =============================================================================
// Scene Extraction
// =============================================================================

/// Computed style once resolved, authored style before that
fn style_of(document: &Document, id: ElementId) -> &StyleMap {
    let element = document.element(id);
    if element.is_style_resolved() {
        element.computed_style()
    } else {
        element.style()
    }
}

fn attribute_f64(document: &Document, id: ElementId, key: &str) -> Option<f64> {
    document.element(id).attribute(key)?.as_f64()
}

/// A percent length as a fraction
fn fraction(style: &StyleMap, key: StyleKey) -> Option<f64> {
    match style.length(key)? {
        (v, Unit::Percent) => Some(v / 100.0),
        _ => None,
    }
}

fn text_scene(style: &StyleMap, fallback: &TextScene) -> TextScene {
    TextScene {
        family: style
            .keyword(StyleKey::FontFamily)
            .map(str::to_string)
            .unwrap_or_else(|| fallback.family.clone()),
        size: style
            .length(StyleKey::FontSize)
            .map(|(v, _)| v)
            .unwrap_or(fallback.size),
        color: style.color(StyleKey::Color).unwrap_or(fallback.color),
    }
}

fn label_text(document: &Document, tag: &str) -> Option<String> {
    let id = document.first_child_by_tag(document.root(), tag)?;
    document
        .element(id)
        .text()
        .filter(|t| !t.trim().is_empty())
        .map(str::to_string)
}

/// Read the drawable scene out of a (preferably resolved) chart document.
///
/// Fails when the document has no series, when a series has a missing or
/// unknown `chart-type`, or when series of different types are mixed.
pub fn extract_scene(document: &Document, matrix: &AggregationMatrix) -> Result<ChartScene> {
    let links = link_series(document, matrix);
    if links.is_empty() {
        return Err(ChartError::processing("Chart document has no series"));
    }

    let palette = ColorPalette::category10();
    let mut series_type: Option<SeriesType> = None;
    let mut series = Vec::with_capacity(links.len());

    for (index, link) in links.iter().enumerate() {
        let style = style_of(document, link.series);
        let keyword = style
            .keyword(StyleKey::ChartType)
            .ok_or_else(|| ChartError::processing(format!("Series {} has no chart-type", index)))?;
        let kind = SeriesType::from_keyword(keyword).ok_or_else(|| {
            ChartError::processing(format!("Series {} has unknown chart-type '{}'", index, keyword))
        })?;
        match series_type {
            Some(existing) if existing != kind => {
                return Err(ChartError::processing(format!(
                    "Chart mixes {} and {} series",
                    existing.keyword(),
                    kind.keyword()
                )))
            }
            _ => series_type = Some(kind),
        }

        series.push(SeriesScene {
            color: style
                .color(StyleKey::Color)
                .unwrap_or_else(|| palette.get_color(index)),
            column: link.column,
            line_width: style
                .length(StyleKey::LineWidth)
                .map(|(v, _)| v.round().max(1.0) as u32)
                .unwrap_or(1),
            bar_max_width: fraction(style, StyleKey::BarMaxWidth),
        });
    }

    let Some(series_type) = series_type else {
        return Err(ChartError::processing("Chart document has no series"));
    };
    let plot = document.first_child_by_tag(document.root(), TAG_PLOT);
    let horizontal = plot
        .and_then(|p| style_of(document, p).keyword(StyleKey::Orientation))
        == Some(HORIZONTAL);
    let plot_scene = match series_type {
        SeriesType::Bar => PlotScene::Categorical { graph_type: GraphType::Bar, series, horizontal },
        SeriesType::Line => PlotScene::Categorical { graph_type: GraphType::Line, series, horizontal },
        SeriesType::Area => PlotScene::Categorical { graph_type: GraphType::Area, series, horizontal },
        SeriesType::Pie => PlotScene::Pie { series },
        SeriesType::Dial => PlotScene::Dial(extract_dial(document, plot)),
    };

    Ok(ChartScene {
        title: label_text(document, TAG_TITLE),
        value_label: label_text(document, TAG_RANGE_LABEL),
        category_label: label_text(document, TAG_DOMAIN_LABEL),
        plot: plot_scene,
    })
}

/// Dial settings; parts missing from the document keep their defaults
fn extract_dial(document: &Document, plot: Option<ElementId>) -> DialScene {
    let mut dial = DialScene::default();
    let Some(plot) = plot else {
        return dial;
    };

    let style = style_of(document, plot);
    dial.face = style
        .color(StyleKey::GradientColor)
        .or_else(|| style.color(StyleKey::BackgroundColor))
        .unwrap_or(dial.face);
    dial.border = style.color(StyleKey::BorderTopColor).unwrap_or(dial.border);

    if let Some(pointer) = document.first_child_by_tag(plot, TAG_DIAL_POINTER) {
        let style = style_of(document, pointer);
        dial.pointer = style.color(StyleKey::Color).unwrap_or(dial.pointer);
        dial.pointer_length = fraction(style, StyleKey::Height).unwrap_or(dial.pointer_length);
        dial.pointer_width = fraction(style, StyleKey::Width).unwrap_or(dial.pointer_width);
    }

    if let Some(cap) = document.first_child_by_tag(plot, TAG_DIAL_CAP) {
        let style = style_of(document, cap);
        dial.cap = style.color(StyleKey::Color).unwrap_or(dial.cap);
        dial.cap_width = fraction(style, StyleKey::Width).unwrap_or(dial.cap_width);
    }

    if let Some(scale) = document.first_child_by_tag(plot, TAG_SCALE) {
        dial.lower = attribute_f64(document, scale, "lowerbound").unwrap_or(dial.lower);
        dial.upper = attribute_f64(document, scale, "upperbound").unwrap_or(dial.upper);
        dial.start_angle = attribute_f64(document, scale, "startangle").unwrap_or(dial.start_angle);
        dial.extent = attribute_f64(document, scale, "extent").unwrap_or(dial.extent);

        if let Some(label) = document.first_child_by_tag(scale, TAG_TICK_LABEL) {
            dial.tick_label = text_scene(style_of(document, label), &dial.tick_label);
        }
        if let Some(major) = document.first_child_by_tag(scale, TAG_MAJOR_TICK) {
            let style = style_of(document, major);
            dial.major_increment =
                attribute_f64(document, major, "increment").unwrap_or(dial.major_increment);
            dial.major_tick = style.color(StyleKey::Color).unwrap_or(dial.major_tick);
            dial.major_tick_length =
                fraction(style, StyleKey::Height).unwrap_or(dial.major_tick_length);
        }
        if let Some(minor) = document.first_child_by_tag(scale, TAG_MINOR_TICK) {
            let style = style_of(document, minor);
            dial.minor_count = attribute_f64(document, minor, "count")
                .map(|c| c.max(0.0) as usize)
                .unwrap_or(dial.minor_count);
            dial.minor_tick = style.color(StyleKey::Color).unwrap_or(dial.minor_tick);
            dial.minor_tick_length =
                fraction(style, StyleKey::Height).unwrap_or(dial.minor_tick_length);
        }
    }

    if let Some(indicator) = document.first_child_by_tag(plot, TAG_DIAL_VALUE_INDICATOR) {
        dial.value_indicator = text_scene(style_of(document, indicator), &dial.value_indicator);
    }

    if let Some(ranges) = document.first_child_by_tag(plot, TAG_DIAL_RANGES) {
        for id in document.find_children_by_tag(ranges, TAG_DIAL_RANGE) {
            let (Some(lower), Some(upper)) = (
                attribute_f64(document, id, "lowerbound"),
                attribute_f64(document, id, "upperbound"),
            ) else {
                log::warn!("skipping dial range without bounds");
                continue;
            };
            let color = style_of(document, id).color(StyleKey::Color).unwrap_or(BLACK);
            dial.bands.push(DialBand { lower, upper, color });
        }
    }

    dial
}

// =============================================================================
// Output
// =============================================================================

/// Largest drawable area, in pixels (8192 x 8192)
pub const MAX_CHART_PIXELS: u64 = 8192 * 8192;

struct PlottersChart {
    scene: ChartScene,
    matrix: AggregationMatrix,
}

impl ChartOutput for PlottersChart {
    fn persist_chart(
        &self,
        out: &mut dyn Write,
        format: OutputFormat,
        width: u32,
        height: u32,
    ) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(ChartError::invalid_input(format!(
                "Chart size must be positive, got {}x{}",
                width, height
            )));
        }
        if u64::from(width) * u64::from(height) > MAX_CHART_PIXELS {
            return Err(ChartError::invalid_input(format!(
                "Chart size {}x{} exceeds the limit of {} pixels",
                width, height, MAX_CHART_PIXELS
            )));
        }

        let bytes = match format {
            OutputFormat::Png => self.render_png(width, height),
            OutputFormat::Svg => self.render_svg(width, height),
        }
        .map_err(ChartError::Processing)?;

        out.write_all(&bytes)
            .and_then(|_| out.flush())
            .map_err(|e| ChartError::Persistence(format!("Failed to write chart: {}", e)))?;
        log::debug!("wrote {} bytes of {:?} output", bytes.len(), format);
        Ok(())
    }
}

impl PlottersChart {
    fn render_png(&self, width: u32, height: u32) -> anyhow::Result<Vec<u8>> {
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            draw_scene(&root, &self.scene, &self.matrix)?;
            root.present().context("Failed to present drawing")?;
        }

        let mut png_bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png_bytes)
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
        Ok(png_bytes)
    }

    fn render_svg(&self, width: u32, height: u32) -> anyhow::Result<Vec<u8>> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            draw_scene(&root, &self.scene, &self.matrix)?;
            root.present().context("Failed to present drawing")?;
        }
        Ok(svg.into_bytes())
    }
}

// =============================================================================
// Drawing
// =============================================================================

fn draw_scene<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &ChartScene,
    matrix: &AggregationMatrix,
) -> anyhow::Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;
    let area = titled_area(root, scene.title.as_deref());

    match &scene.plot {
        PlotScene::Categorical {
            graph_type,
            series,
            horizontal,
        } => draw_categorical(&area, scene, *graph_type, series, *horizontal, matrix),
        PlotScene::Pie { series } => draw_pie(&area, series, matrix),
        PlotScene::Dial(dial) => draw_dial(&area, dial, matrix.total()),
    }
}

/// Area below the title; the whole area when there is no title or it can't be drawn
fn titled_area<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: Option<&str>,
) -> DrawingArea<DB, Shift> {
    let Some(title) = title else {
        return root.clone();
    };
    match root.titled(title, (SANS_SERIF, 20)) {
        Ok(area) => area,
        Err(e) => {
            log::warn!("Failed to draw chart title: {}", e);
            root.clone()
        }
    }
}

/// Padded value range that always includes zero
fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min == max {
        return min..(max + 1.0);
    }
    let padding = (max - min) * 0.05;
    let lower = if min < 0.0 { min - padding } else { min };
    lower..(max + padding)
}

fn category_label(domains: &[String], position: f64) -> String {
    if position < 0.0 {
        return String::new();
    }
    domains.get(position.floor() as usize).cloned().unwrap_or_default()
}

fn draw_categorical<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    scene: &ChartScene,
    graph_type: GraphType,
    series: &[SeriesScene],
    horizontal: bool,
    matrix: &AggregationMatrix,
) -> anyhow::Result<()>
where
    DB::ErrorType: 'static,
{
    let categories = matrix.row_count();
    let values: Vec<Vec<Option<f64>>> = series
        .iter()
        .map(|s| match s.column {
            Some(c) => matrix.column_values(c),
            None => vec![None; categories],
        })
        .collect();

    let category_range = 0.0..categories as f64;
    let value_range = value_range(values.iter().flatten().flatten().copied());
    // Maps (category position, value) to chart coordinates
    let at = |c: f64, v: f64| if horizontal { (v, c) } else { (c, v) };

    let (x_range, y_range) = if horizontal {
        (value_range, category_range)
    } else {
        (category_range, value_range)
    };
    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .context("Failed to build chart")?;

    {
        let domains = matrix.domains();
        let formatter = |v: &f64| category_label(domains, *v);
        let value_desc = scene.value_label.clone().unwrap_or_default();
        let category_desc = scene.category_label.clone().unwrap_or_default();

        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh();
        if horizontal {
            mesh.y_labels(categories)
                .y_label_formatter(&formatter)
                .x_desc(value_desc)
                .y_desc(category_desc);
        } else {
            mesh.x_labels(categories)
                .x_label_formatter(&formatter)
                .x_desc(category_desc)
                .y_desc(value_desc);
        }
        if let Err(e) = mesh.draw() {
            log::warn!("Failed to draw axes: {}", e);
        }
    }

    match graph_type {
        GraphType::Bar => {
            let slot = 0.8 / series.len() as f64;
            for (index, (style, column)) in series.iter().zip(&values).enumerate() {
                let width = style
                    .bar_max_width
                    .map(|max| slot.min(max * categories as f64))
                    .unwrap_or(slot);
                let offset = (index as f64 - (series.len() as f64 - 1.0) / 2.0) * slot;
                let bars: Vec<_> = column
                    .iter()
                    .enumerate()
                    .filter_map(|(c, v)| v.map(|v| (c as f64 + 0.5 + offset, v)))
                    .map(|(center, v)| {
                        Rectangle::new(
                            [at(center - width / 2.0, 0.0), at(center + width / 2.0, v)],
                            style.color.filled(),
                        )
                    })
                    .collect();
                chart.draw_series(bars).context("Failed to draw bars")?;
            }
        }
        GraphType::Line => {
            for (style, column) in series.iter().zip(&values) {
                let points: Vec<(f64, f64)> = column
                    .iter()
                    .enumerate()
                    .filter_map(|(c, v)| v.map(|v| at(c as f64 + 0.5, v)))
                    .collect();
                chart
                    .draw_series(LineSeries::new(
                        points,
                        style.color.stroke_width(style.line_width),
                    ))
                    .context("Failed to draw line series")?;
            }
        }
        GraphType::Area => {
            for (style, column) in series.iter().zip(&values) {
                if categories == 0 {
                    continue;
                }
                let outline: Vec<(f64, f64)> = column
                    .iter()
                    .enumerate()
                    .map(|(c, v)| at(c as f64 + 0.5, v.unwrap_or(0.0)))
                    .collect();
                let mut polygon = Vec::with_capacity(outline.len() + 2);
                polygon.push(at(0.5, 0.0));
                polygon.extend(outline.iter().copied());
                polygon.push(at(categories as f64 - 0.5, 0.0));
                chart
                    .draw_series(std::iter::once(Polygon::new(
                        polygon,
                        style.color.mix(0.6).filled(),
                    )))
                    .context("Failed to draw area")?;
                chart
                    .draw_series(LineSeries::new(
                        outline,
                        style.color.stroke_width(style.line_width),
                    ))
                    .context("Failed to draw area outline")?;
            }
        }
    }

    Ok(())
}

/// Point at `radius` pixels and `degrees` counterclockwise from three o'clock
fn polar(center: (i32, i32), radius: f64, degrees: f64) -> (i32, i32) {
    let theta = degrees * PI / 180.0;
    (
        center.0 + (radius * theta.cos()).round() as i32,
        center.1 - (radius * theta.sin()).round() as i32,
    )
}

/// Points along an arc, endpoints included
fn arc(center: (i32, i32), radius: f64, from: f64, to: f64) -> Vec<(i32, i32)> {
    let steps = ((to - from).abs() / 2.0).ceil().max(1.0) as usize;
    (0..=steps)
        .map(|i| polar(center, radius, from + (to - from) * i as f64 / steps as f64))
        .collect()
}

fn draw_pie<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    series: &[SeriesScene],
    matrix: &AggregationMatrix,
) -> anyhow::Result<()>
where
    DB::ErrorType: 'static,
{
    let totals: Vec<f64> = (0..matrix.row_count()).map(|r| matrix.row_total(r)).collect();
    let sum: f64 = totals.iter().filter(|t| **t > 0.0).sum();
    if sum <= 0.0 {
        log::warn!("pie chart has no positive values to draw");
        return Ok(());
    }

    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = w.min(h) as f64 * 0.4;
    let palette = ColorPalette::category10();

    let mut angle = 90.0;
    for (row, total) in totals.iter().enumerate() {
        if *total <= 0.0 {
            continue;
        }
        let sweep = total / sum * 360.0;
        let color = if series.is_empty() {
            palette.get_color(row)
        } else {
            series[row % series.len()].color
        };
        // Wedges run clockwise from twelve o'clock
        let mut points = vec![center];
        points.extend(arc(center, radius, angle, angle - sweep));
        area.draw(&Polygon::new(points, color.filled()))
            .context("Failed to draw pie wedge")?;
        angle -= sweep;
    }
    Ok(())
}

/// Evenly spaced scale values from lower to upper, capped to keep drawing bounded
fn ticks(lower: f64, upper: f64, step: f64) -> Vec<f64> {
    let (lo, hi) = ordered(lower, upper);
    if step <= 0.0 || !step.is_finite() || (hi - lo) / step > 1000.0 {
        return Vec::new();
    }
    let count = ((hi - lo) / step + 1e-9).floor() as usize;
    (0..=count).map(|i| lo + step * i as f64).collect()
}

fn format_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}

/// Centered text style for a dial label
fn text_style(text: &TextScene) -> TextStyle<'_> {
    FontDesc::new(FontFamily::from(text.family.as_str()), text.size, FontStyle::Normal)
        .color(&text.color)
        .pos(Pos::new(HPos::Center, VPos::Center))
}

fn draw_dial<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    dial: &DialScene,
    value: f64,
) -> anyhow::Result<()>
where
    DB::ErrorType: 'static,
{
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, (h as f64 * 0.55) as i32);
    let radius = w.min(h) as f64 * 0.42;

    area.draw(&Circle::new(center, radius.round() as i32, dial.face.filled()))
        .context("Failed to draw dial face")?;
    area.draw(&Circle::new(center, radius.round() as i32, dial.border.stroke_width(2)))
        .context("Failed to draw dial border")?;

    // Colored bands just inside the rim
    let (outer, inner) = (radius * 0.92, radius * 0.82);
    for band in &dial.bands {
        let from = dial.angle_of(dial.clamp(band.lower));
        let to = dial.angle_of(dial.clamp(band.upper));
        let mut points = arc(center, outer, from, to);
        let mut back = arc(center, inner, from, to);
        back.reverse();
        points.append(&mut back);
        area.draw(&Polygon::new(points, band.color.filled()))
            .context("Failed to draw dial range")?;
    }

    let majors = ticks(dial.lower, dial.upper, dial.major_increment);
    let minor_step = dial.major_increment / (dial.minor_count as f64 + 1.0);
    for v in ticks(dial.lower, dial.upper, minor_step) {
        let angle = dial.angle_of(v);
        let tick = [
            polar(center, outer - radius * dial.minor_tick_length, angle),
            polar(center, outer, angle),
        ];
        area.draw(&PathElement::new(tick.to_vec(), dial.minor_tick.stroke_width(1)))
            .context("Failed to draw minor tick")?;
    }

    let label_font = text_style(&dial.tick_label);
    let mut label_failed = false;
    for v in &majors {
        let angle = dial.angle_of(*v);
        let tick = [
            polar(center, outer - radius * dial.major_tick_length, angle),
            polar(center, outer, angle),
        ];
        area.draw(&PathElement::new(tick.to_vec(), dial.major_tick.stroke_width(2)))
            .context("Failed to draw major tick")?;

        let at = polar(center, radius * 0.68, angle);
        if !label_failed {
            if let Err(e) = area.draw(&Text::new(format_value(*v), at, label_font.clone())) {
                log::warn!("Failed to draw dial labels: {}", e);
                label_failed = true;
            }
        }
    }

    // Needle: a triangle from the cap to the pointer tip
    let angle = dial.angle_of(dial.clamp(value));
    let half_width = radius * dial.pointer_width / 2.0;
    let needle = vec![
        polar(center, radius * dial.pointer_length, angle),
        polar(center, half_width, angle + 90.0),
        polar(center, half_width, angle - 90.0),
    ];
    area.draw(&Polygon::new(needle, dial.pointer.filled()))
        .context("Failed to draw dial pointer")?;
    let cap_radius = (radius * dial.cap_width).round().max(1.0) as i32;
    area.draw(&Circle::new(center, cap_radius, dial.cap.filled()))
        .context("Failed to draw dial cap")?;

    let indicator_font = text_style(&dial.value_indicator);
    let at = (center.0, center.1 + (radius * 0.5) as i32);
    if let Err(e) = area.draw(&Text::new(format_value(value), at, indicator_font)) {
        log::warn!("Failed to draw dial value: {}", e);
    }

    Ok(())
}
