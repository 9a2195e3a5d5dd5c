use crate::document::{
    ChartContext, Document, Element, ElementId, COLUMN_POSITION, TAG_CHART, TAG_DOMAIN_LABEL,
    TAG_PLOT, TAG_RANGE_LABEL, TAG_SERIES, TAG_TITLE,
};
use crate::model::{ChartModel, DialPlot, DialRange, Graph, Orientation, PiePlot, Plot};
use crate::style::{
    rgb, GraphType, SeriesType, StyleKey, StyleMap, StyleValue, AREA_STYLE_AREA, BAR_STYLE_BAR,
    BORDER_SOLID, HORIZONTAL, SANS_SERIF, VERTICAL,
};
use plotters::style::RGBColor;

pub const TAG_DATASET: &str = "dataset";
pub const TAG_DIAL_POINTER: &str = "dialpointer";
pub const TAG_DIAL_CAP: &str = "dialcap";
pub const TAG_SCALE: &str = "scale";
pub const TAG_TICK_LABEL: &str = "ticklabel";
pub const TAG_MAJOR_TICK: &str = "majortick";
pub const TAG_MINOR_TICK: &str = "minortick";
pub const TAG_DIAL_VALUE_INDICATOR: &str = "dialvalueindicator";
pub const TAG_DIAL_RANGES: &str = "dialranges";
pub const TAG_DIAL_RANGE: &str = "dialrange";

pub const DIAL_START_ANGLE: f64 = -150.0;
pub const DIAL_EXTENT: f64 = -240.0;
pub const MINOR_TICK_COUNT: i64 = 2;

// =============================================================================
// Entry Point
// =============================================================================

/// Compile a plot model (and optional theme) into an unresolved chart document.
///
/// Every document starts with a `chart` root holding a `title` child; the rest
/// of the structure depends on the plot kind.
pub fn compile(model: &ChartModel, theme: Option<&Document>, context: &ChartContext) -> Document {
    let root = Element::new(TAG_CHART);
    let mut doc = Document::new(root, context.clone());
    let root = doc.root();
    doc.append_child(
        root,
        Element::new(TAG_TITLE).with_text(model.title.clone().unwrap_or_default()),
    );

    let themes = SeriesThemes::from_document(theme);

    match &model.plot {
        Plot::Bar(graph) => compile_graph(&mut doc, graph, GraphType::Bar, &themes),
        Plot::Line(graph) => compile_graph(&mut doc, graph, GraphType::Line, &themes),
        Plot::Area(graph) => compile_graph(&mut doc, graph, GraphType::Area, &themes),
        Plot::Pie(pie) => compile_pie(&mut doc, pie, &themes),
        Plot::Dial(dial) => compile_dial(&mut doc, dial),
    }

    log::debug!(
        "compiled {} plot into {} elements",
        kind_name(&model.plot),
        doc.len()
    );
    doc
}

fn kind_name(plot: &Plot) -> &'static str {
    match plot {
        Plot::Bar(_) => "bar",
        Plot::Line(_) => "line",
        Plot::Area(_) => "area",
        Plot::Pie(_) => "pie",
        Plot::Dial(_) => "dial",
    }
}

// =============================================================================
// Theme Lookup
// =============================================================================

/// Authored styles of the theme's `series` elements, matched by position
struct SeriesThemes {
    styles: Vec<StyleMap>,
}

impl SeriesThemes {
    fn from_document(theme: Option<&Document>) -> Self {
        let styles = match theme {
            Some(doc) => doc
                .find_children_by_tag(doc.root(), TAG_SERIES)
                .into_iter()
                .map(|id| doc.element(id).style().clone())
                .collect(),
            None => Vec::new(),
        };
        Self { styles }
    }

    /// Color of the i-th themed series, if the theme has one
    fn color(&self, index: usize) -> Option<RGBColor> {
        self.styles.get(index)?.color(StyleKey::Color)
    }
}

fn series_element(series_type: SeriesType, color: Option<RGBColor>) -> Element {
    let mut element = Element::new(TAG_SERIES);
    if let Some(c) = color {
        element.set_style(StyleKey::Color, StyleValue::Color(c));
    }
    element.set_style(StyleKey::ChartType, StyleValue::keyword(series_type.keyword()));
    element
}

// =============================================================================
// Categorical Plots (bar, line, area)
// =============================================================================

fn compile_graph(doc: &mut Document, graph: &Graph, graph_type: GraphType, themes: &SeriesThemes) {
    let root = doc.root();
    doc.append_child(
        root,
        Element::new(TAG_RANGE_LABEL).with_text(graph.value_axis_label.clone().unwrap_or_default()),
    );
    doc.append_child(
        root,
        Element::new(TAG_DOMAIN_LABEL)
            .with_text(graph.category_axis_label.clone().unwrap_or_default()),
    );

    for index in 0..graph.series.len() {
        let element = match graph_type {
            GraphType::Bar => bar_series_element(index, themes.color(index)),
            GraphType::Line => line_series_element(themes.color(index)),
            GraphType::Area => area_series_element(themes.color(index)),
        };
        doc.append_child(root, element);
    }

    let orientation = match graph.orientation {
        Orientation::Horizontal => HORIZONTAL,
        Orientation::Vertical => VERTICAL,
    };
    let plot = plot_element(doc.context())
        .with_style(StyleKey::Orientation, StyleValue::keyword(orientation));
    doc.append_child(root, plot);
}

fn bar_series_element(index: usize, color: Option<RGBColor>) -> Element {
    series_element(SeriesType::Bar, color)
        .with_attribute(COLUMN_POSITION, index)
        .with_style(StyleKey::BarStyle, StyleValue::keyword(BAR_STYLE_BAR))
        .with_style(StyleKey::BarMaxWidth, StyleValue::percent(10.0))
}

fn line_series_element(color: Option<RGBColor>) -> Element {
    series_element(SeriesType::Line, color).with_style(StyleKey::LineWidth, StyleValue::px(1.0))
}

fn area_series_element(color: Option<RGBColor>) -> Element {
    series_element(SeriesType::Area, color)
        .with_style(StyleKey::AreaStyle, StyleValue::keyword(AREA_STYLE_AREA))
}

/// `plot` element with the drill-through URL and scale number from the context
fn plot_element(context: &ChartContext) -> Element {
    Element::new(TAG_PLOT)
        .with_style(StyleKey::DrillUrl, StyleValue::Uri(context.drill_url.clone()))
        .with_style(StyleKey::ScaleNum, StyleValue::number(context.scale_number))
}

// =============================================================================
// Pie Plots
// =============================================================================

fn compile_pie(doc: &mut Document, pie: &PiePlot, themes: &SeriesThemes) {
    let root = doc.root();
    for index in 0..pie.wedges.len() {
        doc.append_child(root, series_element(SeriesType::Pie, themes.color(index)));
    }

    let plot = plot_element(doc.context());
    let plot = doc.append_child(root, plot);
    doc.append_child(plot, Element::new(TAG_DATASET).with_attribute("type", "pie"));
}

// =============================================================================
// Dial Plots
// =============================================================================

/// Overall (min, max) of a dial: the first range's minimum and the last range's
/// maximum. Ranges are taken in the order given.
pub fn dial_bounds(ranges: &[DialRange]) -> (f64, f64) {
    match (ranges.first(), ranges.last()) {
        (Some(first), Some(last)) => (first.min, last.max),
        _ => (0.0, 0.0),
    }
}

/// Major tick spacing: a fifth of the dial's span, rounded half up
pub fn major_tick_increment(ranges: &[DialRange]) -> i64 {
    let (min, max) = dial_bounds(ranges);
    ((max - min) / 5.0 + 0.5).floor() as i64
}

fn compile_dial(doc: &mut Document, dial: &DialPlot) {
    let root = doc.root();
    doc.append_child(root, series_element(SeriesType::Dial, None));

    let plot = doc.append_child(
        root,
        Element::new(TAG_PLOT)
            .with_style(
                StyleKey::GradientColor,
                StyleValue::ColorPair(rgb(0xfcfcfc), rgb(0xd7d8da)),
            )
            .with_style(StyleKey::BorderTopWidth, StyleValue::px(2.0))
            .with_style(StyleKey::BorderTopColor, StyleValue::rgb(0x8d8d8d))
            .with_style(StyleKey::BorderTopStyle, StyleValue::keyword(BORDER_SOLID))
            .with_style(StyleKey::BorderBottomColor, StyleValue::rgb(0x5d5d5d))
            .with_style(StyleKey::Color, StyleValue::rgb(0xffffff)),
    );

    doc.append_child(
        plot,
        Element::new(TAG_DIAL_POINTER)
            .with_style(StyleKey::Color, StyleValue::rgb(0x636363))
            .with_style(StyleKey::BorderTopColor, StyleValue::rgb(0x5d5d5d))
            .with_style(StyleKey::BorderTopWidth, StyleValue::px(2.0))
            .with_style(StyleKey::BorderTopStyle, StyleValue::keyword(BORDER_SOLID))
            .with_style(StyleKey::Height, StyleValue::percent(90.0))
            .with_style(StyleKey::Width, StyleValue::percent(5.0)),
    );

    doc.append_child(
        plot,
        Element::new(TAG_DIAL_CAP)
            .with_style(StyleKey::Color, StyleValue::rgb(0x636363))
            .with_style(StyleKey::BorderTopColor, StyleValue::rgb(0x5d5d5d))
            .with_style(StyleKey::BorderTopWidth, StyleValue::px(2.0))
            .with_style(StyleKey::BorderTopStyle, StyleValue::keyword(BORDER_SOLID))
            .with_style(StyleKey::Width, StyleValue::percent(6.0)),
    );

    compile_dial_scale(doc, plot, &dial.ranges);

    doc.append_child(
        plot,
        Element::new(TAG_DIAL_VALUE_INDICATOR)
            .with_style(StyleKey::BorderTopStyle, StyleValue::keyword(BORDER_SOLID))
            .with_style(StyleKey::BorderTopColor, StyleValue::rgb(0x8b8b8b))
            .with_style(StyleKey::BorderTopWidth, StyleValue::px(1.0))
            .with_style(StyleKey::Color, StyleValue::rgb(0x000000))
            .with_style(StyleKey::BackgroundColor, StyleValue::rgb(0xffffff))
            .with_style(StyleKey::FontFamily, StyleValue::keyword(SANS_SERIF))
            .with_style(StyleKey::FontSize, StyleValue::pt(12.0)),
    );

    let ranges = doc.append_child(plot, Element::new(TAG_DIAL_RANGES));
    for range in &dial.ranges {
        // Uncolored ranges only contribute to the scale bounds
        let Some(color) = range.color else {
            continue;
        };
        doc.append_child(
            ranges,
            Element::new(TAG_DIAL_RANGE)
                .with_attribute("lowerbound", range.min)
                .with_attribute("upperbound", range.max)
                .with_style(StyleKey::Color, StyleValue::Color(color)),
        );
    }

    doc.append_child(plot, Element::new(TAG_DATASET).with_attribute("type", "value"));
}

fn compile_dial_scale(doc: &mut Document, plot: ElementId, ranges: &[DialRange]) {
    let (lower, upper) = dial_bounds(ranges);
    let scale = doc.append_child(
        plot,
        Element::new(TAG_SCALE)
            .with_attribute("lowerbound", lower)
            .with_attribute("upperbound", upper)
            .with_attribute("startangle", DIAL_START_ANGLE)
            .with_attribute("extent", DIAL_EXTENT),
    );

    doc.append_child(
        scale,
        Element::new(TAG_TICK_LABEL)
            .with_style(StyleKey::FontFamily, StyleValue::keyword(SANS_SERIF))
            .with_style(StyleKey::FontSize, StyleValue::pt(14.0))
            .with_style(StyleKey::Color, StyleValue::rgb(0x000000)),
    );

    doc.append_child(
        scale,
        Element::new(TAG_MAJOR_TICK)
            .with_attribute("increment", major_tick_increment(ranges))
            .with_style(StyleKey::Width, StyleValue::px(2.0))
            .with_style(StyleKey::Height, StyleValue::percent(4.0))
            .with_style(StyleKey::Color, StyleValue::rgb(0x000000)),
    );

    doc.append_child(
        scale,
        Element::new(TAG_MINOR_TICK)
            .with_attribute("count", MINOR_TICK_COUNT)
            .with_style(StyleKey::Width, StyleValue::px(1.0))
            .with_style(StyleKey::Height, StyleValue::percent(2.0))
            .with_style(StyleKey::Color, StyleValue::rgb(0x8b8b8b)),
    );
}
