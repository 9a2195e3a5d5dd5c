//! Chart Generation Orchestrator
//!
//! Entry points composing the pipeline:
//! ```text
//! rows ──> build_matrix ─────────────┐
//! model ─> theme lookup ─> compile ──┴─> generate_chart ─> resolve_styles ─> plugin ─> bytes
//! ```

use crate::cascade::CascadeResolver;
use crate::compiler::compile;
use crate::data::Scalar;
use crate::document::{ChartContext, Document, ElementId, COLUMN_POSITION, TAG_SERIES};
use crate::error::{ChartError, Result};
use crate::matrix::{build_matrix, AggregationMatrix, ColumnRoles};
use crate::model::ChartModel;
use crate::parser::parse_document;
use crate::render::{ChartOutput, ChartPlugin};
use crate::resolve::resolve_styles;
use crate::theme::ThemeFactory;
use crate::RenderOptions;
use std::path::Path;

// =============================================================================
// Series Links
// =============================================================================

/// Which matrix column feeds a series element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesLink {
    pub series: ElementId,
    /// `None` when the column is outside the matrix or the position is invalid
    pub column: Option<usize>,
}

/// Link every `series` child of the root to a matrix column: its
/// `column-position` attribute when present, else its position among series.
pub fn link_series(document: &Document, matrix: &AggregationMatrix) -> Vec<SeriesLink> {
    document
        .find_children_by_tag(document.root(), TAG_SERIES)
        .into_iter()
        .enumerate()
        .map(|(position, id)| {
            let column = match document.element(id).attribute(COLUMN_POSITION) {
                Some(value) => value.as_i64().and_then(|c| usize::try_from(c).ok()),
                None => Some(position),
            };
            SeriesLink {
                series: id,
                column: column.filter(|&c| c < matrix.column_count()),
            }
        })
        .collect()
}

// =============================================================================
// Document Context
// =============================================================================

/// A chart document bundled with its data
#[derive(Debug, Clone)]
pub struct ChartDocumentContext {
    document: Document,
    matrix: Option<AggregationMatrix>,
    links: Vec<SeriesLink>,
}

impl ChartDocumentContext {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn matrix(&self) -> Option<&AggregationMatrix> {
        self.matrix.as_ref()
    }

    pub fn links(&self) -> &[SeriesLink] {
        &self.links
    }

    /// Hand the document and its data to a rendering plugin
    pub fn render(&self, plugin: &dyn ChartPlugin) -> Result<Box<dyn ChartOutput>> {
        let matrix = self
            .matrix
            .as_ref()
            .ok_or_else(|| ChartError::invalid_input("Chart document has no data attached"))?;
        plugin.render_chart_document(&self.document, matrix)
    }
}

/// Bundle a document with optional data, linking series to matrix columns
pub fn generate_chart(document: Document, matrix: Option<AggregationMatrix>) -> ChartDocumentContext {
    let links = matrix
        .as_ref()
        .map(|m| link_series(&document, m))
        .unwrap_or_default();
    ChartDocumentContext {
        document,
        matrix,
        links,
    }
}

// =============================================================================
// Authored Chart Definitions
// =============================================================================

/// Parse a chart definition, resolving its styles when `cascade` is set
pub fn chart_document(source: &str, cascade: bool) -> Result<Document> {
    let mut document = parse_document(source, ChartContext::default())?;
    if cascade {
        resolve_styles(&mut document, &CascadeResolver::new())?;
    }
    Ok(document)
}

pub fn load_chart_document(path: &Path, cascade: bool) -> Result<Document> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        ChartError::resource_load(format!("Failed to read chart definition {}: {}", path.display(), e))
    })?;
    chart_document(&source, cascade)
}

// =============================================================================
// Chart Creation
// =============================================================================

/// Pivot the rows and build the styled document for `model`.
///
/// The theme is only looked up when both a factory and a theme name are given.
pub fn prepare_chart(
    rows: &[Vec<Scalar>],
    roles: ColumnRoles,
    model: &ChartModel,
    themes: Option<&dyn ThemeFactory>,
    context: &ChartContext,
) -> Result<ChartDocumentContext> {
    let matrix = build_matrix(rows, roles)?;

    let theme = match (themes, model.theme.as_deref()) {
        (Some(factory), Some(name)) => Some(factory.theme_document(name)?),
        _ => None,
    };

    let document = compile(model, theme.as_ref(), context);
    let mut chart = generate_chart(document, Some(matrix));
    resolve_styles(&mut chart.document, &CascadeResolver::new())?;
    Ok(chart)
}

/// Create a chart with explicit column roles and return the encoded bytes
pub fn create_chart_with_columns(
    rows: &[Vec<Scalar>],
    roles: ColumnRoles,
    model: &ChartModel,
    options: &RenderOptions,
    plugin: &dyn ChartPlugin,
    themes: Option<&dyn ThemeFactory>,
) -> Result<Vec<u8>> {
    let chart = prepare_chart(rows, roles, model, themes, &ChartContext::default())?;
    let output = chart.render(plugin)?;

    let mut buffer = Vec::new();
    output.persist_chart(&mut buffer, options.format, options.width, options.height)?;
    log::debug!("created chart of {} bytes", buffer.len());
    Ok(buffer)
}

/// Create a chart, inferring column roles from the shape of the first row
pub fn create_chart(
    rows: &[Vec<Scalar>],
    model: &ChartModel,
    options: &RenderOptions,
    plugin: &dyn ChartPlugin,
) -> Result<Vec<u8>> {
    create_chart_with_columns(rows, ColumnRoles::infer(rows), model, options, plugin, None)
}
