use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::{Builder, Target};
use pivotchart::data::ResultSet;
use pivotchart::document::ChartContext;
use pivotchart::factory::prepare_chart;
use pivotchart::matrix::ColumnRoles;
use pivotchart::model::ChartModel;
use pivotchart::render::PlottersPlugin;
use pivotchart::theme::{DirectoryThemeFactory, ThemeFactory};
use pivotchart::OutputFormat;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "pivotchart")]
#[command(about = "Pivot tabular data and render it as a styled chart", long_about = None)]
struct Args {
    /// Chart model JSON file (e.g. '{"title": "Sales", "plot": {"type": "bar", ...}}')
    #[arg(short, long)]
    model: PathBuf,

    /// Data file (CSV, or JSON for .json files); CSV is read from stdin when omitted
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Directory holding <name>.theme files
    #[arg(long)]
    theme_dir: Option<PathBuf>,

    /// Range (measure) column, by header name or index
    #[arg(long)]
    range: Option<String>,

    /// Domain (row grouping) column, by header name or index
    #[arg(long)]
    domain: Option<String>,

    /// Category (column grouping) column, by header name or index
    #[arg(long)]
    category: Option<String>,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Output format: png or svg
    #[arg(short, long, default_value_t = OutputFormat::Png)]
    format: OutputFormat,

    /// Print the styled chart document as JSON instead of an image
    #[arg(long)]
    dump_document: bool,
}

fn init_logging() {
    let mut builder = Builder::from_default_env();
    builder.target(Target::Stderr);
    builder.init();
}

fn read_data(path: Option<&Path>) -> Result<ResultSet> {
    let Some(path) = path else {
        return ResultSet::from_csv(io::stdin().lock()).context("Failed to read CSV from stdin");
    };

    let is_json = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON data in {}", path.display()))?;
        Ok(ResultSet::from_json(&value)?)
    } else {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        ResultSet::from_csv(file).with_context(|| format!("Failed to read CSV from {}", path.display()))
    }
}

fn select_column(data: &ResultSet, selector: &str, role: &str) -> Result<usize> {
    match data.column_index(selector) {
        Some(index) => Ok(index),
        None => bail!("Unknown {} column '{}'", role, selector),
    }
}

/// Explicit roles when any column flag is given, else the positional convention
fn column_roles(args: &Args, data: &ResultSet) -> Result<ColumnRoles> {
    if args.range.is_none() && args.domain.is_none() && args.category.is_none() {
        return Ok(ColumnRoles::infer(&data.rows));
    }
    let range = match &args.range {
        Some(s) => select_column(data, s, "range")?,
        None => 0,
    };
    let domain = args
        .domain
        .as_deref()
        .map(|s| select_column(data, s, "domain"))
        .transpose()?;
    let category = args
        .category
        .as_deref()
        .map(|s| select_column(data, s, "category"))
        .transpose()?;
    Ok(ColumnRoles::new(range, domain, category))
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let model = ChartModel::from_path(&args.model).context("Failed to load chart model")?;
    let data = read_data(args.data.as_deref())?;
    let roles = column_roles(&args, &data)?;
    log::info!("{} rows, roles {:?}", data.rows.len(), roles);

    let themes = args.theme_dir.as_ref().map(|dir| DirectoryThemeFactory::new(dir.clone()));
    let chart = prepare_chart(
        &data.rows,
        roles,
        &model,
        themes.as_ref().map(|t| t as &dyn ThemeFactory),
        &ChartContext::default(),
    )
    .context("Failed to build chart document")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if args.dump_document {
        let json = serde_json::to_string_pretty(&chart.document().to_json())
            .context("Failed to serialize chart document")?;
        writeln!(handle, "{}", json).context("Failed to write document to stdout")?;
        return Ok(());
    }

    let output = chart
        .render(&PlottersPlugin)
        .context("Failed to render chart")?;
    output
        .persist_chart(&mut handle, args.format, args.width, args.height)
        .with_context(|| format!("Failed to write {} to stdout", args.format))?;

    Ok(())
}
