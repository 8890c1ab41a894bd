use crate::config::load_config;
use crate::ir::Highlight;
use crate::layout_dump::write_layout_dump;
use crate::render::write_output_svg;
use crate::session::Session;
use crate::source::{JsonFileSource, load_or_empty};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ratlas", version, about = "Render the research network as a radial map")]
pub struct Args {
    /// Graph store export (JSON with `researchers` and `institutions` rows)
    #[arg(short = 'd', long = "data")]
    pub data: PathBuf,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Select a single institution, as a marker click would
    #[arg(short = 'i', long = "institution")]
    pub institution: Option<String>,

    /// Module code to filter on (repeatable)
    #[arg(short = 'm', long = "module")]
    pub modules: Vec<String>,

    /// Year shown by the time slider
    #[arg(short = 'y', long = "year")]
    pub year: Option<i32>,

    /// Attribute pill to highlight, as attribute=value (repeatable)
    #[arg(long = "highlight")]
    pub highlights: Vec<Highlight>,

    /// Fit the view to the displayed institutions
    #[arg(long = "fit")]
    pub fit: bool,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let source = JsonFileSource::new(&args.data);
    let records = load_or_empty(&source);
    let mut session = Session::new(records, config);
    for notice in session.notices() {
        eprintln!("warning: {}", notice.message);
    }

    if let Some(institution) = args.institution.as_deref() {
        session.on_institution_click(institution);
    }
    if !args.modules.is_empty() {
        session.on_module_filter_change(&args.modules);
    }
    if let Some(year) = args.year {
        session.on_year_change(year);
    }
    for highlight in args.highlights {
        session.on_attribute_toggle(highlight);
    }
    if args.fit {
        session.fit_to_selection();
    }

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&session.render_svg(), args.output.as_deref())?;
        }
        OutputFormat::Png => write_png(&session, args.output)?,
        OutputFormat::Json => {
            write_layout_dump(
                args.output.as_deref(),
                session.layout(),
                session.filter(),
                session.viewport(),
            )?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(session: &Session, output: Option<PathBuf>) -> Result<()> {
    let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
    let mut render = session.config().render.clone();
    render.width = session.viewport().width;
    render.height = session.viewport().height;
    crate::render::write_output_png(&session.render_svg(), &output, &render)
}

#[cfg(not(feature = "png"))]
fn write_png(_session: &Session, _output: Option<PathBuf>) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}
