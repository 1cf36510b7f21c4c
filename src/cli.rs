use crate::canvas::Canvas;
use crate::config::{Config, load_config};
use crate::parser::parse_graph;
use crate::render::{render_svg, write_output_svg};
use crate::scene::GraphRenderer;
use crate::scene_dump::write_scene_dump;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gcr", version, about = "Render a positioned graph document to SVG or PNG")]
pub struct Args {
    /// Input graph document (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, style, canvas)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Drawable width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Drawable height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Margin kept clear inside the drawable rectangle
    #[arg(long = "margin")]
    pub margin: Option<f32>,

    /// Write the drawn scene records as JSON
    #[arg(long = "dumpScene")]
    pub dump_scene: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = apply_overrides(load_config(args.config.as_deref())?, &args);

    let input = read_input(args.input.as_deref())?;
    let parsed = parse_graph(&input)?;
    for err in &parsed.errors {
        eprintln!("warning: {err}");
    }
    let mut graph = parsed.graph;
    let canvas = Canvas::from_config(&config)?;

    let mut scene = GraphRenderer::from_config(&config);
    if let Err(err) = scene.draw_graph(&mut graph, &canvas) {
        if !err.is_format() {
            return Err(err.into());
        }
        // The rest of the scene is still drawn; report and keep going.
        eprintln!("warning: {err}");
    }

    if let Some(path) = args.dump_scene.as_deref() {
        write_scene_dump(path, &scene)?;
    }

    let svg = render_svg(&scene);
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &config)?;
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn apply_overrides(mut config: Config, args: &Args) -> Config {
    if let Some(width) = args.width {
        config.canvas.width = width;
    }
    if let Some(height) = args.height {
        config.canvas.height = height;
    }
    if let Some(margin) = args.margin {
        config.canvas.margin = margin;
    }
    config
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(
        svg,
        output,
        config.canvas.width,
        config.canvas.height,
        &config.theme.font_family,
    )
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the `png` feature"
    ))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!(
        "Output path required for {} output",
        ext
    ))
}
