use crate::config::{Config, load_config};
use crate::hierarchy::hierarchy_chain;
use crate::layout::{Layout, compute_layout};
use crate::layout_dump::LayoutDump;
use crate::parser::parse_snapshot;
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::resolve_roots;
use crate::viewport::{ViewTransform, Viewport, ViewportController};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ftree", version, about = "Family tree reconstruction and layout")]
pub struct Args {
    /// Snapshot file (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (layout block, theme preset, themeVariables)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Root person id; repeat for several roots
    #[arg(short = 'r', long = "root")]
    pub roots: Vec<String>,

    /// Print the male-line breadcrumbs of a person and exit
    #[arg(long = "chain", value_name = "ID")]
    pub chain: Option<String>,

    /// Centre the viewport on this person
    #[arg(long = "focus", value_name = "ID")]
    pub focus: Option<String>,

    /// Viewport width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Viewport height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Zoom used with --focus
    #[arg(short = 'z', long = "zoom", default_value_t = 1.0)]
    pub zoom: f32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())
        .with_context(|| format!("failed to load config {:?}", args.config))?;
    config.render.width = args.width;
    config.render.height = args.height;

    let input = read_input(args.input.as_deref())?;
    let snapshot = parse_snapshot(&input)?;

    if let Some(id) = args.chain.as_deref() {
        let chain = hierarchy_chain(&snapshot.graph, id);
        if chain.is_empty() {
            tracing::info!(person = %id, "no male-line ancestors on record");
        }
        println!("{}", chain.breadcrumbs(" > "));
        return Ok(());
    }

    let roots = resolve_roots(&snapshot, &args.roots);
    if roots.is_empty() {
        return Err(anyhow::anyhow!("No root person given and snapshot is empty"));
    }
    let root_ids: Vec<&str> = roots.iter().map(String::as_str).collect();
    let layout = compute_layout(&snapshot.graph, &root_ids, &config.theme, &config.layout);
    tracing::debug!(
        nodes = layout.nodes.len(),
        people = layout.person_count(),
        "layout ready"
    );

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &config.theme, &config.layout, &config.render);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&layout, &config.theme, &config.layout, &config.render);
            write_output_png(&svg, &output, &config.render, &config.theme)?;
        }
        OutputFormat::Json => {
            let transform = view_transform(&layout, &config, args.focus.as_deref(), args.zoom)?;
            let dump = LayoutDump::from_layout(&layout, Some(transform));
            let json = dump.to_json()?;
            match args.output.as_deref() {
                Some(path) => std::fs::write(path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{json}"),
            }
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

fn view_transform(
    layout: &Layout,
    config: &Config,
    focus: Option<&str>,
    zoom: f32,
) -> Result<ViewTransform> {
    let controller = ViewportController::new(
        layout,
        Viewport {
            width: config.render.width,
            height: config.render.height,
        },
    );
    match focus {
        Some(id) => controller
            .zoom_to_person(id, zoom)
            .ok_or_else(|| anyhow::anyhow!("Person {id} is not part of the drawn tree")),
        None => Ok(controller.zoom_to_fit()),
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
