use crate::config::load_config;
use crate::generate;
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_relations;
use crate::render::{render_svg, write_output_pptx, write_output_text};
use crate::theme::Theme;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "orgc", version, about = "Ownership organogram generator (editable PowerPoint output)")]
pub struct Args {
    /// Relations file (`Parent --> Child : 60` lines or a JSON array) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. SVG/JSON default to stdout, PPTX to `<title>.pptx`.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "pptx")]
    pub output_format: OutputFormat,

    /// Config JSON/JSON5 file (style, themeVariables, layout)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Style preset: flat, neumorphic, bordered, minimalist
    #[arg(short = 's', long = "style")]
    pub style: Option<String>,

    /// Target canvas width in points; smaller drawings are centered in it
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Presentation title, also used for the default file name
    #[arg(short = 't', long = "title")]
    pub title: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pptx,
    Svg,
    Json,
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(style) = args.style.as_deref() {
        config.theme = Theme::from_name(style)
            .ok_or_else(|| anyhow::anyhow!("Unknown style preset: {style}"))?;
    }
    if let Some(width) = args.width {
        config.layout.target_width = width;
    }
    if let Some(title) = args.title {
        config.render.title = title;
    }

    let input = read_input(args.input.as_deref())?;
    let store = parse_relations(&input)?;
    let relations = store.snapshot();
    let generated = generate(&relations, &config)?;

    match args.output_format {
        OutputFormat::Pptx => {
            let output = args
                .output
                .unwrap_or_else(|| PathBuf::from(generated.presentation.file_name()));
            write_output_pptx(&generated.presentation, &output)?;
        }
        OutputFormat::Svg => {
            let svg = render_svg(&generated.presentation, &generated.layout, &config.theme)?;
            write_output_text(&svg, args.output.as_deref())?;
        }
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => {
                let file = std::fs::File::create(path)?;
                write_layout_dump(io::BufWriter::new(file), &generated.layout)?;
            }
            None => write_layout_dump(io::stdout().lock(), &generated.layout)?,
        },
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
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
