use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fourcut", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a composite described by a request JSON file as a PNG.
    Render(RenderArgs),
    /// Print the frame geometry for a container size as JSON.
    Geometry(GeometryArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input request JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Font file for the caption (overrides the request's `font`).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output pixels per layout unit (overrides the request's `options.scale`).
    #[arg(long)]
    scale: Option<f64>,
}

#[derive(Parser, Debug)]
struct GeometryArgs {
    /// Container width in layout units.
    #[arg(long)]
    width: f64,

    /// Container height in layout units.
    #[arg(long)]
    height: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Geometry(args) => cmd_geometry(args),
    }
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let spec = fourcut::RequestSpec::from_path(&args.in_path)?;
    let base_dir = args.in_path.parent().unwrap_or_else(|| Path::new("."));

    let request = spec.to_request(Some(base_dir))?;
    let mut options = spec.options.clone();
    if let Some(scale) = args.scale {
        options.scale = scale;
    }

    let mut renderer = fourcut::CompositeRenderer::new(options)?;
    if let Some(font) = args.font.or_else(|| spec.font_path(Some(base_dir))) {
        let blob = fourcut::FontBlob::from_path(&font)
            .with_context(|| format!("load font '{}'", font.display()))?;
        renderer = renderer.with_font(blob);
    }
    let renderer = renderer.with_system_font();
    let fetcher = fourcut::SourceFetcher::new(&renderer.options().fetch)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    let image = runtime.block_on(renderer.render(&request, &fetcher))?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    let rgba = image.to_rgba_image()?;
    image::save_buffer_with_format(
        &args.out,
        rgba.as_raw(),
        image.width,
        image.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_geometry(args: GeometryArgs) -> anyhow::Result<()> {
    let geometry = fourcut::compute_geometry(
        fourcut::Size::new(args.width, args.height),
        &fourcut::ChromeInsets::default(),
    );
    let json = serde_json::to_string_pretty(&geometry).context("serialize geometry")?;
    println!("{json}");
    Ok(())
}
