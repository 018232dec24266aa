use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use memeforge::{Canvas, CaptionStyle, Compositor, ImageBuf, LayoutConfig, MemeRenderer as _};

#[derive(Parser, Debug)]
#[command(name = "memeforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a single meme as a PNG.
    Compose(ComposeArgs),
    /// Compose every meme listed in a JSON manifest.
    Batch(BatchArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Source image path.
    #[arg(long)]
    image: PathBuf,

    /// Top caption.
    #[arg(long, default_value = "")]
    top: String,

    /// Bottom caption.
    #[arg(long, default_value = "")]
    bottom: String,

    /// Caption font file (TTF/OTF).
    #[arg(long)]
    font: PathBuf,

    /// Output canvas width; defaults to the image width.
    #[arg(long)]
    width: Option<u32>,

    /// Output canvas height; defaults to the image height.
    #[arg(long)]
    height: Option<u32>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Manifest JSON: an array of {"image", "top", "bottom", "out"} entries.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Caption font file (TTF/OTF), shared by every entry.
    #[arg(long)]
    font: PathBuf,
}

#[derive(serde::Deserialize, Debug)]
struct ManifestEntry {
    image: PathBuf,
    #[serde(default)]
    top: String,
    #[serde(default)]
    bottom: String,
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Batch(args) => cmd_batch(args),
    }
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let font_bytes = std::fs::read(&args.font)
        .with_context(|| format!("read font '{}'", args.font.display()))?;
    let mut compositor = Compositor::new(font_bytes, CaptionStyle::default());

    compose_one(
        &mut compositor,
        &args.image,
        &args.top,
        &args.bottom,
        args.width,
        args.height,
        &args.out,
    )?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let manifest = std::fs::read(&args.in_path)
        .with_context(|| format!("read manifest '{}'", args.in_path.display()))?;
    let entries: Vec<ManifestEntry> =
        serde_json::from_slice(&manifest).context("parse manifest json")?;

    let font_bytes = std::fs::read(&args.font)
        .with_context(|| format!("read font '{}'", args.font.display()))?;
    let mut compositor = Compositor::new(font_bytes, CaptionStyle::default());

    for entry in &entries {
        compose_one(
            &mut compositor,
            &entry.image,
            &entry.top,
            &entry.bottom,
            None,
            None,
            &entry.out,
        )?;
        eprintln!("wrote {}", entry.out.display());
    }
    Ok(())
}

fn compose_one(
    compositor: &mut Compositor,
    image_path: &Path,
    top: &str,
    bottom: &str,
    width: Option<u32>,
    height: Option<u32>,
    out: &Path,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(image_path)
        .with_context(|| format!("read image '{}'", image_path.display()))?;
    let image = ImageBuf::decode(&bytes)?;

    let canvas = Canvas::new(
        width.unwrap_or(image.width),
        height.unwrap_or(image.height),
    )?;
    let layout = memeforge::compute(image.size(), canvas.as_size(), &LayoutConfig::default())?;
    let rendered = compositor.render(&image, top, bottom, &layout, canvas)?;

    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        out,
        &rendered.to_straight_rgba8(),
        rendered.width,
        rendered.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}
