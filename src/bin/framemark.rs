use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use framemark::{
    AuxFile, Color, Model, ModelParams, NamedUpload, VideoOptions, process_images, process_video,
    zip_archive,
};

#[derive(Parser, Debug)]
#[command(name = "framemark", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a set of images and package the results into a ZIP archive.
    Images(ImagesArgs),
    /// Re-encode a video with every frame processed (requires `ffmpeg` on PATH).
    Video(VideoArgs),
}

#[derive(Parser, Debug)]
struct ImagesArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// Output ZIP path.
    #[arg(long)]
    out: PathBuf,

    /// Input image files, processed in the given order.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct VideoArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// Target bitrate in kbit/s (encoder default when omitted).
    #[arg(long)]
    bitrate: Option<u32>,

    /// Input video path.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ModelArgs {
    /// Model selection ("Model A", "Model B", "Model C", "Custom").
    #[arg(long, default_value = "Model A")]
    model: String,

    /// Rectangle color as R,G,B with each channel in 0-255. Defaults to the
    /// selected model's color.
    #[arg(long, value_parser = parse_color)]
    color: Option<Color>,

    /// Checkpoint file for the Custom model.
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Config file for the Custom model.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_color(s: &str) -> Result<Color, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err("expected R,G,B".to_string());
    }
    let mut rgb: Color = [0; 3];
    for (slot, part) in rgb.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse::<u8>()
            .map_err(|e| format!("bad channel '{}': {e}", part.trim()))?;
    }
    Ok(rgb)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Images(args) => cmd_images(args),
        Command::Video(args) => cmd_video(args),
    }
}

fn load_aux(path: Option<&Path>) -> anyhow::Result<Option<AuxFile>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let data = fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    Ok(Some(AuxFile {
        name: file_name(path, "upload"),
        data,
    }))
}

fn file_name(path: &Path, fallback: &str) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(fallback)
        .to_string()
}

fn build_model(args: &ModelArgs) -> anyhow::Result<Model> {
    let params = ModelParams {
        color: args.color,
        checkpoint_file: load_aux(args.checkpoint.as_deref())?,
        config_file: load_aux(args.config.as_deref())?,
    };
    Ok(Model::from_selection(&args.model, params)?)
}

fn cmd_images(args: ImagesArgs) -> anyhow::Result<()> {
    let model = build_model(&args.model)?;

    let mut uploads = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let data = fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
        uploads.push(NamedUpload::new(file_name(path, "image"), data));
    }

    let total = uploads.len();
    let mut done = 0usize;
    let processed = process_images(&model, &uploads, &mut |fraction| {
        done += 1;
        tracing::info!("processed image {done}/{total} ({:.0}%)", fraction * 100.0);
    })?;

    let archive = zip_archive(&processed)?;
    fs::write(&args.out, archive).with_context(|| format!("write '{}'", args.out.display()))?;
    tracing::info!(out = %args.out.display(), entries = total, "wrote archive");
    Ok(())
}

fn cmd_video(args: VideoArgs) -> anyhow::Result<()> {
    let model = build_model(&args.model)?;
    let upload =
        fs::read(&args.in_path).with_context(|| format!("read '{}'", args.in_path.display()))?;

    let opts = VideoOptions {
        bitrate_kbps: args.bitrate,
    };

    let mut last_percent = 0u32;
    let bytes = process_video(&model, &upload, &opts, &mut |fraction| {
        let percent = (fraction * 100.0) as u32;
        if percent > last_percent {
            last_percent = percent;
            tracing::info!("encoding {percent}%");
        }
    })?;

    fs::write(&args.out, bytes).with_context(|| format!("write '{}'", args.out.display()))?;
    tracing::info!(out = %args.out.display(), "wrote video");
    Ok(())
}
