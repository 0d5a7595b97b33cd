use std::fs;
use std::path::PathBuf;

use addgrid::{debug::save_preview, ImageSource, LabelPosition, RenderSettings, Session};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::*;
use tracing_subscriber::EnvFilter;

/// Overlay a labeled grid on an image and export it next to the original.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Image to process
    input: PathBuf,

    /// Number of columns (2-26)
    #[arg(long, default_value_t = 6)]
    columns: u32,

    /// Number of rows (2-99)
    #[arg(long, default_value_t = 6)]
    rows: u32,

    /// Draw grid lines
    #[arg(long)]
    grid: bool,

    /// Label placement: none, top-left, bottom-right or all
    #[arg(long, default_value_t = LabelPosition::TopLeft)]
    labels: LabelPosition,

    /// Black text with a white outline instead of white on black
    #[arg(long)]
    dark_text: bool,

    /// Stamp the caption in the bottom-right corner
    #[arg(long)]
    watermark: bool,

    /// Directory for the exported file, defaults to the input's directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Also save the on-screen preview to this path
    #[arg(long)]
    preview: Option<PathBuf>,
}

impl Args {
    fn settings(&self) -> RenderSettings {
        let mut settings = RenderSettings::default();
        settings.set_columns(self.columns);
        settings.set_rows(self.rows);
        settings.set_show_grid(self.grid);
        settings.set_label_position(self.labels);
        settings.set_dark_text(self.dark_text);
        settings.set_add_watermark(self.watermark);
        settings
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let source = ImageSource::from_path(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let mut session = Session::default();
    session.set_settings(args.settings());
    session.load(source).context("Failed to load image")?;

    if let Some(path) = &args.preview {
        if let Some(preview) = session.preview() {
            save_preview(preview, path).context("Failed to save preview")?;
        }
    }

    let exported = session.export().context("Failed to export image")?;
    let out_dir = match &args.out_dir {
        Some(dir) => dir.clone(),
        None => args
            .input
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default(),
    };
    let out_path = out_dir.join(&exported.file_name);
    fs::write(&out_path, &exported.bytes)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    info!("Wrote {}", out_path.display());

    Ok(())
}
