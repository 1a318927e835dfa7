use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use img2asset::{
    load::{ResizeOptions, ScaleMode},
    palette::PaletteSource,
    pipeline::{self, Options},
};

/// Create MakeCode Arcade compatible asset(s) from image(s) and save PNG
/// file(s) for reference.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The path(s) to the input image file(s), supports wildcards (e.g. '*.bmp').
    #[arg(required = true)]
    input_path: Vec<String>,

    /// Directory where output files will be saved.
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Width of the output image(s) in pixels. Defaults to 160 if --height is
    /// also omitted. If only --width is given, height keeps the aspect ratio.
    #[arg(short, long)]
    width: Option<u32>,

    /// Height of the output image(s) in pixels. Defaults to 120 if --width is
    /// also omitted. If only --height is given, width keeps the aspect ratio.
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// How to handle an aspect ratio mismatch when both width and height are given.
    #[arg(short, long, value_enum, default_value_t = ScaleMode::Fit)]
    scale: ScaleMode,

    /// Comma-separated list of hex colors (e.g. '#FF0000,#00FF00') to use as
    /// the palette. The first color is used for transparency. Up to 16 colors.
    #[arg(short, long, conflicts_with = "palette_file")]
    palette: Option<String>,

    /// JSON file with a 'palette' key holding a list of hex color strings,
    /// e.g. {"palette": ["#000000", "#FFFFFF", ...]}
    #[arg(short = 'f', long)]
    palette_file: Option<PathBuf>,

    /// Also write the palette in use to this JSON file.
    #[arg(long)]
    save_palette: Option<PathBuf>,
}

impl Args {
    fn palette_source(&self) -> PaletteSource {
        match (&self.palette, &self.palette_file) {
            (Some(list), _) => PaletteSource::HexList(list.clone()),
            (None, Some(path)) => PaletteSource::File(path.clone()),
            (None, None) => PaletteSource::Derived,
        }
    }
}

pub fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let options = Options {
        inputs: args.input_path.clone(),
        output_dir: args.output.clone(),
        resize: ResizeOptions::new(args.width, args.height, args.scale),
        palette: args.palette_source(),
        save_palette: args.save_palette.clone(),
    };
    let summary = pipeline::run(&options).context("Conversion failed")?;
    info!(
        "Wrote {} image(s) to '{}'.",
        summary.raster_paths.len(),
        summary.asset_path.display()
    );
    Ok(())
}
