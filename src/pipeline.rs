// One conversion run, from input patterns to the written asset file.
//
// The palette is the only thing shared between images, so it is fixed
// first (for a derived palette this needs every image decoded). After
// that each image is assigned and encoded independently, in parallel,
// and the results are written in input order.
use std::{fs, path::PathBuf};

use log::info;
use rayon::prelude::*;

use crate::{
    assign::{assign_indices, IndexGrid},
    encode::{encode, EncodedAsset},
    error::{AssetError, Result},
    load::{expand_inputs, load_images, LoadedImage, ResizeOptions},
    palette::{Palette, PaletteSource},
    raster::save_indexed_png,
    writer::AssetGroup,
};

#[derive(Clone, Debug)]
pub struct Options {
    /// Input paths or glob patterns.
    pub inputs: Vec<String>,
    pub output_dir: PathBuf,
    pub resize: ResizeOptions,
    pub palette: PaletteSource,
    /// Where to additionally store the palette as JSON.
    pub save_palette: Option<PathBuf>,
}

pub struct ConvertedImage {
    pub name: String,
    pub grid: IndexGrid,
    pub asset: EncodedAsset,
}

#[derive(Debug)]
pub struct RunSummary {
    pub palette: Palette,
    pub asset_path: PathBuf,
    pub raster_paths: Vec<PathBuf>,
}

/// Assigns and encodes every image against the shared palette. The output
/// order matches the input order.
pub fn convert_images(images: &[LoadedImage], palette: &Palette) -> Result<Vec<ConvertedImage>> {
    images
        .par_iter()
        .map(|img| -> Result<ConvertedImage> {
            info!("Applying palette to create '{}'.", img.name);
            let grid = assign_indices(&img.image, palette);
            let asset = encode(&img.name, &grid)?;
            Ok(ConvertedImage {
                name: img.name.clone(),
                grid,
                asset,
            })
        })
        .collect()
}

fn asset_file_name(images: &[LoadedImage]) -> String {
    match images {
        [single] => format!("{}.ts", single.name),
        _ => "assets.ts".to_string(),
    }
}

pub fn run(options: &Options) -> Result<RunSummary> {
    // Explicit palettes are validated before any image is touched.
    let explicit_palette = match &options.palette {
        PaletteSource::Derived => None,
        source => Some(source.build(&[])?),
    };

    let paths = expand_inputs(&options.inputs)?;
    let images = load_images(&paths, &options.resize);
    if images.is_empty() {
        return Err(AssetError::NoValidInputImages);
    }

    let palette = match explicit_palette {
        Some(palette) => palette,
        None => {
            let decoded: Vec<_> = images.iter().map(|img| &img.image).collect();
            PaletteSource::Derived.build(&decoded)?
        }
    };

    // Every image must encode before anything reaches the disk.
    let converted = convert_images(&images, &palette)?;

    if let Some(path) = &options.save_palette {
        palette.save_json(path)?;
    }

    fs::create_dir_all(&options.output_dir).map_err(|source| AssetError::Io {
        path: options.output_dir.clone(),
        source,
    })?;

    let mut group = AssetGroup::new(palette);
    let mut raster_paths = vec![];
    for image in converted {
        let png_path = options.output_dir.join(format!("{}.png", image.name));
        save_indexed_png(&png_path, &image.grid, &palette)?;
        raster_paths.push(png_path);
        group.push(image.asset);
    }

    let asset_path = options.output_dir.join(asset_file_name(&images));
    group.write(&asset_path)?;

    Ok(RunSummary {
        palette,
        asset_path,
        raster_paths,
    })
}
