// Input side of a run: locating input files, decoding them and bringing
// them to their target size.
//
// Images are only ever shrunk. With both a width and a height the target
// is clamped to the original size per axis, and a mismatching aspect ratio
// is resolved by padding (`fit`) or cropping (`fill`). With only one
// dimension the other one follows the original aspect ratio.
use std::path::{Path, PathBuf};

use image::{imageops::FilterType, DynamicImage, ImageReader, Rgba, RgbaImage};
use itertools::Itertools;
use log::{info, warn};

use crate::{
    common::DecodedImage,
    error::{AssetError, Result},
};

pub const DEFAULT_WIDTH: u32 = 160;
pub const DEFAULT_HEIGHT: u32 = 120;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ScaleMode {
    /// Pad to the requested size, keeping the whole image visible.
    #[default]
    Fit,
    /// Crop to the requested size, filling it completely.
    Fill,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ResizeOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scale: ScaleMode,
}

impl ResizeOptions {
    /// Falls back to 160x120 when neither dimension is given.
    pub fn new(width: Option<u32>, height: Option<u32>, scale: ScaleMode) -> Self {
        match (width, height) {
            (None, None) => ResizeOptions {
                width: Some(DEFAULT_WIDTH),
                height: Some(DEFAULT_HEIGHT),
                scale,
            },
            _ => ResizeOptions {
                width,
                height,
                scale,
            },
        }
    }

    pub fn original_size() -> Self {
        ResizeOptions {
            width: None,
            height: None,
            scale: ScaleMode::Fit,
        }
    }
}

/// A decoded input together with its logical name (the file stem).
pub struct LoadedImage {
    pub name: String,
    pub image: DecodedImage,
}

/// Expands glob patterns into a sorted, duplicate-free list of paths.
/// Patterns that match nothing contribute nothing.
pub fn expand_inputs<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PathBuf>> {
    let mut paths = vec![];
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let entries = glob::glob(pattern).map_err(|source| AssetError::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })?;
        for entry in entries {
            match entry {
                Ok(path) => paths.push(path),
                Err(e) => warn!("Skipping unreadable path: {}", e),
            }
        }
    }
    Ok(paths.into_iter().sorted().dedup().collect())
}

pub fn image_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn pad(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let fitted = img.resize(width, height, FilterType::Lanczos3).to_rgba8();
    let background = if img.color().has_alpha() {
        Rgba([0, 0, 0, 0])
    } else {
        Rgba([0, 0, 0, 255])
    };
    let mut canvas = RgbaImage::from_pixel(width, height, background);
    let x = (width - fitted.width()) / 2;
    let y = (height - fitted.height()) / 2;
    image::imageops::replace(&mut canvas, &fitted, x as i64, y as i64);
    DynamicImage::ImageRgba8(canvas)
}

pub fn resize(img: DynamicImage, options: &ResizeOptions) -> DynamicImage {
    let (orig_width, orig_height) = (img.width(), img.height());
    match (options.width, options.height) {
        (Some(width), Some(height)) => {
            let target_width = width.min(orig_width);
            let target_height = height.min(orig_height);
            if target_width < orig_width || target_height < orig_height {
                match options.scale {
                    ScaleMode::Fill => {
                        info!(
                            "Resizing and cropping image to {}x{} pixels (fill mode).",
                            target_width, target_height
                        );
                        img.resize_to_fill(target_width, target_height, FilterType::Lanczos3)
                    }
                    ScaleMode::Fit => {
                        info!(
                            "Resizing and padding image to {}x{} pixels (fit mode).",
                            target_width, target_height
                        );
                        pad(&img, target_width, target_height)
                    }
                }
            } else {
                info!(
                    "Requested size {}x{} is larger than original {}x{}. Keeping original size.",
                    width, height, orig_width, orig_height
                );
                img
            }
        }
        (Some(width), None) if width < orig_width => {
            info!(
                "Resizing image to width {} while maintaining aspect ratio (no enlargement).",
                width
            );
            let new_height = (width as f64 * orig_height as f64 / orig_width as f64) as u32;
            img.resize_exact(width, new_height.max(1), FilterType::Lanczos3)
        }
        (None, Some(height)) if height < orig_height => {
            info!(
                "Resizing image to height {} while maintaining aspect ratio (no enlargement).",
                height
            );
            let new_width = (height as f64 * orig_width as f64 / orig_height as f64) as u32;
            img.resize_exact(new_width.max(1), height, FilterType::Lanczos3)
        }
        _ => img,
    }
}

pub fn load_image(path: &Path, options: &ResizeOptions) -> image::ImageResult<DecodedImage> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    Ok(resize(img, options).to_rgba8())
}

/// Decodes every path, skipping (and logging) the ones that fail.
pub fn load_images(paths: &[PathBuf], options: &ResizeOptions) -> Vec<LoadedImage> {
    paths
        .iter()
        .filter_map(|path| match load_image(path, options) {
            Ok(image) => Some(LoadedImage {
                name: image_name(path),
                image,
            }),
            Err(e) => {
                warn!("Skipping '{}': {}", path.display(), e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};

    fn red_rgb(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([255, 0, 0])))
    }

    #[test]
    fn test_default_size() {
        let opts = ResizeOptions::new(None, None, ScaleMode::Fit);
        assert_eq!(opts.width, Some(160));
        assert_eq!(opts.height, Some(120));
        let opts = ResizeOptions::new(Some(32), None, ScaleMode::Fit);
        assert_eq!(opts.height, None);
    }

    #[test]
    fn test_no_enlargement() {
        let opts = ResizeOptions::new(Some(100), Some(100), ScaleMode::Fit);
        let out = resize(red_rgb(64, 48), &opts);
        assert_eq!(out.dimensions(), (64, 48));
        let opts = ResizeOptions::new(Some(100), None, ScaleMode::Fit);
        assert_eq!(resize(red_rgb(64, 48), &opts).dimensions(), (64, 48));
    }

    #[test]
    fn test_fit_pads_with_opaque_black_for_rgb() {
        let opts = ResizeOptions::new(Some(32), Some(32), ScaleMode::Fit);
        let out = resize(red_rgb(64, 48), &opts).to_rgba8();
        assert_eq!(out.dimensions(), (32, 32));
        assert_eq!(out.get_pixel(16, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(out.get_pixel(16, 16)[3], 255);
    }

    #[test]
    fn test_fit_pads_with_transparency_for_rgba() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 48, Rgba([0, 255, 0, 255])));
        let opts = ResizeOptions::new(Some(32), Some(32), ScaleMode::Fit);
        let out = resize(img, &opts).to_rgba8();
        assert_eq!(out.get_pixel(16, 0)[3], 0);
    }

    #[test]
    fn test_fill_crops() {
        let opts = ResizeOptions::new(Some(32), Some(32), ScaleMode::Fill);
        let out = resize(red_rgb(64, 48), &opts);
        assert_eq!(out.dimensions(), (32, 32));
    }

    #[test]
    fn test_single_dimension_keeps_aspect() {
        let opts = ResizeOptions::new(Some(32), None, ScaleMode::Fit);
        assert_eq!(resize(red_rgb(64, 48), &opts).dimensions(), (32, 24));
        let opts = ResizeOptions::new(None, Some(12), ScaleMode::Fit);
        assert_eq!(resize(red_rgb(64, 48), &opts).dimensions(), (16, 12));
    }

    #[test]
    fn test_expand_inputs_sorted_and_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.png", "c.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let pattern = format!("{}/*.png", dir.path().display());
        let a = dir.path().join("a.png").display().to_string();
        let paths = expand_inputs(&[pattern, a]).unwrap();
        assert_eq!(
            paths,
            vec![dir.path().join("a.png"), dir.path().join("b.png")]
        );
    }

    #[test]
    fn test_load_images_skips_undecodable() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]))
            .save(&good)
            .unwrap();
        let bad = dir.path().join("bad.png");
        std::fs::write(&bad, b"not an image").unwrap();

        let loaded = load_images(&[bad, good], &ResizeOptions::original_size());
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "good");
        assert_eq!(loaded[0].image.dimensions(), (4, 4));
    }
}
