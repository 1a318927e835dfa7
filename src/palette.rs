// Construction of the shared 16-color palette.
//
// A palette comes from exactly one source: an explicit list of hex colors,
// a JSON palette file, or the content of the input images themselves. In
// the last case slot 0 is fixed to black and reserved for transparency,
// and the 15 remaining slots are filled by median cut.
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use json_pretty_compact::PrettyCompactFormatter;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Serializer;

use crate::{
    common::{ColorRGB, DecodedImage, BLACK, CONTENT_COLORS, PALETTE_SIZE, WHITE},
    error::{AssetError, Result},
    helpers::{alpha_blend, rgb},
    quantize::{histogram, median_cut},
};

/// Exactly 16 RGB entries; immutable once built.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: [ColorRGB; PALETTE_SIZE],
}

/// On-disk palette document: `{"palette": ["#RRGGBB", ...]}`.
#[derive(Serialize, Deserialize)]
struct PaletteFile {
    palette: Vec<String>,
}

/// Where the palette of a run comes from, in priority order.
#[derive(Clone, Debug)]
pub enum PaletteSource {
    /// Comma-separated `#RRGGBB` list.
    HexList(String),
    /// JSON palette file.
    File(PathBuf),
    /// Median cut over all input images.
    Derived,
}

impl PaletteSource {
    pub fn build(&self, images: &[&DecodedImage]) -> Result<Palette> {
        match self {
            PaletteSource::HexList(list) => {
                info!("Using custom palette provided via command line.");
                Palette::from_hex_str(list)
            }
            PaletteSource::File(path) => {
                info!("Using custom palette from file: {}", path.display());
                Palette::load_json(path)
            }
            PaletteSource::Derived => {
                info!("Generating shared palette from all input images.");
                Palette::from_images(images)
            }
        }
    }
}

pub fn parse_hex_color(s: &str) -> Result<ColorRGB> {
    let invalid = || AssetError::InvalidPaletteFormat {
        value: s.to_string(),
    };
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let mut color: ColorRGB = [0, 0, 0];
    for (i, c) in color.iter_mut().enumerate() {
        *c = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
    }
    Ok(color)
}

impl Palette {
    /// Builds a palette from hex strings. Only the first 16 entries are used;
    /// missing trailing entries are black.
    pub fn from_hex_list<S: AsRef<str>>(hex_colors: &[S]) -> Result<Self> {
        let mut hex_colors = hex_colors;
        if hex_colors.len() > PALETTE_SIZE {
            warn!(
                "{} colors provided. Only the first {} will be used.",
                hex_colors.len(),
                PALETTE_SIZE
            );
            hex_colors = &hex_colors[..PALETTE_SIZE];
        }
        let mut colors = [BLACK; PALETTE_SIZE];
        for (slot, s) in colors.iter_mut().zip(hex_colors) {
            *slot = parse_hex_color(s.as_ref())?;
        }
        Ok(Palette { colors })
    }

    pub fn from_hex_str(list: &str) -> Result<Self> {
        let entries = list.split(',').map(str::trim).collect_vec();
        Self::from_hex_list(&entries)
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        info!("Loading {}", path.display());
        let data_bytes = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AssetError::PaletteFileNotFound {
                path: path.to_owned(),
            },
            _ => AssetError::Io {
                path: path.to_owned(),
                source: e,
            },
        })?;
        let data: PaletteFile =
            serde_json::from_slice(&data_bytes).map_err(|e| AssetError::PaletteFileMalformed {
                path: path.to_owned(),
                reason: e.to_string(),
            })?;
        if data.palette.is_empty() {
            return Err(AssetError::PaletteFileMalformed {
                path: path.to_owned(),
                reason: "'palette' list is empty".to_string(),
            });
        }
        Self::from_hex_list(&data.palette)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        info!("Saving {}", path.display());
        let io_err = |source: io::Error| AssetError::Io {
            path: path.to_owned(),
            source,
        };
        let data = PaletteFile {
            palette: self.hex_entries(),
        };
        let formatter = PrettyCompactFormatter::new();
        let mut data_bytes = vec![];
        let mut ser = Serializer::with_formatter(&mut data_bytes, formatter);
        data.serialize(&mut ser)
            .map_err(|e| io_err(io::Error::from(e)))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, &data_bytes).map_err(io_err)?;
        Ok(())
    }

    /// Derives a palette from image content.
    ///
    /// Each image is composited over opaque white using its alpha channel,
    /// and the results are stacked vertically at the widest image's width
    /// (the uncovered area of narrower images counts as white). Median cut
    /// then picks 15 colors for slots 1-15; slot 0 stays black.
    pub fn from_images(images: &[&DecodedImage]) -> Result<Self> {
        let max_width = images
            .iter()
            .map(|img| img.width())
            .max()
            .ok_or(AssetError::NoValidInputImages)?;

        info!(
            "Creating a {}-color palette from the image(s), reserving color 0 for transparency.",
            CONTENT_COLORS
        );
        let composited = images.iter().flat_map(|&img| {
            (0..img.height()).flat_map(move |y| {
                (0..max_width).map(move |x| {
                    if x < img.width() {
                        let p = img.get_pixel(x, y);
                        alpha_blend(WHITE, rgb(p), p[3])
                    } else {
                        WHITE
                    }
                })
            })
        });
        let content = median_cut(histogram(composited), CONTENT_COLORS);

        let mut colors = [BLACK; PALETTE_SIZE];
        for (slot, c) in colors[1..].iter_mut().zip(content) {
            *slot = c;
        }
        Ok(Palette { colors })
    }

    pub fn colors(&self) -> &[ColorRGB; PALETTE_SIZE] {
        &self.colors
    }

    /// Slots 1-15, the colors available to opaque content.
    pub fn content_colors(&self) -> &[ColorRGB] {
        &self.colors[1..]
    }

    /// All 16 entries as one uppercase hex string (48 bytes, 96 digits).
    pub fn to_hex(&self) -> String {
        self.colors
            .iter()
            .flatten()
            .map(|b| format!("{:02X}", b))
            .join("")
    }

    pub fn hex_entries(&self) -> Vec<String> {
        self.colors
            .iter()
            .map(|[r, g, b]| format!("#{:02X}{:02X}{:02X}", r, g, b))
            .collect()
    }
}
