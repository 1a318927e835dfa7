// Binary 4bpp image buffers and their textual forms.
//
// The buffer starts with a 4-byte header (format tag, width, height,
// reserved zero) followed by the pixel body. The body is column-major:
// each column is walked top to bottom two rows at a time, and each pair
// of pixels shares a byte with the upper pixel in the low nibble. An odd
// final row is paired with a zero nibble.
use itertools::Itertools;

use crate::{
    assign::IndexGrid,
    common::FORMAT_TAG,
    error::{AssetError, Result},
};

pub const HEADER_LEN: usize = 4;
const RESERVED: u8 = 0x00;

// Grid literal symbols, indexed by palette index. Index 0 (transparent)
// renders as a dot.
const LITERAL_ALPHABET: &[u8; 16] = b".123456789abcdef";

/// One encoded image, ready to be written out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedAsset {
    name: String,
    width: u8,
    height: u8,
    body: Vec<u8>,
    literal: String,
}

pub fn body_len(width: usize, height: usize) -> usize {
    width * height.div_ceil(2)
}

pub fn pack_indices(grid: &IndexGrid) -> Vec<u8> {
    let (width, height) = (grid.width(), grid.height());
    let mut packed = Vec::with_capacity(body_len(width as usize, height as usize));
    for x in 0..width {
        for y in (0..height).step_by(2) {
            let low = grid.get(x, y);
            let high = if y + 1 < height { grid.get(x, y + 1) } else { 0 };
            packed.push(high << 4 | (low & 0x0F));
        }
    }
    packed
}

/// Renders the grid one row per line, cells separated by spaces.
pub fn grid_literal(grid: &IndexGrid) -> String {
    grid.rows()
        .map(|row| {
            row.iter()
                .map(|&idx| LITERAL_ALPHABET[idx as usize] as char)
                .join(" ")
        })
        .join("\n")
}

/// Encodes a grid under a logical name. Fails with `DimensionOverflow` when
/// either dimension does not fit in a header byte.
pub fn encode(name: &str, grid: &IndexGrid) -> Result<EncodedAsset> {
    let overflow = || AssetError::DimensionOverflow {
        name: name.to_string(),
        width: grid.width(),
        height: grid.height(),
    };
    let width = u8::try_from(grid.width()).map_err(|_| overflow())?;
    let height = u8::try_from(grid.height()).map_err(|_| overflow())?;
    Ok(EncodedAsset {
        name: name.to_string(),
        width,
        height,
        body: pack_indices(grid),
        literal: grid_literal(grid),
    })
}

impl EncodedAsset {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn header(&self) -> [u8; HEADER_LEN] {
        [FORMAT_TAG, self.width, self.height, RESERVED]
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.header().to_vec();
        bytes.extend_from_slice(&self.body);
        bytes
    }

    /// Header and body as uppercase hex, no separators.
    pub fn to_hex(&self) -> String {
        self.to_bytes().iter().map(|b| format!("{:02X}", b)).join("")
    }
}
