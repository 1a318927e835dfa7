// Reference PNG output: a 4-bit indexed image using the shared palette,
// with index 0 marked fully transparent.
use std::{fs::File, io::BufWriter, path::Path};

use log::info;

use crate::{
    assign::IndexGrid,
    common::{PALETTE_SIZE, TRANSPARENT_IDX},
    error::{AssetError, Result},
    palette::Palette,
};

// Row-major 4bpp scanlines as PNG expects them: leftmost pixel in the high
// nibble, each row padded to a whole byte.
fn pack_scanlines(grid: &IndexGrid) -> Vec<u8> {
    let mut data = Vec::with_capacity(grid.height() as usize * grid.width().div_ceil(2) as usize);
    for row in grid.rows() {
        for pair in row.chunks(2) {
            let low = pair.get(1).copied().unwrap_or(0);
            data.push(pair[0] << 4 | low);
        }
    }
    data
}

pub fn save_indexed_png(path: &Path, grid: &IndexGrid, palette: &Palette) -> Result<()> {
    let png_err = |source| AssetError::Png {
        path: path.to_owned(),
        source,
    };
    let file = File::create(path).map_err(|source| AssetError::Io {
        path: path.to_owned(),
        source,
    })?;

    let mut encoder = png::Encoder::new(BufWriter::new(file), grid.width(), grid.height());
    encoder.set_color(png::ColorType::Indexed);
    encoder.set_depth(png::BitDepth::Four);
    encoder.set_palette(palette.colors().iter().flatten().copied().collect::<Vec<u8>>());
    let mut trns = vec![255u8; PALETTE_SIZE];
    trns[TRANSPARENT_IDX as usize] = 0;
    encoder.set_trns(trns);

    let mut writer = encoder.write_header().map_err(png_err)?;
    writer
        .write_image_data(&pack_scanlines(grid))
        .map_err(png_err)?;
    writer.finish().map_err(png_err)?;
    info!("Image successfully saved to '{}'", path.display());
    Ok(())
}
