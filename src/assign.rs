// Mapping of RGBA pixels onto 4-bit palette indices.
use log::debug;

use crate::{
    common::{ColorIdx, DecodedImage, BLACK, PALETTE_SIZE, TRANSPARENT_IDX},
    helpers::rgb,
    palette::Palette,
    quantize::NearestColor,
};

// Where true black ends up, and where it is assumed to live when the
// palette has no exact black entry.
const BLACK_IDX: ColorIdx = 15;

// Replacement for opaque pixels whose nearest color is the reserved slot.
const FIRST_OPAQUE_IDX: ColorIdx = 1;

/// Width x height grid of palette indices (0-15), row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexGrid {
    width: u32,
    height: u32,
    indices: Vec<ColorIdx>,
}

impl IndexGrid {
    pub fn new(width: u32, height: u32, indices: Vec<ColorIdx>) -> Self {
        assert_eq!(indices.len(), width as usize * height as usize);
        assert!(indices.iter().all(|&i| (i as usize) < PALETTE_SIZE));
        IndexGrid {
            width,
            height,
            indices,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> ColorIdx {
        self.indices[(y * self.width + x) as usize]
    }

    pub fn indices(&self) -> &[ColorIdx] {
        &self.indices
    }

    pub fn rows(&self) -> impl Iterator<Item = &[ColorIdx]> {
        self.indices.chunks(self.width.max(1) as usize)
    }
}

// What the remap rules get to see about one pixel of an image that has
// transparency.
struct PixelContext {
    alpha: u8,
    nearest: ColorIdx,
    black_idx: ColorIdx,
}

enum Remap {
    To(ColorIdx),
    Keep,
}

struct RemapRule {
    applies: fn(&PixelContext) -> bool,
    remap: Remap,
}

// Evaluated top to bottom, first match wins. The alpha test must come first
// so that only genuinely transparent pixels get index 0, and the black test
// must precede the zero test so that opaque black never reads as
// transparent.
const TRANSPARENCY_RULES: [RemapRule; 4] = [
    RemapRule {
        applies: |p| p.alpha == 0,
        remap: Remap::To(TRANSPARENT_IDX),
    },
    RemapRule {
        applies: |p| p.nearest == p.black_idx,
        remap: Remap::To(BLACK_IDX),
    },
    RemapRule {
        applies: |p| p.nearest == TRANSPARENT_IDX,
        remap: Remap::To(FIRST_OPAQUE_IDX),
    },
    RemapRule {
        applies: |_| true,
        remap: Remap::Keep,
    },
];

fn apply_rules(ctx: &PixelContext) -> ColorIdx {
    match TRANSPARENCY_RULES.iter().find(|r| (r.applies)(ctx)) {
        Some(RemapRule {
            remap: Remap::To(idx),
            ..
        }) => *idx,
        _ => ctx.nearest,
    }
}

pub fn has_transparency(image: &DecodedImage) -> bool {
    image.pixels().any(|p| p[3] < 255)
}

// First slot holding exact black, else the last slot.
fn black_index(palette: &Palette) -> ColorIdx {
    palette
        .colors()
        .iter()
        .position(|&c| c == BLACK)
        .map_or(BLACK_IDX, |i| i as ColorIdx)
}

/// Assigns a palette index to every pixel of `image`.
///
/// Images containing any pixel with alpha below 255 are snapped to all 16
/// palette entries and then remapped so that index 0 marks exactly the
/// fully transparent pixels. Fully opaque images are snapped to slots 1-15
/// only, so index 0 cannot occur.
pub fn assign_indices(image: &DecodedImage, palette: &Palette) -> IndexGrid {
    let indices = if has_transparency(image) {
        debug!("Image has transparency; reserving index 0 for transparent pixels.");
        assign_with_transparency(image, palette)
    } else {
        debug!("Image is fully opaque; using palette slots 1-15.");
        assign_opaque(image, palette)
    };
    IndexGrid::new(image.width(), image.height(), indices)
}

fn assign_with_transparency(image: &DecodedImage, palette: &Palette) -> Vec<ColorIdx> {
    let black_idx = black_index(palette);
    let mut nearest = NearestColor::new(palette.colors());
    image
        .pixels()
        .map(|p| {
            apply_rules(&PixelContext {
                alpha: p[3],
                nearest: nearest.lookup(rgb(p)),
                black_idx,
            })
        })
        .collect()
}

fn assign_opaque(image: &DecodedImage, palette: &Palette) -> Vec<ColorIdx> {
    let mut nearest = NearestColor::new(palette.content_colors());
    image.pixels().map(|p| nearest.lookup(rgb(p)) + 1).collect()
}
