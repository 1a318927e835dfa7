pub type ColorValue = u8; // Color channel value (0-255)
pub type ColorIdx = u8; // Index into 4bpp palette (0-15)
pub type ColorRGB = [ColorValue; 3];

pub const PALETTE_SIZE: usize = 16;

// Slot 0 of every palette is reserved for transparency and never carries
// image content.
pub const TRANSPARENT_IDX: ColorIdx = 0;

// Number of palette slots available to real image colors (1-15).
pub const CONTENT_COLORS: usize = PALETTE_SIZE - 1;

pub const BLACK: ColorRGB = [0, 0, 0];
pub const WHITE: ColorRGB = [255, 255, 255];

// Tag byte identifying a 4bpp image buffer to the runtime.
pub const FORMAT_TAG: u8 = 0xE4;

// Decoded RGBA raster as handed over by the image loader.
pub type DecodedImage = image::RgbaImage;
