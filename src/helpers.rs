use crate::common::{ColorRGB, ColorValue};

// Linear "over" blend of an 8-bit alpha foreground onto an opaque background,
// rounded to the nearest channel value.
pub fn alpha_blend(bg: ColorRGB, fg: ColorRGB, alpha: ColorValue) -> ColorRGB {
    let a = alpha as u32;
    let mut out: ColorRGB = [0, 0, 0];
    for i in 0..3 {
        out[i] = ((fg[i] as u32 * a + bg[i] as u32 * (255 - a) + 127) / 255) as u8;
    }
    out
}

pub fn rgb(pixel: &image::Rgba<u8>) -> ColorRGB {
    [pixel[0], pixel[1], pixel[2]]
}
